use thiserror::Error;

/// Fatal errors. These only come from acquiring manifest text, never from
/// the content of a manifest.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Reading a local manifest failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The HTTP request could not be sent or its body could not be read.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("http status {status} for {url}")]
    HttpStatus {
        /// Requested URL.
        url: String,
        /// Status code returned.
        status: u16,
    },

    /// A location could not be parsed as a URL.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// No fetcher handles the URL's scheme.
    #[error("unsupported url scheme: {0}")]
    UnsupportedScheme(String),

    /// A fetched body was not UTF-8.
    #[error("manifest is not valid utf-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// A manifest was larger than the configured limit.
    #[error("manifest exceeds {limit} bytes")]
    TooLarge {
        /// Configured limit in bytes.
        limit: usize,
    },
}

/// Recoverable problems found while parsing. The parser records these on the
/// document it returns and keeps going.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseWarning {
    /// A directive value or attribute could not be parsed. The field it
    /// would have set is left unset.
    #[error("malformed {attribute} in {directive}: {value:?}")]
    MalformedAttribute {
        /// Directive the value belongs to, e.g. `#EXTINF`.
        directive: &'static str,
        /// Which part of the directive was malformed.
        attribute: &'static str,
        /// Raw text as it appeared in the manifest.
        value: String,
    },

    /// `#EXT-X-KEY` lacked `METHOD` or `URI`.
    #[error("#EXT-X-KEY without {attribute}")]
    MissingRequiredKeyAttribute {
        /// The missing attribute name.
        attribute: &'static str,
    },

    /// A segment tag appeared with no open `#EXTINF` segment.
    #[error("{directive} without a preceding #EXTINF")]
    OrderingViolation {
        /// The misplaced directive.
        directive: &'static str,
    },

    /// Segment numbering ran past `i64::MAX`. The segment at `path` and
    /// every segment after it were dropped.
    #[error("sequence number overflow at {path}")]
    SequenceOverflow {
        /// URI of the first dropped segment.
        path: String,
    },

    /// A media playlist referenced by a master could not be loaded.
    #[error("could not load media playlist {path}: {reason}")]
    Unresolved {
        /// Path as written in the master manifest.
        path: String,
        /// Why resolving or fetching it failed.
        reason: String,
    },
}

/// Result type for manifest acquisition.
pub type Result<T> = std::result::Result<T, ManifestError>;
