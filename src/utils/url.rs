use url::Url;

use crate::Result;

/// References beginning with one of these are used as-is instead of being
/// resolved against the parent manifest.
const QUALIFIED_PREFIXES: [&str; 2] = ["http", "file"];

/// Returns true when `reference` names its own scheme (`http…`, `file…`).
pub fn is_fully_qualified(reference: &str) -> bool {
    QUALIFIED_PREFIXES.iter().any(|p| reference.starts_with(p))
}

/// Resolves `reference` against `base` following RFC 3986.
///
/// A relative path replaces the last path component: `low/index.m3u8`
/// against `http://host/vod/master.m3u8` becomes
/// `http://host/vod/low/index.m3u8`. A root-relative path (`/abs/x.m3u8`)
/// replaces the whole path and a network-path reference (`//cdn/x.m3u8`)
/// replaces the host as well. Dot segments are normalised.
pub fn join_reference(base: &Url, reference: &str) -> Result<Url> {
    Ok(base.join(reference)?)
}

/// Builds the absolute URL for a manifest reference found inside `base`.
pub fn resolve_reference(base: &Url, reference: &str) -> Result<Url> {
    if is_fully_qualified(reference) {
        Ok(Url::parse(reference)?)
    } else {
        join_reference(base, reference)
    }
}

/// Turns a user supplied location (URL or filesystem path) into a `Url`.
pub fn location_from_str(location: &str) -> Result<Url> {
    match Url::parse(location) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let path = std::path::absolute(location)?;
            Url::from_file_path(&path).map_err(|_| {
                crate::ManifestError::UnsupportedScheme(format!("not a file path: {}", location))
            })
        }
        Err(e) => Err(e.into()),
    }
}
