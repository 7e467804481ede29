//! # Manifest Parsing
//!
//! Single-pass parsers for master and media playlists and the document
//! model they produce.
//!
//! ```rust
//! use m3u8kit::manifest::{MasterPlaylistParser, MediaPlaylistParser};
//! use m3u8kit::source::StrLineSource;
//!
//! let master = MasterPlaylistParser::new().parse(StrLineSource::new(
//!     "#EXTM3U\n#EXT-X-STREAM-INF:PROGRAM-ID=1,BANDWIDTH=2757000,RESOLUTION=1280x720\nlow/index.m3u8\n",
//! ));
//! assert_eq!(master.playlists[0].path.as_deref(), Some("low/index.m3u8"));
//!
//! let media = MediaPlaylistParser::new().parse(StrLineSource::new(
//!     "#EXTM3U\n#EXT-X-TARGETDURATION:11\n#EXTINF:10.8,\nseg0.ts\n#EXTINF:10.8,\nseg1.ts\n",
//! ));
//! assert_eq!(media.segments.len(), 2);
//! assert_eq!(media.duration(), 21.6);
//! ```
//!
//! Malformed content never fails a parse. Each problem is logged and kept
//! in the document's `warnings`, and the affected field stays unset.

use log::warn;

use crate::error::ParseWarning;

/// Quote-aware attribute list tokenizer
pub mod attributes;
/// Master playlist parser
pub mod master;
/// Media playlist parser
pub mod media;
/// Playlist, segment and key types
pub mod types;


pub use attributes::{parse_attribute_list, AttributeList};
pub use master::{MasterPlaylistParser, MediaPlaylistCallback};
pub use media::{MediaPlaylistParser, MediaSegmentCallback};
pub use types::{MasterPlaylist, MediaPlaylist, MediaSegment, Resolution, XKey};

/// Splits `#TAG:VALUE` into the tag name and the value after the colon.
pub(crate) fn split_directive(line: &str) -> (&str, &str) {
    line.split_once(':').unwrap_or((line, ""))
}

pub(crate) fn record(warnings: &mut Vec<ParseWarning>, warning: ParseWarning) {
    warn!("{}", warning);
    warnings.push(warning);
}
