use chrono::{DateTime, FixedOffset};
use std::sync::Arc;
use url::Url;

use crate::error::ParseWarning;
use crate::utils::url::resolve_reference;

/// Pixel dimensions of a variant stream, from `RESOLUTION=WIDTHxHEIGHT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Horizontal pixels.
    pub width: u32,
    /// Vertical pixels.
    pub height: u32,
}

impl Resolution {
    /// Resolution of `width` by `height` pixels.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Parses `1280x720`. Anything else yields `None`.
    pub fn parse(value: &str) -> Option<Self> {
        let (width, height) = value.trim().split_once('x')?;
        Some(Self {
            width: width.trim().parse().ok()?,
            height: height.trim().parse().ok()?,
        })
    }
}

/// Encryption key declared by `#EXT-X-KEY`.
///
/// One instance is shared by every segment between its directive and the
/// next `#EXT-X-KEY`, so it is handed out as `Arc<XKey>` and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XKey {
    /// `METHOD`, e.g. `AES-128` or `SAMPLE-AES`.
    pub method: String,
    /// `URI` of the key, quotes removed.
    pub uri: String,
    /// `IV` as written, e.g. `0x0123...`.
    pub iv: Option<String>,
    /// `KEYFORMAT`.
    pub key_format: Option<String>,
    /// `KEYFORMATVERSIONS`.
    pub key_format_versions: Option<String>,
}

/// One media segment: an `#EXTINF`, the tags that decorate it, and its URI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaSegment {
    /// Seconds, from `#EXTINF`.
    pub duration: Option<f64>,
    /// Text after the duration's comma, empty when absent.
    pub title: String,
    /// URI line as written in the manifest.
    pub path: Option<String>,
    /// Media sequence number.
    pub sequence: i64,
    /// Length from `#EXT-X-BYTERANGE`.
    pub subrange_length: Option<u64>,
    /// Offset from `#EXT-X-BYTERANGE`, when given.
    pub subrange_start: Option<u64>,
    /// Set by `#EXT-X-DISCONTINUITY`.
    pub discontinuity: bool,
    /// From `#EXT-X-PROGRAM-DATE-TIME`.
    pub program_date_time: Option<DateTime<FixedOffset>>,
    /// Key in effect when the segment was closed.
    pub x_key: Option<Arc<XKey>>,
}

impl MediaSegment {
    /// Empty segment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Byte range as `(start, length)` when both halves are known.
    pub fn byte_range(&self) -> Option<(u64, u64)> {
        Some((self.subrange_start?, self.subrange_length?))
    }
}

/// A variant stream: the attributes its master listed it with plus the
/// segments of its own manifest once that has been parsed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaPlaylist {
    /// `PROGRAM-ID` from the master.
    pub program_id: Option<i64>,
    /// Bits per second.
    pub bandwidth: Option<f64>,
    /// `RESOLUTION` from the master.
    pub resolution: Option<Resolution>,
    /// `CODECS` from the master, quotes removed.
    pub codecs: Option<String>,
    /// Reference exactly as written in the master manifest.
    pub path: Option<String>,
    /// Absolute location this playlist was fetched from, when known.
    pub location: Option<Url>,
    /// `#EXT-X-VERSION`.
    pub version: Option<i64>,
    /// `#EXT-X-TARGETDURATION` in seconds.
    pub target_duration: Option<i64>,
    /// `#EXT-X-MEDIA-SEQUENCE`, 0 when absent.
    pub media_sequence: i64,
    /// Set by `#EXT-X-ENDLIST`.
    pub end_list: bool,
    /// Segments in manifest order.
    pub segments: Vec<MediaSegment>,
    /// Problems found while parsing this playlist.
    pub warnings: Vec<ParseWarning>,
}

impl MediaPlaylist {
    /// Empty playlist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `segment`.
    pub fn add_segment(&mut self, segment: MediaSegment) {
        self.segments.push(segment);
    }

    /// Total playback time in seconds. Segments without a duration count as 0.
    pub fn duration(&self) -> f64 {
        self.segments.iter().filter_map(|s| s.duration).sum()
    }

    /// Absolute URL of `segment`, resolved against this playlist's location.
    pub fn segment_url(&self, segment: &MediaSegment) -> Option<Url> {
        let base = self.location.as_ref()?;
        resolve_reference(base, segment.path.as_deref()?).ok()
    }
}

/// A master manifest: its variant streams in manifest order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MasterPlaylist {
    /// Variant streams.
    pub playlists: Vec<MediaPlaylist>,
    /// Absolute location of the master manifest, when known.
    pub location: Option<Url>,
    /// Problems found while parsing or resolving the master.
    pub warnings: Vec<ParseWarning>,
}

impl MasterPlaylist {
    /// Empty master.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `playlist`.
    pub fn add_playlist(&mut self, playlist: MediaPlaylist) {
        self.playlists.push(playlist);
    }
}
