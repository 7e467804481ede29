use log::debug;

use super::attributes::{parse_attribute_list, AttributeList};
use super::types::{MasterPlaylist, MediaPlaylist, Resolution};
use super::{record, split_directive};
use crate::error::ParseWarning;
use crate::source::LineSource;

const EXT_X_STREAM_INF: &str = "#EXT-X-STREAM-INF";

/// Called with the master and the playlist just appended to it.
pub type MediaPlaylistCallback<'a> = Box<dyn FnMut(&MasterPlaylist, &MediaPlaylist) + Send + 'a>;

/// Parses master playlists.
///
/// A `#EXT-X-STREAM-INF` line opens a variant; the next URI line names it and
/// appends it to the master. URI lines with no open variant are ignored.
#[derive(Default)]
pub struct MasterPlaylistParser<'a> {
    on_media_playlist: Option<MediaPlaylistCallback<'a>>,
}

impl<'a> MasterPlaylistParser<'a> {
    /// Parser with no callback registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback fired once per variant, in manifest order.
    pub fn on_media_playlist<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&MasterPlaylist, &MediaPlaylist) + Send + 'a,
    {
        self.on_media_playlist = Some(Box::new(callback));
        self
    }

    /// Parses a master playlist from `source`, closing it when done.
    pub fn parse<S: LineSource>(&mut self, mut source: S) -> MasterPlaylist {
        let mut master = MasterPlaylist::new();
        let mut pending: Option<MediaPlaylist> = None;

        while let Some(line) = source.read_line() {
            if line.is_empty() {
                continue;
            }

            if line.starts_with('#') {
                let (tag, value) = split_directive(&line);
                if tag == EXT_X_STREAM_INF {
                    let attrs = parse_attribute_list(value);
                    pending = Some(variant_from_attributes(&attrs, &mut master.warnings));
                }
                continue;
            }

            let Some(mut playlist) = pending.take() else {
                debug!("Ignoring URI without #EXT-X-STREAM-INF: {}", line);
                continue;
            };
            playlist.path = Some(line);
            master.add_playlist(playlist);

            if let (Some(callback), Some(playlist)) =
                (self.on_media_playlist.as_mut(), master.playlists.last())
            {
                callback(&master, playlist);
            }
        }

        source.close();
        master
    }
}

fn variant_from_attributes(attrs: &AttributeList, warnings: &mut Vec<ParseWarning>) -> MediaPlaylist {
    let mut playlist = MediaPlaylist::new();

    match attrs.get("PROGRAM-ID") {
        Some(value) => match value.parse() {
            Ok(id) => playlist.program_id = Some(id),
            Err(_) => record(warnings, malformed("PROGRAM-ID", value)),
        },
        None => debug!("#EXT-X-STREAM-INF without PROGRAM-ID"),
    }

    match attrs.get("BANDWIDTH") {
        Some(value) => match value.parse() {
            Ok(bandwidth) => playlist.bandwidth = Some(bandwidth),
            Err(_) => record(warnings, malformed("BANDWIDTH", value)),
        },
        None => debug!("#EXT-X-STREAM-INF without BANDWIDTH"),
    }

    if let Some(value) = attrs.get("RESOLUTION") {
        match Resolution::parse(value) {
            Some(resolution) => playlist.resolution = Some(resolution),
            None => record(warnings, malformed("RESOLUTION", value)),
        }
    }

    playlist.codecs = attrs.get_unquoted("CODECS").map(str::to_string);
    playlist
}

fn malformed(attribute: &'static str, value: &str) -> ParseWarning {
    ParseWarning::MalformedAttribute {
        directive: EXT_X_STREAM_INF,
        attribute,
        value: value.to_string(),
    }
}
