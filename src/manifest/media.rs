use chrono::DateTime;
use log::debug;
use std::sync::Arc;

use super::attributes::parse_attribute_list;
use super::types::{MediaPlaylist, MediaSegment, XKey};
use super::{record, split_directive};
use crate::error::ParseWarning;
use crate::source::LineSource;

const EXT_X_VERSION: &str = "#EXT-X-VERSION";
const EXT_X_TARGETDURATION: &str = "#EXT-X-TARGETDURATION";
const EXT_X_MEDIA_SEQUENCE: &str = "#EXT-X-MEDIA-SEQUENCE";
const EXTINF: &str = "#EXTINF";
const EXT_X_BYTERANGE: &str = "#EXT-X-BYTERANGE";
const EXT_X_DISCONTINUITY: &str = "#EXT-X-DISCONTINUITY";
const EXT_X_PROGRAM_DATE_TIME: &str = "#EXT-X-PROGRAM-DATE-TIME";
const EXT_X_KEY: &str = "#EXT-X-KEY";
const EXT_X_ENDLIST: &str = "#EXT-X-ENDLIST";

/// Called with the playlist and the segment just appended to it.
pub type MediaSegmentCallback<'a> = Box<dyn FnMut(&MediaPlaylist, &MediaSegment) + Send + 'a>;

/// Parses media playlists.
///
/// `#EXTINF` opens a segment, the tags after it decorate that segment, and
/// the next URI line closes it. The most recent valid `#EXT-X-KEY` is shared
/// by every segment closed after it.
#[derive(Default)]
pub struct MediaPlaylistParser<'a> {
    on_media_segment: Option<MediaSegmentCallback<'a>>,
}

/// State that lives for one parse call.
struct ParseState {
    x_key: Option<Arc<XKey>>,
    pending: Option<MediaSegment>,
    /// `None` once numbering has run past `i64::MAX`.
    sequence: Option<i64>,
    overflow_reported: bool,
}

impl<'a> MediaPlaylistParser<'a> {
    /// Parser with no callback registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback fired once per segment, in manifest order.
    pub fn on_media_segment<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&MediaPlaylist, &MediaSegment) + Send + 'a,
    {
        self.on_media_segment = Some(Box::new(callback));
        self
    }

    /// Parses a media playlist from `source`. Problems in the text end up
    /// in [`MediaPlaylist::warnings`]; the parse itself never fails.
    pub fn parse<S: LineSource>(&mut self, source: S) -> MediaPlaylist {
        let mut playlist = MediaPlaylist::new();
        self.parse_into(source, &mut playlist);
        playlist
    }

    /// Continues populating `playlist`, e.g. a variant from a master manifest.
    /// Its `path` and `location` are left alone.
    pub fn parse_into<S: LineSource>(&mut self, mut source: S, playlist: &mut MediaPlaylist) {
        let mut state = ParseState {
            x_key: None,
            pending: None,
            sequence: Some(playlist.media_sequence),
            overflow_reported: false,
        };

        while let Some(line) = source.read_line() {
            if line.is_empty() {
                continue;
            }

            if line.starts_with('#') {
                let (tag, value) = split_directive(&line);
                apply_directive(tag, value.trim(), &mut state, playlist);
                continue;
            }

            let Some(mut segment) = state.pending.take() else {
                debug!("Ignoring URI without #EXTINF: {}", line);
                continue;
            };
            let Some(sequence) = state.sequence else {
                if !state.overflow_reported {
                    record(&mut playlist.warnings, ParseWarning::SequenceOverflow { path: line });
                    state.overflow_reported = true;
                }
                continue;
            };
            segment.path = Some(line);
            segment.sequence = sequence;
            segment.x_key = state.x_key.clone();
            state.sequence = sequence.checked_add(1);
            playlist.add_segment(segment);

            if let Some(callback) = self.on_media_segment.as_mut() {
                let playlist: &MediaPlaylist = playlist;
                if let Some(segment) = playlist.segments.last() {
                    callback(playlist, segment);
                }
            }
        }

        source.close();
    }
}

fn apply_directive(tag: &str, value: &str, state: &mut ParseState, playlist: &mut MediaPlaylist) {
    match tag {
        EXT_X_VERSION => {
            if let Some(version) = parse_number(EXT_X_VERSION, value, &mut playlist.warnings) {
                playlist.version = Some(version);
            }
        }
        EXT_X_TARGETDURATION => {
            if let Some(duration) = parse_number(EXT_X_TARGETDURATION, value, &mut playlist.warnings) {
                playlist.target_duration = Some(duration);
            }
        }
        EXT_X_MEDIA_SEQUENCE => {
            if let Some(sequence) = parse_number(EXT_X_MEDIA_SEQUENCE, value, &mut playlist.warnings) {
                playlist.media_sequence = sequence;
                state.sequence = Some(sequence);
                state.overflow_reported = false;
            }
        }
        EXTINF => {
            let mut segment = MediaSegment::new();
            let (duration, title) = value.split_once(',').unwrap_or((value, ""));
            match duration.trim().parse::<f64>() {
                Ok(duration) if duration.is_finite() => segment.duration = Some(duration),
                _ => record(
                    &mut playlist.warnings,
                    malformed(EXTINF, "duration", duration),
                ),
            }
            segment.title = title.to_string();
            state.pending = Some(segment);
        }
        EXT_X_BYTERANGE => {
            let Some(segment) = pending_segment(EXT_X_BYTERANGE, state, playlist) else {
                return;
            };
            let (length, start) = match value.split_once('@') {
                Some((length, start)) => (length, Some(start)),
                None => (value, None),
            };
            segment.subrange_length = length.trim().parse().ok();
            segment.subrange_start = start.and_then(|s| s.trim().parse().ok());

            let start_ok = start.is_none() || segment.subrange_start.is_some();
            if segment.subrange_length.is_none() || !start_ok {
                record(
                    &mut playlist.warnings,
                    malformed(EXT_X_BYTERANGE, "byte range", value),
                );
            }
        }
        EXT_X_DISCONTINUITY => {
            if let Some(segment) = pending_segment(EXT_X_DISCONTINUITY, state, playlist) {
                segment.discontinuity = true;
            }
        }
        EXT_X_PROGRAM_DATE_TIME => {
            let Some(segment) = pending_segment(EXT_X_PROGRAM_DATE_TIME, state, playlist) else {
                return;
            };
            match DateTime::parse_from_rfc3339(value) {
                Ok(date_time) => segment.program_date_time = Some(date_time),
                Err(_) => record(
                    &mut playlist.warnings,
                    malformed(EXT_X_PROGRAM_DATE_TIME, "date-time", value),
                ),
            }
        }
        EXT_X_KEY => {
            state.x_key = parse_x_key(value, &mut playlist.warnings).map(Arc::new);
        }
        EXT_X_ENDLIST => playlist.end_list = true,
        _ => {}
    }
}

/// The segment opened by the last `#EXTINF`. A tag that needs one but comes
/// before any `#EXTINF` is reported and skipped.
fn pending_segment<'s>(
    directive: &'static str,
    state: &'s mut ParseState,
    playlist: &mut MediaPlaylist,
) -> Option<&'s mut MediaSegment> {
    if state.pending.is_none() {
        record(
            &mut playlist.warnings,
            ParseWarning::OrderingViolation { directive },
        );
    }
    state.pending.as_mut()
}

fn parse_x_key(value: &str, warnings: &mut Vec<ParseWarning>) -> Option<XKey> {
    let attrs = parse_attribute_list(value);
    let owned = |key: &str| attrs.get_unquoted(key).map(str::to_string);

    let Some(method) = owned("METHOD") else {
        record(warnings, ParseWarning::MissingRequiredKeyAttribute { attribute: "METHOD" });
        return None;
    };
    let Some(uri) = owned("URI") else {
        record(warnings, ParseWarning::MissingRequiredKeyAttribute { attribute: "URI" });
        return None;
    };

    Some(XKey {
        method,
        uri,
        iv: owned("IV"),
        key_format: owned("KEYFORMAT"),
        key_format_versions: owned("KEYFORMATVERSIONS"),
    })
}

/// Integer directives take the leading run of ASCII digits, so `10.000` reads
/// as 10. No digits, or a run too large for `i64`, is malformed.
fn parse_number(directive: &'static str, value: &str, warnings: &mut Vec<ParseWarning>) -> Option<i64> {
    let end = value.find(|c: char| !c.is_ascii_digit()).unwrap_or(value.len());
    match value[..end].parse() {
        Ok(n) => Some(n),
        Err(_) => {
            record(warnings, malformed(directive, "value", value));
            None
        }
    }
}

fn malformed(directive: &'static str, attribute: &'static str, value: &str) -> ParseWarning {
    ParseWarning::MalformedAttribute {
        directive,
        attribute,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ReaderLineSource, StrLineSource};
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> MediaPlaylist {
        MediaPlaylistParser::new().parse(StrLineSource::new(text))
    }

    #[test]
    fn test_header_directives() {
        let playlist = parse("#EXTM3U\n#EXT-X-VERSION:4\n#EXT-X-TARGETDURATION:11\n#EXT-X-MEDIA-SEQUENCE:7\n#EXT-X-ENDLIST\n");

        assert_eq!(playlist.version, Some(4));
        assert_eq!(playlist.target_duration, Some(11));
        assert_eq!(playlist.media_sequence, 7);
        assert!(playlist.end_list);
        assert!(playlist.segments.is_empty());
    }

    #[test]
    fn test_two_segments() {
        let playlist = parse(
            "#EXTM3U\n#EXT-X-TARGETDURATION:11\n#EXT-X-MEDIA-SEQUENCE:0\n#EXTINF:10.8,\nseg0.ts\n#EXTINF:10.8,\nseg1.ts\n",
        );

        assert_eq!(playlist.target_duration, Some(11));
        assert_eq!(playlist.media_sequence, 0);
        assert_eq!(playlist.segments.len(), 2);
        assert_eq!(playlist.segments[0].sequence, 0);
        assert_eq!(playlist.segments[1].sequence, 1);
        assert_eq!(playlist.segments[1].path.as_deref(), Some("seg1.ts"));
        assert_eq!(playlist.duration(), 21.6);
    }

    #[test]
    fn test_extinf_title() {
        let playlist = parse("#EXTINF:10.8,\na.ts\n#EXTINF:4.5,Intro, part 1\nb.ts\n#EXTINF:3\nc.ts\n");

        assert_eq!(playlist.segments[0].duration, Some(10.8));
        assert_eq!(playlist.segments[0].title, "");
        assert_eq!(playlist.segments[1].title, "Intro, part 1");
        assert_eq!(playlist.segments[2].duration, Some(3.0));
        assert_eq!(playlist.segments[2].title, "");
    }

    #[test]
    fn test_sequence_starts_at_media_sequence() {
        let playlist = parse("#EXT-X-MEDIA-SEQUENCE:100\n#EXTINF:2,\na.ts\n#EXTINF:2,\nb.ts\n#EXTINF:2,\nc.ts\n");

        let sequences: Vec<i64> = playlist.segments.iter().map(|s| s.sequence).collect();
        assert_eq!(sequences, vec![100, 101, 102]);
    }

    #[test]
    fn test_byte_ranges() {
        let playlist = parse(
            "#EXTINF:10,\n#EXT-X-BYTERANGE:876456@0\nmain.ts\n#EXTINF:10,\n#EXT-X-BYTERANGE:1358864@876456\nmain.ts\n#EXTINF:10,\n#EXT-X-BYTERANGE:5000\nmain.ts\n",
        );

        assert_eq!(playlist.segments[0].subrange_length, Some(876456));
        assert_eq!(playlist.segments[0].subrange_start, Some(0));
        assert_eq!(playlist.segments[1].subrange_length, Some(1358864));
        assert_eq!(playlist.segments[1].subrange_start, Some(876456));
        assert_eq!(playlist.segments[2].subrange_length, Some(5000));
        assert_eq!(playlist.segments[2].subrange_start, None);
        assert!(playlist.warnings.is_empty());
    }

    #[test]
    fn test_malformed_byte_range() {
        let playlist = parse("#EXTINF:10,\n#EXT-X-BYTERANGE:lots@0\nmain.ts\n");

        assert_eq!(playlist.segments[0].subrange_length, None);
        assert_eq!(playlist.segments[0].subrange_start, Some(0));
        assert_eq!(playlist.warnings.len(), 1);
    }

    #[test]
    fn test_discontinuity() {
        let playlist = parse("#EXTINF:10,\na.ts\n#EXTINF:10,\n#EXT-X-DISCONTINUITY\nb.ts\n#EXT-X-DISCONTINUITY-SEQUENCE:3\n");

        assert!(!playlist.segments[0].discontinuity);
        assert!(playlist.segments[1].discontinuity);
        assert!(playlist.warnings.is_empty());
    }

    #[test]
    fn test_ordering_violations_are_reported_and_skipped() {
        let playlist = parse("#EXT-X-BYTERANGE:100@0\n#EXT-X-DISCONTINUITY\n#EXTINF:10,\na.ts\n");

        assert_eq!(playlist.segments.len(), 1);
        assert_eq!(playlist.segments[0].subrange_length, None);
        assert!(!playlist.segments[0].discontinuity);
        assert_eq!(
            playlist.warnings,
            vec![
                ParseWarning::OrderingViolation { directive: "#EXT-X-BYTERANGE" },
                ParseWarning::OrderingViolation { directive: "#EXT-X-DISCONTINUITY" },
            ]
        );
    }

    #[test]
    fn test_key_is_shared_until_replaced() {
        let playlist = parse(concat!(
            "#EXTINF:10,\nclear.ts\n",
            "#EXT-X-KEY:METHOD=AES-128,URI=\"https://my-host/?foo=bar\",IV=0x0123456789ABCDEF\n",
            "#EXTINF:10,\na.ts\n#EXTINF:10,\nb.ts\n",
            "#EXT-X-KEY:METHOD=SAMPLE-AES,URI=\"skd://twelve\",KEYFORMAT=\"com.apple.streamingkeydelivery\",KEYFORMATVERSIONS=\"1\"\n",
            "#EXTINF:10,\nc.ts\n",
        ));

        let segments = &playlist.segments;
        assert!(segments[0].x_key.is_none());

        let a = segments[1].x_key.as_ref().unwrap();
        let b = segments[2].x_key.as_ref().unwrap();
        assert!(Arc::ptr_eq(a, b));
        assert_eq!(a.method, "AES-128");
        assert_eq!(a.uri, "https://my-host/?foo=bar");
        assert_eq!(a.iv.as_deref(), Some("0x0123456789ABCDEF"));
        assert_eq!(a.key_format, None);

        let c = segments[3].x_key.as_ref().unwrap();
        assert!(!Arc::ptr_eq(a, c));
        assert_eq!(c.method, "SAMPLE-AES");
        assert_eq!(c.uri, "skd://twelve");
        assert_eq!(c.key_format.as_deref(), Some("com.apple.streamingkeydelivery"));
        assert_eq!(c.key_format_versions.as_deref(), Some("1"));
    }

    #[test]
    fn test_key_without_uri_clears_key() {
        let playlist = parse(concat!(
            "#EXT-X-KEY:METHOD=AES-128,URI=\"k1\"\n#EXTINF:10,\na.ts\n",
            "#EXT-X-KEY:METHOD=NONE\n#EXTINF:10,\nb.ts\n",
        ));

        assert!(playlist.segments[0].x_key.is_some());
        assert!(playlist.segments[1].x_key.is_none());
        assert_eq!(
            playlist.warnings,
            vec![ParseWarning::MissingRequiredKeyAttribute { attribute: "URI" }]
        );
    }

    #[test]
    fn test_program_date_time() {
        let playlist = parse("#EXTINF:10,\n#EXT-X-PROGRAM-DATE-TIME:2010-02-19T14:54:23.031+08:00\na.ts\n");

        let date_time = playlist.segments[0].program_date_time.unwrap();
        assert_eq!(date_time.to_rfc3339(), "2010-02-19T14:54:23.031+08:00");
    }

    #[test]
    fn test_malformed_numbers_leave_fields_unset() {
        let playlist = parse("#EXT-X-VERSION:x\n#EXT-X-MEDIA-SEQUENCE:\n#EXTINF:long,title\na.ts\n");

        assert_eq!(playlist.version, None);
        assert_eq!(playlist.media_sequence, 0);
        assert_eq!(playlist.segments[0].duration, None);
        assert_eq!(playlist.segments[0].title, "title");
        assert_eq!(playlist.segments[0].sequence, 0);
        assert_eq!(playlist.warnings.len(), 3);
    }

    #[test]
    fn test_integer_directives_take_leading_digits() {
        let playlist = parse("#EXT-X-TARGETDURATION:10.000\n#EXT-X-VERSION:3 ; v\n#EXT-X-MEDIA-SEQUENCE:42abc\n#EXTINF:1,\na.ts\n");

        assert_eq!(playlist.target_duration, Some(10));
        assert_eq!(playlist.version, Some(3));
        assert_eq!(playlist.media_sequence, 42);
        assert_eq!(playlist.segments[0].sequence, 42);
        assert!(playlist.warnings.is_empty());
    }

    #[test]
    fn test_integer_directive_too_large_is_malformed() {
        let playlist = parse("#EXT-X-MEDIA-SEQUENCE:99999999999999999999\n");

        assert_eq!(playlist.media_sequence, 0);
        assert_eq!(
            playlist.warnings,
            vec![malformed(EXT_X_MEDIA_SEQUENCE, "value", "99999999999999999999")]
        );
    }

    #[test]
    fn test_non_finite_durations_are_malformed() {
        let playlist = parse("#EXTINF:nan,\na.ts\n#EXTINF:inf,\nb.ts\n#EXTINF:-infinity,\nc.ts\n#EXTINF:2.5,\nd.ts\n");

        assert_eq!(playlist.segments.len(), 4);
        assert!(playlist.segments[..3].iter().all(|s| s.duration.is_none()));
        assert_eq!(playlist.segments[3].duration, Some(2.5));
        assert_eq!(playlist.duration(), 2.5);
        assert_eq!(
            playlist.warnings,
            vec![
                malformed(EXTINF, "duration", "nan"),
                malformed(EXTINF, "duration", "inf"),
                malformed(EXTINF, "duration", "-infinity"),
            ]
        );
    }

    #[test]
    fn test_invalid_utf8_title_keeps_later_segments() {
        let input: &[u8] = b"#EXTINF:1,\na.ts\n#EXTINF:1,caf\xe9\nb.ts\n#EXTINF:1,\nc.ts\n";
        let playlist = MediaPlaylistParser::new().parse(ReaderLineSource::new(input));

        let paths: Vec<_> = playlist.segments.iter().filter_map(|s| s.path.as_deref()).collect();
        assert_eq!(paths, vec!["a.ts", "b.ts", "c.ts"]);
        assert_eq!(playlist.segments[1].title, "caf\u{fffd}");
    }

    #[test]
    fn test_uri_without_extinf_is_ignored() {
        let playlist = parse("#EXTM3U\nstray.ts\n#EXTINF:1,\na.ts\nalso-stray.ts\n");

        assert_eq!(playlist.segments.len(), 1);
        assert_eq!(playlist.segments[0].path.as_deref(), Some("a.ts"));
    }

    #[test]
    fn test_parse_into_preserves_variant_fields() {
        let mut playlist = MediaPlaylist {
            path: Some("low/index.m3u8".to_string()),
            bandwidth: Some(1.0),
            ..MediaPlaylist::new()
        };

        MediaPlaylistParser::new().parse_into(StrLineSource::new("#EXTINF:1,\na.ts\n"), &mut playlist);

        assert_eq!(playlist.path.as_deref(), Some("low/index.m3u8"));
        assert_eq!(playlist.bandwidth, Some(1.0));
        assert_eq!(playlist.segments.len(), 1);
    }

    #[test]
    fn test_callback_sees_parent_playlist() {
        let mut seen = Vec::new();
        MediaPlaylistParser::new()
            .on_media_segment(|playlist, segment| {
                seen.push((playlist.segments.len(), segment.sequence, playlist.target_duration));
            })
            .parse(StrLineSource::new("#EXT-X-TARGETDURATION:4\n#EXT-X-MEDIA-SEQUENCE:5\n#EXTINF:4,\na.ts\n#EXTINF:4,\nb.ts\n"));

        assert_eq!(seen, vec![(1, 5, Some(4)), (2, 6, Some(4))]);
    }
}
