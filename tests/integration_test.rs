use m3u8kit::config::Config;
use m3u8kit::error::{ManifestError, ParseWarning, Result};
use m3u8kit::manifest::{MasterPlaylistParser, MediaPlaylistParser};
use m3u8kit::source::{FsFetcher, ReaderLineSource};
use m3u8kit::{ManifestBuilder, Resolution};
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn fixture_url(name: &str) -> Url {
    Url::from_file_path(fixture(name)).unwrap()
}

fn fs_builder() -> ManifestBuilder<FsFetcher> {
    ManifestBuilder::with_fetcher(FsFetcher::new(&Config::default()))
}

#[test]
fn test_parse_master_playlist_from_file() -> Result<()> {
    let mut callbacks = 0;
    let master = MasterPlaylistParser::new()
        .on_media_playlist(|_, playlist| {
            assert!(playlist.program_id.is_some());
            assert!(playlist.bandwidth.is_some());
            assert!(playlist.path.is_some());
            callbacks += 1;
        })
        .parse(ReaderLineSource::open(fixture("master.m3u8"))?);

    assert_eq!(callbacks, 5);
    assert_eq!(master.playlists.len(), 5);

    let paths: Vec<_> = master.playlists.iter().filter_map(|p| p.path.as_deref()).collect();
    assert_eq!(
        paths,
        vec!["low/index.m3u8", "mid/index.m3u8", "missing/index.m3u8", "hi/index.m3u8", "audio/index.m3u8"]
    );
    assert_eq!(master.playlists[1].resolution, Some(Resolution::new(640, 360)));
    assert_eq!(master.playlists[1].codecs.as_deref(), Some("avc1.4d401e,mp4a.40.2"));
    assert_eq!(master.playlists[4].resolution, None);
    assert!(master.warnings.is_empty());
    Ok(())
}

#[test]
fn test_parse_media_playlist_from_file() -> Result<()> {
    let playlist = fs_builder().parse_media_playlist_from_file(fixture("media_v.m3u8"))?;

    assert_eq!(playlist.target_duration, Some(11));
    assert_eq!(playlist.version, Some(4));
    assert_eq!(playlist.media_sequence, 0);
    assert!(playlist.end_list);
    assert_eq!(playlist.segments.len(), 4);

    let segments = &playlist.segments;
    assert_eq!(segments[0].title, "");
    assert_eq!(segments[0].subrange_length, Some(876456));
    assert_eq!(segments[0].subrange_start, Some(0));
    assert_eq!(segments[1].subrange_length, Some(1358864));
    assert_eq!(segments[1].subrange_start, Some(876456));
    assert_eq!(segments[2].duration, Some(10.8));
    assert_eq!(segments[2].path.as_deref(), Some("1540306021904-huwfw1.ts"));
    assert!(segments[3].discontinuity);
    assert!(!segments[2].discontinuity);
    assert!((playlist.duration() - 35.0).abs() < 1e-9);

    // The first DISCONTINUITY precedes its #EXTINF.
    assert_eq!(
        playlist.warnings,
        vec![ParseWarning::OrderingViolation { directive: "#EXT-X-DISCONTINUITY" }]
    );
    Ok(())
}

#[test]
fn test_parse_from_string_matches_file() -> Result<()> {
    let text = std::fs::read_to_string(fixture("master.m3u8"))?;
    let builder = fs_builder();

    let from_str = builder.parse_master_playlist_from_str(&text);
    let from_file = builder.parse_master_playlist_from_file(fixture("master.m3u8"))?;
    assert_eq!(from_str, from_file);
    Ok(())
}

#[test]
fn test_missing_file_is_fatal() {
    let result = fs_builder().parse_media_playlist_from_file(fixture("nope.m3u8"));
    assert!(matches!(result, Err(ManifestError::Io(_))));
}

#[tokio::test]
async fn test_full_parse_from_filesystem() -> Result<()> {
    let builder = fs_builder();
    let url = fixture_url("master.m3u8");

    let mut segment_urls = Vec::new();
    let master = builder
        .parse_with(
            &url,
            |_, _| {},
            |playlist, segment| segment_urls.push(playlist.segment_url(segment).unwrap()),
        )
        .await?;

    assert_eq!(master.playlists.len(), 5);

    let low = &master.playlists[0];
    assert_eq!(low.location, Some(fixture_url("low/index.m3u8")));
    assert_eq!(low.segments.len(), 2);
    assert_eq!(low.duration(), 21.6);

    let mid = &master.playlists[1];
    let sequences: Vec<i64> = mid.segments.iter().map(|s| s.sequence).collect();
    assert_eq!(sequences, vec![12, 13, 14]);
    let key = mid.segments[0].x_key.as_ref().unwrap();
    assert_eq!(key.uri, "https://keys.example.com/key?id=7,8");
    assert!(Arc::ptr_eq(key, mid.segments[1].x_key.as_ref().unwrap()));
    assert!(mid.segments[2].x_key.is_none());
    assert!(mid.segments[0].program_date_time.is_some());

    assert!(master.playlists[3].segments.is_empty());
    assert!(master.playlists[3].end_list);

    let unresolved: Vec<_> = master
        .warnings
        .iter()
        .filter_map(|w| match w {
            ParseWarning::Unresolved { path, .. } => Some(path.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(unresolved, vec!["missing/index.m3u8", "audio/index.m3u8"]);

    assert_eq!(segment_urls.len(), 5);
    assert_eq!(segment_urls[0], fixture_url("low/seg0.ts"));
    assert_eq!(segment_urls[4], fixture_url("mid/seg14.ts"));
    Ok(())
}

#[tokio::test]
async fn test_full_parse_with_absolute_file_references() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let media_dir = tempfile::tempdir()?;

    let media_path = media_dir.path().join("index.m3u8");
    std::fs::write(&media_path, "#EXTM3U\n#EXTINF:6,\na.ts\n#EXTINF:6,\nb.ts\n")?;
    let media_url = Url::from_file_path(&media_path).unwrap();

    let master_path = dir.path().join("master.m3u8");
    std::fs::write(
        &master_path,
        format!("#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=500000\n{}\n", media_url),
    )?;

    let master = fs_builder()
        .parse(&Url::from_file_path(&master_path).unwrap())
        .await?;

    let playlist = &master.playlists[0];
    assert_eq!(playlist.path.as_deref(), Some(media_url.as_str()));
    assert_eq!(playlist.location.as_ref(), Some(&media_url));
    assert_eq!(playlist.segments.len(), 2);
    assert_eq!(playlist.duration(), 12.0);
    Ok(())
}

#[test]
fn test_standalone_media_parse_leaves_path_unset() {
    let playlist = MediaPlaylistParser::new().parse(ReaderLineSource::new(
        "#EXTM3U\n#EXTINF:1,\na.ts\n".as_bytes(),
    ));
    assert_eq!(playlist.path, None);
    assert_eq!(playlist.location, None);
}
