use log::{debug, info};
use std::path::Path;
use url::Url;

use crate::config::Config;
use crate::error::ParseWarning;
use crate::manifest::{
    record, MasterPlaylist, MasterPlaylistParser, MediaPlaylist, MediaPlaylistParser, MediaSegment,
};
use crate::source::{BytesLineSource, LineSource, ManifestFetcher, ReaderLineSource, SchemeFetcher, StrLineSource};
use crate::utils::url::resolve_reference;
use crate::Result;

/// Entry point for parsing manifests from strings, files and URLs, and for
/// resolving a master manifest together with all of its media playlists.
///
/// Parsing is synchronous; only fetching is async. Every call starts from
/// fresh parse state, so one builder can be shared between tasks.
#[derive(Debug, Clone)]
pub struct ManifestBuilder<F = SchemeFetcher> {
    fetcher: F,
}

impl ManifestBuilder<SchemeFetcher> {
    /// Builder fetching `file://` and `http(s)://` URLs, configured from the
    /// environment.
    pub fn new() -> Result<Self> {
        Self::with_config(&Config::from_env())
    }

    /// Builder fetching `file://` and `http(s)://` URLs with `config`.
    pub fn with_config(config: &Config) -> Result<Self> {
        Ok(Self::with_fetcher(SchemeFetcher::new(config)?))
    }
}

impl<F: ManifestFetcher> ManifestBuilder<F> {
    /// Builder fetching through `fetcher`.
    pub fn with_fetcher(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// The fetcher used for URL entry points.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Parses a master playlist from any line source.
    pub fn parse_master_playlist<S: LineSource>(&self, source: S) -> MasterPlaylist {
        MasterPlaylistParser::new().parse(source)
    }

    /// Parses a master playlist held in memory.
    pub fn parse_master_playlist_from_str(&self, text: &str) -> MasterPlaylist {
        self.parse_master_playlist(StrLineSource::new(text))
    }

    /// Parses a master playlist file. Fails only if it cannot be opened.
    pub fn parse_master_playlist_from_file<P: AsRef<Path>>(&self, path: P) -> Result<MasterPlaylist> {
        Ok(self.parse_master_playlist(ReaderLineSource::open(path)?))
    }

    /// Fetches and parses a master playlist without resolving its variants.
    pub async fn parse_master_playlist_from_url(&self, url: &Url) -> Result<MasterPlaylist> {
        let mut master = self.parse_master_playlist(self.open(url).await?);
        master.location = Some(url.clone());
        Ok(master)
    }

    /// Parses a media playlist from any line source.
    pub fn parse_media_playlist<S: LineSource>(&self, source: S) -> MediaPlaylist {
        MediaPlaylistParser::new().parse(source)
    }

    /// Parses a media playlist held in memory.
    pub fn parse_media_playlist_from_str(&self, text: &str) -> MediaPlaylist {
        self.parse_media_playlist(StrLineSource::new(text))
    }

    /// Parses a media playlist file. Fails only if it cannot be opened.
    pub fn parse_media_playlist_from_file<P: AsRef<Path>>(&self, path: P) -> Result<MediaPlaylist> {
        Ok(self.parse_media_playlist(ReaderLineSource::open(path)?))
    }

    /// Fetches and parses a media playlist and records its location.
    pub async fn parse_media_playlist_from_url(&self, url: &Url) -> Result<MediaPlaylist> {
        let mut playlist = self.parse_media_playlist(self.open(url).await?);
        playlist.location = Some(url.clone());
        Ok(playlist)
    }

    /// Parses the master manifest at `url` and every media playlist it lists.
    pub async fn parse(&self, url: &Url) -> Result<MasterPlaylist> {
        self.parse_with(url, |_, _| {}, |_, _| {}).await
    }

    /// Like [`parse`](Self::parse), with callbacks fired for each variant as
    /// the master is read and for each segment of every media playlist.
    ///
    /// Media playlists are fetched one after another in master order.
    /// References starting with `http` or `file` are fetched as written;
    /// anything else is resolved against `url` per RFC 3986. A media
    /// playlist that cannot be loaded is recorded as a warning on the master
    /// and left without segments. Only failing to load the master is an error.
    pub async fn parse_with<P, S>(
        &self,
        url: &Url,
        on_media_playlist: P,
        on_media_segment: S,
    ) -> Result<MasterPlaylist>
    where
        P: FnMut(&MasterPlaylist, &MediaPlaylist) + Send,
        S: FnMut(&MediaPlaylist, &MediaSegment) + Send,
    {
        let source = self.open(url).await?;
        let mut master = MasterPlaylistParser::new()
            .on_media_playlist(on_media_playlist)
            .parse(source);
        master.location = Some(url.clone());
        info!("Master {} lists {} media playlists", url, master.playlists.len());

        let mut media_parser = MediaPlaylistParser::new().on_media_segment(on_media_segment);
        for playlist in master.playlists.iter_mut() {
            let Some(path) = playlist.path.clone() else {
                continue;
            };

            let loaded = match resolve_reference(url, &path) {
                Ok(location) => self.open(&location).await.map(|source| (location, source)),
                Err(e) => Err(e),
            };

            match loaded {
                Ok((location, source)) => {
                    debug!("Parsing media playlist {}", location);
                    playlist.location = Some(location);
                    media_parser.parse_into(source, playlist);
                }
                Err(e) => record(
                    &mut master.warnings,
                    ParseWarning::Unresolved {
                        path,
                        reason: e.to_string(),
                    },
                ),
            }
        }

        Ok(master)
    }

    async fn open(&self, url: &Url) -> Result<BytesLineSource> {
        BytesLineSource::new(self.fetcher.fetch(url).await?)
    }
}
