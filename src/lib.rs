#![doc(html_root_url = "https://docs.rs/m3u8kit/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

//! # m3u8kit - HTTP Live Streaming manifest parser
//!
//! `m3u8kit` turns M3U8 manifest text into a typed document model: a master
//! playlist listing variant media playlists, each with its ordered media
//! segments, byte ranges, discontinuities and encryption keys.
//!
//! ## Features
//!
//! - Single-pass master and media playlist parsers
//! - Quote-aware attribute lists (`CODECS="avc1.4d001f,mp4a.40.2"` stays whole)
//! - Per-variant and per-segment callbacks fired as the parse goes
//! - Recursive resolution of a master and all its media playlists over
//!   `file://` or `http(s)://`
//! - Malformed content is never fatal: fields stay unset and the problem is
//!   logged and recorded as a [`ParseWarning`]
//!
//! ## Quick Start
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! m3u8kit = "0.1.0"
//! ```
//!
//! ### Parsing a manifest you already have
//!
//! ```rust
//! use m3u8kit::ManifestBuilder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let builder = ManifestBuilder::new()?;
//! let master = builder.parse_master_playlist_from_str(
//!     "#EXTM3U\n#EXT-X-STREAM-INF:PROGRAM-ID=1,BANDWIDTH=2757000,RESOLUTION=1280x720\nlow/index.m3u8\n",
//! );
//!
//! let variant = &master.playlists[0];
//! assert_eq!(variant.program_id, Some(1));
//! assert_eq!(variant.bandwidth, Some(2757000.0));
//! assert_eq!(variant.path.as_deref(), Some("low/index.m3u8"));
//! # Ok(())
//! # }
//! ```
//!
//! ### Resolving a whole presentation
//!
//! ```rust,no_run
//! use m3u8kit::ManifestBuilder;
//! use url::Url;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let builder = ManifestBuilder::new()?;
//!     let url = Url::parse("http://example.com/bipbop/bipbopall.m3u8")?;
//!
//!     let master = builder
//!         .parse_with(
//!             &url,
//!             |_, playlist| println!("variant {:?}", playlist.path),
//!             |playlist, segment| println!("segment {:?}", playlist.segment_url(segment)),
//!         )
//!         .await?;
//!
//!     for playlist in &master.playlists {
//!         println!("{:?}: {:.1}s", playlist.path, playlist.duration());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - `manifest`: document model, attribute tokenizer and the two parsers
//! - `source`: line sources and manifest fetchers
//! - `resolver`: [`ManifestBuilder`], the convenience and recursive entry points
//! - `config`: fetch settings from the environment or a config file
//! - `error`: fatal errors and recoverable parse warnings
//! - `utils`: URL helpers

/// Configuration module
pub mod config;

/// Error types and utilities
pub mod error;

/// Document model and playlist parsers
pub mod manifest;

/// Recursive master playlist resolution
pub mod resolver;

/// Line sources and manifest fetchers
pub mod source;

/// Common utilities and helper functions
pub mod utils;

pub use config::Config;
pub use error::{ManifestError, ParseWarning, Result};
pub use manifest::{
    MasterPlaylist, MasterPlaylistParser, MediaPlaylist, MediaPlaylistParser, MediaSegment,
    Resolution, XKey,
};
pub use resolver::ManifestBuilder;
