//! # Utility Functions
//!
//! Helpers shared by the parsers and the resolver.
//!
//! ## URL Resolution
//!
//! Media playlists are referenced from their master either by a full URL or
//! by a path relative to the master:
//!
//! ```rust
//! use m3u8kit::utils::url::resolve_reference;
//! use url::Url;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let master = Url::parse("http://example.com/vod/master.m3u8")?;
//!
//! let url = resolve_reference(&master, "low/index.m3u8")?;
//! assert_eq!(url.as_str(), "http://example.com/vod/low/index.m3u8");
//!
//! let url = resolve_reference(&master, "https://cdn.example.com/hi/index.m3u8")?;
//! assert_eq!(url.as_str(), "https://cdn.example.com/hi/index.m3u8");
//! # Ok(())
//! # }
//! ```

/// Manifest location helpers
pub mod url;
