use log::{debug, warn};
use std::env;
use std::path::Path;
use std::time::Duration;

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_USER_AGENT: &str = concat!("m3u8kit/", env!("CARGO_PKG_VERSION"));
const DEFAULT_MAX_MANIFEST_BYTES: usize = 16 * 1024 * 1024;

/// Settings for fetching manifests.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Per-request timeout for HTTP fetches
    pub http_timeout: Duration,
    /// `User-Agent` header sent with HTTP fetches
    pub user_agent: String,
    /// Manifests larger than this are rejected
    pub max_manifest_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_manifest_bytes: DEFAULT_MAX_MANIFEST_BYTES,
        }
    }
}

impl Config {
    /// Defaults overridden by `M3U8KIT_HTTP_TIMEOUT` (seconds),
    /// `M3U8KIT_USER_AGENT` and `M3U8KIT_MAX_MANIFEST_BYTES`.
    pub fn from_env() -> Self {
        let mut config = Config::default();
        for (key, var) in [
            ("http_timeout", "M3U8KIT_HTTP_TIMEOUT"),
            ("user_agent", "M3U8KIT_USER_AGENT"),
            ("max_manifest_bytes", "M3U8KIT_MAX_MANIFEST_BYTES"),
        ] {
            if let Ok(value) = env::var(var) {
                config.apply(key, &value);
            }
        }
        config
    }

    /// Environment settings, then overrides from a `key = value` file.
    /// A missing file leaves the environment settings in place.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Self {
        let mut config = Config::from_env();
        match std::fs::read_to_string(path.as_ref()) {
            Ok(content) => config.apply_str(&content),
            Err(e) => debug!("No config at {}: {}", path.as_ref().display(), e),
        }
        config
    }

    fn apply_str(&mut self, content: &str) {
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let value = value.trim().trim_matches('"').trim_matches('\'');
                self.apply(key.trim(), value);
            }
        }
    }

    fn apply(&mut self, key: &str, value: &str) {
        match key {
            "http_timeout" => match value.parse::<u64>() {
                Ok(secs) => self.http_timeout = Duration::from_secs(secs),
                Err(_) => warn!("Ignoring invalid http_timeout {:?}", value),
            },
            "user_agent" if !value.is_empty() => self.user_agent = value.to_string(),
            "max_manifest_bytes" => match value.parse() {
                Ok(limit) => self.max_manifest_bytes = limit,
                Err(_) => warn!("Ignoring invalid max_manifest_bytes {:?}", value),
            },
            _ => debug!("Ignoring config key {:?}", key),
        }
    }
}
