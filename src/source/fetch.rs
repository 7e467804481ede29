use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, info};
use reqwest::Client;
use url::Url;

use crate::config::Config;
use crate::{ManifestError, Result};

/// Retrieves the raw text of a manifest.
#[async_trait]
pub trait ManifestFetcher: Send + Sync {
    /// Returns the whole body at `url`.
    async fn fetch(&self, url: &Url) -> Result<Bytes>;
}

fn check_size(data: Bytes, limit: usize) -> Result<Bytes> {
    if data.len() > limit {
        return Err(ManifestError::TooLarge { limit });
    }
    Ok(data)
}

/// Reads `file://` URLs from the local filesystem.
#[derive(Debug, Clone)]
pub struct FsFetcher {
    max_bytes: usize,
}

impl FsFetcher {
    /// Uses the size limit from `config`.
    pub fn new(config: &Config) -> Self {
        Self {
            max_bytes: config.max_manifest_bytes,
        }
    }
}

#[async_trait]
impl ManifestFetcher for FsFetcher {
    async fn fetch(&self, url: &Url) -> Result<Bytes> {
        let path = url
            .to_file_path()
            .map_err(|_| ManifestError::UnsupportedScheme(url.to_string()))?;
        debug!("Reading manifest {}", path.display());
        let data = tokio::fs::read(&path).await?;
        check_size(Bytes::from(data), self.max_bytes)
    }
}

/// Fetches `http://` and `https://` URLs.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    max_bytes: usize,
}

impl HttpFetcher {
    /// Builds a client with the timeout and user agent from `config`.
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            max_bytes: config.max_manifest_bytes,
        })
    }
}

#[async_trait]
impl ManifestFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<Bytes> {
        info!("Fetching manifest {}", url);
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ManifestError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if let Some(len) = response.content_length() {
            if len > self.max_bytes as u64 {
                return Err(ManifestError::TooLarge {
                    limit: self.max_bytes,
                });
            }
        }

        check_size(response.bytes().await?, self.max_bytes)
    }
}

/// Picks the filesystem or HTTP fetcher by URL scheme.
#[derive(Debug, Clone)]
pub struct SchemeFetcher {
    fs: FsFetcher,
    http: HttpFetcher,
}

impl SchemeFetcher {
    /// Builds both fetchers from `config`.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            fs: FsFetcher::new(config),
            http: HttpFetcher::new(config)?,
        })
    }
}

#[async_trait]
impl ManifestFetcher for SchemeFetcher {
    async fn fetch(&self, url: &Url) -> Result<Bytes> {
        match url.scheme() {
            "file" => self.fs.fetch(url).await,
            "http" | "https" => self.http.fetch(url).await,
            other => Err(ManifestError::UnsupportedScheme(other.to_string())),
        }
    }
}
