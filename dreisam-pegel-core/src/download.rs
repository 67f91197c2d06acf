use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::config::PegelConfig;
use crate::contract::FeedSource;
use crate::error::PegelError;

/// Fetches the feed over HTTPS with a browser-like user agent.
///
/// Certificate validation is switched off on this client only; the gauge
/// server's chain does not verify. Nothing else in the process is affected.
pub struct HttpFeedSource {
    client: reqwest::Client,
}

impl HttpFeedSource {
    pub fn new(user_agent: &str) -> Result<Self, PegelError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| {
                error!(error = ?e, "Failed to build feed http client");
                PegelError::Fetch {
                    url: String::new(),
                    status: None,
                    message: format!("cannot build http client: {e}"),
                }
            })?;
        Ok(Self { client })
    }

    pub fn from_config(config: &PegelConfig) -> Result<Self, PegelError> {
        Self::new(&config.user_agent)
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn download(&self, url: &str) -> Result<Vec<u8>, PegelError> {
        info!(url, "Fetching gauge feed");
        let response = self.client.get(url).send().await.map_err(|e| {
            error!(error = ?e, url, "Failed to fetch gauge feed");
            PegelError::Fetch {
                url: url.to_string(),
                status: None,
                message: e.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            error!(status = %status, url, "Gauge feed returned non-OK status");
            return Err(PegelError::Fetch {
                url: url.to_string(),
                status: Some(status.as_u16()),
                message: format!("non-OK HTTP status: {}", status.as_u16()),
            });
        }

        let body = response.bytes().await.map_err(|e| {
            error!(error = ?e, url, "Failed to read gauge feed body");
            PegelError::Fetch {
                url: url.to_string(),
                status: Some(status.as_u16()),
                message: format!("cannot read body: {e}"),
            }
        })?;
        info!(url, size = body.len(), "Fetched gauge feed");
        Ok(body.to_vec())
    }
}

/// True if `path` exists and was modified less than `ttl` before `now`.
///
/// A modification time in the future counts as fresh.
pub fn is_fresh(path: &Path, ttl: Duration, now: SystemTime) -> bool {
    match fs::metadata(path).and_then(|m| m.modified()) {
        Ok(mtime) => match now.duration_since(mtime) {
            Ok(age) => age < ttl,
            Err(_) => true,
        },
        Err(_) => false,
    }
}

/// Return the cached feed if it is younger than `ttl`, otherwise download it
/// and overwrite the cache before returning the fresh body.
pub async fn fetch_or_cached<S>(
    source: &S,
    url: &str,
    cache_path: &Path,
    ttl: Duration,
) -> Result<Vec<u8>, PegelError>
where
    S: FeedSource + ?Sized,
{
    if is_fresh(cache_path, ttl, SystemTime::now()) {
        debug!(path = %cache_path.display(), "Using cached gauge feed");
        return fs::read(cache_path).map_err(|e| {
            error!(error = ?e, path = %cache_path.display(), "Failed to read cache file");
            PegelError::storage(cache_path, e)
        });
    }

    let body = source.download(url).await?;

    if let Some(parent) = cache_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            error!(error = ?e, path = %parent.display(), "Failed to create cache folder");
            PegelError::storage(parent, e)
        })?;
    }
    fs::write(cache_path, &body).map_err(|e| {
        error!(error = ?e, path = %cache_path.display(), "Failed to write cache file");
        PegelError::storage(cache_path, e)
    })?;
    debug!(path = %cache_path.display(), size = body.len(), "Refreshed cache file");

    Ok(body)
}
