use super::cache::TileCache;
use crate::core::geo::TileCoord;
use crate::{MapError, Result};
use async_trait::async_trait;
use futures::future::{join_all, BoxFuture, FutureExt};
use once_cell::sync::Lazy;
use reqwest::Client;
use std::sync::Arc;

/// Shared HTTP client with a custom User-Agent so that public tile servers
/// (e.g. OpenStreetMap) don't reject the request. Building the client once
/// avoids the cost of TLS and connection pool setup for every tile.
static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent(concat!("tripmap/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|e| {
            log::warn!("falling back to default http client: {}", e);
            Client::new()
        })
});

/// Transport that turns a tile URL into image bytes
#[async_trait]
pub trait TileFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Fetches tiles over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpTileFetcher {
    client: Client,
}

impl HttpTileFetcher {
    pub fn new() -> Self {
        Self {
            client: HTTP_CLIENT.clone(),
        }
    }
}

impl Default for HttpTileFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TileFetcher for HttpTileFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(MapError::TileFetch {
                url: url.to_string(),
                reason: format!("HTTP {}", resp.status()),
            });
        }
        Ok(resp.bytes().await?.to_vec())
    }
}

/// Outcome of one batch of tile requests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileLoadReport {
    pub requested: usize,
    pub cached: usize,
    pub loaded: usize,
    pub failed: usize,
}

/// Loads tiles through a [`TileFetcher`] into a [`TileCache`].
///
/// Failures are logged and counted; they never surface as errors, a missing
/// tile just leaves the background blank.
#[derive(Clone)]
pub struct TileLoader {
    fetcher: Arc<dyn TileFetcher>,
    cache: TileCache,
    max_attempts: usize,
}

impl TileLoader {
    pub fn new(fetcher: Arc<dyn TileFetcher>, cache: TileCache) -> Self {
        Self {
            fetcher,
            cache,
            max_attempts: 2,
        }
    }

    pub fn cache(&self) -> &TileCache {
        &self.cache
    }

    /// Builds the future for a batch; the caller decides where it runs.
    pub fn load_batch(
        &self,
        requests: Vec<(TileCoord, String)>,
    ) -> BoxFuture<'static, TileLoadReport> {
        let fetcher = Arc::clone(&self.fetcher);
        let cache = self.cache.clone();
        let max_attempts = self.max_attempts;

        async move {
            let mut report = TileLoadReport {
                requested: requests.len(),
                ..TileLoadReport::default()
            };

            let pending: Vec<(TileCoord, String)> = requests
                .into_iter()
                .filter(|(coord, _)| !cache.contains(coord))
                .collect();
            report.cached = report.requested - pending.len();

            let results = join_all(pending.into_iter().map(|(coord, url)| {
                let fetcher = Arc::clone(&fetcher);
                async move {
                    let outcome = fetch_with_retry(fetcher.as_ref(), &url, max_attempts).await;
                    (coord, outcome)
                }
            }))
            .await;

            for (coord, outcome) in results {
                match outcome {
                    Ok(data) => {
                        log::debug!("downloaded tile {:?} ({} bytes)", coord, data.len());
                        cache.insert(coord, data);
                        report.loaded += 1;
                    }
                    Err(e) => {
                        log::warn!("giving up on tile {:?}: {}", coord, e);
                        report.failed += 1;
                    }
                }
            }

            report
        }
        .boxed()
    }
}

async fn fetch_with_retry(
    fetcher: &dyn TileFetcher,
    url: &str,
    max_attempts: usize,
) -> Result<Vec<u8>> {
    let mut attempt = 1;
    loop {
        match fetcher.fetch(url).await {
            Ok(data) => return Ok(data),
            Err(e) if attempt < max_attempts => {
                log::debug!("tile {} failed on attempt {}: {}", url, attempt, e);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
