use super::source::{TileSource, UrlTemplateSource};
use super::TileImage;
use crate::core::config::TileLoadingConfig;
use crate::core::geo::TileKey;
use crate::{MapError, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::sync::Arc;

/// Shared async HTTP client. Building it once avoids the cost of TLS and
/// connection pool setup for every tile.
pub(crate) static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .user_agent(concat!("shelter-map/", env!("CARGO_PKG_VERSION")))
        .tcp_keepalive(std::time::Duration::from_secs(30))
        .pool_max_idle_per_host(8)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
});

/// Supplies decoded tile images; the network/image-loading collaborator.
#[async_trait]
pub trait TileFetcher: Send + Sync {
    /// Number of equivalent hosts the loader may choose between
    fn subdomain_count(&self) -> usize {
        1
    }

    /// Fetch and decode one tile from the host at `subdomain`
    async fn fetch_tile_image(&self, subdomain: usize, key: TileKey) -> Result<TileImage>;
}

/// Fetches tiles over HTTP from a URL template and decodes them with `image`
pub struct HttpTileFetcher {
    source: Arc<dyn TileSource>,
    client: reqwest::Client,
}

impl HttpTileFetcher {
    pub fn new(source: Arc<dyn TileSource>) -> Self {
        Self {
            source,
            client: HTTP_CLIENT.clone(),
        }
    }

    /// Fetcher for the template, subdomains and user agent in `config`
    pub fn from_config(config: &TileLoadingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .tcp_keepalive(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            source: Arc::new(UrlTemplateSource::new(
                config.url_template.clone(),
                config.subdomains.clone(),
            )),
            client,
        })
    }

    pub fn openstreetmap() -> Self {
        Self::new(Arc::new(UrlTemplateSource::openstreetmap()))
    }
}

#[async_trait]
impl TileFetcher for HttpTileFetcher {
    fn subdomain_count(&self) -> usize {
        self.source.subdomain_count()
    }

    async fn fetch_tile_image(&self, subdomain: usize, key: TileKey) -> Result<TileImage> {
        let url = self.source.url(subdomain, key);
        log::debug!("fetch tile {} from {}", key, url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(MapError::TileStatus {
                key,
                status: response.status().as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        let pixels = image::load_from_memory(&bytes)?.to_rgba8();
        Ok(TileImage::new(key, pixels))
    }
}
