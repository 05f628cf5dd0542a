//! Catalog loading, caching and the guarded upstream fetch.
//!
//! The widget ships two embedded catalogs (the demo shop and a partner
//! feed) and can also serve a merchant catalog from a configured URL.
//! Remote loads go through the same guarded fetch as the browser-facing
//! proxy endpoint: JSON only, bounded response size, bounded time.

use std::time::Duration;

use moka::future::Cache;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;
use vocalshop_core::{Catalog, CatalogError};

use crate::config::WidgetConfig;

/// Embedded demo catalog served when no merchant catalog is configured.
const DEMO_CATALOG_JSON: &str = include_str!("../data/products.json");

/// Embedded partner feed exposed on its own endpoint for integration demos.
const PARTNER_CATALOG_JSON: &str = include_str!("../data/partner.json");

/// Remote catalogs are cached briefly; merchants update feeds rarely but
/// the widget is hit on every utterance.
const CATALOG_CACHE_TTL: Duration = Duration::from_secs(60);
const CATALOG_CACHE_CAPACITY: u64 = 32;

/// Parse the embedded demo catalog.
///
/// # Errors
///
/// Returns an error if the embedded JSON fails validation, which only
/// happens when the data file is edited incorrectly.
pub fn embedded_demo() -> Result<Catalog, CatalogError> {
    Catalog::from_json(DEMO_CATALOG_JSON)
}

/// Errors from the guarded upstream fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("missing url parameter")]
    MissingUrl,

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("response exceeds size cap ({0} bytes)")]
    TooLarge(usize),

    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("upstream timed out")]
    Timeout,

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("upstream returned invalid JSON: {0}")]
    InvalidJson(String),
}

/// Shared catalog source for all handlers.
///
/// Holds the embedded catalogs, the HTTP client for remote feeds and a
/// short-lived cache of parsed remote catalogs keyed by URL.
pub struct CatalogStore {
    client: reqwest::Client,
    cache: Cache<String, Catalog>,
    demo: Catalog,
    partner: Catalog,
    default_url: Option<String>,
    max_bytes: usize,
}

impl CatalogStore {
    /// Build the store from configuration, parsing the embedded catalogs.
    ///
    /// # Errors
    ///
    /// Returns an error if an embedded catalog fails validation or the
    /// HTTP client cannot be constructed.
    pub fn new(config: &WidgetConfig) -> Result<Self, CatalogStoreInitError> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .build()?;

        Ok(Self {
            client,
            cache: Cache::builder()
                .max_capacity(CATALOG_CACHE_CAPACITY)
                .time_to_live(CATALOG_CACHE_TTL)
                .build(),
            demo: Catalog::from_json(DEMO_CATALOG_JSON)?,
            partner: Catalog::from_json(PARTNER_CATALOG_JSON)?,
            default_url: config.catalog_url.clone(),
            max_bytes: config.fetch_max_bytes,
        })
    }

    /// The embedded demo catalog.
    #[must_use]
    pub const fn demo(&self) -> &Catalog {
        &self.demo
    }

    /// The embedded partner feed.
    #[must_use]
    pub const fn partner(&self) -> &Catalog {
        &self.partner
    }

    /// The catalog the assistant works against: the configured merchant
    /// feed when set and reachable, the embedded demo catalog otherwise.
    pub async fn active_catalog(&self) -> Catalog {
        let Some(url) = &self.default_url else {
            return self.demo.clone();
        };
        match self.fetch_catalog(url).await {
            Ok(catalog) => catalog,
            Err(error) => {
                warn!(%url, %error, "merchant catalog unavailable, using demo catalog");
                self.demo.clone()
            }
        }
    }

    /// Fetch and validate a remote catalog, with caching.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails or the payload is not a valid
    /// catalog. Failures are not cached.
    pub async fn fetch_catalog(&self, url: &str) -> Result<Catalog, CatalogFetchError> {
        if let Some(catalog) = self.cache.get(url).await {
            debug!(%url, "catalog cache hit");
            return Ok(catalog);
        }

        let body = self.fetch_text(url).await?;
        let catalog = Catalog::from_json(&body)?;
        self.cache.insert(url.to_string(), catalog.clone()).await;
        Ok(catalog)
    }

    /// Fetch arbitrary JSON through the guarded pipeline (proxy endpoint).
    ///
    /// # Errors
    ///
    /// Returns a `FetchError` describing which guard rejected the request.
    pub async fn fetch_json(&self, url: &str) -> Result<serde_json::Value, FetchError> {
        let body = self.fetch_text(url).await?;
        serde_json::from_str(&body).map_err(|e| FetchError::InvalidJson(e.to_string()))
    }

    /// Guarded GET: http(s) only, JSON content type, size cap, timeout.
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl(format!(
                "unsupported scheme: {}",
                parsed.scheme()
            )));
        }

        let response = self
            .client
            .get(parsed)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Upstream(format!("HTTP {status}")));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !content_type.contains("json") {
            return Err(FetchError::UnsupportedContentType(content_type));
        }

        // The declared length is checked up front, the real length after
        // download; upstreams are not trusted to declare either honestly.
        if let Some(declared) = response.content_length() {
            let declared = usize::try_from(declared).unwrap_or(usize::MAX);
            if declared > self.max_bytes {
                return Err(FetchError::TooLarge(declared));
            }
        }
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        if bytes.len() > self.max_bytes {
            return Err(FetchError::TooLarge(bytes.len()));
        }

        String::from_utf8(bytes.to_vec())
            .map_err(|_| FetchError::InvalidJson("response is not valid UTF-8".to_string()))
    }
}

fn map_reqwest_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Upstream(error.to_string())
    }
}

/// Errors constructing the store at startup.
#[derive(Debug, Error)]
pub enum CatalogStoreInitError {
    #[error("embedded catalog is invalid: {0}")]
    EmbeddedCatalog(#[from] CatalogError),
    #[error("http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Errors from a remote catalog load.
#[derive(Debug, Error)]
pub enum CatalogFetchError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Invalid(#[from] CatalogError),
}
