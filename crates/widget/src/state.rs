//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::{CatalogStore, CatalogStoreInitError};
use crate::config::WidgetConfig;
use crate::matcher::MatchPolicy;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the catalog store and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WidgetConfig,
    catalogs: CatalogStore,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if an embedded catalog fails validation or the
    /// HTTP client cannot be constructed.
    pub fn new(config: WidgetConfig) -> Result<Self, CatalogStoreInitError> {
        let catalogs = CatalogStore::new(&config)?;
        Ok(Self {
            inner: Arc::new(AppStateInner { config, catalogs }),
        })
    }

    /// Get a reference to the widget configuration.
    #[must_use]
    pub fn config(&self) -> &WidgetConfig {
        &self.inner.config
    }

    /// Get a reference to the catalog store.
    #[must_use]
    pub fn catalogs(&self) -> &CatalogStore {
        &self.inner.catalogs
    }

    /// Matching thresholds for this deployment.
    #[must_use]
    pub fn policy(&self) -> &MatchPolicy {
        &self.inner.config.match_policy
    }
}
