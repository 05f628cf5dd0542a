//! Catalog endpoints consumed by the embedded widget.
//!
//! Both endpoints are CORS-open: the loader script injects the widget into
//! arbitrary merchant pages and fetches the catalog from there.

use axum::{Json, extract::State};
use tracing::instrument;
use vocalshop_core::Catalog;

use crate::state::AppState;

/// The catalog the assistant works against: the configured merchant feed
/// when reachable, the embedded demo catalog otherwise.
#[instrument(skip(state))]
pub async fn active(State(state): State<AppState>) -> Json<Catalog> {
    Json(state.catalogs().active_catalog().await)
}

/// The embedded partner feed, kept on its own endpoint so integration
/// demos can point the widget at a second shop without configuration.
pub async fn partner(State(state): State<AppState>) -> Json<Catalog> {
    Json(state.catalogs().partner().clone())
}
