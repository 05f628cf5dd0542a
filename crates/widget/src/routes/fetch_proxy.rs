//! Guarded JSON fetch proxy.
//!
//! The embedded widget runs on merchant pages and cannot fetch arbitrary
//! cross-origin feeds itself, so it goes through this proxy. The proxy
//! only relays JSON, enforces the configured size cap and timeout, and is
//! rate limited more tightly than the rest of the API.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use crate::catalog::FetchError;
use crate::error::Result;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FetchParams {
    pub url: Option<String>,
}

/// Relay a JSON document from the given URL.
#[instrument(skip(state))]
pub async fn fetch(
    State(state): State<AppState>,
    Query(params): Query<FetchParams>,
) -> Result<Json<serde_json::Value>> {
    let url = params.url.filter(|u| !u.is_empty()).ok_or(FetchError::MissingUrl)?;
    let value = state.catalogs().fetch_json(&url).await?;
    Ok(Json(value))
}
