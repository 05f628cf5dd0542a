//! Cart route handlers.
//!
//! Plain JSON endpoints over the session cart, used by the widget page for
//! button-driven edits alongside the voice flow. Lines are identified by
//! variant id.

use axum::{Json, extract::State};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;
use vocalshop_core::{Cart, CartLine};

use crate::cart::{load_cart, save_cart};
use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddRequest {
    pub product_id: String,
    pub variant_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub variant_id: String,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct RemoveRequest {
    pub variant_id: String,
}

/// Current cart contents.
pub async fn show(session: Session) -> Json<Cart> {
    Json(load_cart(&session).await)
}

/// Add a catalog variant to the cart, merging quantities on repeat adds.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddRequest>,
) -> Result<Json<Cart>> {
    let catalog = state.catalogs().active_catalog().await;
    let (product, variant) = catalog
        .find_variant(&request.variant_id)
        .filter(|(product, _)| product.id == request.product_id)
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "variant {} of product {}",
                request.variant_id, request.product_id
            ))
        })?;

    let mut cart = load_cart(&session).await;
    cart.add_or_merge(CartLine::from_catalog(product, variant, request.quantity));
    save_cart(&session, &cart).await;
    Ok(Json(cart))
}

/// Set a line's quantity; zero removes the line.
#[instrument(skip(session))]
pub async fn update(session: Session, Json(request): Json<UpdateRequest>) -> Result<Json<Cart>> {
    let mut cart = load_cart(&session).await;
    if !cart.set_quantity(&request.variant_id, request.quantity) {
        return Err(AppError::NotFound(format!(
            "cart line {}",
            request.variant_id
        )));
    }
    save_cart(&session, &cart).await;
    Ok(Json(cart))
}

/// Remove a line from the cart.
#[instrument(skip(session))]
pub async fn remove(session: Session, Json(request): Json<RemoveRequest>) -> Result<Json<Cart>> {
    let mut cart = load_cart(&session).await;
    if !cart.remove(&request.variant_id) {
        return Err(AppError::NotFound(format!(
            "cart line {}",
            request.variant_id
        )));
    }
    save_cart(&session, &cart).await;
    Ok(Json(cart))
}

/// Empty the cart.
pub async fn clear(session: Session) -> Json<Cart> {
    let mut cart = load_cart(&session).await;
    cart.clear();
    save_cart(&session, &cart).await;
    Json(cart)
}
