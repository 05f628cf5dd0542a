//! Session-backed cart persistence.
//!
//! The cart lives in the visitor's session, keyed by [`CART_SESSION_KEY`].
//! Session writes are best-effort: a failed write loses at most one cart
//! mutation for one visitor, which is preferable to failing the whole
//! assistant reply, so failures are logged and the reply goes out anyway.

use tower_sessions::Session;
use tracing::warn;
use vocalshop_core::Cart;

/// Session key under which the cart is stored.
pub const CART_SESSION_KEY: &str = "va_cart";

/// Load the visitor's cart, falling back to an empty cart when the
/// session has none or the stored value cannot be read.
pub async fn load_cart(session: &Session) -> Cart {
    match session.get::<Cart>(CART_SESSION_KEY).await {
        Ok(Some(cart)) => cart,
        Ok(None) => Cart::default(),
        Err(error) => {
            warn!(%error, "failed to read cart from session");
            Cart::default()
        }
    }
}

/// Persist the visitor's cart back to the session.
pub async fn save_cart(session: &Session, cart: &Cart) {
    if let Err(error) = session.insert(CART_SESSION_KEY, cart).await {
        warn!(%error, "failed to write cart to session");
    }
}

/// Drop the cart from the session entirely.
pub async fn clear_cart(session: &Session) {
    if let Err(error) = session.remove::<Cart>(CART_SESSION_KEY).await {
        warn!(%error, "failed to clear cart from session");
    }
}
