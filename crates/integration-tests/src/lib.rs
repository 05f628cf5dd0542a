//! Integration tests for VocalShop.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the widget service
//! cargo run -p vocalshop-widget
//!
//! # Run integration tests against it
//! cargo test -p vocalshop-integration-tests -- --ignored
//! ```
//!
//! The base URL defaults to `http://localhost:3000` and can be overridden
//! with `WIDGET_BASE_URL`.

/// Base URL for the widget service (configurable via environment).
#[must_use]
pub fn widget_base_url() -> String {
    std::env::var("WIDGET_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// HTTP client with a cookie store, so the session cart persists across
/// requests the way a browser would keep it.
///
/// # Panics
///
/// Panics if the client cannot be constructed.
#[must_use]
pub fn session_client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}
