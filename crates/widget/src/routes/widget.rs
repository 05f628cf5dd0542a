//! The standalone widget page and the embeddable loader script.
//!
//! Merchants drop a single script tag on their page; the loader injects a
//! floating button and an iframe pointing back at `/widget`. Both assets
//! are compiled into the binary so the service deploys as one file.

use axum::http::header;
use axum::response::{Html, IntoResponse};

const WIDGET_PAGE: &str = include_str!("../../static/widget.html");
const LOADER_SCRIPT: &str = include_str!("../../static/widget.js");

/// Standalone widget page, also used as the iframe body by the loader.
pub async fn page() -> Html<&'static str> {
    Html(WIDGET_PAGE)
}

/// Embeddable loader script.
pub async fn loader() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/javascript; charset=utf-8"),
            (header::CACHE_CONTROL, "public, max-age=300"),
        ],
        LOADER_SCRIPT,
    )
}
