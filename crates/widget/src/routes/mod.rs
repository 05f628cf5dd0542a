//! HTTP route handlers for the widget service.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Assistant
//! POST /api/assistant          - One utterance in, reply + results + cart out
//! GET  /api/speech             - WebSocket transcript transport
//!
//! # Catalogs
//! GET  /api/catalogue          - Active catalog (merchant feed or demo)
//! GET  /api/catalogue-partner  - Embedded partner feed
//!
//! # Browser plumbing
//! GET  /api/fetch?url=...      - Guarded JSON fetch proxy for the embed
//! POST /api/telemetry          - Fire-and-forget usage events
//!
//! # Cart (JSON)
//! GET  /cart                   - Current cart
//! POST /cart/add               - Add or merge a line
//! POST /cart/update            - Set quantity (0 removes)
//! POST /cart/remove            - Remove a line
//! POST /cart/clear             - Empty the cart
//!
//! # Embed
//! GET  /widget                 - Standalone widget page
//! GET  /widget.js              - Embeddable loader script
//! ```

pub mod assistant;
pub mod cart;
pub mod catalogue;
pub mod fetch_proxy;
pub mod speech;
pub mod telemetry;
pub mod widget;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};

use crate::middleware::{api_rate_limiter, proxy_rate_limiter};
use crate::state::AppState;

/// Health check endpoint.
async fn health() -> &'static str {
    "OK"
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create the API routes router.
///
/// Catalog endpoints get a permissive CORS layer: the loader script runs on
/// merchant pages, so these are cross-origin by design. The fetch proxy
/// gets its own tight rate limit.
pub fn api_routes() -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/assistant", post(assistant::handle))
        .route("/speech", get(speech::upgrade))
        .route("/telemetry", post(telemetry::record))
        .route(
            "/catalogue",
            get(catalogue::active).layer(cors.clone()),
        )
        .route(
            "/catalogue-partner",
            get(catalogue::partner).layer(cors),
        )
        .route(
            "/fetch",
            get(fetch_proxy::fetch).layer(proxy_rate_limiter()),
        )
}

/// Create all routes for the widget service.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes())
        .nest("/cart", cart_routes())
        .route("/widget", get(widget::page))
        .route("/widget.js", get(widget::loader))
        .layer(api_rate_limiter())
}

/// Assemble the full application: routes, session layer, state.
///
/// Kept separate from `main` so router-level tests can drive the exact
/// production stack in-process.
pub fn app(state: AppState) -> Router {
    let session_layer = crate::middleware::create_session_layer();
    routes().layer(session_layer).with_state(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::config::WidgetConfig;
    use crate::state::AppState;

    fn test_app() -> Router {
        let state = AppState::new(WidgetConfig::default()).unwrap();
        super::app(state)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_catalogue_returns_products() {
        let response = test_app()
            .oneshot(Request::get("/api/catalogue").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert!(!body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_partner_catalogue_is_distinct() {
        let app = test_app();
        let demo = json_body(
            app.clone()
                .oneshot(Request::get("/api/catalogue").body(Body::empty()).unwrap())
                .await
                .unwrap(),
        )
        .await;
        let partner = json_body(
            app.oneshot(
                Request::get("/api/catalogue-partner")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap(),
        )
        .await;
        assert_ne!(demo, partner);
    }

    #[tokio::test]
    async fn test_fetch_proxy_requires_url() {
        let response = test_app()
            .oneshot(Request::get("/api/fetch").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_fetch_proxy_rejects_bad_scheme() {
        let response = test_app()
            .oneshot(
                Request::get("/api/fetch?url=file:///etc/passwd")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_telemetry_accepts_json() {
        let response = test_app()
            .oneshot(json_request(
                "POST",
                "/api/telemetry",
                json!({ "event": "widget_opened" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn test_telemetry_soft_fails_on_malformed_body() {
        let request = Request::post("/api/telemetry")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await, json!({ "ok": false }));
    }

    #[tokio::test]
    async fn test_assistant_search_returns_results_and_trace() {
        let response = test_app()
            .oneshot(json_request(
                "POST",
                "/api/assistant",
                json!({ "utterance": "chemise bleue taille M a moins de 60 euros" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["action"], "searched");
        assert_eq!(body["query"]["product_type"], "chemise");
        assert_eq!(body["query"]["color"], "bleu");
        assert_eq!(body["query"]["size"], "M");
        assert_eq!(body["query"]["price_max"], 60);
        assert_eq!(body["pass"], "strict");
        assert_eq!(body["results"][0]["id"], "chemise-lin-bleue");
    }

    #[tokio::test]
    async fn test_assistant_empty_utterance() {
        let response = test_app()
            .oneshot(json_request(
                "POST",
                "/api/assistant",
                json!({ "utterance": "   " }),
            ))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["action"], "heard_nothing");
    }

    #[tokio::test]
    async fn test_assistant_add_to_cart_updates_cart() {
        let response = test_app()
            .oneshot(json_request(
                "POST",
                "/api/assistant",
                json!({ "utterance": "ajoute la chemise bleue en M" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["action"], "added_to_cart");
        assert_eq!(body["cart"][0]["variant_id"], "chemise-lin-bleue-m");
        assert_eq!(body["cart"][0]["quantity"], 1);
    }

    #[tokio::test]
    async fn test_assistant_clear_command_beats_add_words() {
        // "panier" is an add word; the clear command must win.
        let response = test_app()
            .oneshot(json_request(
                "POST",
                "/api/assistant",
                json!({ "utterance": "vide le panier" }),
            ))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["action"], "cleared_cart");
    }

    #[tokio::test]
    async fn test_cart_persists_across_requests() {
        let app = test_app();

        let add = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/cart/add",
                json!({
                    "product_id": "baskets-noires",
                    "variant_id": "baskets-noires-41",
                    "quantity": 2
                }),
            ))
            .await
            .unwrap();
        assert_eq!(add.status(), StatusCode::OK);
        let cookie = add
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string();

        let show = app
            .oneshot(
                Request::get("/cart")
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = json_body(show).await;
        assert_eq!(body[0]["variant_id"], "baskets-noires-41");
        assert_eq!(body[0]["quantity"], 2);
    }

    #[tokio::test]
    async fn test_cart_add_unknown_variant_is_404() {
        let response = test_app()
            .oneshot(json_request(
                "POST",
                "/cart/add",
                json!({ "product_id": "nope", "variant_id": "nope-m" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cart_update_zero_removes_line() {
        let app = test_app();
        let add = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/cart/add",
                json!({
                    "product_id": "robe-rouge",
                    "variant_id": "robe-rouge-s",
                    "quantity": 1
                }),
            ))
            .await
            .unwrap();
        let cookie = add
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string();

        let update = app
            .oneshot(
                Request::post("/cart/update")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(header::COOKIE, cookie)
                    .body(Body::from(
                        json!({ "variant_id": "robe-rouge-s", "quantity": 0 }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(update.status(), StatusCode::OK);
        let body = json_body(update).await;
        assert!(body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_widget_page_and_loader_served() {
        let app = test_app();
        let page = app
            .clone()
            .oneshot(Request::get("/widget").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(page.status(), StatusCode::OK);

        let loader = app
            .oneshot(Request::get("/widget.js").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(loader.status(), StatusCode::OK);
        assert!(
            loader.headers()[header::CONTENT_TYPE]
                .to_str()
                .unwrap()
                .contains("javascript")
        );
    }

    #[tokio::test]
    async fn test_loader_forwards_merchant_options() {
        let app = test_app();
        let loader = app
            .clone()
            .oneshot(Request::get("/widget.js").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let script = String::from_utf8(
            loader
                .into_body()
                .collect()
                .await
                .unwrap()
                .to_bytes()
                .to_vec(),
        )
        .unwrap();
        for attribute in ["data-catalog", "data-theme", "data-welcome", "data-width", "data-height"]
        {
            assert!(script.contains(attribute), "{attribute}");
        }

        let page = app
            .oneshot(Request::get("/widget").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let html = String::from_utf8(
            page.into_body()
                .collect()
                .await
                .unwrap()
                .to_bytes()
                .to_vec(),
        )
        .unwrap();
        // The page must read the forwarded params and send `catalog` along
        // with each utterance.
        assert!(html.contains("location.search"));
        assert!(html.contains("catalog: catalogUrl"));
    }
}
