//! Fire-and-forget telemetry endpoint.
//!
//! The widget posts small usage events (widget opened, utterance handled,
//! add-to-cart confirmed). Events are logged, never stored; a malformed
//! body is answered with `{"ok": false}` rather than an error page so the
//! widget can stay oblivious.

use axum::{Json, extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse};
use serde_json::{Value, json};
use tracing::info;

/// Record a telemetry event.
pub async fn record(payload: Result<Json<Value>, JsonRejection>) -> impl IntoResponse {
    match payload {
        Ok(Json(event)) => {
            let kind = event
                .get("event")
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            info!(event = kind, payload = %event, "telemetry event");
            (StatusCode::OK, Json(json!({ "ok": true })))
        }
        Err(_) => (StatusCode::BAD_REQUEST, Json(json!({ "ok": false }))),
    }
}
