//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::catalog::FetchError;
use vocalshop_core::CatalogError;

/// Application-level error type for the widget service.
#[derive(Debug, Error)]
pub enum AppError {
    /// Upstream fetch (proxy or catalog load) failed.
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Upstream catalog payload failed validation.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<crate::catalog::CatalogFetchError> for AppError {
    fn from(error: crate::catalog::CatalogFetchError) -> Self {
        match error {
            crate::catalog::CatalogFetchError::Fetch(e) => Self::Fetch(e),
            crate::catalog::CatalogFetchError::Invalid(e) => Self::Catalog(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Internal(_) | Self::Catalog(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Fetch(err) => match err {
                FetchError::MissingUrl | FetchError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
                FetchError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
                FetchError::UnsupportedContentType(_) | FetchError::InvalidJson(_) => {
                    StatusCode::UNSUPPORTED_MEDIA_TYPE
                }
                FetchError::Timeout => StatusCode::GATEWAY_TIMEOUT,
                FetchError::Upstream(_) => StatusCode::BAD_GATEWAY,
            },
            Self::Catalog(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Internal(_) => "Erreur interne du serveur".to_string(),
            Self::RateLimited => "Trop de requetes, reessaie dans un instant".to_string(),
            Self::Catalog(_) => "Catalogue distant invalide".to_string(),
            Self::Fetch(err) => match err {
                FetchError::MissingUrl => "Parametre url manquant".to_string(),
                FetchError::InvalidUrl(_) => "URL invalide".to_string(),
                FetchError::TooLarge(_) => "Reponse distante trop volumineuse".to_string(),
                FetchError::UnsupportedContentType(_) => {
                    "Type de contenu non supporte (JSON attendu)".to_string()
                }
                FetchError::InvalidJson(_) => {
                    "La ressource distante n'est pas du JSON valide".to_string()
                }
                FetchError::Timeout => "Delai d'attente distant depasse".to_string(),
                FetchError::Upstream(_) => "Ressource distante indisponible".to_string(),
            },
            _ => self.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
