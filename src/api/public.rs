//! Public API types

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;

use crate::auth::AuthError;
use crate::dispatch::DispatchError;

// Errors

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::ConfigurationMissing(_) | AuthError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AuthError::TokenExchangeFailed(_) | AuthError::TokenEndpointUnavailable { .. } => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

/// Convert `AuthError` into a plain text Axum response.
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // Always log the error
        tracing::error!("{}", self);

        (self.status_code(), format!("Error: {}", self)).into_response()
    }
}

impl DispatchError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DispatchError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            DispatchError::UnsupportedAction(_) | DispatchError::InvalidPayload { .. } => {
                StatusCode::BAD_REQUEST
            }
            DispatchError::RemoteServiceError { .. } | DispatchError::Auth(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Convert `DispatchError` into the webhook's JSON error envelope.
impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        match self.status_code() {
            status if status.is_server_error() => tracing::error!("{}", self),
            _ => tracing::warn!("{}", self),
        }

        (
            self.status_code(),
            Json(webhook::WebhookResponse::error(self.to_string())),
        )
            .into_response()
    }
}

// Re-export public types from each route

pub mod auth {
    pub use crate::api::routes::auth::public::*;
}

pub mod webhook {
    pub use crate::api::routes::webhook::public::*;
}
