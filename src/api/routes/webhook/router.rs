//! Router for the webhook API

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::Value;

use super::public::WebhookResponse;
use crate::api::state::AppState;
use crate::dispatch::DispatchError;

type SharedState = Arc<AppState>;

pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

fn presented_secret(headers: &HeaderMap) -> Option<&str> {
    if let Some(value) = headers.get(WEBHOOK_SECRET_HEADER) {
        return value.to_str().ok();
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
}

/// Compare in time independent of where the inputs first differ
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// Create a calendar event from an automation trigger
async fn webhook(State(state): State<SharedState>, headers: HeaderMap, body: Bytes) -> Response {
    tracing::info!("Webhook request received");

    let Some(secret) = &state.config.webhook_secret else {
        tracing::error!("CALBOT_WEBHOOK_SECRET is not set, refusing webhook");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(WebhookResponse::error("Webhook secret not configured")),
        )
            .into_response();
    };
    let authorized = presented_secret(&headers)
        .is_some_and(|presented| constant_time_eq(presented.as_bytes(), secret.as_bytes()));
    if !authorized {
        tracing::warn!("Rejected webhook with missing or wrong secret");
        return (
            StatusCode::UNAUTHORIZED,
            Json(WebhookResponse::error("Invalid webhook secret")),
        )
            .into_response();
    }

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            return DispatchError::InvalidPayload {
                field: String::from("body"),
                reason: format!("is not valid JSON ({})", e),
            }
            .into_response();
        }
    };

    match state.dispatcher.handle_webhook(&payload).await {
        Ok(event) => Json(WebhookResponse::success(event)).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Create the webhook router
pub fn router() -> Router<SharedState> {
    Router::new().route("/webhook", axum::routing::post(webhook))
}
