//! API routes module

pub mod auth;
pub mod webhook;

use std::sync::Arc;

use crate::api::state::AppState;
use axum::Router;

type SharedState = Arc<AppState>;

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Authorization flow and status routes
        .merge(auth::router())
        // Webhook routes
        .merge(webhook::router())
}
