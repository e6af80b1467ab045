//! Public types for the authorization API
use serde::Serialize;

pub const AUTHENTICATED_MESSAGE: &str = "Calendar Bot is running and authenticated!";
pub const CALLBACK_SUCCESS_MESSAGE: &str = "Successfully authenticated! You can close this window.";

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}
