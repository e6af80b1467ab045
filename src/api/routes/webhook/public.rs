//! Public types for the webhook API
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope for every `/webhook` response
#[derive(Debug, Deserialize, Serialize)]
pub struct WebhookResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl WebhookResponse {
    pub fn success(event: Value) -> Self {
        Self {
            status: String::from("success"),
            event: Some(event),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: String::from("error"),
            event: None,
            message: Some(message.into()),
        }
    }
}
