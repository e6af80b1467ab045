//! Turns webhook payloads into calendar events

mod payload;

use std::sync::Arc;

use reqwest::Client;
use serde_json::Value;

pub use payload::{ADD_EVENT_ACTION, CalendarEventRequest};

use crate::auth::{AuthError, AuthManager};
use crate::core::AppConfig;
use crate::google::gcal::{CalendarApiError, insert_event};

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Bot not authenticated")]
    NotAuthenticated,
    #[error("Unsupported action: {0}")]
    UnsupportedAction(String),
    #[error("Invalid payload: `{field}` {reason}")]
    InvalidPayload { field: String, reason: String },
    #[error("Calendar service error{}: {message}", status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    RemoteServiceError {
        status: Option<u16>,
        message: String,
    },
    #[error(transparent)]
    Auth(AuthError),
}

impl From<AuthError> for DispatchError {
    fn from(err: AuthError) -> Self {
        match err {
            // An unreachable token endpoint is an upstream outage, not a
            // reason to ask for re-authorization
            AuthError::TokenEndpointUnavailable { status, message } => {
                DispatchError::RemoteServiceError { status, message }
            }
            err => DispatchError::Auth(err),
        }
    }
}

impl From<CalendarApiError> for DispatchError {
    fn from(err: CalendarApiError) -> Self {
        match err {
            CalendarApiError::Status { status, message } => DispatchError::RemoteServiceError {
                status: Some(status),
                message,
            },
            CalendarApiError::Transport(e) => DispatchError::RemoteServiceError {
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
            },
        }
    }
}

pub struct EventDispatcher {
    auth: Arc<AuthManager>,
    http: Client,
    calendar_api_url: String,
    calendar_id: String,
}

impl EventDispatcher {
    pub fn new(config: &AppConfig, auth: Arc<AuthManager>, http: Client) -> Self {
        Self {
            auth,
            http,
            calendar_api_url: config.calendar_api_url.clone(),
            calendar_id: config.calendar_id.clone(),
        }
    }

    /// Create one calendar event from a webhook payload and return the
    /// event exactly as the calendar service reported it.
    pub async fn handle_webhook(&self, payload: &Value) -> Result<Value, DispatchError> {
        let credential = self
            .auth
            .active_credential()
            .await?
            .ok_or(DispatchError::NotAuthenticated)?;

        let request = CalendarEventRequest::from_payload(payload)?;
        let event = request.to_remote_event();
        tracing::debug!(
            "Creating event \"{}\" with {} attendee(s)",
            event.summary,
            event.attendees.len()
        );

        let created = insert_event(
            &self.http,
            &self.calendar_api_url,
            &credential.access_token,
            &self.calendar_id,
            &event,
        )
        .await?;

        tracing::info!(
            "Event created: {}",
            created.get("id").and_then(|id| id.as_str()).unwrap_or("<no id>")
        );
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_formats_remote_errors_with_status() {
        let err = DispatchError::RemoteServiceError {
            status: Some(403),
            message: "Insufficient Permission".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Calendar service error (HTTP 403): Insufficient Permission"
        );

        let err = DispatchError::RemoteServiceError {
            status: None,
            message: "operation timed out".to_string(),
        };
        assert_eq!(err.to_string(), "Calendar service error: operation timed out");
    }

    #[test]
    fn it_names_the_invalid_field() {
        let err = DispatchError::InvalidPayload {
            field: "title".to_string(),
            reason: "is missing".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid payload: `title` is missing");
    }

    #[test]
    fn it_reports_unavailable_token_endpoint_as_remote_error() {
        let err: DispatchError = AuthError::TokenEndpointUnavailable {
            status: Some(503),
            message: "backend error".to_string(),
        }
        .into();
        assert!(matches!(
            err,
            DispatchError::RemoteServiceError {
                status: Some(503),
                ..
            }
        ));

        let err: DispatchError = AuthError::ConfigurationMissing("gone".to_string()).into();
        assert!(matches!(err, DispatchError::Auth(_)));
    }
}
