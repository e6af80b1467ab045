//! Google Calendar v3 client, event insertion only

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventDateTime {
    #[serde(rename = "dateTime")]
    pub date_time: String,
    #[serde(rename = "timeZone")]
    pub time_zone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventAttendee {
    pub email: String,
}

/// Request body for `events.insert`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewEvent {
    pub summary: String,
    pub description: String,
    pub location: String,
    pub start: EventDateTime,
    pub end: EventDateTime,
    pub attendees: Vec<EventAttendee>,
}

#[derive(Debug, thiserror::Error)]
pub enum CalendarApiError {
    #[error("Calendar API returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Calendar API request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

// Google wraps API failures as {"error": {"code": 403, "message": "..."}}
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.to_string())
}

/// Insert `event` into `calendar_id`, notifying every attendee. The
/// created event is returned as-is.
pub async fn insert_event(
    client: &Client,
    api_url: &str,
    access_token: &str,
    calendar_id: &str,
    event: &NewEvent,
) -> Result<Value, CalendarApiError> {
    let url = format!(
        "{}/calendar/v3/calendars/{}/events?sendUpdates=all",
        api_url.trim_end_matches('/'),
        urlencoding::encode(calendar_id)
    );

    let response = client
        .post(&url)
        .bearer_auth(access_token)
        .json(event)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Could not read error response".to_string());
        return Err(CalendarApiError::Status {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    let created = response.json::<Value>().await?;
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standup() -> NewEvent {
        NewEvent {
            summary: "Standup".to_string(),
            description: String::new(),
            location: String::new(),
            start: EventDateTime {
                date_time: "2024-01-01T09:00:00Z".to_string(),
                time_zone: "UTC".to_string(),
            },
            end: EventDateTime {
                date_time: "2024-01-01T09:30:00Z".to_string(),
                time_zone: "UTC".to_string(),
            },
            attendees: vec![],
        }
    }

    #[test]
    fn it_serializes_google_field_names() {
        let body = serde_json::to_value(standup()).unwrap();
        assert_eq!(body["start"]["dateTime"], "2024-01-01T09:00:00Z");
        assert_eq!(body["start"]["timeZone"], "UTC");
        assert_eq!(body["attendees"], serde_json::json!([]));
    }

    #[test]
    fn it_extracts_google_error_message() {
        let body = r#"{"error": {"code": 403, "message": "Insufficient Permission"}}"#;
        assert_eq!(error_message(body), "Insufficient Permission");
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }

    #[tokio::test]
    async fn test_insert_event() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/calendar/v3/calendars/primary/events")
            .match_query(mockito::Matcher::UrlEncoded(
                "sendUpdates".into(),
                "all".into(),
            ))
            .match_header("authorization", "Bearer access-1")
            .match_body(mockito::Matcher::PartialJson(
                serde_json::json!({"summary": "Standup"}),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": "evt_001", "status": "confirmed"}"#)
            .create_async()
            .await;

        let created = insert_event(
            &Client::new(),
            &server.url(),
            "access-1",
            "primary",
            &standup(),
        )
        .await
        .unwrap();

        mock.assert_async().await;
        assert_eq!(created["id"], "evt_001");
    }

    #[tokio::test]
    async fn test_insert_event_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/calendar/v3/calendars/primary/events")
            .match_query(mockito::Matcher::Any)
            .with_status(403)
            .with_body(r#"{"error": {"code": 403, "message": "Insufficient Permission"}}"#)
            .create_async()
            .await;

        let err = insert_event(
            &Client::new(),
            &server.url(),
            "access-1",
            "primary",
            &standup(),
        )
        .await
        .unwrap_err();

        match err {
            CalendarApiError::Status { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "Insufficient Permission");
            }
            other => panic!("Unexpected error: {}", other),
        }
    }
}
