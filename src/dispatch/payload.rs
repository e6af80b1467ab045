//! Validation of inbound webhook payloads into a typed event request

use chrono::{DateTime, NaiveDateTime};
use serde_json::{Map, Value};

use super::DispatchError;
use crate::google::gcal::{EventAttendee, EventDateTime, NewEvent};

pub const ADD_EVENT_ACTION: &str = "add_event";

/// No timezone is accepted from the payload so everything is pinned to UTC
const EVENT_TIME_ZONE: &str = "UTC";

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEventRequest {
    pub title: String,
    pub description: String,
    pub location: String,
    pub start: String,
    pub end: String,
    pub attendees: Vec<String>,
}

fn invalid(field: &str, reason: &str) -> DispatchError {
    DispatchError::InvalidPayload {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn required_str<'a>(details: &'a Map<String, Value>, field: &str) -> Result<&'a str, DispatchError> {
    match details.get(field) {
        None | Some(Value::Null) => Err(invalid(field, "is missing")),
        Some(Value::String(s)) if s.trim().is_empty() => Err(invalid(field, "is empty")),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(invalid(field, "must be a string")),
    }
}

fn optional_str(details: &Map<String, Value>, field: &str) -> Result<String, DispatchError> {
    match details.get(field) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(invalid(field, "must be a string")),
    }
}

fn is_timestamp(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
}

// The input text is forwarded untouched so the remote event matches it exactly
fn timestamp(details: &Map<String, Value>, field: &str) -> Result<String, DispatchError> {
    let value = required_str(details, field)?;
    if !is_timestamp(value) {
        return Err(invalid(field, "must be an ISO-8601 date-time"));
    }
    Ok(value.to_string())
}

fn attendees(details: &Map<String, Value>) -> Result<Vec<String>, DispatchError> {
    let entries = match details.get("attendees") {
        None | Some(Value::Null) => return Ok(vec![]),
        Some(Value::Array(entries)) => entries,
        Some(_) => return Err(invalid("attendees", "must be a list")),
    };

    entries
        .iter()
        .map(|entry| match entry.get("email") {
            Some(Value::String(email)) if !email.trim().is_empty() => Ok(email.clone()),
            _ => Err(invalid("attendees", "every attendee needs an email")),
        })
        .collect()
}

impl CalendarEventRequest {
    /// Validate a webhook body. The action is checked before any event
    /// field is read.
    pub fn from_payload(payload: &Value) -> Result<Self, DispatchError> {
        let body = payload
            .as_object()
            .ok_or_else(|| invalid("body", "must be a JSON object"))?;

        let action = match body.get("action") {
            None | Some(Value::Null) => return Err(invalid("action", "is missing")),
            Some(Value::String(action)) => action,
            Some(_) => return Err(invalid("action", "must be a string")),
        };
        if action != ADD_EVENT_ACTION {
            return Err(DispatchError::UnsupportedAction(action.clone()));
        }

        let details = match body.get("eventDetails") {
            Some(Value::Object(details)) => details,
            None | Some(Value::Null) => return Err(invalid("eventDetails", "is missing")),
            Some(_) => return Err(invalid("eventDetails", "must be an object")),
        };

        Ok(Self {
            title: required_str(details, "title")?.to_string(),
            description: optional_str(details, "description")?,
            location: optional_str(details, "location")?,
            start: timestamp(details, "startDate")?,
            end: timestamp(details, "endDate")?,
            attendees: attendees(details)?,
        })
    }

    pub fn to_remote_event(&self) -> NewEvent {
        NewEvent {
            summary: self.title.clone(),
            description: self.description.clone(),
            location: self.location.clone(),
            start: EventDateTime {
                date_time: self.start.clone(),
                time_zone: EVENT_TIME_ZONE.to_string(),
            },
            end: EventDateTime {
                date_time: self.end.clone(),
                time_zone: EVENT_TIME_ZONE.to_string(),
            },
            attendees: self
                .attendees
                .iter()
                .map(|email| EventAttendee {
                    email: email.clone(),
                })
                .collect(),
        }
    }
}
