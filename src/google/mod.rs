//! Thin clients for the Google OAuth2 and Calendar v3 REST APIs
pub mod gcal;
pub mod oauth;
