//! Test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use axum::{Router, body::Body};
use chrono::Utc;
use mockito::{Matcher, Mock, ServerGuard};
use tempfile::TempDir;

use calbot::api::{AppState, app};
use calbot::auth::{Credential, CredentialStore};
use calbot::core::AppConfig;
use calbot::core::db::migrated_db;

pub const REDIRECT_URI: &str = "http://localhost:8080/oauth2callback";
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";
pub const EVENTS_PATH: &str = "/calendar/v3/calendars/primary/events";
pub const WEBHOOK_SECRET: &str = "test-webhook-secret";

/// Client timeout for tests that need an upstream to be too slow
pub const SHORT_TIMEOUT: Duration = Duration::from_millis(500);
const SLOW_RESPONSE_DELAY: Duration = Duration::from_secs(2);

pub struct TestOptions {
    /// Write a client secret file pointing at the mock token endpoint
    pub client_secret: bool,
    /// Credential stored before the app starts
    pub credential: Option<Credential>,
    pub webhook_secret: Option<String>,
    pub http_timeout: Duration,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            client_secret: true,
            credential: None,
            webhook_secret: Some(WEBHOOK_SECRET.to_string()),
            http_timeout: Duration::from_secs(5),
        }
    }
}

/// A running app wired to a mock Google behind `server`. The temp
/// directory holding the database lives as long as this does.
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub server: ServerGuard,
    pub config: AppConfig,
    pub dir: TempDir,
}

pub fn valid_credential(access_token: &str) -> Credential {
    Credential {
        access_token: access_token.to_string(),
        refresh_token: Some(String::from("refresh-1")),
        expires_at: Utc::now() + chrono::Duration::hours(1),
        scopes: vec![CALENDAR_SCOPE.to_string()],
    }
}

pub fn expired_credential(refresh_token: Option<&str>) -> Credential {
    Credential {
        access_token: String::from("stale-access"),
        refresh_token: refresh_token.map(String::from),
        expires_at: Utc::now() - chrono::Duration::hours(1),
        scopes: vec![CALENDAR_SCOPE.to_string()],
    }
}

pub async fn test_config(dir: &TempDir, server: &ServerGuard) -> AppConfig {
    AppConfig {
        storage_path: dir.path().display().to_string(),
        db_path: dir.path().join("db").display().to_string(),
        client_secret_path: dir.path().join("credentials.json"),
        redirect_uri: REDIRECT_URI.to_string(),
        calendar_api_url: server.url(),
        calendar_id: String::from("primary"),
        http_timeout: Duration::from_secs(5),
        webhook_secret: Some(WEBHOOK_SECRET.to_string()),
    }
}

pub fn write_client_secret(config: &AppConfig, server: &ServerGuard) {
    let secret = serde_json::json!({
        "web": {
            "client_id": "test-client.apps.googleusercontent.com",
            "project_id": "calbot-test",
            "auth_uri": "https://accounts.google.com/o/oauth2/auth",
            "token_uri": format!("{}/token", server.url()),
            "client_secret": "test-client-secret",
            "redirect_uris": [REDIRECT_URI]
        }
    });
    fs::write(&config.client_secret_path, secret.to_string())
        .expect("Failed to write client secret");
}

/// Creates a test application with a temporary database and a mock
/// server standing in for both the token endpoint and the calendar API.
pub async fn test_app_with(options: TestOptions) -> TestApp {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let server = mockito::Server::new_async().await;

    let mut config = test_config(&dir, &server).await;
    config.webhook_secret = options.webhook_secret;
    config.http_timeout = options.http_timeout;
    if options.client_secret {
        write_client_secret(&config, &server);
    }

    let db = migrated_db(&config.db_path)
        .await
        .expect("Failed to create db");
    if let Some(credential) = &options.credential {
        CredentialStore::new(db.clone())
            .save(credential)
            .await
            .expect("Failed to store credential");
    }

    let state = Arc::new(
        AppState::new(db, config.clone())
            .await
            .expect("Failed to create app state"),
    );

    TestApp {
        router: app(Arc::clone(&state)),
        state,
        server,
        config,
        dir,
    }
}

pub async fn test_app() -> TestApp {
    test_app_with(TestOptions::default()).await
}

/// Mock the token endpoint for a `grant_type`, answering with `body`
/// and expecting exactly `hits` calls
pub async fn mock_token(
    server: &mut ServerGuard,
    grant_type: &str,
    body: serde_json::Value,
    hits: usize,
) -> Mock {
    server
        .mock("POST", "/token")
        .match_body(Matcher::UrlEncoded("grant_type".into(), grant_type.into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .expect(hits)
        .create_async()
        .await
}

/// Mock `method path` so the body only arrives after the client
/// timeout has passed, expecting exactly `hits` calls
pub async fn mock_slow(server: &mut ServerGuard, method: &str, path: &str, hits: usize) -> Mock {
    server
        .mock(method, path)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_chunked_body(|w| {
            std::thread::sleep(SLOW_RESPONSE_DELAY);
            w.write_all(b"{}")
        })
        .expect(hits)
        .create_async()
        .await
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}
