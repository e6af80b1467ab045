use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// OAuth scope granting read/write access to calendars.
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage_path: String,
    pub db_path: String,
    pub client_secret_path: PathBuf,
    pub redirect_uri: String,
    pub calendar_api_url: String,
    pub calendar_id: String,
    pub http_timeout: Duration,
    pub webhook_secret: Option<String>,
}

impl AppConfig {
    pub fn scopes(&self) -> Vec<String> {
        vec![CALENDAR_SCOPE.to_string()]
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let storage_path = env::var("CALBOT_STORAGE_PATH").unwrap_or("./".to_string());
        let db_path = format!("{}/db", storage_path.trim_end_matches('/'));
        let client_secret_path = env::var("CALBOT_CLIENT_SECRET_PATH")
            .unwrap_or_else(|_| "./credentials.json".to_string());
        let redirect_uri = env::var("CALBOT_REDIRECT_URI")
            .unwrap_or_else(|_| "http://localhost:8080/oauth2callback".to_string());
        let calendar_api_url = env::var("CALBOT_CALENDAR_API_URL")
            .unwrap_or_else(|_| "https://www.googleapis.com".to_string());
        let calendar_id = env::var("CALBOT_CALENDAR_ID").unwrap_or_else(|_| "primary".to_string());
        let http_timeout = env::var("CALBOT_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|secs| secs.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));
        // An empty value is the same as not setting it
        let webhook_secret = env::var("CALBOT_WEBHOOK_SECRET")
            .ok()
            .filter(|secret| !secret.is_empty());

        Self {
            storage_path,
            db_path,
            client_secret_path: PathBuf::from(client_secret_path),
            redirect_uri,
            calendar_api_url,
            calendar_id,
            http_timeout,
            webhook_secret,
        }
    }
}
