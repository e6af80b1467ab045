//! Google OAuth2 authorization-code grant: client secret loading,
//! consent URL construction, code exchange and token refresh.

use anyhow::{Result, anyhow};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// OAuth client registration as downloaded from the Google Cloud
/// console (`credentials.json`).
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

// The console wraps the registration in a key naming the client type
#[derive(Deserialize)]
enum ClientSecretFile {
    #[serde(rename = "web")]
    Web(ClientSecret),
    #[serde(rename = "installed")]
    Installed(ClientSecret),
}

impl ClientSecret {
    pub fn from_json(json: &str) -> Result<Self> {
        let file: ClientSecretFile = serde_json::from_str(json)
            .map_err(|e| anyhow!("Unrecognized client secret format: {}", e))?;
        let secret = match file {
            ClientSecretFile::Web(secret) | ClientSecretFile::Installed(secret) => secret,
        };
        Ok(secret)
    }

}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The token endpoint answered and refused the grant
    #[error("Token endpoint returned HTTP {status} - {body}")]
    Rejected { status: u16, body: String },
    #[error("Token endpoint returned HTTP {status} - {body}")]
    Unavailable { status: u16, body: String },
    #[error("Token request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl TokenError {
    /// Whether retrying with the same grant could succeed
    pub fn is_transient(&self) -> bool {
        !matches!(self, TokenError::Rejected { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            TokenError::Rejected { status, .. } | TokenError::Unavailable { status, .. } => {
                Some(*status)
            }
            TokenError::Transport(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: Option<i64>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
    pub token_type: Option<String>,
}

/// Build the consent screen URL. `access_type=offline` is what makes
/// Google hand out a refresh token on the first exchange.
pub fn authorization_url(secret: &ClientSecret, redirect_uri: &str, scopes: &[String]) -> String {
    let scope = scopes.join(" ");
    format!(
        "{}?response_type=code&client_id={}&redirect_uri={}&scope={}&access_type=offline&include_granted_scopes=true",
        secret.auth_uri,
        urlencoding::encode(&secret.client_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(&scope)
    )
}

async fn request_token(
    client: &Client,
    token_uri: &str,
    params: &[(&str, &str)],
) -> Result<TokenResponse, TokenError> {
    let response = client.post(token_uri).form(params).send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Could not read error response".to_string());
        // Throttling and timeouts say nothing about the grant itself
        let rejected = status.is_client_error()
            && status != StatusCode::REQUEST_TIMEOUT
            && status != StatusCode::TOO_MANY_REQUESTS;
        let status = status.as_u16();
        return Err(if rejected {
            TokenError::Rejected { status, body }
        } else {
            TokenError::Unavailable { status, body }
        });
    }

    let token = response.json::<TokenResponse>().await?;
    Ok(token)
}

pub async fn exchange_code_for_token(
    client: &Client,
    secret: &ClientSecret,
    code: &str,
    redirect_uri: &str,
) -> Result<TokenResponse, TokenError> {
    tracing::debug!("Exchanging authorization code at {}", secret.token_uri);
    request_token(
        client,
        &secret.token_uri,
        &[
            ("client_id", secret.client_id.as_str()),
            ("client_secret", secret.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ],
    )
    .await
}

pub async fn refresh_access_token(
    client: &Client,
    secret: &ClientSecret,
    refresh_token: &str,
) -> Result<TokenResponse, TokenError> {
    tracing::debug!("Refreshing access token at {}", secret.token_uri);
    request_token(
        client,
        &secret.token_uri,
        &[
            ("client_id", secret.client_id.as_str()),
            ("client_secret", secret.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ],
    )
    .await
}
