use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::Utc;
use reqwest::Client;
use tokio::sync::Mutex;
use url::Url;

use super::credential::{Credential, CredentialState};
use super::store::CredentialStore;
use super::AuthError;
use crate::core::AppConfig;
use crate::google::oauth::{
    ClientSecret, authorization_url, exchange_code_for_token, refresh_access_token,
};

/// One in-flight consent flow
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub url: String,
}

/// Owns the credential slot. Every read-refresh-write cycle happens
/// under the slot's lock so concurrent refreshes can't clobber each
/// other.
pub struct AuthManager {
    http: Client,
    store: CredentialStore,
    client_secret_path: PathBuf,
    redirect_uri: String,
    scopes: Vec<String>,
    slot: Mutex<Option<Credential>>,
}

impl AuthManager {
    /// Create the manager, seeding the slot from durable storage
    pub async fn load(
        config: &AppConfig,
        store: CredentialStore,
        http: Client,
    ) -> Result<Self, AuthError> {
        let credential = store.load().await?;
        match &credential {
            Some(c) => tracing::info!("Loaded stored credential ({:?})", c.state()),
            None => tracing::info!("No stored credential, authorization required"),
        }

        Ok(Self {
            http,
            store,
            client_secret_path: config.client_secret_path.clone(),
            redirect_uri: config.redirect_uri.clone(),
            scopes: config.scopes(),
            slot: Mutex::new(credential),
        })
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    // Read on every use so the file can be dropped in after start up
    async fn client_secret(&self) -> Result<ClientSecret, AuthError> {
        let path = self.client_secret_path.display();
        let json = match tokio::fs::read_to_string(&self.client_secret_path).await {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(AuthError::ConfigurationMissing(format!("{} not found", path)));
            }
            Err(e) => {
                return Err(AuthError::ConfigurationMissing(format!(
                    "{} is unreadable: {}",
                    path, e
                )));
            }
        };
        ClientSecret::from_json(&json)
            .map_err(|e| AuthError::ConfigurationMissing(format!("{} is unusable: {}", path, e)))
    }

    pub async fn begin_authorization(&self) -> Result<AuthorizationRequest, AuthError> {
        let secret = self.client_secret().await?;
        let url = authorization_url(&secret, &self.redirect_uri, &self.scopes);
        tracing::debug!("Created authorization URL");

        Ok(AuthorizationRequest {
            redirect_uri: self.redirect_uri.clone(),
            scopes: self.scopes.clone(),
            url,
        })
    }

    /// Exchange the code carried by `callback_url` for a credential and
    /// persist it, replacing any previous one.
    pub async fn complete_authorization(&self, callback_url: &str) -> Result<Credential, AuthError> {
        let secret = self.client_secret().await?;

        let url = Url::parse(callback_url)
            .map_err(|e| AuthError::TokenExchangeFailed(format!("Invalid callback URL: {}", e)))?;
        let mut code = None;
        for (key, value) in url.query_pairs() {
            match &*key {
                "error" => {
                    return Err(AuthError::TokenExchangeFailed(format!(
                        "Authorization was denied: {}",
                        value
                    )));
                }
                "code" => code = Some(value.into_owned()),
                _ => {}
            }
        }
        let code = code.filter(|c| !c.is_empty()).ok_or_else(|| {
            AuthError::TokenExchangeFailed("Callback is missing the authorization code".to_string())
        })?;

        let token = exchange_code_for_token(&self.http, &secret, &code, &self.redirect_uri)
            .await
            .map_err(|e| AuthError::TokenExchangeFailed(e.to_string()))?;
        let credential = Credential::from_token_response(token, &self.scopes, Utc::now());
        if credential.refresh_token.is_none() {
            tracing::warn!("No refresh token granted, re-authorization will be needed on expiry");
        }

        let mut slot = self.slot.lock().await;
        self.store.save(&credential).await?;
        *slot = Some(credential.clone());
        tracing::info!("Stored new credential");

        Ok(credential)
    }

    /// The current credential if usable, refreshing it first when
    /// expired. `None` means not authenticated: there is no credential,
    /// or the token endpoint refused the refresh token. A token endpoint
    /// that can't be reached is an error instead.
    pub async fn active_credential(&self) -> Result<Option<Credential>, AuthError> {
        let mut slot = self.slot.lock().await;
        let Some(current) = slot.as_ref() else {
            return Ok(None);
        };

        let refresh_token = match current.state() {
            CredentialState::Valid => return Ok(Some(current.clone())),
            CredentialState::Expired => {
                tracing::info!("Stored credential expired and has no refresh token");
                return Ok(None);
            }
            CredentialState::Refreshable => current.refresh_token.clone().unwrap_or_default(),
        };

        let secret = self.client_secret().await?;
        let token = match refresh_access_token(&self.http, &secret, &refresh_token).await {
            Ok(token) => token,
            Err(e) if e.is_transient() => {
                tracing::error!("Could not reach token endpoint: {}", e);
                return Err(AuthError::TokenEndpointUnavailable {
                    status: e.status(),
                    message: e.to_string(),
                });
            }
            Err(e) => {
                tracing::warn!("Refresh token was rejected: {}", e);
                return Ok(None);
            }
        };

        let refreshed = current.refreshed(token, Utc::now());
        self.store.save(&refreshed).await?;
        *slot = Some(refreshed.clone());
        tracing::info!("Refreshed access token");

        Ok(Some(refreshed))
    }

    /// Whatever is in the slot, without refreshing
    pub async fn stored_credential(&self) -> Option<Credential> {
        self.slot.lock().await.clone()
    }

    /// Forget the credential both in memory and on disk
    pub async fn revoke(&self) -> Result<bool, AuthError> {
        let mut slot = self.slot.lock().await;
        let removed = self.store.clear().await?;
        *slot = None;
        Ok(removed)
    }
}
