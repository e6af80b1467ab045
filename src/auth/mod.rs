//! Credential lifecycle: OAuth2 consent, code exchange, persistence
//! and refresh of the single process-wide calendar credential.

mod credential;
mod manager;
mod store;

pub use credential::{Credential, CredentialState, EXPIRY_SKEW_SECS};
pub use manager::{AuthManager, AuthorizationRequest};
pub use store::CredentialStore;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Client secret configuration missing: {0}")]
    ConfigurationMissing(String),
    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(String),
    #[error("Token endpoint unavailable{}: {message}", status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    TokenEndpointUnavailable {
        status: Option<u16>,
        message: String,
    },
    #[error("Credential storage failed: {0}")]
    Storage(#[from] tokio_rusqlite::Error),
}
