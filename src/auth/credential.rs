use chrono::{DateTime, Duration, Utc};

use crate::google::oauth::TokenResponse;

/// Access tokens are considered expired this long before Google
/// actually expires them so one never lapses mid-request.
pub const EXPIRY_SKEW_SECS: i64 = 60;

/// Lifetime assumed when the token endpoint omits `expires_in`
const DEFAULT_EXPIRES_IN: i64 = 3600;

/// OAuth2 token set authorizing calendar access
#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialState {
    Valid,
    /// Expired, but carries a refresh token
    Refreshable,
    Expired,
}

fn parse_scopes(scope: &str) -> Vec<String> {
    scope.split_whitespace().map(String::from).collect()
}

impl Credential {
    /// Build a credential from the response to an authorization code
    /// exchange. `requested_scopes` is used when Google does not echo
    /// the granted scopes back.
    pub fn from_token_response(
        token: TokenResponse,
        requested_scopes: &[String],
        now: DateTime<Utc>,
    ) -> Self {
        let expires_in = token.expires_in.unwrap_or(DEFAULT_EXPIRES_IN);
        let scopes = token
            .scope
            .as_deref()
            .map(parse_scopes)
            .unwrap_or_else(|| requested_scopes.to_vec());

        Self {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: now + Duration::seconds(expires_in),
            scopes,
        }
    }

    /// Apply a refresh response. Google usually omits the refresh token
    /// and scope on refresh so the existing ones carry over.
    pub fn refreshed(&self, token: TokenResponse, now: DateTime<Utc>) -> Self {
        let expires_in = token.expires_in.unwrap_or(DEFAULT_EXPIRES_IN);
        Self {
            access_token: token.access_token,
            refresh_token: token.refresh_token.or_else(|| self.refresh_token.clone()),
            expires_at: now + Duration::seconds(expires_in),
            scopes: token
                .scope
                .as_deref()
                .map(parse_scopes)
                .unwrap_or_else(|| self.scopes.clone()),
        }
    }

    pub fn state_at(&self, now: DateTime<Utc>) -> CredentialState {
        if now + Duration::seconds(EXPIRY_SKEW_SECS) < self.expires_at {
            CredentialState::Valid
        } else if self.refresh_token.is_some() {
            CredentialState::Refreshable
        } else {
            CredentialState::Expired
        }
    }

    pub fn state(&self) -> CredentialState {
        self.state_at(Utc::now())
    }
}
