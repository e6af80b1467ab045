//! Router for the OAuth2 authorization flow

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::Uri,
    response::{Html, IntoResponse, Response},
};

use url::Url;

use super::public;
use crate::api::state::AppState;
use crate::auth::AuthError;

type SharedState = Arc<AppState>;

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

/// Authentication status, or a link to start the consent flow
async fn home(State(state): State<SharedState>) -> Response {
    match state.auth.active_credential().await {
        Ok(Some(_)) => public::AUTHENTICATED_MESSAGE.into_response(),
        Ok(None) => match state.auth.begin_authorization().await {
            Ok(request) => Html(format!(
                r#"<a href="{}">Click here to authorize with Google Calendar</a>"#,
                escape_attribute(&request.url)
            ))
            .into_response(),
            Err(err) => err.into_response(),
        },
        Err(err) => err.into_response(),
    }
}

// The redirect URI is the externally visible address of the callback
// route so it stands in for scheme and host
fn callback_url(redirect_uri: &str, query: Option<&str>) -> Result<String, AuthError> {
    let mut url = Url::parse(redirect_uri).map_err(|e| {
        AuthError::TokenExchangeFailed(format!("Invalid redirect URI {}: {}", redirect_uri, e))
    })?;
    url.set_query(query);
    Ok(url.into())
}

/// Complete the consent flow
async fn oauth2_callback(State(state): State<SharedState>, uri: Uri) -> Response {
    tracing::info!("OAuth callback received");
    let callback_url = match callback_url(state.auth.redirect_uri(), uri.query()) {
        Ok(url) => url,
        Err(err) => return err.into_response(),
    };

    match state.auth.complete_authorization(&callback_url).await {
        Ok(_) => public::CALLBACK_SUCCESS_MESSAGE.into_response(),
        Err(err) => err.into_response(),
    }
}

async fn health() -> Json<public::HealthResponse> {
    Json(public::HealthResponse {
        status: String::from("ok"),
    })
}

/// Create the authorization router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", axum::routing::get(home))
        .route("/oauth2callback", axum::routing::get(oauth2_callback))
        .route("/health", axum::routing::get(health))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_escapes_link_attribute() {
        assert_eq!(
            escape_attribute(r#"https://a/?x=1&y="2""#),
            "https://a/?x=1&amp;y=&quot;2&quot;"
        );
    }

    #[test]
    fn it_replaces_redirect_uri_query_with_callback_query() {
        let url = callback_url(
            "https://bot.example.com/oauth2callback?tenant=a",
            Some("code=abc123&scope=calendar"),
        )
        .unwrap();
        assert_eq!(
            url,
            "https://bot.example.com/oauth2callback?code=abc123&scope=calendar"
        );

        let url = callback_url("http://localhost:8080/oauth2callback", None).unwrap();
        assert_eq!(url, "http://localhost:8080/oauth2callback");
    }

    #[test]
    fn it_rejects_unparseable_redirect_uri() {
        assert!(matches!(
            callback_url("not a url", Some("code=abc")),
            Err(AuthError::TokenExchangeFailed(_))
        ));
    }
}
