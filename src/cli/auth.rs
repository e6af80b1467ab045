use anyhow::Result;
use reqwest::Client;

use crate::auth::{AuthManager, CredentialState, CredentialStore};
use crate::core::{AppConfig, db::migrated_db};

async fn auth_manager(config: &AppConfig) -> Result<AuthManager> {
    let db = migrated_db(&config.db_path).await?;
    let http = Client::builder().timeout(config.http_timeout).build()?;
    let manager = AuthManager::load(config, CredentialStore::new(db), http).await?;
    Ok(manager)
}

/// Report the stored credential without touching the network
pub async fn status(config: &AppConfig) -> Result<()> {
    let manager = auth_manager(config).await?;

    match manager.stored_credential().await {
        None => println!("Not authenticated. Visit the server root to authorize."),
        Some(credential) => {
            let state = match credential.state() {
                CredentialState::Valid => "valid",
                CredentialState::Refreshable => "expired, will refresh on next use",
                CredentialState::Expired => "expired, re-authorization required",
            };
            println!("Credential {}", state);
            println!("Expires at: {}", credential.expires_at.to_rfc3339());
            println!("Scopes: {}", credential.scopes.join(" "));
        }
    }

    Ok(())
}

pub async fn logout(config: &AppConfig) -> Result<()> {
    let manager = auth_manager(config).await?;

    if manager.revoke().await? {
        println!("Removed stored credential.");
    } else {
        println!("No credential was stored.");
    }

    Ok(())
}
