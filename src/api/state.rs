use std::sync::Arc;

use anyhow::Result;
use reqwest::Client;
use tokio_rusqlite::Connection;

use crate::auth::{AuthManager, CredentialStore};
use crate::core::AppConfig;
use crate::dispatch::EventDispatcher;

pub struct AppState {
    pub config: AppConfig,
    pub auth: Arc<AuthManager>,
    pub dispatcher: EventDispatcher,
}

impl AppState {
    pub async fn new(db: Connection, config: AppConfig) -> Result<Self> {
        // Shared by the token endpoint and calendar calls, bounded so a
        // slow upstream can't hang a request
        let http = Client::builder().timeout(config.http_timeout).build()?;

        let auth = Arc::new(AuthManager::load(&config, CredentialStore::new(db), http.clone()).await?);
        let dispatcher = EventDispatcher::new(&config, Arc::clone(&auth), http);

        Ok(Self {
            config,
            auth,
            dispatcher,
        })
    }
}
