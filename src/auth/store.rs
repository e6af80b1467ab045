use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;
use rusqlite::types::Type;
use tokio_rusqlite::Connection;

use super::credential::Credential;

/// Durable home of the single credential record
#[derive(Clone)]
pub struct CredentialStore {
    db: Connection,
}

impl CredentialStore {
    pub fn new(db: Connection) -> Self {
        Self { db }
    }

    pub async fn load(&self) -> Result<Option<Credential>, tokio_rusqlite::Error> {
        self.db
            .call(|conn| {
                let credential = conn
                    .query_row(
                        "SELECT access_token, refresh_token, expires_at, scopes FROM credential WHERE id = 1",
                        [],
                        |row| {
                            let expires_at: String = row.get(2)?;
                            let expires_at = DateTime::parse_from_rfc3339(&expires_at)
                                .map_err(|e| {
                                    rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e))
                                })?
                                .with_timezone(&Utc);
                            let scopes: String = row.get(3)?;
                            Ok(Credential {
                                access_token: row.get(0)?,
                                refresh_token: row.get(1)?,
                                expires_at,
                                scopes: scopes.split_whitespace().map(String::from).collect(),
                            })
                        },
                    )
                    .optional()?;
                Ok(credential)
            })
            .await
    }

    /// Overwrites whatever credential was stored before
    pub async fn save(&self, credential: &Credential) -> Result<(), tokio_rusqlite::Error> {
        let credential = credential.clone();
        self.db
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO credential (id, access_token, refresh_token, expires_at, scopes)
                     VALUES (1, ?1, ?2, ?3, ?4)
                     ON CONFLICT(id) DO UPDATE SET
                        access_token = excluded.access_token,
                        refresh_token = excluded.refresh_token,
                        expires_at = excluded.expires_at,
                        scopes = excluded.scopes",
                    tokio_rusqlite::params![
                        credential.access_token,
                        credential.refresh_token,
                        credential.expires_at.to_rfc3339(),
                        credential.scopes.join(" "),
                    ],
                )?;
                Ok(())
            })
            .await
    }

    /// Returns whether there was anything to remove
    pub async fn clear(&self) -> Result<bool, tokio_rusqlite::Error> {
        self.db
            .call(|conn| {
                let deleted = conn.execute("DELETE FROM credential WHERE id = 1", [])?;
                Ok(deleted > 0)
            })
            .await
    }
}
