use anyhow::Result;
use rusqlite::Connection as SyncConnection;
use tokio_rusqlite::Connection;

pub async fn async_db(db_path: &str) -> Result<Connection> {
    let db = Connection::open(db_path).await?;
    Ok(db)
}

/// Create the schema. Safe to run repeatedly.
pub fn initialize_db(conn: &SyncConnection) -> Result<(), rusqlite::Error> {
    // A single row table, there is only ever one credential per
    // deployment
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS credential (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            access_token TEXT NOT NULL,
            refresh_token TEXT,
            expires_at TEXT NOT NULL,
            scopes TEXT NOT NULL
        );",
    )?;
    Ok(())
}

/// Open the database at `db_path` and make sure the schema exists.
pub async fn migrated_db(db_path: &str) -> Result<Connection> {
    let db = async_db(db_path).await?;
    db.call(|conn| {
        initialize_db(conn)?;
        Ok(())
    })
    .await?;
    Ok(db)
}
