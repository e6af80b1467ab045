use anyhow::Result;

use crate::core::{AppConfig, db::migrated_db};

pub async fn run(config: &AppConfig) -> Result<()> {
    tokio::fs::create_dir_all(&config.storage_path).await?;
    migrated_db(&config.db_path).await?;
    println!("Initialized credential database at {}", config.db_path);
    Ok(())
}
