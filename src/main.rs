use anyhow::Result;
use calbot::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
