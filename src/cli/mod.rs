use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::core::AppConfig;

pub mod auth;
pub mod init;
pub mod serve;

#[derive(Subcommand)]
enum Command {
    /// Create the credential database
    Init {},
    /// Run the API server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "8080")]
        port: String,
    },
    /// Show whether a calendar credential is stored and usable
    Status {},
    /// Remove the stored calendar credential
    Logout {},
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();
    let config = AppConfig::default();

    // Handle each sub command
    match args.command {
        Some(Command::Init {}) => {
            init::run(&config).await?;
        }
        Some(Command::Serve { host, port }) => {
            serve::run(host, port, config).await?;
        }
        Some(Command::Status {}) => {
            auth::status(&config).await?;
        }
        Some(Command::Logout {}) => {
            auth::logout(&config).await?;
        }
        None => {}
    }

    Ok(())
}
