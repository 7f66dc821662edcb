//! Candleworks CLI - Interactive storefront shell.
//!
//! # Usage
//!
//! ```bash
//! # Start the interactive shell (probes the session first)
//! cw-cli shop
//!
//! # One-off account commands
//! cw-cli register -u jnana -e jnana@example.com
//! cw-cli forgot-password -i jnana@example.com
//! ```
//!
//! # Commands
//!
//! - `shop` - Interactive storefront session (browse, cart, checkout)
//! - `register` - Register a new account (completes with OTP verification)
//! - `forgot-password` - Start password recovery, then verify OTP and reset
//!
//! Each line typed into the shell counts as user activity for the idle
//! logout timer; going quiet for the configured idle timeout, or reaching
//! the hard session timeout, logs the session out underneath the shell.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use candleworks_storefront::{Storefront, StorefrontConfig};

mod shell;

#[derive(Parser)]
#[command(name = "cw-cli")]
#[command(author, version, about = "Candleworks storefront shell")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive storefront shell
    Shop,
    /// Register a new account
    Register {
        /// Username
        #[arg(short, long)]
        username: String,

        /// Email address
        #[arg(short, long)]
        email: String,
    },
    /// Start password recovery for an account
    ForgotPassword {
        /// Email or username
        #[arg(short, long)]
        identifier: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing with EnvFilter; default to engine info logs.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "candleworks_storefront=info,candleworks_cli=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = StorefrontConfig::from_env()?;
    let store = Storefront::new(config)?;

    match cli.command {
        Commands::Shop => shell::run(store).await?,
        Commands::Register { username, email } => {
            shell::register(&store, &username, &email).await?;
        }
        Commands::ForgotPassword { identifier } => {
            shell::forgot_password(&store, &identifier).await?;
        }
    }
    Ok(())
}
