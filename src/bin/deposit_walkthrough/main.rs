//! Deposit-address swap walkthrough.
//!
//! This binary runs the deposit flow against the swap API: lists source
//! networks for a destination, requests a quote, creates a swap with a
//! deposit address and optionally tracks its status until it finishes.

mod config;
mod error;
mod walkthrough;

use std::process::exit;

use clap::Parser;
use deposit_sdk::{ApiClient, flow::DepositFlow};
use tracing::error;

use config::{CliConfig, EnvConfig, WalkthroughConfig};
use error::Result;
use walkthrough::Walkthrough;

#[tokio::main]
async fn main() {
    // Load .env file
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Warning: Failed to load .env file: {}", e);
    }

    let (env_config, walkthrough_config) = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            exit(1);
        }
    };

    // Set up logging
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let client = match api_client(&env_config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to create API client: {}", e);
            exit(1);
        }
    };

    let mut walkthrough = Walkthrough::new(DepositFlow::new(client), walkthrough_config);
    if let Err(e) = walkthrough.run(env_config.api_key.as_deref()).await {
        error!(%e, "Deposit walkthrough failed");
        exit(1);
    }
}

/// Environment and CLI configuration.
fn load_config() -> Result<(EnvConfig, WalkthroughConfig)> {
    let env_config = EnvConfig::from_env()?;
    let walkthrough_config = CliConfig::parse().to_walkthrough_config()?;
    Ok((env_config, walkthrough_config))
}

fn api_client(env_config: &EnvConfig) -> Result<ApiClient> {
    Ok(ApiClient::new(env_config.api_config()?)?)
}
