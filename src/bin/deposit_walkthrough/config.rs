//! Configuration for the deposit walkthrough.
//!
//! Configuration comes from two sources:
//! - Environment variables (via .env file or shell): API endpoint and key
//! - CLI arguments: the route to walk through and how to report it

use std::time::Duration;

use clap::Parser;
use deposit_sdk::{ApiConfig, flow::TokenMode, poll::PollConfig};
use url::Url;

/// Environment configuration (endpoint, credentials).
#[derive(Debug, serde::Deserialize)]
pub struct EnvConfig {
    /// Base URL of the API (default: mainnet)
    pub api_base_url: Option<String>,

    /// Optional API key, sent as `X-LS-APIKEY`
    pub api_key: Option<String>,

    /// Optional timeout for a single request (default: 30s)
    pub timeout_seconds: Option<u64>,
}

impl EnvConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// Endpoint configuration. The API key is applied separately, through
    /// the walkthrough, so that it gets validated.
    pub fn api_config(&self) -> Result<ApiConfig, url::ParseError> {
        let config = match self.api_base_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => ApiConfig::custom(Url::parse(url)?),
            _ => ApiConfig::mainnet(),
        };
        Ok(match self.timeout_seconds {
            Some(secs) => config.with_timeout(Duration::from_secs(secs)),
            None => config,
        })
    }
}

/// CLI arguments for the walkthrough.
#[derive(Debug, Parser)]
#[command(name = "deposit-walkthrough")]
#[command(about = "Walk through a deposit-address swap: sources, quote, swap, status")]
pub struct CliConfig {
    /// Address receiving the funds on the destination network
    #[arg(long)]
    pub wallet_address: String,

    /// Destination network identifier (e.g., BASE_MAINNET)
    #[arg(long)]
    pub destination_network: String,

    /// Destination token symbol. Required in single mode; in multiple mode
    /// it is picked among the tokens reachable from the source (default:
    /// the first one)
    #[arg(long)]
    pub destination_token: Option<String>,

    /// How the destination token is chosen: "single" or "multiple"
    #[arg(long, default_value = "single")]
    pub token_mode: String,

    /// Source network (default: the first one listed)
    #[arg(long)]
    pub source_network: Option<String>,

    /// Source token (default: the first one of the source network)
    #[arg(long)]
    pub source_token: Option<String>,

    /// Poll the swap status until it completes or Ctrl-C is pressed
    #[arg(long)]
    pub track: bool,

    /// Delay between status checks
    #[arg(long, default_value_t = 5000)]
    pub poll_interval_ms: u64,

    /// Print the curl command of every recorded API call
    #[arg(long)]
    pub show_curl: bool,
}

/// What to walk through, validated.
#[derive(Clone, Debug)]
pub struct WalkthroughConfig {
    pub wallet_address: String,
    pub token_mode: TokenMode,
    pub destination_network: String,
    pub destination_token: Option<String>,
    pub source_network: Option<String>,
    pub source_token: Option<String>,
    pub track: bool,
    pub poll: PollConfig,
    pub show_curl: bool,
}

impl CliConfig {
    /// Convert CLI arguments to the walkthrough configuration.
    pub fn to_walkthrough_config(&self) -> Result<WalkthroughConfig, ConfigError> {
        let wallet_address = self.wallet_address.trim();
        if wallet_address.is_empty() {
            return Err(ConfigError::BlankWalletAddress);
        }

        let token_mode: TokenMode = self
            .token_mode
            .parse()
            .map_err(|_| ConfigError::InvalidTokenMode(self.token_mode.clone()))?;

        let destination_token = non_blank(self.destination_token.as_deref());
        if token_mode == TokenMode::Single && destination_token.is_none() {
            return Err(ConfigError::MissingDestinationToken);
        }

        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }

        Ok(WalkthroughConfig {
            wallet_address: wallet_address.to_string(),
            token_mode,
            destination_network: self.destination_network.trim().to_string(),
            destination_token,
            source_network: non_blank(self.source_network.as_deref()),
            source_token: non_blank(self.source_token.as_deref()),
            track: self.track,
            poll: PollConfig {
                interval: Duration::from_millis(self.poll_interval_ms),
                ..PollConfig::default()
            },
            show_curl: self.show_curl,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("wallet_address cannot be blank")]
    BlankWalletAddress,

    #[error("Invalid token mode {0}, expected single or multiple")]
    InvalidTokenMode(String),

    #[error("destination_token is required in single token mode")]
    MissingDestinationToken,

    #[error("poll_interval_ms cannot be zero")]
    ZeroPollInterval,
}
