//! Error types for the deposit walkthrough.

use deposit_sdk::ApiError;

use crate::config::ConfigError;

/// Main error type for the deposit walkthrough.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Environment configuration error: {0}")]
    EnvConfig(#[from] envy::Error),

    #[error("Invalid API URL: {0}")]
    InvalidApiUrl(#[from] url::ParseError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("No source network can fund the destination")]
    NoSources,

    #[error("Source {0} not listed for this destination")]
    SourceNotFound(String),

    #[error("No destination token reachable from the source")]
    NoDestinationTokens,

    #[error("No route available for the selected pair")]
    NoRoutes,

    #[error("Status polling ended before the swap finished")]
    PollingEnded,
}

pub type Result<T> = std::result::Result<T, Error>;
