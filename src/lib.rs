//! Deposit-address swap SDK.
//!
//! # Overview
//!
//! Client-side walkthrough of a cross-chain swap REST API: pick a destination
//! network and token, find source networks that can fund it, request a quote,
//! create a swap with a generated deposit address and track its status.
//!
//! * [`ApiClient`] issues the HTTP calls and keeps an [`activity::ActivityLog`]
//!   of the last requests together with equivalent `curl` commands.
//! * [`flow::DepositFlow`] holds the wizard state and derives which steps are
//!   locked or completed from it.
//! * [`poll`] repeats `GET /swaps/{id}` at a fixed interval until the swap
//!   reaches a terminal status.
//!
//! See `./tests` for end-to-end examples against a mocked API.
//!
//! # Limitations/follow-ups
//!
//! * Only deposit-address swaps are covered; wallet-signed transfers are not.
//!
//! * Nothing is retried automatically, including status polling failures,
//!   which are only reported until the next scheduled fetch.

pub mod activity;
pub mod client;
pub mod error;
pub mod flow;
pub mod num;
pub mod poll;
pub mod types;

use std::time::Duration;

use url::Url;

pub use client::ApiClient;
pub use error::ApiError;

const MAINNET_URL: &str = "https://api.layerswap.io/api/v2";

#[derive(Clone, derive_more::Debug)]
/// Endpoint and credentials of the swap API.
pub struct ApiConfig {
    #[debug("{base_url}")]
    base_url: Url,
    #[debug("{:?}", api_key.as_ref().map(|_| "<redacted>"))]
    api_key: Option<String>,
    timeout: Duration,
}

impl ApiConfig {
    /// Client-side bound on a single request.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn mainnet() -> Self {
        Self::custom(Url::parse(MAINNET_URL).expect("ApiConfig: mainnet URL"))
    }

    pub fn custom(base_url: Url) -> Self {
        Self {
            base_url,
            api_key: None,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_api_key(mut self, api_key: Option<&str>) -> Self {
        self.set_api_key(api_key);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn set_api_key(&mut self, api_key: Option<&str>) {
        self.api_key = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string);
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Configured API key; `None` means public rate limits apply.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
