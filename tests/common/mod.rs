//! Mock swap API shared by the integration tests.
//!
//! [`TestApi`] wraps a `mockito` server mounted under `/api/v2` and builds
//! clients pointed at it. The fixture functions return response bodies in
//! the API's `{ "data": ... }` envelope.

#![allow(dead_code)]

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use deposit_sdk::{ApiClient, ApiConfig, poll::PollConfig};
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::{Value, json};
use url::Url;

pub const API_KEY: &str = "0123456789abcdef";

pub struct TestApi {
    pub server: ServerGuard,
}

impl TestApi {
    pub async fn new() -> Self {
        Self {
            server: mockito::Server::new_async().await,
        }
    }

    pub fn base_url(&self) -> Url {
        Url::parse(&format!("{}/api/v2", self.server.url())).unwrap()
    }

    pub fn config(&self) -> ApiConfig {
        ApiConfig::custom(self.base_url()).with_timeout(Duration::from_secs(5))
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(self.config()).unwrap()
    }

    /// Mocks a JSON response; `query` must be given for endpoints that take
    /// query parameters.
    pub async fn mock_json(
        &mut self,
        method: &str,
        endpoint: &str,
        query: Option<Matcher>,
        status: usize,
        body: Value,
    ) -> Mock {
        let mut mock = self.server.mock(method, format!("/api/v2{endpoint}").as_str());
        if let Some(query) = query {
            mock = mock.match_query(query);
        }
        mock.with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await
    }

    /// Mocks `GET /swaps/{id}`, answering with `statuses` in order and
    /// repeating the last one. Returns the mock and a hit counter.
    pub async fn mock_swap_statuses(
        &mut self,
        swap_id: &str,
        statuses: &'static [&'static str],
    ) -> (Mock, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let id = swap_id.to_string();
        let mock = self
            .server
            .mock("GET", format!("/api/v2/swaps/{swap_id}").as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body_from_request(move |_| {
                let hit = counter.fetch_add(1, Ordering::SeqCst);
                let status = statuses[hit.min(statuses.len() - 1)];
                swap_status_body(&id, status).to_string().into_bytes()
            })
            .expect_at_least(1)
            .create_async()
            .await;
        (mock, hits)
    }
}

/// Query matcher requiring every given pair.
pub fn query(pairs: &[(&str, &str)]) -> Matcher {
    Matcher::AllOf(
        pairs
            .iter()
            .map(|(k, v)| Matcher::UrlEncoded(k.to_string(), v.to_string()))
            .collect(),
    )
}

/// Poller timing short enough for tests.
pub fn fast_poll() -> PollConfig {
    PollConfig {
        interval: Duration::from_millis(20),
        tick: Duration::from_millis(10),
    }
}

pub fn sources_body() -> Value {
    json!({
        "data": [
            {
                "name": "ETHEREUM_MAINNET",
                "display_name": "Ethereum",
                "chain_id": "1",
                "type": "evm",
                "tokens": [
                    { "symbol": "ETH", "decimals": 18, "price_in_usd": 3120.55 },
                    { "symbol": "USDC", "decimals": 6, "price_in_usd": "1" }
                ]
            },
            {
                "name": "ARBITRUM_MAINNET",
                "display_name": "Arbitrum One",
                "tokens": [{ "symbol": "ETH", "decimals": 18 }]
            }
        ]
    })
}

pub fn quote_body() -> Value {
    json!({
        "data": [
            {
                "min_amount": 0.0015,
                "max_amount": "3.5",
                "total_fee": "0.0004",
                "total_fee_in_usd": 1.25,
                "avg_completion_time": "00:00:42",
                "path": [{ "provider": "layerswap" }],
                "fee_discount": 0
            }
        ]
    })
}

pub fn created_swap_body(swap_id: &str) -> Value {
    json!({
        "data": {
            "swap": swap_json(swap_id, "user_transfer_pending"),
            "deposit_actions": [
                {
                    "type": "transfer",
                    "to_address": "0xdeposit",
                    "amount": 0.01,
                    "network": { "name": "ETHEREUM_MAINNET" },
                    "token": { "symbol": "ETH" },
                    "order": 0
                }
            ]
        }
    })
}

pub fn swap_status_body(swap_id: &str, status: &str) -> Value {
    json!({ "data": { "swap": swap_json(swap_id, status), "quote": {} } })
}

fn swap_json(swap_id: &str, status: &str) -> Value {
    json!({
        "id": swap_id,
        "status": status,
        "source_network": { "name": "ETHEREUM_MAINNET" },
        "source_token": { "symbol": "ETH" },
        "destination_network": { "name": "BASE_MAINNET" },
        "destination_token": { "symbol": "ETH" },
        "destination_address": "0xabc",
        "transactions": []
    })
}
