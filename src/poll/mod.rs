//! Swap status polling.
//!
//! Repeats `GET /swaps/{id}` at a fixed interval until the swap reaches a
//! terminal status (see [`crate::types::SwapStatus::is_terminal`]).
//!
//! # Architecture
//!
//! - [`stream`] - the polling loop as a [`futures::Stream`] of [`PollUpdate`]s,
//!   with the sleep function injected
//! - [`start`] - spawns the stream on a tokio task and hands back a
//!   [`StatusReceiver`] and a cancellable [`PollHandle`]
//! - [`SwapSource`] - where statuses come from, implemented by [`crate::ApiClient`]
//!
//! A failed fetch is delivered as an update and does not stop polling. A
//! terminal status is delivered and then the stream ends, so no fetch is
//! made after it.
//!
//! # Example
//!
//! ```ignore
//! use deposit_sdk::{ApiClient, ApiConfig, poll};
//!
//! let client = ApiClient::new(ApiConfig::mainnet())?;
//! let (mut rx, mut handle) = poll::start(
//!     client,
//!     "swap_123".to_string(),
//!     poll::PollConfig::default(),
//!     tokio::time::sleep,
//! );
//!
//! while let Some(update) = rx.recv().await {
//!     match update.result {
//!         Ok(swap) => println!("#{} {}", update.attempt, swap.status),
//!         Err(e) => println!("#{} failed: {e}", update.attempt),
//!     }
//! }
//! handle.stop();
//! ```

mod poller;
mod types;

pub use poller::{SwapSource, start, stream};
pub use types::{PollConfig, PollHandle, PollUpdate, StatusReceiver};
