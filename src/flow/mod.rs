//! Deposit walkthrough state machine.
//!
//! [`DepositFlow`] drives the steps of a deposit-address swap:
//!
//! 1. [`Step::Config`] - wallet address, optional API key, destination
//! 2. [`Step::SelectSource`] - `GET /sources`, then pick a network and token
//! 3. [`Step::SelectDestinationToken`] - [`TokenMode::Multiple`] only
//! 4. [`Step::Quote`] - `GET /detailed_quote`
//! 5. [`Step::CreateSwap`] - `POST /swaps`, yields the deposit address
//! 6. [`Step::TrackStatus`] - one-shot or periodic `GET /swaps/{id}`
//!
//! Whether a step is locked or completed is never stored; it is derived
//! from [`WizardState`] by [`step::describe`]. Changing a choice clears
//! everything derived from it, including a running status poller.

mod controller;
mod state;
pub mod step;

pub use controller::{DepositFlow, MIN_API_KEY_LEN};
pub use state::{TokenMode, WizardState};
pub use step::{BannerKind, Step, StepBanner, StepDescriptor};
