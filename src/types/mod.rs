mod network;
mod quote;
mod request;
mod swap;

pub use network::{Network, Token, find_network};
pub use quote::QuoteRoute;
pub use request::{CreateSwapBody, RouteRequest};
pub use swap::{CreatedSwap, DepositAction, Swap, SwapStatus, Transaction, TransactionType};

/// Identifier of a network, e.g. `ETHEREUM_MAINNET`.
pub type NetworkName = String;

/// Token symbol, e.g. `ETH`.
pub type TokenSymbol = String;

/// Identifier of a swap assigned by the API.
pub type SwapId = String;
