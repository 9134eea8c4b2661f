use std::fmt;

use chrono::{DateTime, Utc};
use fastnum::UD64;
use itertools::Itertools;
use serde::Deserialize;

use crate::num;

/// Lifecycle status of a swap.
///
/// Parsed case-insensitively; unknown values are preserved in
/// [`SwapStatus::Other`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum SwapStatus {
    UserTransferPending,
    LsTransferPending,
    Completed,
    Failed,
    Cancelled,
    Expired,
    PendingRefund,
    Refunded,
    Other(String),
}

impl SwapStatus {
    /// Whether no further status change is expected.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::UserTransferPending => "user_transfer_pending",
            Self::LsTransferPending => "ls_transfer_pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
            Self::PendingRefund => "pending_refund",
            Self::Refunded => "refunded",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for SwapStatus {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "user_transfer_pending" => Self::UserTransferPending,
            "ls_transfer_pending" => Self::LsTransferPending,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            "cancelled" | "canceled" => Self::Cancelled,
            "expired" => Self::Expired,
            "pending_refund" => Self::PendingRefund,
            "refunded" => Self::Refunded,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for SwapStatus {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a swap transaction.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum TransactionType {
    Input,
    Output,
    Refuel,
    Other(String),
}

impl From<String> for TransactionType {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "input" => Self::Input,
            "output" => Self::Output,
            "refuel" => Self::Refuel,
            _ => Self::Other(value),
        }
    }
}

/// On-chain transaction attached to a swap.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Transaction {
    #[serde(rename = "type")]
    pub r#type: TransactionType,
    #[serde(default, alias = "transaction_hash")]
    pub tx_hash: Option<String>,
    #[serde(default, deserialize_with = "num::decimal_opt::deserialize")]
    pub amount: Option<UD64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "named_ref")]
    pub network: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Swap object returned by `POST /swaps` and `GET /swaps/{id}`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Swap {
    pub id: String,
    pub status: SwapStatus,
    #[serde(default, deserialize_with = "named_ref")]
    pub source_network: Option<String>,
    #[serde(default, deserialize_with = "named_ref")]
    pub source_token: Option<String>,
    #[serde(default, deserialize_with = "named_ref")]
    pub destination_network: Option<String>,
    #[serde(default, deserialize_with = "named_ref")]
    pub destination_token: Option<String>,
    #[serde(default)]
    pub destination_address: Option<String>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl Swap {
    /// Transactions split into `(inputs, outputs)`; other types are dropped.
    pub fn transactions_by_direction(&self) -> (Vec<&Transaction>, Vec<&Transaction>) {
        self.transactions
            .iter()
            .filter(|tx| matches!(tx.r#type, TransactionType::Input | TransactionType::Output))
            .partition(|tx| tx.r#type == TransactionType::Input)
    }

    pub fn input_transactions(&self) -> Vec<&Transaction> {
        self.transactions_by_direction().0
    }

    pub fn output_transactions(&self) -> Vec<&Transaction> {
        self.transactions_by_direction().1
    }

    /// Comma-separated hashes of the known transactions, for display.
    pub fn tx_hashes(&self) -> String {
        self.transactions
            .iter()
            .filter_map(|tx| tx.tx_hash.as_deref())
            .join(", ")
    }
}

/// Instruction telling the user how to fund a swap.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct DepositAction {
    #[serde(default, rename = "type")]
    pub r#type: Option<String>,
    pub to_address: String,
    #[serde(default, deserialize_with = "num::decimal_opt::deserialize")]
    pub amount: Option<UD64>,
    #[serde(default, deserialize_with = "named_ref")]
    pub network: Option<String>,
    #[serde(default, deserialize_with = "named_ref")]
    pub token: Option<String>,
    #[serde(default)]
    pub order: Option<u32>,
}

/// Result of `POST /swaps`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CreatedSwap {
    pub swap: Swap,
    #[serde(default)]
    pub deposit_actions: Vec<DepositAction>,
}

impl CreatedSwap {
    /// Address the user has to fund, taken from the first deposit action.
    pub fn deposit_address(&self) -> Option<&str> {
        self.deposit_actions
            .iter()
            .min_by_key(|a| a.order.unwrap_or(0))
            .map(|a| a.to_address.as_str())
    }
}

/// The API sends networks and tokens either as plain identifiers or as
/// nested objects.
#[derive(Deserialize)]
#[serde(untagged)]
enum NamedRef {
    Plain(String),
    Token { symbol: String },
    Network { name: String },
}

fn named_ref<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(
        Option::<NamedRef>::deserialize(deserializer)?.map(|r| match r {
            NamedRef::Plain(s) => s,
            NamedRef::Token { symbol } => symbol,
            NamedRef::Network { name } => name,
        }),
    )
}

#[cfg(test)]
mod tests {
    use fastnum::udec64;

    use super::*;

    #[test]
    fn test_status_is_case_insensitive() {
        assert_eq!(SwapStatus::from("Completed"), SwapStatus::Completed);
        assert_eq!(SwapStatus::from("FAILED"), SwapStatus::Failed);
        assert_eq!(SwapStatus::from("cancelled"), SwapStatus::Cancelled);
        assert_eq!(
            SwapStatus::from("Weird_State"),
            SwapStatus::Other("Weird_State".to_string())
        );
        assert_eq!(SwapStatus::from("Weird_State").to_string(), "Weird_State");
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(SwapStatus::Completed.is_terminal());
        assert!(SwapStatus::Failed.is_terminal());
        assert!(SwapStatus::Cancelled.is_terminal());
        assert!(!SwapStatus::UserTransferPending.is_terminal());
        assert!(!SwapStatus::LsTransferPending.is_terminal());
        assert!(!SwapStatus::Expired.is_terminal());
        assert!(!SwapStatus::from("unknown").is_terminal());
    }

    #[test]
    fn test_deserialize_swap_with_transactions() {
        let swap: Swap = serde_json::from_str(
            r#"{
                "id": "swap_123",
                "status": "LS_TRANSFER_PENDING",
                "source_network": {"name": "ETHEREUM_MAINNET", "display_name": "Ethereum"},
                "source_token": {"symbol": "ETH"},
                "destination_network": "BASE_MAINNET",
                "destination_token": "ETH",
                "destination_address": "0xabc",
                "transactions": [
                    {"type": "input", "tx_hash": "0x01", "amount": 0.1,
                     "timestamp": "2024-05-01T10:00:00Z"},
                    {"type": "output", "transaction_hash": "0x02", "amount": "0.0998"},
                    {"type": "refuel", "tx_hash": "0x03"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(swap.status, SwapStatus::LsTransferPending);
        assert_eq!(swap.source_network.as_deref(), Some("ETHEREUM_MAINNET"));
        assert_eq!(swap.source_token.as_deref(), Some("ETH"));
        assert_eq!(swap.destination_network.as_deref(), Some("BASE_MAINNET"));

        let (inputs, outputs) = swap.transactions_by_direction();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].amount, Some(udec64!(0.1)));
        assert!(inputs[0].timestamp.is_some());
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].tx_hash.as_deref(), Some("0x02"));
        assert_eq!(swap.tx_hashes(), "0x01, 0x02, 0x03");
    }

    #[test]
    fn test_deposit_address_uses_first_action() {
        let created: CreatedSwap = serde_json::from_str(
            r#"{
                "swap": {"id": "swap_123", "status": "user_transfer_pending"},
                "deposit_actions": [
                    {"type": "transfer", "to_address": "0xsecond", "order": 1},
                    {"type": "transfer", "to_address": "0xdeadbeef", "order": 0}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(created.deposit_address(), Some("0xdeadbeef"));
        assert!(created.swap.transactions.is_empty());
    }
}
