use fastnum::UD64;
use serde::Deserialize;

use crate::num;

/// Network as listed by `GET /sources` and `GET /destinations`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Network {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub chain_id: Option<String>,
    #[serde(default, rename = "type")]
    pub network_type: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub tokens: Vec<Token>,
}

impl Network {
    /// Human-readable name, falling back to the network identifier.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    pub fn token(&self, symbol: &str) -> Option<&Token> {
        self.tokens.iter().find(|t| t.symbol == symbol)
    }
}

/// Token available on a [`Network`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Token {
    pub symbol: String,
    #[serde(default)]
    pub display_asset: Option<String>,
    #[serde(default)]
    pub contract: Option<String>,
    #[serde(default)]
    pub decimals: Option<u8>,
    #[serde(default)]
    pub precision: Option<u8>,
    #[serde(default, deserialize_with = "num::decimal_opt::deserialize")]
    pub price_in_usd: Option<UD64>,
    #[serde(default)]
    pub logo: Option<String>,
}

/// Finds a network by its identifier.
pub fn find_network<'a>(networks: &'a [Network], name: &str) -> Option<&'a Network> {
    networks.iter().find(|n| n.name == name)
}
