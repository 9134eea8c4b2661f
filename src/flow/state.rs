use std::{fmt, str::FromStr};

use crate::types::{
    DepositAction, Network, NetworkName, QuoteRoute, RouteRequest, Swap, SwapId, SwapStatus,
    Token, TokenSymbol,
};

/// How the destination token is chosen.
///
/// * [`TokenMode::Single`] - the destination token is fixed up front,
///   together with the destination network.
/// * [`TokenMode::Multiple`] - only the destination network is fixed; the
///   token is picked after the source, among those reachable from it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TokenMode {
    #[default]
    Single,
    Multiple,
}

impl FromStr for TokenMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "multiple" | "multi" => Ok(Self::Multiple),
            other => Err(format!("unknown token mode: {other}")),
        }
    }
}

impl fmt::Display for TokenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Single => "single",
            Self::Multiple => "multiple",
        })
    }
}

/// Everything the user picked and the API returned during one session.
///
/// Fields are only changed by [`super::DepositFlow`], which also applies the
/// invalidation rules: changing an upstream choice clears everything that
/// was derived from it.
#[derive(Clone, derive_more::Debug, Default)]
pub struct WizardState {
    pub(crate) wallet_address: String,
    #[debug("{:?}", api_key.as_ref().map(|_| "<redacted>"))]
    pub(crate) api_key: Option<String>,
    pub(crate) token_mode: TokenMode,
    pub(crate) destination_network: Option<NetworkName>,
    pub(crate) destination_token: Option<TokenSymbol>,
    pub(crate) sources: Vec<Network>,
    pub(crate) source_network: Option<NetworkName>,
    pub(crate) source_token: Option<TokenSymbol>,
    pub(crate) destination_tokens: Vec<Token>,
    pub(crate) quote_routes: Vec<QuoteRoute>,
    pub(crate) swap_id: Option<SwapId>,
    pub(crate) deposit_address: Option<String>,
    pub(crate) deposit_actions: Vec<DepositAction>,
    pub(crate) swap: Option<Swap>,
    pub(crate) swap_status: Option<SwapStatus>,
}

impl WizardState {
    pub fn wallet_address(&self) -> &str {
        &self.wallet_address
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn token_mode(&self) -> TokenMode {
        self.token_mode
    }

    pub fn destination_network(&self) -> Option<&str> {
        self.destination_network.as_deref()
    }

    pub fn destination_token(&self) -> Option<&str> {
        self.destination_token.as_deref()
    }

    /// Networks returned by the last successful `GET /sources`.
    pub fn sources(&self) -> &[Network] {
        &self.sources
    }

    pub fn source_network(&self) -> Option<&str> {
        self.source_network.as_deref()
    }

    pub fn source_token(&self) -> Option<&str> {
        self.source_token.as_deref()
    }

    /// Destination tokens reachable from the selected source
    /// ([`TokenMode::Multiple`] only).
    pub fn destination_tokens(&self) -> &[Token] {
        &self.destination_tokens
    }

    pub fn quote_routes(&self) -> &[QuoteRoute] {
        &self.quote_routes
    }

    pub fn swap_id(&self) -> Option<&str> {
        self.swap_id.as_deref()
    }

    pub fn deposit_address(&self) -> Option<&str> {
        self.deposit_address.as_deref()
    }

    pub fn deposit_actions(&self) -> &[DepositAction] {
        &self.deposit_actions
    }

    /// Last swap snapshot, from creation or from a status fetch.
    pub fn swap(&self) -> Option<&Swap> {
        self.swap.as_ref()
    }

    pub fn swap_status(&self) -> Option<&SwapStatus> {
        self.swap_status.as_ref()
    }

    pub(crate) fn has_wallet(&self) -> bool {
        !self.wallet_address.trim().is_empty()
    }

    pub(crate) fn has_source(&self) -> bool {
        self.source_network.is_some() && self.source_token.is_some()
    }

    /// Route for quoting and swap creation, once every selection is made.
    pub fn route_request(&self) -> Option<RouteRequest> {
        if !self.has_wallet() {
            return None;
        }
        Some(RouteRequest {
            source_network: self.source_network.clone()?,
            source_token: self.source_token.clone()?,
            destination_network: self.destination_network.clone()?,
            destination_token: self.destination_token.clone()?,
            destination_address: self.wallet_address.clone(),
        })
    }

    pub(crate) fn clear_swap(&mut self) {
        self.swap_id = None;
        self.deposit_address = None;
        self.deposit_actions.clear();
        self.swap = None;
        self.swap_status = None;
    }

    pub(crate) fn clear_quote(&mut self) {
        self.quote_routes.clear();
        self.clear_swap();
    }

    /// A new source invalidates the destination token in
    /// [`TokenMode::Multiple`], since it was picked among the source's reach.
    pub(crate) fn clear_after_source(&mut self) {
        if self.token_mode == TokenMode::Multiple {
            self.destination_token = None;
            self.destination_tokens.clear();
        }
        self.clear_quote();
    }

    /// A new destination invalidates sources and everything after them.
    pub(crate) fn clear_after_destination(&mut self) {
        self.sources.clear();
        self.source_network = None;
        self.source_token = None;
        self.destination_tokens.clear();
        self.clear_quote();
    }
}
