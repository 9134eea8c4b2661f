use std::{
    collections::{HashMap, HashSet},
    time::Duration,
};

use tracing::{info, warn};

use super::{
    state::{TokenMode, WizardState},
    step::{self, BannerKind, Step, StepBanner, StepDescriptor},
};
use crate::{
    ApiClient,
    activity::ActivityEntry,
    error::ApiError,
    poll::{self, PollConfig, PollHandle, PollUpdate, StatusReceiver},
    types::{Swap, SwapStatus, find_network},
};

/// Shortest API key accepted by [`DepositFlow::set_api_key`].
pub const MIN_API_KEY_LEN: usize = 16;

/// Wizard controller for a deposit-address swap.
///
/// Owns the [`WizardState`] and the status poller. Every action returns its
/// error and also leaves a [`StepBanner`] on the step it belongs to; a
/// failed action changes nothing else, except [`DepositFlow::get_quote`]
/// which drops stale routes before asking for new ones.
#[derive(Debug)]
pub struct DepositFlow {
    client: ApiClient,
    state: WizardState,
    banners: HashMap<Step, StepBanner>,
    loading: HashSet<Step>,
    poll_config: PollConfig,
    updates: Option<StatusReceiver>,
    poller: Option<PollHandle>,
}

impl DepositFlow {
    pub fn new(client: ApiClient) -> Self {
        let state = WizardState {
            api_key: client.config().api_key().map(str::to_string),
            ..Default::default()
        };
        Self {
            client,
            state,
            banners: HashMap::new(),
            loading: HashSet::new(),
            poll_config: PollConfig::default(),
            updates: None,
            poller: None,
        }
    }

    pub fn with_poll_config(mut self, poll_config: PollConfig) -> Self {
        self.poll_config = poll_config;
        self
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    /// Descriptors of the steps present in the current token mode.
    pub fn steps(&self) -> Vec<StepDescriptor> {
        step::describe(&self.state)
    }

    /// Descriptor of a single step, `None` if the step is not part of the
    /// current token mode.
    pub fn step(&self, step: Step) -> Option<StepDescriptor> {
        self.steps().into_iter().find(|d| d.step == step)
    }

    pub fn banner(&self, step: Step) -> Option<&StepBanner> {
        self.banners.get(&step)
    }

    pub fn is_loading(&self, step: Step) -> bool {
        self.loading.contains(&step)
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(PollHandle::is_active)
    }

    /// Time until the next status fetch while polling.
    pub fn countdown(&self) -> Option<Duration> {
        self.poller
            .as_ref()
            .filter(|p| p.is_active())
            .map(PollHandle::countdown)
    }

    /// Recent API calls, most recent first.
    pub fn activity(&self) -> Vec<ActivityEntry> {
        self.client.activity()
    }

    // Configuration

    pub fn set_wallet_address(&mut self, wallet_address: &str) {
        let wallet_address = wallet_address.trim();
        if self.state.wallet_address == wallet_address {
            return;
        }
        self.state.wallet_address = wallet_address.to_string();
        // quotes and swaps are bound to the destination address
        self.state.clear_quote();
        self.invalidated(Step::SelectDestinationToken);
    }

    /// Sets or clears (blank input) the API key used for every later call.
    pub fn set_api_key(&mut self, api_key: &str) -> Result<(), ApiError> {
        let api_key = api_key.trim();
        if !api_key.is_empty() && api_key.chars().count() < MIN_API_KEY_LEN {
            return Err(self.fail(
                Step::Config,
                ApiError::validation(format!(
                    "API key must be at least {MIN_API_KEY_LEN} characters"
                )),
            ));
        }
        self.state.api_key = (!api_key.is_empty()).then(|| api_key.to_string());
        self.client.set_api_key(Some(api_key));
        self.banners.remove(&Step::Config);
        Ok(())
    }

    pub fn set_token_mode(&mut self, mode: TokenMode) {
        if self.state.token_mode == mode {
            return;
        }
        info!(%mode, "Token mode changed");
        self.state.token_mode = mode;
        self.state.destination_token = None;
        self.state.clear_after_destination();
        self.invalidated(Step::Config);
    }

    /// Sets the destination.
    ///
    /// In [`TokenMode::Single`] the token is required; in
    /// [`TokenMode::Multiple`] it is picked later with
    /// [`DepositFlow::select_destination_token`] and must be `None` here.
    pub fn select_destination(
        &mut self,
        network: &str,
        token: Option<&str>,
    ) -> Result<(), ApiError> {
        let network = network.trim();
        let token = token.map(str::trim).filter(|t| !t.is_empty());

        let checked = match (self.state.token_mode, token) {
            _ if network.is_empty() => Err("Select a destination network"),
            (TokenMode::Single, None) => Err("Select a destination token"),
            (TokenMode::Multiple, Some(_)) => {
                Err("Destination token is selected after the source in multiple-token mode")
            }
            _ => Ok(()),
        };
        if let Err(message) = checked {
            return Err(self.fail(Step::Config, ApiError::validation(message)));
        }
        self.banners.remove(&Step::Config);

        if self.state.destination_network.as_deref() == Some(network)
            && self.state.destination_token.as_deref() == token
        {
            return Ok(());
        }
        self.state.destination_network = Some(network.to_string());
        self.state.destination_token = token.map(str::to_string);
        self.state.clear_after_destination();
        self.invalidated(Step::Config);
        info!(network, token, "Destination selected");
        Ok(())
    }

    // Source

    /// Lists networks that can fund the destination.
    pub async fn get_sources(&mut self) -> Result<(), ApiError> {
        self.ensure_unlocked(Step::SelectSource)?;
        let network = self.state.destination_network.clone().unwrap_or_default();
        let token = match self.state.token_mode {
            TokenMode::Single => self.state.destination_token.clone(),
            TokenMode::Multiple => None,
        };

        self.loading.insert(Step::SelectSource);
        let result = self.client.get_sources(&network, token.as_deref()).await;
        self.loading.remove(&Step::SelectSource);

        let sources = result.map_err(|e| self.fail(Step::SelectSource, e))?;
        info!(count = sources.len(), "Fetched source networks");
        let banner = if sources.is_empty() {
            StepBanner::new(BannerKind::Empty, "No networks available")
        } else {
            StepBanner::new(
                BannerKind::Success,
                format!("Found {} source networks", sources.len()),
            )
        };
        self.state.sources = sources;
        self.state.source_network = None;
        self.state.source_token = None;
        self.state.clear_after_source();
        self.banners.insert(Step::SelectSource, banner);
        self.invalidated(Step::SelectSource);
        Ok(())
    }

    /// Picks one of the fetched sources.
    pub fn select_source(&mut self, network: &str, token: &str) -> Result<(), ApiError> {
        self.ensure_unlocked(Step::SelectSource)?;
        let known = find_network(&self.state.sources, network).map(|n| n.token(token).is_some());
        let message = match known {
            None => Some(format!("Unknown source network: {network}")),
            Some(false) => Some(format!("{network} has no token {token}")),
            Some(true) => None,
        };
        if let Some(message) = message {
            return Err(self.fail(Step::SelectSource, ApiError::validation(message)));
        }

        self.state.source_network = Some(network.to_string());
        self.state.source_token = Some(token.to_string());
        self.state.clear_after_source();
        self.banners.insert(
            Step::SelectSource,
            StepBanner::new(BannerKind::Success, format!("Source: {network} / {token}")),
        );
        self.invalidated(Step::SelectSource);
        info!(network, token, "Source selected");
        Ok(())
    }

    // Destination token, multiple-token mode only

    /// Lists tokens of the destination network reachable from the source.
    pub async fn get_destination_tokens(&mut self) -> Result<(), ApiError> {
        self.ensure_unlocked(Step::SelectDestinationToken)?;
        let (Some(source_network), Some(source_token), Some(destination_network)) = (
            self.state.source_network.clone(),
            self.state.source_token.clone(),
            self.state.destination_network.clone(),
        ) else {
            return Ok(());
        };

        self.loading.insert(Step::SelectDestinationToken);
        let result = self
            .client
            .get_destinations(&source_network, &source_token, Some(&destination_network))
            .await;
        self.loading.remove(&Step::SelectDestinationToken);

        let networks = result.map_err(|e| self.fail(Step::SelectDestinationToken, e))?;
        let tokens = find_network(&networks, &destination_network)
            .map(|n| n.tokens.clone())
            .unwrap_or_default();
        info!(count = tokens.len(), network = %destination_network, "Fetched destination tokens");

        let banner = if tokens.is_empty() {
            StepBanner::new(BannerKind::Empty, "No tokens available")
        } else {
            StepBanner::new(
                BannerKind::Success,
                format!("Found {} destination tokens", tokens.len()),
            )
        };
        self.state.destination_tokens = tokens;
        self.state.destination_token = None;
        self.state.clear_quote();
        self.banners.insert(Step::SelectDestinationToken, banner);
        self.invalidated(Step::SelectDestinationToken);
        Ok(())
    }

    /// Picks one of the fetched destination tokens.
    pub fn select_destination_token(&mut self, token: &str) -> Result<(), ApiError> {
        self.ensure_unlocked(Step::SelectDestinationToken)?;
        if !self.state.destination_tokens.iter().any(|t| t.symbol == token) {
            return Err(self.fail(
                Step::SelectDestinationToken,
                ApiError::validation(format!("Unknown destination token: {token}")),
            ));
        }

        self.state.destination_token = Some(token.to_string());
        self.state.clear_quote();
        self.banners.insert(
            Step::SelectDestinationToken,
            StepBanner::new(BannerKind::Success, format!("Destination token: {token}")),
        );
        self.invalidated(Step::SelectDestinationToken);
        info!(token, "Destination token selected");
        Ok(())
    }

    // Quote and swap

    /// Requests quotes for the selected route, replacing previous ones.
    pub async fn get_quote(&mut self) -> Result<(), ApiError> {
        self.ensure_unlocked(Step::Quote)?;
        if self.state.swap_id.is_some() {
            return Err(self.fail(
                Step::Quote,
                ApiError::validation("A swap already exists for this route; reset to start over"),
            ));
        }
        let Some(request) = self.state.route_request() else {
            return Ok(());
        };

        self.state.quote_routes.clear();
        self.loading.insert(Step::Quote);
        let result = self.client.get_quote(&request).await;
        self.loading.remove(&Step::Quote);

        let routes = result.map_err(|e| self.fail(Step::Quote, e))?;
        info!(count = routes.len(), "Fetched quote");
        let banner = if routes.is_empty() {
            StepBanner::new(BannerKind::Empty, "No routes available")
        } else {
            StepBanner::new(BannerKind::Success, format!("{} route(s) quoted", routes.len()))
        };
        self.state.quote_routes = routes;
        self.banners.insert(Step::Quote, banner);
        self.invalidated(Step::Quote);
        Ok(())
    }

    /// Creates the swap and stores its deposit address.
    pub async fn create_swap(&mut self) -> Result<(), ApiError> {
        self.ensure_unlocked(Step::CreateSwap)?;
        if let Some(id) = &self.state.swap_id {
            let message = format!("Swap {id} already created; reset to start over");
            return Err(self.fail(Step::CreateSwap, ApiError::validation(message)));
        }
        let Some(request) = self.state.route_request() else {
            return Ok(());
        };

        self.loading.insert(Step::CreateSwap);
        let result = self.client.create_swap(&request).await;
        self.loading.remove(&Step::CreateSwap);

        let created = result.map_err(|e| self.fail(Step::CreateSwap, e))?;
        let deposit_address = created.deposit_address().map(str::to_string);
        info!(
            swap_id = %created.swap.id,
            deposit_address = deposit_address.as_deref().unwrap_or("none"),
            "Swap created"
        );

        let message = match &deposit_address {
            Some(address) => format!("Swap {} created, deposit to {address}", created.swap.id),
            None => format!("Swap {} created without a deposit address", created.swap.id),
        };
        self.state.swap_id = Some(created.swap.id.clone());
        self.state.deposit_address = deposit_address;
        self.state.deposit_actions = created.deposit_actions;
        self.state.swap_status = Some(created.swap.status.clone());
        self.state.swap = Some(created.swap);
        self.banners
            .insert(Step::CreateSwap, StepBanner::new(BannerKind::Success, message));
        Ok(())
    }

    // Status

    /// Fetches the swap status once.
    pub async fn get_swap_status(&mut self) -> Result<&SwapStatus, ApiError> {
        self.ensure_unlocked(Step::TrackStatus)?;
        let swap_id = self.state.swap_id.clone().unwrap_or_default();

        self.loading.insert(Step::TrackStatus);
        let result = self.client.get_swap(&swap_id).await;
        self.loading.remove(&Step::TrackStatus);

        let swap = result.map_err(|e| self.fail(Step::TrackStatus, e))?;
        self.apply_swap(swap);
        self.state
            .swap_status
            .as_ref()
            .ok_or_else(|| ApiError::validation("Swap status is unknown"))
    }

    /// Starts polling if idle, stops it otherwise. Returns whether polling
    /// is now active.
    pub fn toggle_status_polling(&mut self) -> Result<bool, ApiError> {
        if self.is_polling() {
            self.stop_status_polling();
            Ok(false)
        } else {
            self.start_status_polling()?;
            Ok(true)
        }
    }

    /// Starts polling the created swap. No-op if already polling.
    pub fn start_status_polling(&mut self) -> Result<(), ApiError> {
        self.ensure_unlocked(Step::TrackStatus)?;
        if self.is_polling() {
            return Ok(());
        }
        let swap_id = self.state.swap_id.clone().unwrap_or_default();
        let (updates, handle) = poll::start(
            self.client.clone(),
            swap_id,
            self.poll_config,
            tokio::time::sleep,
        );
        self.updates = Some(updates);
        self.poller = Some(handle);
        self.banners.insert(
            Step::TrackStatus,
            StepBanner::new(BannerKind::Info, "Polling swap status"),
        );
        Ok(())
    }

    /// Stops polling. Safe to call when not polling.
    pub fn stop_status_polling(&mut self) {
        if let Some(mut handle) = self.poller.take() {
            handle.stop();
        }
        self.updates = None;
    }

    /// Waits for the next poll result and applies it.
    ///
    /// Returns `None` when not polling. A terminal status stops the poller.
    pub async fn next_status_update(&mut self) -> Option<PollUpdate> {
        let updates = self.updates.as_mut()?;
        let Some(update) = updates.recv().await else {
            self.stop_status_polling();
            return None;
        };

        match &update.result {
            Ok(swap) => self.apply_swap(swap.clone()),
            Err(e) => {
                warn!(attempt = update.attempt, %e, "Status poll failed");
                self.banners.insert(
                    Step::TrackStatus,
                    StepBanner::new(BannerKind::Error, format!("Status check failed: {e}")),
                );
            }
        }
        if update.is_terminal() {
            self.stop_status_polling();
        }
        Some(update)
    }

    // Lifecycle

    /// Starts over, keeping wallet address, API key and token mode.
    pub fn reset(&mut self) {
        self.stop_status_polling();
        self.state = WizardState {
            wallet_address: std::mem::take(&mut self.state.wallet_address),
            api_key: self.state.api_key.take(),
            token_mode: self.state.token_mode,
            ..Default::default()
        };
        self.banners.clear();
        self.loading.clear();
        info!("Walkthrough reset");
    }

    /// Stops background work. Dropping the flow does the same.
    pub fn dispose(&mut self) {
        self.stop_status_polling();
    }

    fn apply_swap(&mut self, swap: Swap) {
        if self.state.swap_id.as_deref() != Some(swap.id.as_str()) {
            warn!(swap_id = %swap.id, "Ignoring status of a different swap");
            return;
        }
        let banner = match &swap.status {
            SwapStatus::Completed => StepBanner::new(BannerKind::Success, "Swap completed"),
            status if status.is_terminal() => {
                StepBanner::new(BannerKind::Error, format!("Swap {status}"))
            }
            status => StepBanner::new(BannerKind::Info, format!("Status: {status}")),
        };
        if swap.status.is_terminal() {
            info!(swap_id = %swap.id, status = %swap.status, "Swap reached terminal status");
        }
        self.state.swap_status = Some(swap.status.clone());
        self.state.swap = Some(swap);
        self.banners.insert(Step::TrackStatus, banner);
    }

    fn ensure_unlocked(&mut self, step: Step) -> Result<(), ApiError> {
        match step::missing_prerequisite(&self.state, step) {
            Some(missing) => Err(self.fail(step, ApiError::validation(missing))),
            None => Ok(()),
        }
    }

    fn fail(&mut self, step: Step, err: ApiError) -> ApiError {
        self.banners
            .insert(step, StepBanner::new(BannerKind::Error, err.to_string()));
        err
    }

    /// Drops banners of steps after `step` and stops a poller whose swap
    /// was cleared.
    fn invalidated(&mut self, step: Step) {
        self.banners.retain(|s, _| *s <= step);
        if self.state.swap_id.is_none() {
            self.stop_status_polling();
        }
    }
}
