use std::fmt;

use super::state::{TokenMode, WizardState};

/// A wizard step, in walkthrough order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Step {
    Config,
    SelectSource,
    /// Only present in [`TokenMode::Multiple`].
    SelectDestinationToken,
    Quote,
    CreateSwap,
    TrackStatus,
}

const SINGLE_TOKEN_STEPS: &[Step] = &[
    Step::Config,
    Step::SelectSource,
    Step::Quote,
    Step::CreateSwap,
    Step::TrackStatus,
];

const MULTIPLE_TOKEN_STEPS: &[Step] = &[
    Step::Config,
    Step::SelectSource,
    Step::SelectDestinationToken,
    Step::Quote,
    Step::CreateSwap,
    Step::TrackStatus,
];

impl Step {
    /// Steps present in the given mode, in order.
    pub fn sequence(mode: TokenMode) -> &'static [Step] {
        match mode {
            TokenMode::Single => SINGLE_TOKEN_STEPS,
            TokenMode::Multiple => MULTIPLE_TOKEN_STEPS,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Config => "Configure wallet and destination",
            Self::SelectSource => "Select source network",
            Self::SelectDestinationToken => "Select destination token",
            Self::Quote => "Get quote",
            Self::CreateSwap => "Create swap",
            Self::TrackStatus => "Track status",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Derived view of one step. Never stored, always recomputed from
/// [`WizardState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepDescriptor {
    pub step: Step,
    /// 1-based position among the steps of the current mode.
    pub order: usize,
    pub locked: bool,
    pub completed: bool,
}

/// What is missing before `step` can run, or `None` if it is unlocked.
pub fn missing_prerequisite(state: &WizardState, step: Step) -> Option<&'static str> {
    match step {
        Step::Config => None,
        Step::SelectSource => missing_config(state),
        Step::SelectDestinationToken => {
            if state.token_mode == TokenMode::Single {
                return Some("Destination token is chosen with the destination in single-token mode");
            }
            missing_config(state).or_else(|| missing_source(state))
        }
        Step::Quote => missing_config(state)
            .or_else(|| missing_source(state))
            .or_else(|| {
                state
                    .destination_token
                    .is_none()
                    .then_some("Select a destination token")
            }),
        Step::CreateSwap => missing_prerequisite(state, Step::Quote).or_else(|| {
            state
                .quote_routes
                .is_empty()
                .then_some("Request a quote first")
        }),
        Step::TrackStatus => state.swap_id.is_none().then_some("Create a swap first"),
    }
}

fn missing_config(state: &WizardState) -> Option<&'static str> {
    if !state.has_wallet() {
        Some("Wallet address is required")
    } else if state.destination_network.is_none() {
        Some("Select a destination network")
    } else if state.token_mode == TokenMode::Single && state.destination_token.is_none() {
        Some("Select a destination token")
    } else {
        None
    }
}

fn missing_source(state: &WizardState) -> Option<&'static str> {
    (!state.has_source()).then_some("Select a source network and token")
}

pub fn is_locked(state: &WizardState, step: Step) -> bool {
    missing_prerequisite(state, step).is_some()
}

/// A locked step is never completed.
pub fn is_completed(state: &WizardState, step: Step) -> bool {
    if is_locked(state, step) {
        return false;
    }
    match step {
        Step::Config => missing_config(state).is_none(),
        Step::SelectSource => state.has_source(),
        Step::SelectDestinationToken => state.destination_token.is_some(),
        Step::Quote => !state.quote_routes.is_empty(),
        Step::CreateSwap => state.swap_id.is_some(),
        Step::TrackStatus => state.swap_status.as_ref().is_some_and(|s| s.is_terminal()),
    }
}

pub fn describe(state: &WizardState) -> Vec<StepDescriptor> {
    Step::sequence(state.token_mode)
        .iter()
        .enumerate()
        .map(|(i, &step)| StepDescriptor {
            step,
            order: i + 1,
            locked: is_locked(state, step),
            completed: is_completed(state, step),
        })
        .collect()
}

/// Outcome of a step's last action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BannerKind {
    Info,
    Success,
    /// The call succeeded but returned nothing to choose from.
    Empty,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepBanner {
    pub kind: BannerKind,
    pub message: String,
}

impl StepBanner {
    pub fn new(kind: BannerKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for StepBanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.kind {
            BannerKind::Info => "info",
            BannerKind::Success => "ok",
            BannerKind::Empty => "empty",
            BannerKind::Error => "error",
        };
        write!(f, "[{tag}] {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SwapStatus;

    fn configured(mode: TokenMode) -> WizardState {
        WizardState {
            wallet_address: "0xabc".to_string(),
            token_mode: mode,
            destination_network: Some("BASE_MAINNET".to_string()),
            destination_token: (mode == TokenMode::Single).then(|| "ETH".to_string()),
            ..Default::default()
        }
    }

    fn locked_steps(state: &WizardState) -> Vec<Step> {
        describe(state)
            .into_iter()
            .filter(|d| d.locked)
            .map(|d| d.step)
            .collect()
    }

    #[test]
    fn test_fresh_state_only_config_unlocked() {
        let state = WizardState::default();
        let steps = describe(&state);

        assert_eq!(steps.len(), 5);
        assert!(!steps[0].locked);
        assert!(!steps[0].completed);
        assert!(steps[1..].iter().all(|d| d.locked && !d.completed));
    }

    #[test]
    fn test_order_counts_present_steps_only() {
        let single = describe(&configured(TokenMode::Single));
        assert_eq!(single[2].step, Step::Quote);
        assert_eq!(single[2].order, 3);

        let multiple = describe(&configured(TokenMode::Multiple));
        assert_eq!(multiple[2].step, Step::SelectDestinationToken);
        assert_eq!(multiple[3].step, Step::Quote);
        assert_eq!(multiple[3].order, 4);
    }

    #[test]
    fn test_config_completion_per_mode() {
        let state = configured(TokenMode::Single);
        assert!(is_completed(&state, Step::Config));
        assert_eq!(
            locked_steps(&state),
            vec![Step::Quote, Step::CreateSwap, Step::TrackStatus]
        );

        let mut state = configured(TokenMode::Single);
        state.destination_token = None;
        assert!(!is_completed(&state, Step::Config));
        assert_eq!(
            missing_prerequisite(&state, Step::SelectSource),
            Some("Select a destination token")
        );

        // Multiple mode does not need the token up front
        let state = configured(TokenMode::Multiple);
        assert!(is_completed(&state, Step::Config));
        assert!(!is_locked(&state, Step::SelectSource));
    }

    #[test]
    fn test_blank_wallet_locks_everything_after_config() {
        let mut state = configured(TokenMode::Single);
        state.wallet_address = "   ".to_string();
        state.source_network = Some("ETHEREUM_MAINNET".to_string());
        state.source_token = Some("ETH".to_string());

        assert_eq!(
            locked_steps(&state),
            vec![
                Step::SelectSource,
                Step::Quote,
                Step::CreateSwap,
                Step::TrackStatus
            ]
        );
        assert_eq!(
            missing_prerequisite(&state, Step::Quote),
            Some("Wallet address is required")
        );
    }

    #[test]
    fn test_quote_needs_destination_token_in_multiple_mode() {
        let mut state = configured(TokenMode::Multiple);
        state.source_network = Some("ETHEREUM_MAINNET".to_string());
        state.source_token = Some("USDC".to_string());

        assert!(!is_locked(&state, Step::SelectDestinationToken));
        assert!(!is_completed(&state, Step::SelectDestinationToken));
        assert_eq!(
            missing_prerequisite(&state, Step::Quote),
            Some("Select a destination token")
        );

        state.destination_token = Some("USDC".to_string());
        assert!(is_completed(&state, Step::SelectDestinationToken));
        assert!(!is_locked(&state, Step::Quote));
    }

    #[test]
    fn test_destination_token_step_locked_in_single_mode() {
        let state = configured(TokenMode::Single);
        assert!(is_locked(&state, Step::SelectDestinationToken));
        assert!(!is_completed(&state, Step::SelectDestinationToken));
    }

    #[test]
    fn test_create_swap_needs_routes() {
        let mut state = configured(TokenMode::Single);
        state.source_network = Some("ETHEREUM_MAINNET".to_string());
        state.source_token = Some("ETH".to_string());

        assert!(!is_locked(&state, Step::Quote));
        assert_eq!(
            missing_prerequisite(&state, Step::CreateSwap),
            Some("Request a quote first")
        );

        state.quote_routes = vec![serde_json::from_str("{}").unwrap()];
        assert!(is_completed(&state, Step::Quote));
        assert!(!is_locked(&state, Step::CreateSwap));
        assert!(!is_completed(&state, Step::CreateSwap));
    }

    #[test]
    fn test_track_status_completion_needs_terminal_status() {
        let mut state = configured(TokenMode::Single);
        assert!(is_locked(&state, Step::TrackStatus));

        state.swap_id = Some("swap_123".to_string());
        assert!(!is_locked(&state, Step::TrackStatus));

        state.swap_status = Some(SwapStatus::LsTransferPending);
        assert!(!is_completed(&state, Step::TrackStatus));

        state.swap_status = Some(SwapStatus::Failed);
        assert!(is_completed(&state, Step::TrackStatus));
    }

    #[test]
    fn test_banner_display() {
        let banner = StepBanner::new(BannerKind::Empty, "No networks available");
        assert_eq!(banner.to_string(), "[empty] No networks available");
    }
}
