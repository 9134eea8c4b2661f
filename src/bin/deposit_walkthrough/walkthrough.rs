//! Step-by-step run of the deposit flow.
//!
//! Each step prints the outcome reported by the flow, then the next step
//! runs with the first (or requested) option picked automatically.

use deposit_sdk::{
    flow::{DepositFlow, Step, TokenMode},
    types::{Network, QuoteRoute},
};
use itertools::Itertools;
use tracing::{debug, info, warn};

use crate::{
    config::WalkthroughConfig,
    error::{Error, Result},
};

#[derive(Debug)]
pub struct Walkthrough {
    flow: DepositFlow,
    config: WalkthroughConfig,
}

impl Walkthrough {
    pub fn new(flow: DepositFlow, config: WalkthroughConfig) -> Self {
        let flow = flow.with_poll_config(config.poll);
        Self { flow, config }
    }

    /// Runs every step, then prints the recorded API calls whether the run
    /// succeeded or not.
    pub async fn run(&mut self, api_key: Option<&str>) -> Result<()> {
        let result = self.run_steps(api_key).await;
        self.print_activity();
        self.flow.dispose();
        result
    }

    async fn run_steps(&mut self, api_key: Option<&str>) -> Result<()> {
        self.configure(api_key)?;
        self.select_source().await?;
        if self.config.token_mode == TokenMode::Multiple {
            self.select_destination_token().await?;
        }
        self.quote().await?;
        self.create_swap().await?;
        if self.config.track {
            self.track().await?;
        }
        self.print_steps();
        Ok(())
    }

    fn configure(&mut self, api_key: Option<&str>) -> Result<()> {
        if let Some(api_key) = api_key {
            self.flow.set_api_key(api_key)?;
        }
        self.flow.set_wallet_address(&self.config.wallet_address);
        self.flow.set_token_mode(self.config.token_mode);
        self.flow.select_destination(
            &self.config.destination_network,
            match self.config.token_mode {
                TokenMode::Single => self.config.destination_token.as_deref(),
                TokenMode::Multiple => None,
            },
        )?;
        info!(
            wallet_address = %self.config.wallet_address,
            destination_network = %self.config.destination_network,
            mode = %self.config.token_mode,
            "Walkthrough configured"
        );
        self.print_steps();
        Ok(())
    }

    async fn select_source(&mut self) -> Result<()> {
        self.heading(Step::SelectSource);
        self.flow.get_sources().await?;
        self.print_banner(Step::SelectSource);

        let sources = self.flow.state().sources();
        if sources.is_empty() {
            return Err(Error::NoSources);
        }
        for network in sources {
            println!(
                "  {} ({}): {}",
                network.label(),
                network.name,
                network.tokens.iter().map(|t| &t.symbol).join(", ")
            );
        }

        let (network, token) = pick_source(
            sources,
            self.config.source_network.as_deref(),
            self.config.source_token.as_deref(),
        )
        .ok_or_else(|| {
            Error::SourceNotFound(format!(
                "{}/{}",
                self.config.source_network.as_deref().unwrap_or("*"),
                self.config.source_token.as_deref().unwrap_or("*")
            ))
        })?;
        self.flow.select_source(&network, &token)?;
        self.print_banner(Step::SelectSource);
        Ok(())
    }

    async fn select_destination_token(&mut self) -> Result<()> {
        self.heading(Step::SelectDestinationToken);
        self.flow.get_destination_tokens().await?;
        self.print_banner(Step::SelectDestinationToken);

        let tokens = self.flow.state().destination_tokens();
        let token = match self.config.destination_token.as_deref() {
            Some(wanted) => tokens.iter().find(|t| t.symbol == wanted),
            None => tokens.first(),
        }
        .map(|t| t.symbol.clone())
        .ok_or(Error::NoDestinationTokens)?;

        self.flow.select_destination_token(&token)?;
        self.print_banner(Step::SelectDestinationToken);
        Ok(())
    }

    async fn quote(&mut self) -> Result<()> {
        self.heading(Step::Quote);
        self.flow.get_quote().await?;
        self.print_banner(Step::Quote);

        let routes = self.flow.state().quote_routes();
        if routes.is_empty() {
            return Err(Error::NoRoutes);
        }
        for (i, route) in routes.iter().enumerate() {
            println!("  route {}: {}", i + 1, describe_route(route));
        }
        Ok(())
    }

    async fn create_swap(&mut self) -> Result<()> {
        self.heading(Step::CreateSwap);
        self.flow.create_swap().await?;
        self.print_banner(Step::CreateSwap);

        let state = self.flow.state();
        println!("  swap id:         {}", state.swap_id().unwrap_or("-"));
        println!("  deposit address: {}", state.deposit_address().unwrap_or("-"));
        for action in state.deposit_actions() {
            println!(
                "  deposit {} {} on {} to {}",
                opt(action.amount.as_ref()),
                action.token.as_deref().unwrap_or("?"),
                action.network.as_deref().unwrap_or("?"),
                action.to_address
            );
        }
        Ok(())
    }

    async fn track(&mut self) -> Result<()> {
        self.heading(Step::TrackStatus);
        self.flow.start_status_polling()?;

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                update = self.flow.next_status_update() => {
                    let Some(update) = update else {
                        warn!("Status poller ended without a terminal status");
                        return Err(Error::PollingEnded);
                    };
                    match &update.result {
                        Ok(swap) => {
                            let hashes = swap.tx_hashes();
                            if hashes.is_empty() {
                                println!("  #{} {}", update.attempt, swap.status);
                            } else {
                                println!("  #{} {} (tx: {hashes})", update.attempt, swap.status);
                            }
                        }
                        Err(e) => println!("  #{} status check failed: {e}", update.attempt),
                    }
                    if update.is_terminal() {
                        self.print_banner(Step::TrackStatus);
                        return Ok(());
                    }
                    debug!(countdown = ?self.flow.countdown(), "Waiting for next status check");
                }
                _ = &mut ctrl_c => {
                    info!("Interrupted, stopping status polling");
                    self.flow.stop_status_polling();
                    return Ok(());
                }
            }
        }
    }

    fn heading(&self, step: Step) {
        if let Some(d) = self.flow.step(step) {
            println!("\n{}. {}", d.order, d.step);
        }
    }

    fn print_banner(&self, step: Step) {
        if let Some(banner) = self.flow.banner(step) {
            println!("  {banner}");
        }
    }

    fn print_steps(&self) {
        println!("\nSteps:");
        for d in self.flow.steps() {
            let marker = match (d.completed, d.locked) {
                (true, _) => "done",
                (false, true) => "locked",
                (false, false) => "open",
            };
            println!("  {}. {:<34} [{marker}]", d.order, d.step.title());
        }
    }

    fn print_activity(&self) {
        let activity = self.flow.activity();
        if activity.is_empty() {
            return;
        }
        println!("\nAPI activity (most recent first):");
        for entry in &activity {
            let status = entry
                .http_status
                .map_or_else(|| "no response".to_string(), |s| s.to_string());
            println!(
                "  #{} {} {} {} -> {status}",
                entry.id, entry.label, entry.method, entry.url
            );
            if let Some(error) = &entry.error {
                println!("     failed: {error}");
            }
            if self.config.show_curl {
                println!("{}\n", entry.curl);
            }
        }
    }
}

/// First source matching the requested network and token, either of which
/// may be left open.
fn pick_source(
    sources: &[Network],
    network: Option<&str>,
    token: Option<&str>,
) -> Option<(String, String)> {
    sources
        .iter()
        .filter(|n| network.is_none_or(|name| n.name == name))
        .find_map(|n| {
            n.tokens
                .iter()
                .find(|t| token.is_none_or(|symbol| t.symbol == symbol))
                .map(|t| (n.name.clone(), t.symbol.clone()))
        })
}

fn describe_route(route: &QuoteRoute) -> String {
    let eta = route
        .completion_time()
        .map_or_else(|| "-".to_string(), |d| format!("{}s", d.as_secs()));
    format!(
        "min {} max {} fee {} (${}) eta {eta}",
        opt(route.min_amount.as_ref()),
        opt(route.max_amount.as_ref()),
        opt(route.total_fee.as_ref()),
        opt(route.total_fee_in_usd.as_ref()),
    )
}

fn opt<T: std::fmt::Display>(value: Option<&T>) -> String {
    value.map_or_else(|| "-".to_string(), ToString::to_string)
}
