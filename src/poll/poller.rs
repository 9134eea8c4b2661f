use std::time::Duration;

use futures::{Stream, StreamExt, stream as futures_stream};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use super::types::{PollConfig, PollHandle, PollUpdate, StatusReceiver};
use crate::{
    ApiClient,
    error::ApiError,
    types::{Swap, SwapId},
};

const DEFAULT_CHANNEL_SIZE: usize = 16;

/// Source of swap snapshots for the poller.
pub trait SwapSource {
    fn get_swap(&self, swap_id: &str) -> impl Future<Output = Result<Swap, ApiError>> + Send;
}

impl SwapSource for ApiClient {
    fn get_swap(&self, swap_id: &str) -> impl Future<Output = Result<Swap, ApiError>> + Send {
        ApiClient::get_swap(self, swap_id)
    }
}

struct PollState<S, Sl> {
    source: S,
    swap_id: SwapId,
    config: PollConfig,
    countdown: watch::Sender<Duration>,
    sleep: Sl,
    attempt: u32,
    finished: bool,
}

/// Returns a stream of status updates for the given swap.
///
/// The first fetch happens immediately, following ones `config.interval`
/// after the previous fetch completed. While waiting, `countdown` is
/// decremented every `config.tick`; it is reset to the full interval after
/// every fetch, failed or not.
///
/// The stream ends right after yielding a terminal status.
pub fn stream<S, Sl, SlFut>(
    source: S,
    swap_id: SwapId,
    config: PollConfig,
    countdown: watch::Sender<Duration>,
    sleep: Sl,
) -> impl Stream<Item = PollUpdate>
where
    S: SwapSource,
    Sl: Fn(Duration) -> SlFut + Copy,
    SlFut: Future<Output = ()>,
{
    let state = PollState {
        source,
        swap_id,
        config,
        countdown,
        sleep,
        attempt: 0,
        finished: false,
    };
    futures_stream::unfold(state, |mut state| async move {
        if state.finished {
            return None;
        }

        if state.attempt > 0 {
            let ticks = state.config.ticks();
            let tick = state.config.interval / ticks;
            for remaining in (0..ticks).rev() {
                (state.sleep)(tick).await;
                state.countdown.send_replace(tick * remaining);
            }
        }

        state.attempt += 1;
        debug!(swap_id = %state.swap_id, attempt = state.attempt, "Fetching swap status");
        let result = state.source.get_swap(&state.swap_id).await;

        match &result {
            Ok(swap) => debug!(swap_id = %state.swap_id, status = %swap.status, "Swap status"),
            Err(e) => warn!(swap_id = %state.swap_id, %e, "Swap status fetch failed, will retry"),
        }

        let update = PollUpdate {
            attempt: state.attempt,
            result,
        };
        state.finished = update.is_terminal();
        state.countdown.send_replace(if state.finished {
            Duration::ZERO
        } else {
            state.config.interval
        });

        Some((update, state))
    })
}

/// Start polling the given swap on a background task.
///
/// Returns a receiver for updates and a handle that stops the poller when
/// [`PollHandle::stop`] is called or the handle is dropped.
pub fn start<S, Sl, SlFut>(
    source: S,
    swap_id: SwapId,
    config: PollConfig,
    sleep: Sl,
) -> (StatusReceiver, PollHandle)
where
    S: SwapSource + Send + Sync + 'static,
    Sl: Fn(Duration) -> SlFut + Copy + Send + 'static,
    SlFut: Future<Output = ()> + Send,
{
    let (tx, rx) = mpsc::channel(DEFAULT_CHANNEL_SIZE);
    let (countdown_tx, countdown_rx) = watch::channel(Duration::ZERO);

    info!(%swap_id, interval = ?config.interval, "Starting status poller");
    let task = tokio::spawn(async move {
        let updates = stream(source, swap_id, config, countdown_tx, sleep);
        futures::pin_mut!(updates);

        while let Some(update) = updates.next().await {
            let terminal = update.is_terminal();
            if tx.send(update).await.is_err() {
                // Receiver dropped, nobody is listening
                break;
            }
            if terminal {
                info!("Swap reached terminal status, status poller stopped");
            }
        }
    });

    (StatusReceiver::new(rx), PollHandle::new(task, countdown_rx))
}
