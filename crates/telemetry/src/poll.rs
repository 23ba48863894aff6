//! Recurring refresh tied to a view's active lifetime.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Handed to every refresh. Check it before writing results back: once
/// the view is torn down, late results must be dropped.
#[derive(Clone, Debug)]
pub struct Lifetime(CancellationToken);

impl Lifetime {
    pub fn is_active(&self) -> bool {
        !self.0.is_cancelled()
    }
}

/// Owns the timer of one polling view. Cancelling is idempotent and
/// dropping the handle cancels too.
#[derive(Debug)]
pub struct PollHandle {
    name: &'static str,
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn cancel(&self) {
        if !self.token.is_cancelled() {
            info!(view = self.name, "poll: cancelled");
        }
        self.token.cancel();
    }

    /// Cancels and waits for the timer task to exit. In-flight refreshes
    /// are not awaited.
    pub async fn shutdown(mut self) {
        self.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(view = self.name, error = %e, "poll: timer task failed");
            }
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Runs `refresh` now and then every `every` until the handle is cancelled.
///
/// Each refresh is spawned on its own, so a slow one never delays the
/// next tick; overlapping refreshes are expected.
pub fn spawn_polling<F, Fut>(name: &'static str, every: Duration, refresh: F) -> PollHandle
where
    F: Fn(Lifetime) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let token = CancellationToken::new();
    let timer_token = token.clone();

    let task = tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut cycle: u64 = 0;

        info!(view = name, every_secs = every.as_secs(), "poll: started");
        loop {
            tokio::select! {
                biased;
                _ = timer_token.cancelled() => break,
                _ = ticker.tick() => {
                    cycle += 1;
                    debug!(view = name, cycle, "poll: refresh");
                    tokio::spawn(refresh(Lifetime(timer_token.child_token())));
                }
            }
        }
        debug!(view = name, cycles = cycle, "poll: timer exited");
    });

    PollHandle {
        name,
        token,
        task: Some(task),
    }
}
