//! Payment-confirmation polling.
//!
//! After the backend is armed and the QR is displayed, a single task polls
//! the confirmation endpoint at a fixed cadence. Each tick awaits its
//! response before the next is scheduled, so at most one request is in
//! flight. The loop stops immediately on confirmation or on reaching the
//! ceiling; no request is issued after either terminal condition.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::{Instant, sleep};
use tracing::{info, warn};

use candleworks_core::PaymentOutcome;

use crate::api::{ApiClient, orders::PaymentStatus};
use crate::cart::CartStore;
use crate::session::timers::ScheduledTask;

/// Poll cadence. The defaults are the contract; tests tighten them.
#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    /// Time between polls.
    pub interval: Duration,
    /// Total time before the poll gives up.
    pub ceiling: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            ceiling: Duration::from_secs(300),
        }
    }
}

/// A running confirmation poll, owned by a cancellable handle.
///
/// Dropping the handle aborts the poll task.
pub struct PaymentPoll {
    task: ScheduledTask,
    outcome_rx: oneshot::Receiver<PaymentOutcome>,
}

impl PaymentPoll {
    /// Spawn the poll task. On confirmation it clears the cart before
    /// reporting [`PaymentOutcome::Confirmed`].
    pub(crate) fn spawn(
        api: ApiClient,
        cart: CartStore,
        reference: String,
        settings: PollSettings,
    ) -> Self {
        let (outcome_tx, outcome_rx) = oneshot::channel();
        let task = ScheduledTask::spawn(async move {
            let outcome = run(api, cart, &reference, settings).await;
            let _ = outcome_tx.send(outcome);
        });
        Self { task, outcome_rx }
    }

    /// Wait for the terminal outcome. Returns `None` if the poll was
    /// cancelled before reaching one.
    pub async fn outcome(self) -> Option<PaymentOutcome> {
        self.outcome_rx.await.ok()
    }

    /// Stop polling. Idempotent; no request is issued after cancellation.
    pub fn cancel(&self) {
        self.task.cancel();
    }
}

async fn run(
    api: ApiClient,
    cart: CartStore,
    reference: &str,
    settings: PollSettings,
) -> PaymentOutcome {
    let deadline = Instant::now() + settings.ceiling;
    loop {
        sleep(settings.interval).await;

        // Ceiling check before the next request: at the ceiling the dialog
        // times out without another poll.
        if Instant::now() >= deadline {
            warn!(reference, "Payment confirmation timed out");
            return PaymentOutcome::TimedOut;
        }

        match api.poll_payment_confirmation(reference).await {
            Ok(PaymentStatus::Success) => {
                info!(reference, "Payment confirmed; clearing cart");
                cart.clear().await;
                return PaymentOutcome::Confirmed;
            }
            Ok(PaymentStatus::Pending) => {}
            // A failed poll counts as "still pending": the ceiling bounds
            // how long we keep trying.
            Err(e) => warn!(reference, error = %e, "Payment confirmation poll failed"),
        }
    }
}
