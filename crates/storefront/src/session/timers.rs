//! Cancellable timer tasks backing the session lifecycle.
//!
//! Both logout timers are spawned tasks owned by a single handle.
//! Cancellation is idempotent, and dropping a handle aborts its task, so a
//! timer can never outlive the session that armed it.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep, sleep_until};

/// Owning handle for a spawned timer task.
///
/// `cancel` is idempotent; dropping the handle also aborts the task.
#[derive(Debug)]
pub struct ScheduledTask {
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Spawn a future as an owned, cancellable task.
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(future),
        }
    }

    /// Abort the task. Safe to call more than once, or after completion.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    /// Whether the task has run to completion or been aborted.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Idle logout timer.
///
/// Fires `on_expire` exactly once if no activity is recorded within
/// `timeout`; every recorded activity pushes the deadline back.
#[derive(Debug)]
pub struct IdleTimer {
    task: ScheduledTask,
    activity_tx: mpsc::UnboundedSender<()>,
}

impl IdleTimer {
    /// Arm the timer.
    pub fn start<F>(timeout: Duration, on_expire: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let (activity_tx, mut activity_rx) = mpsc::unbounded_channel::<()>();
        let task = ScheduledTask::spawn(async move {
            let mut on_expire = Some(on_expire);
            let mut deadline = Instant::now() + timeout;
            loop {
                tokio::select! {
                    () = sleep_until(deadline) => {
                        if let Some(expire) = on_expire.take() {
                            expire();
                        }
                        break;
                    }
                    activity = activity_rx.recv() => match activity {
                        Some(()) => deadline = Instant::now() + timeout,
                        // Sender dropped: the timer is being torn down.
                        None => break,
                    },
                }
            }
        });
        Self { task, activity_tx }
    }

    /// Push the idle deadline back by the full timeout.
    pub fn record_activity(&self) {
        let _ = self.activity_tx.send(());
    }

    /// Disarm the timer. Idempotent.
    pub fn cancel(&self) {
        self.task.cancel();
    }
}

/// Hard session timer: fires once at `timeout` after arming, regardless of
/// activity, unless cancelled first.
pub fn hard_timer<F>(timeout: Duration, on_expire: F) -> ScheduledTask
where
    F: FnOnce() + Send + 'static,
{
    ScheduledTask::spawn(async move {
        sleep(timeout).await;
        on_expire();
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let fired = count.clone();
        (count, move || {
            fired.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn idle_timer_fires_once_without_activity() {
        let (count, on_expire) = counter();
        let _timer = IdleTimer::start(Duration::from_secs(15), on_expire);

        tokio::time::sleep(Duration::from_secs(16)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // No double fire later.
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_timer_never_fires_with_activity_inside_timeout() {
        let (count, on_expire) = counter();
        let timer = IdleTimer::start(Duration::from_secs(15), on_expire);

        for _ in 0..5 {
            tokio::time::sleep(Duration::from_secs(10)).await;
            timer.record_activity();
            // Let the timer task observe the activity before sleeping again.
            tokio::task::yield_now().await;
        }
        assert_eq!(count.load(Ordering::SeqCst), 0);

        // Deadline still applies once activity stops.
        tokio::time::sleep(Duration::from_secs(16)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_timer_cancel_prevents_fire() {
        let (count, on_expire) = counter();
        let timer = IdleTimer::start(Duration::from_secs(15), on_expire);

        tokio::time::sleep(Duration::from_secs(10)).await;
        timer.cancel();
        timer.cancel(); // idempotent

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn hard_timer_ignores_nothing_and_fires_once() {
        let (count, on_expire) = counter();
        let _task = hard_timer(Duration::from_secs(120), on_expire);

        tokio::time::sleep(Duration::from_secs(119)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn hard_timer_cancelled_by_drop() {
        let (count, on_expire) = counter();
        let task = hard_timer(Duration::from_secs(120), on_expire);

        tokio::time::sleep(Duration::from_secs(60)).await;
        drop(task);

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
