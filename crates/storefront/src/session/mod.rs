//! Session lifecycle management.
//!
//! Owns the single authoritative authentication state and enforces the two
//! expiry policies: an idle timeout reset by user activity, and a hard
//! timeout bounding total session lifetime regardless of activity.
//!
//! State machine: `Unchecked → Checking → {Authenticated, Unauthenticated}`.
//! From `Authenticated`, the session ends on idle-timer fire, hard-timer
//! fire, explicit logout, or a failed silent probe - and the consumer learns
//! which via [`LogoutReason`] on the published snapshot.

pub mod timers;

use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{info, warn};

use candleworks_core::{LogoutReason, SessionState};

use crate::api::{ApiClient, ApiError};
use timers::{IdleTimer, ScheduledTask, hard_timer};

/// Published view of the session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    pub state: SessionState,
    /// When the last probe or login resolved.
    pub checked_at: Option<DateTime<Utc>>,
    /// Why the last session ended, if one did.
    pub ended: Option<LogoutReason>,
}

#[derive(Default)]
struct Timers {
    idle: Option<IdleTimer>,
    hard: Option<ScheduledTask>,
}

struct SessionInner {
    api: ApiClient,
    idle_timeout: Duration,
    hard_timeout: Duration,
    state_tx: watch::Sender<SessionSnapshot>,
    timers: Mutex<Timers>,
}

/// Owns authentication state and the logout timers.
///
/// Cheap to clone; all clones share one session. Consumers subscribe for
/// change notification instead of reading ambient global state.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionInner>,
}

impl SessionManager {
    /// Create an unchecked session manager.
    #[must_use]
    pub fn new(api: ApiClient, idle_timeout: Duration, hard_timeout: Duration) -> Self {
        let (state_tx, _) = watch::channel(SessionSnapshot::default());
        Self {
            inner: Arc::new(SessionInner {
                api,
                idle_timeout,
                hard_timeout,
                state_tx,
                timers: Mutex::new(Timers::default()),
            }),
        }
    }

    /// Subscribe to session state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.state_tx.subscribe()
    }

    /// Current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.state_tx.borrow().clone()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.inner.state_tx.borrow().state
    }

    /// Run the one-time silent auth probe.
    ///
    /// Must resolve before any protected view renders. Any failure - network
    /// error or non-2xx - is treated identically to "not logged in"; the
    /// manager never rests in `Checking`.
    pub async fn start(&self) -> SessionState {
        self.inner.state_tx.send_modify(|snap| {
            snap.state = SessionState::Checking;
        });

        match self.inner.api.probe_session().await {
            Ok(()) => {
                info!("Session probe succeeded");
                self.on_authenticated();
            }
            Err(e) => {
                warn!(error = %e, "Session probe failed; treating as logged out");
                self.inner.state_tx.send_modify(|snap| {
                    snap.state = SessionState::Unauthenticated;
                    snap.checked_at = Some(Utc::now());
                });
            }
        }
        self.state()
    }

    /// Exchange credentials for an authenticated session.
    ///
    /// On success, both logout timers are armed fresh.
    ///
    /// # Errors
    ///
    /// Returns the API error on failure; state stays unauthenticated.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        self.inner.api.login(username, password).await?;
        info!(username, "Login succeeded");
        self.on_authenticated();
        Ok(())
    }

    /// Record a qualifying user-activity event, pushing back the idle
    /// deadline. No-op outside an authenticated session.
    pub fn record_activity(&self) {
        if self.state() != SessionState::Authenticated {
            return;
        }
        if let Ok(timers) = self.inner.timers.lock()
            && let Some(idle) = timers.idle.as_ref()
        {
            idle.record_activity();
        }
    }

    /// Explicit logout: best-effort backend notification, then an
    /// unconditional local clear.
    pub async fn logout(&self) {
        Self::expire(self.inner.clone(), LogoutReason::Explicit).await;
    }

    /// Transition to `Authenticated` and arm both timers fresh.
    ///
    /// Any timers from a previous session are cancelled first; handles are
    /// never reused across sessions.
    fn on_authenticated(&self) {
        let inner = &self.inner;
        let weak = Arc::downgrade(inner);

        let idle = {
            let weak = weak.clone();
            IdleTimer::start(inner.idle_timeout, move || {
                Self::spawn_expiry(&weak, LogoutReason::Idle);
            })
        };
        let hard = hard_timer(inner.hard_timeout, move || {
            Self::spawn_expiry(&weak, LogoutReason::HardTimeout);
        });

        if let Ok(mut timers) = inner.timers.lock() {
            if let Some(old) = timers.idle.take() {
                old.cancel();
            }
            if let Some(old) = timers.hard.take() {
                old.cancel();
            }
            timers.idle = Some(idle);
            timers.hard = Some(hard);
        }

        inner.state_tx.send_modify(|snap| {
            snap.state = SessionState::Authenticated;
            snap.checked_at = Some(Utc::now());
            snap.ended = None;
        });
    }

    /// Timer callback path: runs the expiry off the timer task so aborting
    /// the timer never cuts the logout short.
    fn spawn_expiry(weak: &Weak<SessionInner>, reason: LogoutReason) {
        if let Some(inner) = weak.upgrade() {
            tokio::spawn(async move {
                Self::expire(inner, reason).await;
            });
        }
    }

    /// End the session: notify the backend (single request, no retry), then
    /// clear local state regardless of the outcome.
    async fn expire(inner: Arc<SessionInner>, reason: LogoutReason) {
        if inner.state_tx.borrow().state != SessionState::Authenticated {
            return;
        }

        if let Err(e) = inner.api.logout().await {
            warn!(error = %e, %reason, "Backend logout failed; clearing local session anyway");
        }

        Self::end_session(&inner, reason);
    }

    /// Unconditional local teardown. Idempotent: only the first caller for a
    /// given authenticated session publishes the transition.
    fn end_session(inner: &SessionInner, reason: LogoutReason) {
        let (idle, hard) = match inner.timers.lock() {
            Ok(mut timers) => (timers.idle.take(), timers.hard.take()),
            Err(_) => (None, None),
        };
        if let Some(idle) = idle {
            idle.cancel();
        }
        if let Some(hard) = hard {
            hard.cancel();
        }

        inner.api.clear_bearer_token();

        let changed = inner.state_tx.send_if_modified(|snap| {
            if snap.state == SessionState::Authenticated {
                snap.state = SessionState::Unauthenticated;
                snap.ended = Some(reason);
                true
            } else {
                false
            }
        });
        if changed {
            info!(%reason, "Session ended");
        }
    }
}
