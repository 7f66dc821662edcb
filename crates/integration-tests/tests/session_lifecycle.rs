//! Session lifecycle: probe gating, idle and hard timeouts, logout.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::Ordering;
use std::time::Duration;

use candleworks_core::{LogoutReason, SessionState};
use candleworks_integration_tests::TestContext;

/// Short timeouts so timer behavior is observable in test time.
fn short_timeouts(
    idle: Duration,
    hard: Duration,
) -> impl FnOnce(&mut candleworks_storefront::StorefrontConfig) {
    move |config| {
        config.idle_timeout = idle;
        config.session_timeout = hard;
    }
}

#[tokio::test]
async fn probe_failure_resolves_to_unauthenticated() {
    let ctx = TestContext::start().await;
    // Backend reports no session.
    let state = ctx.store.session().start().await;
    assert_eq!(state, SessionState::Unauthenticated);
    // Never left resting in Checking.
    assert_eq!(ctx.store.session().state(), SessionState::Unauthenticated);
}

#[tokio::test]
async fn probe_success_resolves_to_authenticated() {
    let ctx = TestContext::start().await;
    ctx.backend.authed.store(true, Ordering::SeqCst);

    let state = ctx.store.session().start().await;
    assert_eq!(state, SessionState::Authenticated);
    assert!(ctx.store.session().snapshot().checked_at.is_some());
}

#[tokio::test]
async fn failed_login_stays_unauthenticated() {
    let ctx = TestContext::start().await;
    ctx.store.session().start().await;

    let result = ctx.store.session().login("wrong", "whatever").await;
    assert!(result.is_err());
    assert_eq!(ctx.store.session().state(), SessionState::Unauthenticated);
}

#[tokio::test]
async fn idle_timeout_logs_out_exactly_once() {
    let ctx = TestContext::start_with(short_timeouts(
        Duration::from_millis(200),
        Duration::from_secs(30),
    ))
    .await;
    ctx.login().await;
    assert_eq!(ctx.store.session().state(), SessionState::Authenticated);

    let mut session_rx = ctx.store.session().subscribe();

    tokio::time::sleep(Duration::from_millis(600)).await;
    let snapshot = ctx.store.session().snapshot();
    assert_eq!(snapshot.state, SessionState::Unauthenticated);
    assert_eq!(snapshot.ended, Some(LogoutReason::Idle));

    // Exactly one transition to Unauthenticated was published.
    let mut endings = 0;
    while session_rx.has_changed().unwrap_or(false) {
        let snap = session_rx.borrow_and_update().clone();
        if snap.state == SessionState::Unauthenticated {
            endings += 1;
        }
    }
    assert_eq!(endings, 1);
}

#[tokio::test]
async fn activity_inside_timeout_defers_idle_logout() {
    let ctx = TestContext::start_with(short_timeouts(
        Duration::from_millis(300),
        Duration::from_secs(30),
    ))
    .await;
    ctx.login().await;

    // Keep poking well inside the idle window.
    for _ in 0..6 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        ctx.store.session().record_activity();
    }
    assert_eq!(ctx.store.session().state(), SessionState::Authenticated);

    // Go quiet; the deadline still applies.
    tokio::time::sleep(Duration::from_millis(700)).await;
    let snapshot = ctx.store.session().snapshot();
    assert_eq!(snapshot.state, SessionState::Unauthenticated);
    assert_eq!(snapshot.ended, Some(LogoutReason::Idle));
}

#[tokio::test]
async fn hard_timeout_fires_despite_activity() {
    let ctx = TestContext::start_with(short_timeouts(
        Duration::from_secs(30),
        Duration::from_millis(400),
    ))
    .await;
    ctx.login().await;

    // Constant activity cannot extend the hard deadline.
    for _ in 0..10 {
        tokio::time::sleep(Duration::from_millis(80)).await;
        ctx.store.session().record_activity();
    }

    let snapshot = ctx.store.session().snapshot();
    assert_eq!(snapshot.state, SessionState::Unauthenticated);
    assert_eq!(snapshot.ended, Some(LogoutReason::HardTimeout));
}

#[tokio::test]
async fn explicit_logout_cancels_hard_timer() {
    let ctx = TestContext::start_with(short_timeouts(
        Duration::from_secs(30),
        Duration::from_millis(300),
    ))
    .await;
    ctx.login().await;

    ctx.store.session().logout().await;
    let snapshot = ctx.store.session().snapshot();
    assert_eq!(snapshot.ended, Some(LogoutReason::Explicit));

    // The cancelled hard timer must not overwrite the reason later.
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(
        ctx.store.session().snapshot().ended,
        Some(LogoutReason::Explicit)
    );
}

#[tokio::test]
async fn logout_clears_local_state_even_when_network_call_fails() {
    let ctx = TestContext::start().await;
    ctx.login().await;
    ctx.backend.fail_logout.store(true, Ordering::SeqCst);

    ctx.store.session().logout().await;

    let snapshot = ctx.store.session().snapshot();
    assert_eq!(snapshot.state, SessionState::Unauthenticated);
    assert_eq!(snapshot.ended, Some(LogoutReason::Explicit));
}

#[tokio::test]
async fn relogin_rearms_fresh_timers() {
    let ctx = TestContext::start_with(short_timeouts(
        Duration::from_millis(300),
        Duration::from_secs(30),
    ))
    .await;
    ctx.login().await;

    ctx.store.session().logout().await;
    assert_eq!(ctx.store.session().state(), SessionState::Unauthenticated);

    // A new session gets its own timers and ends on its own idle deadline.
    ctx.login().await;
    assert_eq!(ctx.store.session().state(), SessionState::Authenticated);
    tokio::time::sleep(Duration::from_millis(700)).await;
    assert_eq!(
        ctx.store.session().snapshot().ended,
        Some(LogoutReason::Idle)
    );
}
