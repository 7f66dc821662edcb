//! Session and payment status enums.

use serde::{Deserialize, Serialize};

/// Authentication state of the client session.
///
/// `Unchecked → Checking → {Authenticated, Unauthenticated}`. The probe on
/// startup always resolves to one of the two terminal states; `Checking` is
/// never a resting state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Unchecked,
    Checking,
    Authenticated,
    Unauthenticated,
}

impl SessionState {
    /// Whether protected views may render.
    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated)
    }
}

/// Why a session ended.
///
/// Idle-induced logout is distinguished so the UI can show an acknowledgment
/// modal instead of redirecting immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogoutReason {
    /// User chose to log out.
    Explicit,
    /// No qualifying activity within the idle timeout.
    Idle,
    /// Absolute session lifetime reached, regardless of activity.
    HardTimeout,
    /// The silent auth probe failed.
    ProbeFailed,
}

impl std::fmt::Display for LogoutReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Explicit => write!(f, "explicit"),
            Self::Idle => write!(f, "idle"),
            Self::HardTimeout => write!(f, "hard_timeout"),
            Self::ProbeFailed => write!(f, "probe_failed"),
        }
    }
}

/// Terminal outcome of a payment-confirmation poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentOutcome {
    /// Backend reported the payment as received; the order was placed.
    Confirmed,
    /// The polling ceiling elapsed without confirmation.
    TimedOut,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_authenticated() {
        assert!(SessionState::Authenticated.is_authenticated());
        assert!(!SessionState::Unchecked.is_authenticated());
        assert!(!SessionState::Checking.is_authenticated());
        assert!(!SessionState::Unauthenticated.is_authenticated());
    }

    #[test]
    fn test_logout_reason_display() {
        assert_eq!(LogoutReason::Idle.to_string(), "idle");
        assert_eq!(LogoutReason::HardTimeout.to_string(), "hard_timeout");
    }

    #[test]
    fn test_default_session_state() {
        assert_eq!(SessionState::default(), SessionState::Unchecked);
    }
}
