//! Error types carried by terminal signals and executor submissions.
//!
//! This module defines three error types:
//!
//! - [`SignalError`] — the cause delivered through `on_error`.
//! - [`RejectedExecution`] — an executor refused a unit of work.
//! - [`ProtocolViolation`] — a participant broke the subscription contract.
//!
//! All of them provide helper methods (`as_label`, `as_message`) for logs and metrics.
//! Errors travel through signals and may be observed by several parties, so they are
//! cheap to clone (`Arc<str>` payloads).

use std::sync::Arc;

use thiserror::Error;

use crate::signals::SignalKind;

/// # Error delivered to a subscriber through `on_error`.
///
/// `subscribe` never fails at the call site: every failure of a subscription,
/// including an executor refusing to run one of its signals, ends up here.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    /// The source failed to produce its value, element or completion.
    #[error("source failed: {error}")]
    Failed {
        /// The underlying error message.
        error: Arc<str>,
    },

    /// An executor refused to run a signal of this subscription.
    ///
    /// The upstream side of the subscription is cancelled when this is delivered.
    #[error(transparent)]
    Rejected(#[from] RejectedExecution),

    /// A participant violated the subscription contract.
    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolViolation),

    /// A single-valued composite finished without producing a value.
    #[error("completed without a value")]
    NoValue,

    /// The source dropped its subscriber without delivering a terminal signal.
    #[error("source abandoned the subscription")]
    Abandoned,
}

impl SignalError {
    /// Creates a [`SignalError::Failed`] from any message.
    ///
    /// # Example
    /// ```
    /// use sigflow::SignalError;
    ///
    /// let err = SignalError::failed("disk full");
    /// assert_eq!(err.to_string(), "source failed: disk full");
    /// ```
    pub fn failed(error: impl Into<Arc<str>>) -> Self {
        SignalError::Failed {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use sigflow::SignalError;
    ///
    /// assert_eq!(SignalError::NoValue.as_label(), "signal_no_value");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SignalError::Failed { .. } => "signal_failed",
            SignalError::Rejected(_) => "signal_rejected",
            SignalError::Protocol(_) => "signal_protocol_violation",
            SignalError::NoValue => "signal_no_value",
            SignalError::Abandoned => "signal_abandoned",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SignalError::Failed { error } => format!("failed: {error}"),
            SignalError::Rejected(rejected) => rejected.as_message(),
            SignalError::Protocol(violation) => format!("protocol: {violation}"),
            SignalError::NoValue => "no value".to_string(),
            SignalError::Abandoned => "abandoned".to_string(),
        }
    }

    /// Indicates whether the error was caused by an executor refusing work.
    pub fn is_rejection(&self) -> bool {
        matches!(self, SignalError::Rejected(_))
    }
}

/// # An executor refused to accept a unit of work.
///
/// Returned by [`Executor::submit`](crate::Executor::submit). The offloading
/// operators never hand it to the caller of `subscribe`; it is converted into
/// [`SignalError::Rejected`] and delivered to the affected subscriber instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("executor '{executor}' rejected work: {reason}")]
pub struct RejectedExecution {
    /// Name of the executor that refused the work.
    pub executor: Arc<str>,
    /// Why the work was refused.
    pub reason: Arc<str>,
}

impl RejectedExecution {
    /// Creates a rejection for the named executor.
    pub fn new(executor: impl Into<Arc<str>>, reason: impl Into<Arc<str>>) -> Self {
        Self {
            executor: executor.into(),
            reason: reason.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        "executor_rejected"
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        format!("rejected by {}: {}", self.executor, self.reason)
    }
}

/// # A participant broke the subscription contract.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolViolation {
    /// `request(n)` was called with `n == 0`.
    #[error("request(n) called with n == 0")]
    NonPositiveRequest,

    /// A second `on_subscribe` reached a subscriber.
    #[error("on_subscribe delivered more than once")]
    DuplicateSubscribe,

    /// A signal arrived after the terminal signal.
    #[error("{signal} delivered after a terminal signal")]
    AfterTerminal {
        /// The offending signal.
        signal: SignalKind,
    },

    /// A signal arrived before `on_subscribe`.
    #[error("{signal} delivered before on_subscribe")]
    BeforeSubscribe {
        /// The offending signal.
        signal: SignalKind,
    },
}

impl ProtocolViolation {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ProtocolViolation::NonPositiveRequest => "protocol_non_positive_request",
            ProtocolViolation::DuplicateSubscribe => "protocol_duplicate_subscribe",
            ProtocolViolation::AfterTerminal { .. } => "protocol_after_terminal",
            ProtocolViolation::BeforeSubscribe { .. } => "protocol_before_subscribe",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(SignalError::failed("x").as_label(), "signal_failed");
        assert_eq!(
            SignalError::from(RejectedExecution::new("pool", "shut down")).as_label(),
            "signal_rejected"
        );
        assert_eq!(
            SignalError::from(ProtocolViolation::NonPositiveRequest).as_label(),
            "signal_protocol_violation"
        );
        assert_eq!(SignalError::Abandoned.as_label(), "signal_abandoned");
    }

    #[test]
    fn test_rejection_display_is_transparent() {
        let err = SignalError::from(RejectedExecution::new("pool", "shut down"));
        assert_eq!(err.to_string(), "executor 'pool' rejected work: shut down");
        assert!(err.is_rejection());
        assert!(!SignalError::NoValue.is_rejection());
    }

    #[test]
    fn test_violation_mentions_signal() {
        let v = ProtocolViolation::AfterTerminal {
            signal: SignalKind::OnNext,
        };
        assert_eq!(v.to_string(), "on_next delivered after a terminal signal");
        assert_eq!(v.as_label(), "protocol_after_terminal");
    }
}
