//! # Signal kinds and their direction.

use std::fmt;

use super::SignalSet;

/// Classification of lifecycle signals exchanged by a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    // === Upstream ===
    /// The subscriber attaches to the source.
    Subscribe,
    /// The subscriber signals demand (`request(n)`).
    Request,
    /// The subscriber withdraws interest.
    Cancel,

    // === Downstream ===
    /// The source hands the subscriber its subscription handle.
    OnSubscribe,
    /// The source emits one element (streams only).
    OnNext,
    /// The source finishes successfully: stream completion or a single's value.
    OnComplete,
    /// The source fails.
    OnError,
}

impl SignalKind {
    /// Every signal kind, upstream first.
    pub const ALL: [SignalKind; 7] = [
        SignalKind::Subscribe,
        SignalKind::Request,
        SignalKind::Cancel,
        SignalKind::OnSubscribe,
        SignalKind::OnNext,
        SignalKind::OnComplete,
        SignalKind::OnError,
    ];

    /// Returns the direction this signal travels in.
    #[inline]
    pub const fn direction(self) -> Direction {
        match self {
            SignalKind::Subscribe | SignalKind::Request | SignalKind::Cancel => Direction::Upstream,
            _ => Direction::Downstream,
        }
    }

    /// Returns `true` for `OnComplete` and `OnError`.
    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, SignalKind::OnComplete | SignalKind::OnError)
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub const fn as_label(self) -> &'static str {
        match self {
            SignalKind::Subscribe => "subscribe",
            SignalKind::Request => "request",
            SignalKind::Cancel => "cancel",
            SignalKind::OnSubscribe => "on_subscribe",
            SignalKind::OnNext => "on_next",
            SignalKind::OnComplete => "on_complete",
            SignalKind::OnError => "on_error",
        }
    }

    #[inline]
    pub(crate) const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Direction a signal travels in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// From the subscriber towards the source.
    Upstream,
    /// From the source towards the subscriber.
    Downstream,
}

impl Direction {
    /// Returns every signal kind travelling in this direction.
    #[inline]
    pub const fn signals(self) -> SignalSet {
        match self {
            Direction::Upstream => SignalSet::UPSTREAM,
            Direction::Downstream => SignalSet::DOWNSTREAM,
        }
    }
}
