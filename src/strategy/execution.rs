//! # Execution strategy: which signals must leave the calling thread.

use crate::signals::{Direction, SignalKind, SignalSet};

/// Immutable set of signal categories that must be offloaded.
///
/// Strategies compose by set union ([`merge`](Self::merge)). The default
/// strategy offloads nothing.
///
/// # Example
/// ```
/// use sigflow::{ExecutionStrategy, SignalKind};
///
/// let chain = ExecutionStrategy::offload_upstream().merge(ExecutionStrategy::offload_downstream());
/// assert_eq!(chain, ExecutionStrategy::offload_all());
/// assert!(chain.requires(SignalKind::OnNext));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ExecutionStrategy {
    offloads: SignalSet,
}

impl ExecutionStrategy {
    /// Offloads nothing: every signal runs on the thread that triggers it.
    #[inline]
    pub const fn offload_none() -> Self {
        Self::from_signals(SignalSet::EMPTY)
    }

    /// Offloads `Subscribe`, `Request` and `Cancel`.
    #[inline]
    pub const fn offload_upstream() -> Self {
        Self::from_signals(SignalSet::UPSTREAM)
    }

    /// Offloads `OnSubscribe`, `OnNext`, `OnComplete` and `OnError`.
    #[inline]
    pub const fn offload_downstream() -> Self {
        Self::from_signals(SignalSet::DOWNSTREAM)
    }

    /// Offloads every signal.
    #[inline]
    pub const fn offload_all() -> Self {
        Self::from_signals(SignalSet::ALL)
    }

    /// Offloads exactly the given kinds.
    #[inline]
    pub const fn from_signals(offloads: SignalSet) -> Self {
        Self { offloads }
    }

    /// Returns the kinds this strategy offloads.
    #[inline]
    pub const fn offloads(self) -> SignalSet {
        self.offloads
    }

    /// Returns `true` if `kind` must be offloaded.
    #[inline]
    pub const fn requires(self, kind: SignalKind) -> bool {
        self.offloads.contains(kind)
    }

    /// Returns `true` if any signal of `direction` must be offloaded.
    #[inline]
    pub const fn requires_direction(self, direction: Direction) -> bool {
        self.offloads.intersects(direction.signals())
    }

    #[inline]
    pub const fn is_offload_none(self) -> bool {
        self.offloads.is_empty()
    }

    /// Union of two strategies.
    #[must_use]
    #[inline]
    pub const fn merge(self, other: Self) -> Self {
        Self::from_signals(self.offloads.union(other.offloads))
    }

    /// Union of any number of strategies; empty input yields [`offload_none`](Self::offload_none).
    pub fn merge_all<I>(strategies: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        strategies
            .into_iter()
            .fold(Self::offload_none(), Self::merge)
    }
}

impl FromIterator<ExecutionStrategy> for ExecutionStrategy {
    fn from_iter<I: IntoIterator<Item = ExecutionStrategy>>(iter: I) -> Self {
        Self::merge_all(iter)
    }
}
