//! # Components that declare what they need offloaded.
//!
//! A [`StrategyInfluencer`] is anything placed in a chain that may block or
//! otherwise needs some signals kept off the caller's thread. Unknown components
//! are treated conservatively: the default requirement is
//! [`ExecutionStrategy::offload_all`].

use super::ExecutionStrategy;

/// Declares which signals a component requires to be offloaded.
pub trait StrategyInfluencer {
    /// Returns the offloads this component requires.
    ///
    /// Default: [`ExecutionStrategy::offload_all`]. Components that never block
    /// should override this with [`ExecutionStrategy::offload_none`].
    fn required_offloads(&self) -> ExecutionStrategy {
        ExecutionStrategy::offload_all()
    }
}

impl StrategyInfluencer for ExecutionStrategy {
    fn required_offloads(&self) -> ExecutionStrategy {
        *self
    }
}

/// Merges the requirements of every influencer in a chain.
pub fn required_by<'a, I>(influencers: I) -> ExecutionStrategy
where
    I: IntoIterator<Item = &'a dyn StrategyInfluencer>,
{
    ExecutionStrategy::merge_all(influencers.into_iter().map(|i| i.required_offloads()))
}
