//! # Execution context: an executor plus the strategy to use it with.
//!
//! Bundles what an offloading operator needs so collaborators can be handed
//! a single value instead of an executor and a strategy separately.
//!
//! ```text
//! ExecutionContextBuilder
//!   .executor(pool)                  ─┐
//!   .strategy(offload_upstream)       ├─► ExecutionContext { executor, strategy }
//!   .influenced_by(&component)       ─┘        │
//!                                              └─► source.offload_in(&ctx)
//! ```

use std::sync::Arc;

use super::{ExecutionStrategy, StrategyInfluencer};
use crate::executor::{ExecutorRef, Immediate};

/// An executor and the strategy offloading operators should apply with it.
#[derive(Clone)]
pub struct ExecutionContext {
    executor: ExecutorRef,
    strategy: ExecutionStrategy,
}

impl ExecutionContext {
    /// Creates a context from its parts.
    pub fn new(executor: ExecutorRef, strategy: ExecutionStrategy) -> Self {
        Self { executor, strategy }
    }

    /// Returns a builder starting from an inline executor and no offloads.
    pub fn builder() -> ExecutionContextBuilder {
        ExecutionContextBuilder::default()
    }

    /// Executor used for offloaded signals.
    #[inline]
    pub fn executor(&self) -> &ExecutorRef {
        &self.executor
    }

    /// Signals to offload.
    #[inline]
    pub fn strategy(&self) -> ExecutionStrategy {
        self.strategy
    }

    /// Returns a copy of this context whose strategy also covers `other`.
    #[must_use]
    pub fn with_merged(&self, other: ExecutionStrategy) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            strategy: self.strategy.merge(other),
        }
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("executor", &self.executor.name())
            .field("strategy", &self.strategy)
            .finish()
    }
}

/// Builder for [`ExecutionContext`].
pub struct ExecutionContextBuilder {
    executor: Option<ExecutorRef>,
    strategy: ExecutionStrategy,
}

impl Default for ExecutionContextBuilder {
    fn default() -> Self {
        Self {
            executor: None,
            strategy: ExecutionStrategy::offload_none(),
        }
    }
}

impl ExecutionContextBuilder {
    /// Sets the executor. Without one the context runs everything inline.
    #[must_use]
    pub fn executor(mut self, executor: ExecutorRef) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Replaces the strategy.
    #[must_use]
    pub fn strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Adds the requirements of a component to the strategy.
    #[must_use]
    pub fn influenced_by(mut self, influencer: &dyn StrategyInfluencer) -> Self {
        self.strategy = self.strategy.merge(influencer.required_offloads());
        self
    }

    pub fn build(self) -> ExecutionContext {
        let executor = self
            .executor
            .unwrap_or_else(|| Arc::new(Immediate) as ExecutorRef);
        ExecutionContext::new(executor, self.strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::SignalKind;

    struct Blocking;
    impl StrategyInfluencer for Blocking {}

    #[test]
    fn test_builder_defaults() {
        let ctx = ExecutionContext::builder().build();
        assert!(ctx.strategy().is_offload_none());
        assert_eq!(ctx.executor().name(), "immediate");
    }

    #[test]
    fn test_builder_merges_influencers() {
        let ctx = ExecutionContext::builder()
            .strategy(ExecutionStrategy::offload_upstream())
            .influenced_by(&ExecutionStrategy::offload_downstream())
            .build();
        assert_eq!(ctx.strategy(), ExecutionStrategy::offload_all());

        let ctx = ExecutionContext::builder().influenced_by(&Blocking).build();
        assert!(ctx.strategy().requires(SignalKind::OnNext));
    }

    #[test]
    fn test_with_merged_keeps_executor() {
        let ctx = ExecutionContext::builder()
            .strategy(ExecutionStrategy::offload_upstream())
            .build();
        let wider = ctx.with_merged(ExecutionStrategy::offload_downstream());
        assert!(Arc::ptr_eq(ctx.executor(), wider.executor()));
        assert_eq!(wider.strategy(), ExecutionStrategy::offload_all());
    }
}
