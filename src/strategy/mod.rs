//! Execution strategies and the context they are applied in.
//!
//! ## Contents
//! - [`ExecutionStrategy`]  which signal categories must be offloaded (merge = set union)
//! - [`StrategyInfluencer`] components declaring their own requirements (default: offload all)
//! - [`ExecutionContext`]   an executor plus the strategy to use it with
//!
//! ## Quick wiring
//! ```text
//! source.subscribe_on(exec)  ─► strategy ∪ {Subscribe, Request, Cancel}
//!       .publish_on(exec)    ─► strategy ∪ {OnSubscribe, OnNext, OnComplete, OnError}
//!       .strategy()          ─► union of every operator in the chain
//! ```

mod context;
mod execution;
mod influencer;

pub use context::{ExecutionContext, ExecutionContextBuilder};
pub use execution::ExecutionStrategy;
pub use influencer::{required_by, StrategyInfluencer};
