//! # sigflow
//!
//! **sigflow** is a small reactive-streams core with per-signal offloading.
//!
//! It provides three cold source variants ([`Stream`], [`Single`], [`Completion`]),
//! a way to move chosen lifecycle signals of a subscription onto an [`Executor`]
//! while keeping every signal of one direction strictly ordered, and a sequencing
//! combinator ([`ConcatWith`]) that chains any mix of the three variants.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   Stream / Single / Completion  (cheap handles over an emitter chain)
//!            │
//!            │ operators: subscribe_on, publish_on, offload_with, before_*, concat_with
//!            ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Emitter chain                                                    │
//! │  - base source (from_iter, succeeded, completed, custom source)   │
//! │  - Offload    (consults ExecutionStrategy + OffloadGate)          │
//! │  - Peek       (side-effect hooks)                                 │
//! │  - Concat     (ordered constituents)                              │
//! └──────┬──────────────────────────────────────────────┬─────────────┘
//!        │ downstream signals                           ▲ upstream signals
//!        │ OnSubscribe, OnNext, OnComplete, OnError     │ Subscribe, Request, Cancel
//!        ▼                                              │
//! ┌──────────────────────┐                   ┌──────────────────────┐
//! │ SerialDelivery       │                   │ SerialDelivery       │
//! │ (downstream queue)   │──── Executor ─────│ (upstream queue)     │
//! └──────────┬───────────┘    submit(work)   └──────────────────────┘
//!            ▼
//!     conformance adapter ──► user subscriber
//! ```
//!
//! ### Signal flow of one offloaded subscription
//! ```text
//! subscribe() ──► Offload::subscribe_sink
//!   ├─ plan.decide(Subscribe)?  ── yes ──► executor.submit(subscribe upstream)
//!   │                               └─ rejected ─► on_subscribe(empty), on_error(Rejected)
//!   └─ upstream emits signal S
//!         ├─ plan.decide(S)?  ── no  ──► delivered inline (behind queued signals)
//!         └─ yes ──► queued; drained on the executor, one signal at a time
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                              |
//! |-------------------|---------------------------------------------------------------|-------------------------------------------------|
//! | **Sources**       | Cold sources and their subscriber contracts.                  | [`Stream`], [`Single`], [`Completion`]          |
//! | **Signals**       | The seven lifecycle signal categories.                        | [`SignalKind`], [`SignalSet`], [`Direction`]    |
//! | **Strategy**      | Which categories to offload; merged along the chain.          | [`ExecutionStrategy`], [`StrategyInfluencer`]   |
//! | **Executors**     | Where offloaded signals run.                                  | [`Executor`], [`TokioExecutor`], [`Immediate`]  |
//! | **Gates**         | Per-decision veto over offloading.                            | [`OffloadGate`], [`gate::Countdown`]            |
//! | **Sequencing**    | Ordered concatenation over every pair of variants.            | [`ConcatWith`]                                  |
//! | **Errors**        | Typed causes carried by `on_error`.                           | [`SignalError`], [`RejectedExecution`]          |
//! | **Configuration** | Settings of owned executor pools.                             | [`ExecutorConfig`]                              |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use sigflow::{ConcatWith, ExecutorConfig, ExecutorRef, Single, Stream, TokioExecutor};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = Arc::new(TokioExecutor::start(&ExecutorConfig::named("io").with_workers(2))?);
//!     let executor: ExecutorRef = pool.clone();
//!
//!     let rows = Stream::from_iter(vec![1, 2, 3])
//!         .subscribe_on(Arc::clone(&executor))
//!         .concat_with(Single::from_fn(|| Ok(4)))
//!         .publish_on(executor);
//!
//!     let collected = futures::executor::block_on(rows.to_future())?;
//!     assert_eq!(collected, vec![1, 2, 3, 4]);
//!
//!     pool.shutdown();
//!     Ok(())
//! }
//! ```

mod config;
mod delivery;
mod error;
mod executor;
mod offload;
mod signals;
mod source;
mod strategy;
mod subscriber;

pub mod gate;

// ---- Public re-exports ----

pub use config::ExecutorConfig;
pub use error::{ProtocolViolation, RejectedExecution, SignalError};
pub use executor::{Executor, ExecutorRef, Immediate, TokioExecutor, Work};
pub use gate::{GateRef, OffloadGate};
pub use signals::{Direction, SignalKind, SignalSet};
pub use source::{
    Completion, CompletionSource, ConcatWith, Single, SingleSource, Stream, StreamSource,
};
pub use strategy::{
    required_by, ExecutionContext, ExecutionContextBuilder, ExecutionStrategy,
    StrategyInfluencer,
};
pub use subscriber::{
    Cancellable, CancellableRef, CompletionSubscriber, Demand, EmptySubscription, Lifecycle,
    SingleSubscriber, StreamSubscriber, Subscription, SubscriptionRef,
};
