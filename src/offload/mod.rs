//! Signal offloading.
//!
//! An offloading operator wraps a source so that the signal categories of its
//! strategy are redispatched on an executor, each occurrence subject to an
//! optional [`OffloadGate`](crate::gate::OffloadGate). Unflagged categories, and
//! flagged ones the gate declines, run inline on the thread that triggers them.
//!
//! ## Guarantees per subscription
//! - Downstream-bound signals are delivered in order and never overlap.
//! - Upstream-bound signals (`request`, `cancel`) likewise, independently of downstream.
//! - An executor refusal never reaches the caller: it becomes `on_error(Rejected)`
//!   and the source is cancelled.
//!
//! ## Operators
//! ```text
//! subscribe_on(exec)             strategy = {Subscribe, Request, Cancel}
//! publish_on(exec)               strategy = {OnSubscribe, OnNext, OnComplete, OnError}
//! offload_with(strategy, exec, gate)
//! ```

mod downstream;
mod operator;
mod plan;
mod upstream;

pub(crate) use operator::Offload;
pub(crate) use plan::{gate_ref, OffloadPlan};
