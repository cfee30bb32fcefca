//! Signal categories and sets of them.
//!
//! Every interaction between a subscriber and its source is one of seven
//! signals. The offloading machinery reasons about them by category:
//!
//! - [`SignalKind`] one lifecycle signal (`Subscribe`, `Request`, `OnNext`, ...)
//! - [`Direction`]  which way a signal travels (towards the source or the subscriber)
//! - [`SignalSet`]  a compact, copyable set of signal kinds
//!
//! ## Quick map
//! ```text
//!              Upstream (subscriber → source)     Downstream (source → subscriber)
//!   ┌────────┐  Subscribe, Request, Cancel  ┌────────────┐
//!   │ source │ ◄─────────────────────────── │ subscriber │
//!   │        │ ───────────────────────────► │            │
//!   └────────┘  OnSubscribe, OnNext,        └────────────┘
//!               OnComplete, OnError
//! ```
//!
//! `OnComplete` covers both stream completion and the successful result of a
//! single-valued source.

mod kind;
mod set;

pub use kind::{Direction, SignalKind};
pub use set::SignalSet;
