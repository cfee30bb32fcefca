//! Cold sources and the operators applied to them.
//!
//! ## Contents
//! - [`Stream`]     zero or more elements under demand, then one terminal signal
//! - [`Single`]     exactly one value or one error
//! - [`Completion`] success or failure, without a value
//! - [`ConcatWith`] ordered sequencing across all three variants
//!
//! Every variant is a cheap handle over a shared emitter chain; operators wrap
//! the chain and never mutate it, so one source can be subscribed many times.
//!
//! ```text
//! Stream::from_iter(..)        base emitter
//!     .subscribe_on(exec)      Offload { upstream }      ─┐
//!     .before_on_next(f)       Peek                       ├─ strategy() = union
//!     .publish_on(exec)        Offload { downstream }    ─┘
//!     .subscribe(subscriber)   StreamSink ─► subscriber
//! ```

mod adapt;
mod bridge;
mod completion;
mod concat;
mod hooks;
mod iter;
mod produce;
mod single;
mod stream;

pub use completion::{Completion, CompletionSource};
pub use concat::ConcatWith;
pub use single::{Single, SingleSource};
pub use stream::{Stream, StreamSource};
