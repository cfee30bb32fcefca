//! Signal plumbing shared by every source and operator.
//!
//! ## Contents
//! - `Signal`, `Sink`, `Emitter`: signals as values and the push pipeline built from them
//! - `StreamSink`, `SingleSink`, `CompletionSink`: contract-enforcing adapters in front of user subscribers
//! - `Forwarder`: adapter from user-implemented sources back into the pipeline
//! - `SerialDelivery`: per-subscription, per-direction ordering with inline/offloaded signals

mod conform;
mod forward;
mod serial;
mod signal;

pub(crate) use conform::{CompletionSink, SingleSink, StreamSink};
pub(crate) use forward::Forwarder;
pub(crate) use serial::{Deliver, SerialDelivery};
pub(crate) use signal::{BoxSink, Emitter, EmitterRef, Signal, Sink};
