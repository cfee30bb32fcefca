//! Conditional offloading gates.
//!
//! An offloading operator may carry an [`OffloadGate`]. At each decision point
//! for a category its strategy flags, the gate is consulted exactly once; `false`
//! makes that single occurrence run inline on the triggering thread.
//!
//! ## Decision points
//! ```text
//! upstream   : Subscribe ─► first Request (later requests reuse it) ─► Cancel
//! downstream : OnSubscribe ─► each OnNext (independently) ─► terminal
//! ```
//!
//! ## Contents
//! - [`Always`] / [`Never`] constant answers
//! - [`Countdown`] inline for the first `n` decisions, offload afterwards
//! - [`Script`] scripted answers with a recording of consulted signals
//! - [`FnGate`] any `Fn(SignalKind) -> bool` (see [`from_fn`])
//!
//! Gates are shared by every subscription of a source. For per-subscription
//! state, build the gated source inside `defer`.

mod counting;

use std::sync::Arc;

use crate::signals::SignalKind;

pub use counting::{Countdown, Script};

/// Decides, per decision point, whether a flagged signal is offloaded.
pub trait OffloadGate: Send + Sync + 'static {
    /// Returns `true` to offload this occurrence of `signal`, `false` to run it inline.
    fn should_offload(&self, signal: SignalKind) -> bool;
}

/// Shared handle to a gate.
pub type GateRef = Arc<dyn OffloadGate>;

impl<G: OffloadGate + ?Sized> OffloadGate for Arc<G> {
    fn should_offload(&self, signal: SignalKind) -> bool {
        (**self).should_offload(signal)
    }
}

/// Always offloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Always;

impl OffloadGate for Always {
    fn should_offload(&self, _signal: SignalKind) -> bool {
        true
    }
}

/// Never offloads; the operator becomes a pass-through.
#[derive(Debug, Clone, Copy, Default)]
pub struct Never;

impl OffloadGate for Never {
    fn should_offload(&self, _signal: SignalKind) -> bool {
        false
    }
}

/// Gate backed by a closure.
pub struct FnGate<F>(F);

impl<F> OffloadGate for FnGate<F>
where
    F: Fn(SignalKind) -> bool + Send + Sync + 'static,
{
    fn should_offload(&self, signal: SignalKind) -> bool {
        (self.0)(signal)
    }
}

/// Builds a gate from a closure.
///
/// # Example
/// ```
/// use sigflow::gate::{self, OffloadGate};
/// use sigflow::SignalKind;
///
/// let only_elements = gate::from_fn(|signal| signal == SignalKind::OnNext);
/// assert!(only_elements.should_offload(SignalKind::OnNext));
/// assert!(!only_elements.should_offload(SignalKind::OnComplete));
/// ```
pub fn from_fn<F>(f: F) -> FnGate<F>
where
    F: Fn(SignalKind) -> bool + Send + Sync + 'static,
{
    FnGate(f)
}
