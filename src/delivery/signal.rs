//! # Signals as values, and the sink/emitter pair every operator is built from.
//!
//! Operators do not talk to user subscribers directly. A source ([`Emitter`])
//! pushes [`Signal`]s into a [`Sink`]; the user's subscriber sits behind the
//! last sink of the chain, wrapped by an adapter that enforces the contract.
//!
//! ```text
//! Emitter ──Signal──► Sink (operator) ──Signal──► ... ──► StreamSink ──► StreamSubscriber
//! ```

use std::sync::Arc;

use crate::error::SignalError;
use crate::signals::SignalKind;
use crate::strategy::ExecutionStrategy;
use crate::subscriber::SubscriptionRef;

/// One downstream-bound signal.
///
/// Single-valued sources terminate with `OnSuccess`, streams and completions with `OnComplete`.
pub(crate) enum Signal<T> {
    OnSubscribe(SubscriptionRef),
    OnNext(T),
    OnSuccess(T),
    OnComplete,
    OnError(SignalError),
}

impl<T> Signal<T> {
    /// Category of this signal; `OnSuccess` counts as [`SignalKind::OnComplete`].
    pub(crate) fn kind(&self) -> SignalKind {
        match self {
            Signal::OnSubscribe(_) => SignalKind::OnSubscribe,
            Signal::OnNext(_) => SignalKind::OnNext,
            Signal::OnSuccess(_) | Signal::OnComplete => SignalKind::OnComplete,
            Signal::OnError(_) => SignalKind::OnError,
        }
    }

    #[inline]
    pub(crate) fn is_terminal(&self) -> bool {
        self.kind().is_terminal()
    }
}

/// Receiver of the signals of one subscription.
///
/// `deliver` is never called concurrently for one sink.
pub(crate) trait Sink<T>: Send + 'static {
    fn deliver(&mut self, signal: Signal<T>);
}

pub(crate) type BoxSink<T> = Box<dyn Sink<T>>;

/// A cold source of signals: each `subscribe_sink` starts an independent subscription.
pub(crate) trait Emitter<T>: Send + Sync + 'static {
    fn subscribe_sink(&self, sink: BoxSink<T>);

    /// Offloads this source and everything upstream of it declare.
    fn strategy(&self) -> ExecutionStrategy;
}

pub(crate) type EmitterRef<T> = Arc<dyn Emitter<T>>;
