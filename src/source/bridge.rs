//! # Bridge from subscriptions to futures.
//!
//! `to_future` subscribes eagerly with a [`OneshotSubscriber`] and awaits the
//! terminal signal on a `tokio::sync::oneshot` channel. The returned future is
//! runtime-agnostic and can be driven by any executor.
//!
//! ## Rules
//! - Dropping the future before the outcome arrives cancels the subscription,
//!   even when `on_subscribe` has not been delivered yet.
//! - A subscription released without a terminal signal resolves to
//!   [`SignalError::Abandoned`].

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::error::SignalError;
use crate::subscriber::{CancellableRef, CompletionSubscriber, SingleSubscriber};

enum Slot {
    Waiting,
    Subscribed(CancellableRef),
    Dropped,
}

type SharedSlot = Arc<Mutex<Slot>>;

/// Receiving half returned next to a [`OneshotSubscriber`].
pub(crate) struct Outcome<T> {
    rx: oneshot::Receiver<Result<T, SignalError>>,
    slot: SharedSlot,
}

pub(crate) struct OneshotSubscriber<T> {
    tx: Option<oneshot::Sender<Result<T, SignalError>>>,
    slot: SharedSlot,
}

impl<T: Send + 'static> OneshotSubscriber<T> {
    pub(crate) fn new() -> (Self, Outcome<T>) {
        let (tx, rx) = oneshot::channel();
        let slot = Arc::new(Mutex::new(Slot::Waiting));
        let subscriber = Self {
            tx: Some(tx),
            slot: Arc::clone(&slot),
        };
        (subscriber, Outcome { rx, slot })
    }

    fn attach(&mut self, cancellable: CancellableRef) {
        let mut slot = self.slot.lock();
        if matches!(*slot, Slot::Dropped) {
            drop(slot);
            cancellable.cancel();
            return;
        }
        *slot = Slot::Subscribed(cancellable);
    }

    fn settle(&mut self, outcome: Result<T, SignalError>) {
        *self.slot.lock() = Slot::Waiting;
        if let Some(tx) = self.tx.take() {
            // The receiver may be gone already; nothing is waiting then.
            let _ = tx.send(outcome);
        }
    }
}

impl<T: Send + 'static> SingleSubscriber<T> for OneshotSubscriber<T> {
    fn on_subscribe(&mut self, cancellable: CancellableRef) {
        self.attach(cancellable);
    }
    fn on_success(&mut self, value: T) {
        self.settle(Ok(value));
    }
    fn on_error(&mut self, error: SignalError) {
        self.settle(Err(error));
    }
}

impl CompletionSubscriber for OneshotSubscriber<()> {
    fn on_subscribe(&mut self, cancellable: CancellableRef) {
        self.attach(cancellable);
    }
    fn on_complete(&mut self) {
        self.settle(Ok(()));
    }
    fn on_error(&mut self, error: SignalError) {
        self.settle(Err(error));
    }
}

/// Cancels the subscription unless disarmed first.
struct CancelOnDrop {
    slot: Option<SharedSlot>,
}

impl CancelOnDrop {
    fn disarm(&mut self) {
        self.slot = None;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        let Some(slot) = self.slot.take() else {
            return;
        };
        let previous = std::mem::replace(&mut *slot.lock(), Slot::Dropped);
        if let Slot::Subscribed(cancellable) = previous {
            cancellable.cancel();
        }
    }
}

/// Resolves with the terminal signal carried by `outcome`.
pub(crate) fn await_outcome<T: Send + 'static>(
    outcome: Outcome<T>,
) -> impl Future<Output = Result<T, SignalError>> + Send + 'static {
    let Outcome { rx, slot } = outcome;
    // Created outside the async block so that dropping an unpolled future still cancels.
    let mut guard = CancelOnDrop { slot: Some(slot) };
    async move {
        let result = rx.await.unwrap_or(Err(SignalError::Abandoned));
        guard.disarm();
        result
    }
}
