//! # Subscriber and subscription contracts.
//!
//! ## Rules
//! - Exactly one `on_subscribe` precedes every other callback.
//! - Callbacks of one subscriber never overlap.
//! - At most one terminal callback (`on_complete` / `on_success` / `on_error`), nothing after it.
//! - `request(n)` takes `n > 0`; `request(0)` is answered with `on_error`.
//! - `cancel()` is idempotent and may race with a terminal; exactly one of them wins.

use std::sync::Arc;

use crate::error::SignalError;

/// Handle that withdraws interest in a subscription.
pub trait Cancellable: Send + Sync + 'static {
    /// Cancels the subscription. Repeated calls are no-ops.
    fn cancel(&self);
}

/// Handle of a stream subscription: demand plus cancellation.
pub trait Subscription: Cancellable {
    /// Adds `n` to the outstanding demand. Demand saturates at `u64::MAX` (unbounded).
    fn request(&self, n: u64);
}

/// Shared cancellation handle given to single and completion subscribers.
pub type CancellableRef = Arc<dyn Cancellable>;

/// Shared subscription handle given to stream subscribers.
pub type SubscriptionRef = Arc<dyn Subscription>;

/// Receives the signals of a [`Stream`](crate::Stream).
pub trait StreamSubscriber<T>: Send + 'static {
    /// Called once, before anything else.
    fn on_subscribe(&mut self, subscription: SubscriptionRef);

    /// Called for each element, never beyond requested demand.
    fn on_next(&mut self, item: T);

    /// Terminal: the stream finished.
    fn on_complete(&mut self);

    /// Terminal: the stream failed.
    fn on_error(&mut self, error: SignalError);
}

/// Receives the signals of a [`Single`](crate::Single).
pub trait SingleSubscriber<T>: Send + 'static {
    /// Called once, before anything else.
    fn on_subscribe(&mut self, cancellable: CancellableRef);

    /// Terminal: the value.
    fn on_success(&mut self, value: T);

    /// Terminal: the source failed.
    fn on_error(&mut self, error: SignalError);
}

/// Receives the signals of a [`Completion`](crate::Completion).
pub trait CompletionSubscriber: Send + 'static {
    /// Called once, before anything else.
    fn on_subscribe(&mut self, cancellable: CancellableRef);

    /// Terminal: the work finished.
    fn on_complete(&mut self);

    /// Terminal: the work failed.
    fn on_error(&mut self, error: SignalError);
}

impl<T, S: StreamSubscriber<T> + ?Sized> StreamSubscriber<T> for Box<S> {
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        (**self).on_subscribe(subscription)
    }
    fn on_next(&mut self, item: T) {
        (**self).on_next(item)
    }
    fn on_complete(&mut self) {
        (**self).on_complete()
    }
    fn on_error(&mut self, error: SignalError) {
        (**self).on_error(error)
    }
}

impl<T, S: SingleSubscriber<T> + ?Sized> SingleSubscriber<T> for Box<S> {
    fn on_subscribe(&mut self, cancellable: CancellableRef) {
        (**self).on_subscribe(cancellable)
    }
    fn on_success(&mut self, value: T) {
        (**self).on_success(value)
    }
    fn on_error(&mut self, error: SignalError) {
        (**self).on_error(error)
    }
}

impl<S: CompletionSubscriber + ?Sized> CompletionSubscriber for Box<S> {
    fn on_subscribe(&mut self, cancellable: CancellableRef) {
        (**self).on_subscribe(cancellable)
    }
    fn on_complete(&mut self) {
        (**self).on_complete()
    }
    fn on_error(&mut self, error: SignalError) {
        (**self).on_error(error)
    }
}

/// Subscription that ignores demand and cancellation.
///
/// Handed out when a subscription fails before a real one exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptySubscription;

impl Cancellable for EmptySubscription {
    fn cancel(&self) {}
}

impl Subscription for EmptySubscription {
    fn request(&self, _n: u64) {}
}

/// Presents a cancel-only handle as a subscription; demand is ignored.
pub(crate) struct CancelOnly(pub(crate) CancellableRef);

impl Cancellable for CancelOnly {
    fn cancel(&self) {
        self.0.cancel()
    }
}

impl Subscription for CancelOnly {
    fn request(&self, _n: u64) {}
}

/// Narrows a subscription to its cancel side.
pub(crate) struct CancelVia(pub(crate) SubscriptionRef);

impl Cancellable for CancelVia {
    fn cancel(&self) {
        self.0.cancel()
    }
}
