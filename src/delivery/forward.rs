//! # Subscriber that turns callbacks back into signals.
//!
//! Sources implemented against the public traits ([`StreamSource`](crate::StreamSource),
//! [`SingleSource`](crate::SingleSource), [`CompletionSource`](crate::CompletionSource))
//! see a [`Forwarder`]; it pushes whatever they call into the next sink of the chain.

use std::sync::Arc;

use super::{BoxSink, Signal};
use crate::error::SignalError;
use crate::subscriber::{
    CancelOnly, CancellableRef, CompletionSubscriber, SingleSubscriber, StreamSubscriber,
    SubscriptionRef,
};

pub(crate) struct Forwarder<T> {
    sink: BoxSink<T>,
}

impl<T: Send + 'static> Forwarder<T> {
    pub(crate) fn new(sink: BoxSink<T>) -> Self {
        Self { sink }
    }

    #[inline]
    fn forward(&mut self, signal: Signal<T>) {
        self.sink.deliver(signal);
    }
}

impl<T: Send + 'static> StreamSubscriber<T> for Forwarder<T> {
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        self.forward(Signal::OnSubscribe(subscription));
    }
    fn on_next(&mut self, item: T) {
        self.forward(Signal::OnNext(item));
    }
    fn on_complete(&mut self) {
        self.forward(Signal::OnComplete);
    }
    fn on_error(&mut self, error: SignalError) {
        self.forward(Signal::OnError(error));
    }
}

impl<T: Send + 'static> SingleSubscriber<T> for Forwarder<T> {
    fn on_subscribe(&mut self, cancellable: CancellableRef) {
        self.forward(Signal::OnSubscribe(Arc::new(CancelOnly(cancellable))));
    }
    fn on_success(&mut self, value: T) {
        self.forward(Signal::OnSuccess(value));
    }
    fn on_error(&mut self, error: SignalError) {
        self.forward(Signal::OnError(error));
    }
}

impl CompletionSubscriber for Forwarder<()> {
    fn on_subscribe(&mut self, cancellable: CancellableRef) {
        self.forward(Signal::OnSubscribe(Arc::new(CancelOnly(cancellable))));
    }
    fn on_complete(&mut self) {
        self.forward(Signal::OnComplete);
    }
    fn on_error(&mut self, error: SignalError) {
        self.forward(Signal::OnError(error));
    }
}
