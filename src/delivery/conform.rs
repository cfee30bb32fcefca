//! # Adapters between the signal pipeline and user subscribers.
//!
//! The last sink of every chain is one of [`StreamSink`], [`SingleSink`] or
//! [`CompletionSink`]. They translate signals into subscriber callbacks and
//! enforce the subscriber side of the contract:
//!
//! ## Rules
//! - A second `on_subscribe` is refused: the new subscription is cancelled, `warn!` is logged.
//! - Signals before `on_subscribe` or after a terminal are dropped with a `warn!`.
//! - Exactly one terminal callback reaches the subscriber.

use std::sync::Arc;

use tracing::warn;

use super::{Signal, Sink};
use crate::error::{ProtocolViolation, SignalError};
use crate::subscriber::{
    CancelVia, CancellableRef, CompletionSubscriber, SingleSubscriber, StreamSubscriber,
};

/// Subscriber-side protocol state.
#[derive(Default)]
struct Conformance {
    subscribed: bool,
    terminated: bool,
}

impl Conformance {
    /// Returns `true` if `signal` may reach the subscriber.
    fn admit<T>(&mut self, signal: &Signal<T>) -> bool {
        let kind = signal.kind();
        if self.terminated {
            let violation = ProtocolViolation::AfterTerminal { signal: kind };
            warn!(signal = kind.as_label(), violation = violation.as_label(), "dropping signal");
            if let Signal::OnSubscribe(subscription) = signal {
                subscription.cancel();
            }
            return false;
        }

        match signal {
            Signal::OnSubscribe(subscription) => {
                if self.subscribed {
                    warn!(
                        violation = ProtocolViolation::DuplicateSubscribe.as_label(),
                        "cancelling duplicate subscription"
                    );
                    subscription.cancel();
                    return false;
                }
                self.subscribed = true;
                true
            }
            _ if !self.subscribed => {
                let violation = ProtocolViolation::BeforeSubscribe { signal: kind };
                warn!(signal = kind.as_label(), violation = violation.as_label(), "dropping signal");
                false
            }
            _ => {
                self.terminated = signal.is_terminal();
                true
            }
        }
    }
}

/// Feeds a [`StreamSubscriber`].
pub(crate) struct StreamSink<T> {
    subscriber: Box<dyn StreamSubscriber<T>>,
    state: Conformance,
}

impl<T> StreamSink<T> {
    pub(crate) fn new(subscriber: Box<dyn StreamSubscriber<T>>) -> Self {
        Self {
            subscriber,
            state: Conformance::default(),
        }
    }
}

impl<T: Send + 'static> Sink<T> for StreamSink<T> {
    fn deliver(&mut self, signal: Signal<T>) {
        if !self.state.admit(&signal) {
            return;
        }
        match signal {
            Signal::OnSubscribe(subscription) => self.subscriber.on_subscribe(subscription),
            Signal::OnNext(item) => self.subscriber.on_next(item),
            Signal::OnSuccess(item) => {
                self.subscriber.on_next(item);
                self.subscriber.on_complete();
            }
            Signal::OnComplete => self.subscriber.on_complete(),
            Signal::OnError(error) => self.subscriber.on_error(error),
        }
    }
}

/// Feeds a [`SingleSubscriber`].
pub(crate) struct SingleSink<T> {
    subscriber: Box<dyn SingleSubscriber<T>>,
    state: Conformance,
}

impl<T> SingleSink<T> {
    pub(crate) fn new(subscriber: Box<dyn SingleSubscriber<T>>) -> Self {
        Self {
            subscriber,
            state: Conformance::default(),
        }
    }
}

impl<T: Send + 'static> Sink<T> for SingleSink<T> {
    fn deliver(&mut self, signal: Signal<T>) {
        if let Signal::OnNext(_) = signal {
            warn!(signal = "on_next", "single subscriber received an element; dropping");
            return;
        }
        if !self.state.admit(&signal) {
            return;
        }
        match signal {
            Signal::OnSubscribe(subscription) => {
                let cancellable: CancellableRef = Arc::new(CancelVia(subscription));
                self.subscriber.on_subscribe(cancellable);
            }
            Signal::OnSuccess(value) => self.subscriber.on_success(value),
            Signal::OnComplete => self.subscriber.on_error(SignalError::NoValue),
            Signal::OnError(error) => self.subscriber.on_error(error),
            Signal::OnNext(_) => {}
        }
    }
}

/// Feeds a [`CompletionSubscriber`]; values are ignored.
pub(crate) struct CompletionSink {
    subscriber: Box<dyn CompletionSubscriber>,
    state: Conformance,
}

impl CompletionSink {
    pub(crate) fn new(subscriber: Box<dyn CompletionSubscriber>) -> Self {
        Self {
            subscriber,
            state: Conformance::default(),
        }
    }
}

impl Sink<()> for CompletionSink {
    fn deliver(&mut self, signal: Signal<()>) {
        if let Signal::OnNext(()) = signal {
            return;
        }
        if !self.state.admit(&signal) {
            return;
        }
        match signal {
            Signal::OnSubscribe(subscription) => {
                let cancellable: CancellableRef = Arc::new(CancelVia(subscription));
                self.subscriber.on_subscribe(cancellable);
            }
            Signal::OnSuccess(()) | Signal::OnComplete => self.subscriber.on_complete(),
            Signal::OnError(error) => self.subscriber.on_error(error),
            Signal::OnNext(()) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscriber::{Cancellable, Subscription, SubscriptionRef};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct Flag(AtomicBool);
    impl Cancellable for Flag {
        fn cancel(&self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }
    impl Subscription for Flag {
        fn request(&self, _n: u64) {}
    }

    struct Log(Arc<Mutex<Vec<String>>>);
    impl StreamSubscriber<i32> for Log {
        fn on_subscribe(&mut self, _s: SubscriptionRef) {
            self.0.lock().push("subscribe".into());
        }
        fn on_next(&mut self, item: i32) {
            self.0.lock().push(format!("next {item}"));
        }
        fn on_complete(&mut self) {
            self.0.lock().push("complete".into());
        }
        fn on_error(&mut self, error: SignalError) {
            self.0.lock().push(format!("error {}", error.as_label()));
        }
    }

    #[test]
    fn test_duplicate_subscribe_cancels_new_handle() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut sink = StreamSink::new(Box::new(Log(Arc::clone(&log))));
        let first = Arc::new(Flag::default());
        let second = Arc::new(Flag::default());

        sink.deliver(Signal::OnSubscribe(first.clone()));
        sink.deliver(Signal::OnSubscribe(second.clone()));

        assert!(!first.0.load(Ordering::SeqCst));
        assert!(second.0.load(Ordering::SeqCst));
        assert_eq!(*log.lock(), vec!["subscribe"]);
    }

    #[test]
    fn test_only_one_terminal_reaches_subscriber() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut sink = StreamSink::new(Box::new(Log(Arc::clone(&log))));

        sink.deliver(Signal::OnNext(0));
        sink.deliver(Signal::OnSubscribe(Arc::new(Flag::default())));
        sink.deliver(Signal::OnNext(1));
        sink.deliver(Signal::OnComplete);
        sink.deliver(Signal::OnNext(2));
        sink.deliver(Signal::OnError(SignalError::NoValue));

        assert_eq!(*log.lock(), vec!["subscribe", "next 1", "complete"]);
    }
}
