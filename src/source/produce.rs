//! # Scalar factories: produced outcomes, never-terminating and deferred sources.

use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::delivery::{BoxSink, Emitter, EmitterRef, Signal};
use crate::error::{ProtocolViolation, SignalError};
use crate::strategy::ExecutionStrategy;
use crate::subscriber::{Cancellable, Lifecycle, Subscription, SubscriptionRef};

/// Subscription of a source that ignores demand.
#[derive(Default)]
pub(crate) struct ScalarSubscription {
    lifecycle: Lifecycle,
}

impl Cancellable for ScalarSubscription {
    fn cancel(&self) {
        self.lifecycle.try_cancel();
    }
}

impl Subscription for ScalarSubscription {
    fn request(&self, _n: u64) {}
}

/// Emits the outcome of `f` on the subscribing thread.
///
/// `Ok(Some(v))` becomes `OnSuccess(v)`, `Ok(None)` becomes `OnComplete`.
pub(crate) struct Produce<T, F> {
    f: F,
    _marker: PhantomData<fn() -> T>,
}

impl<T, F> Produce<T, F>
where
    F: Fn() -> Result<Option<T>, SignalError> + Send + Sync + 'static,
{
    pub(crate) fn new(f: F) -> Self {
        Self {
            f,
            _marker: PhantomData,
        }
    }
}

impl<T, F> Emitter<T> for Produce<T, F>
where
    T: Send + 'static,
    F: Fn() -> Result<Option<T>, SignalError> + Send + Sync + 'static,
{
    fn subscribe_sink(&self, mut sink: BoxSink<T>) {
        let subscription = Arc::new(ScalarSubscription::default());
        let handle: SubscriptionRef = subscription.clone();
        sink.deliver(Signal::OnSubscribe(handle));
        if !subscription.lifecycle.is_active() {
            return;
        }

        let outcome = (self.f)();
        if !subscription.lifecycle.try_terminate() {
            return;
        }
        sink.deliver(match outcome {
            Ok(Some(value)) => Signal::OnSuccess(value),
            Ok(None) => Signal::OnComplete,
            Err(error) => Signal::OnError(error),
        });
    }

    fn strategy(&self) -> ExecutionStrategy {
        ExecutionStrategy::offload_none()
    }
}

/// Subscription of [`Never`]: keeps the sink only to answer `request(0)`.
struct NeverSubscription<T> {
    lifecycle: Lifecycle,
    state: Mutex<NeverState<T>>,
}

struct NeverState<T> {
    sink: Option<BoxSink<T>>,
    violated: bool,
}

impl<T: Send + 'static> Cancellable for NeverSubscription<T> {
    fn cancel(&self) {
        if self.lifecycle.try_cancel() {
            let sink = self.state.lock().sink.take();
            drop(sink);
        }
    }
}

impl<T: Send + 'static> Subscription for NeverSubscription<T> {
    fn request(&self, n: u64) {
        if n > 0 || !self.lifecycle.try_terminate() {
            return;
        }
        let sink = {
            let mut state = self.state.lock();
            state.violated = true;
            state.sink.take()
        };
        // Without a sink, `subscribe_sink` is still inside `on_subscribe` and reports it.
        if let Some(mut sink) = sink {
            sink.deliver(Signal::OnError(ProtocolViolation::NonPositiveRequest.into()));
        }
    }
}

/// Delivers `on_subscribe` and nothing else, unless `request(0)` breaks the protocol.
pub(crate) struct Never;

impl<T: Send + 'static> Emitter<T> for Never {
    fn subscribe_sink(&self, mut sink: BoxSink<T>) {
        let subscription = Arc::new(NeverSubscription {
            lifecycle: Lifecycle::new(),
            state: Mutex::new(NeverState {
                sink: None,
                violated: false,
            }),
        });
        let handle: SubscriptionRef = subscription.clone();
        sink.deliver(Signal::OnSubscribe(handle));

        let mut state = subscription.state.lock();
        if state.violated {
            drop(state);
            sink.deliver(Signal::OnError(ProtocolViolation::NonPositiveRequest.into()));
        } else if subscription.lifecycle.is_active() {
            state.sink = Some(sink);
        }
    }

    fn strategy(&self) -> ExecutionStrategy {
        ExecutionStrategy::offload_none()
    }
}

/// Asks `factory` for a new source on every subscription.
///
/// The strategy of the produced source is unknown until subscribe, so none is reported.
pub(crate) struct Defer<T, F> {
    factory: F,
    _marker: PhantomData<fn() -> T>,
}

impl<T, F> Defer<T, F>
where
    F: Fn() -> EmitterRef<T> + Send + Sync + 'static,
{
    pub(crate) fn new(factory: F) -> Self {
        Self {
            factory,
            _marker: PhantomData,
        }
    }
}

impl<T, F> Emitter<T> for Defer<T, F>
where
    T: Send + 'static,
    F: Fn() -> EmitterRef<T> + Send + Sync + 'static,
{
    fn subscribe_sink(&self, sink: BoxSink<T>) {
        (self.factory)().subscribe_sink(sink);
    }

    fn strategy(&self) -> ExecutionStrategy {
        ExecutionStrategy::offload_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::Sink;

    type Log = Arc<Mutex<Vec<String>>>;

    struct Recording {
        log: Log,
        handle: Arc<Mutex<Option<SubscriptionRef>>>,
        request_on_subscribe: Option<u64>,
    }

    impl Sink<i32> for Recording {
        fn deliver(&mut self, signal: Signal<i32>) {
            let entry = match signal {
                Signal::OnSubscribe(s) => {
                    *self.handle.lock() = Some(Arc::clone(&s));
                    if let Some(n) = self.request_on_subscribe {
                        s.request(n);
                    }
                    "subscribe".to_string()
                }
                Signal::OnError(e) => format!("error {}", e.as_label()),
                other => other.kind().as_label().to_string(),
            };
            self.log.lock().push(entry);
        }
    }

    fn never(request_on_subscribe: Option<u64>) -> (Log, SubscriptionRef) {
        let log = Log::default();
        let handle = Arc::new(Mutex::new(None));
        Emitter::<i32>::subscribe_sink(
            &Never,
            Box::new(Recording {
                log: Arc::clone(&log),
                handle: Arc::clone(&handle),
                request_on_subscribe,
            }),
        );
        let subscription = handle.lock().clone().unwrap();
        (log, subscription)
    }

    #[test]
    fn test_never_ignores_positive_demand() {
        let (log, subscription) = never(Some(3));
        subscription.request(10);
        assert_eq!(*log.lock(), vec!["subscribe"]);
    }

    #[test]
    fn test_never_fails_on_request_zero() {
        let (log, subscription) = never(None);
        subscription.request(0);
        subscription.request(0);
        assert_eq!(
            *log.lock(),
            vec!["subscribe", "error signal_protocol_violation"]
        );
    }

    #[test]
    fn test_never_reports_request_zero_made_during_on_subscribe() {
        let (log, _subscription) = never(Some(0));
        assert_eq!(
            *log.lock(),
            vec!["subscribe", "error signal_protocol_violation"]
        );
    }

    #[test]
    fn test_never_stays_silent_after_cancel() {
        let (log, subscription) = never(None);
        subscription.cancel();
        subscription.request(0);
        assert_eq!(*log.lock(), vec!["subscribe"]);
    }

    #[test]
    fn test_produce_delivers_outcome() {
        let log = Log::default();
        let handle = Arc::new(Mutex::new(None));
        Produce::<i32, _>::new(|| Ok(Some(7))).subscribe_sink(Box::new(Recording {
            log: Arc::clone(&log),
            handle,
            request_on_subscribe: None,
        }));
        assert_eq!(*log.lock(), vec!["subscribe", "on_complete"]);
    }
}
