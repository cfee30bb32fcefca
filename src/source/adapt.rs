//! # Shape adapters between source variants.
//!
//! | Adapter           | From          | To                  |
//! |-------------------|---------------|---------------------|
//! | [`ScalarDemand`]  | single        | stream (value waits for demand) |
//! | [`Retype`]        | completion    | valueless source of any `T`     |
//! | [`IgnoreElements`]| stream/single | completion                      |
//! | [`Collect`]       | stream        | single of `Vec<T>`              |
//! | [`Collapse`]      | stream of ≤ 1 | single (`NoValue` if empty)     |

use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::delivery::{BoxSink, Emitter, EmitterRef, Signal, Sink};
use crate::error::{ProtocolViolation, SignalError};
use crate::strategy::ExecutionStrategy;
use crate::subscriber::{Cancellable, Demand, Subscription, SubscriptionRef};

// === ScalarDemand ===

/// Presents a single-valued source as a stream: the value is emitted only once
/// the subscriber has requested, then the stream completes.
pub(crate) struct ScalarDemand<T> {
    source: EmitterRef<T>,
}

impl<T> ScalarDemand<T> {
    pub(crate) fn new(source: EmitterRef<T>) -> Self {
        Self { source }
    }
}

impl<T: Send + 'static> Emitter<T> for ScalarDemand<T> {
    fn subscribe_sink(&self, sink: BoxSink<T>) {
        let shared = Arc::new(Scalar {
            state: Mutex::new(ScalarState {
                sink: Some(sink),
                value: None,
                requested: false,
                done: false,
                upstream: None,
                pending: None,
            }),
        });
        self.source.subscribe_sink(Box::new(ScalarSink { shared }));
    }

    fn strategy(&self) -> ExecutionStrategy {
        self.source.strategy()
    }
}

struct ScalarState<T> {
    sink: Option<BoxSink<T>>,
    value: Option<T>,
    requested: bool,
    done: bool,
    upstream: Option<SubscriptionRef>,
    /// Terminal raised while the sink was out delivering `OnSubscribe`.
    pending: Option<Signal<T>>,
}

struct Scalar<T> {
    state: Mutex<ScalarState<T>>,
}

impl<T: Send + 'static> Scalar<T> {
    /// Emits the value and completes, once both the value and demand are there.
    fn try_emit(&self) {
        let (mut sink, value) = {
            let mut state = self.state.lock();
            if state.done || !state.requested || state.value.is_none() || state.sink.is_none() {
                return;
            }
            state.done = true;
            state.upstream = None;
            match (state.sink.take(), state.value.take()) {
                (Some(sink), Some(value)) => (sink, value),
                _ => return,
            }
        };
        sink.deliver(Signal::OnNext(value));
        sink.deliver(Signal::OnComplete);
    }

    fn finish(&self, signal: Signal<T>) {
        let sink = {
            let mut state = self.state.lock();
            if state.done {
                return;
            }
            state.done = true;
            state.upstream = None;
            match state.sink.take() {
                Some(sink) => sink,
                None => {
                    state.pending = Some(signal);
                    return;
                }
            }
        };
        let mut sink = sink;
        sink.deliver(signal);
    }
}

impl<T: Send + 'static> Cancellable for Scalar<T> {
    fn cancel(&self) {
        let upstream = {
            let mut state = self.state.lock();
            state.done = true;
            state.sink = None;
            state.value = None;
            state.pending = None;
            state.upstream.take()
        };
        if let Some(upstream) = upstream {
            upstream.cancel();
        }
    }
}

impl<T: Send + 'static> Subscription for Scalar<T> {
    fn request(&self, n: u64) {
        if n == 0 {
            let upstream = self.state.lock().upstream.clone();
            if let Some(upstream) = upstream {
                upstream.cancel();
            }
            self.finish(Signal::OnError(ProtocolViolation::NonPositiveRequest.into()));
            return;
        }
        self.state.lock().requested = true;
        self.try_emit();
    }
}

struct ScalarSink<T> {
    shared: Arc<Scalar<T>>,
}

impl<T: Send + 'static> Sink<T> for ScalarSink<T> {
    fn deliver(&mut self, signal: Signal<T>) {
        match signal {
            Signal::OnSubscribe(upstream) => {
                let sink = {
                    let mut state = self.shared.state.lock();
                    state.upstream = Some(upstream);
                    state.sink.take()
                };
                // Not under the lock: the subscriber may request right away.
                if let Some(mut sink) = sink {
                    let handle: SubscriptionRef = self.shared.clone();
                    sink.deliver(Signal::OnSubscribe(handle));
                    let mut state = self.shared.state.lock();
                    if !state.done {
                        state.sink = Some(sink);
                        drop(state);
                        self.shared.try_emit();
                    } else if let Some(terminal) = state.pending.take() {
                        drop(state);
                        sink.deliver(terminal);
                    }
                }
            }
            Signal::OnSuccess(value) | Signal::OnNext(value) => {
                self.shared.state.lock().value = Some(value);
                self.shared.try_emit();
            }
            Signal::OnComplete => {
                // Valueless completion; a value already stored waits for demand.
                if self.shared.state.lock().value.is_none() {
                    self.shared.finish(Signal::OnComplete);
                }
            }
            Signal::OnError(error) => self.shared.finish(Signal::OnError(error)),
        }
    }
}

// === Retype ===

/// A completion seen as a valueless source of `T`.
pub(crate) struct Retype<T> {
    source: EmitterRef<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Retype<T> {
    pub(crate) fn new(source: EmitterRef<()>) -> Self {
        Self {
            source,
            _marker: PhantomData,
        }
    }
}

impl<T: Send + 'static> Emitter<T> for Retype<T> {
    fn subscribe_sink(&self, sink: BoxSink<T>) {
        self.source.subscribe_sink(Box::new(RetypeSink { sink }));
    }

    fn strategy(&self) -> ExecutionStrategy {
        self.source.strategy()
    }
}

struct RetypeSink<T> {
    sink: BoxSink<T>,
}

impl<T: Send + 'static> Sink<()> for RetypeSink<T> {
    fn deliver(&mut self, signal: Signal<()>) {
        let signal = match signal {
            Signal::OnSubscribe(subscription) => Signal::OnSubscribe(subscription),
            Signal::OnNext(()) => return,
            Signal::OnSuccess(()) | Signal::OnComplete => Signal::OnComplete,
            Signal::OnError(error) => Signal::OnError(error),
        };
        self.sink.deliver(signal);
    }
}

// === IgnoreElements ===

/// Drops values; requests without bound so a stream can run to its end.
pub(crate) struct IgnoreElements<T> {
    source: EmitterRef<T>,
}

impl<T> IgnoreElements<T> {
    pub(crate) fn new(source: EmitterRef<T>) -> Self {
        Self { source }
    }
}

impl<T: Send + 'static> Emitter<()> for IgnoreElements<T> {
    fn subscribe_sink(&self, sink: BoxSink<()>) {
        self.source.subscribe_sink(Box::new(IgnoreSink {
            sink,
            _marker: PhantomData,
        }));
    }

    fn strategy(&self) -> ExecutionStrategy {
        self.source.strategy()
    }
}

struct IgnoreSink<T> {
    sink: BoxSink<()>,
    _marker: PhantomData<fn(T)>,
}

impl<T: Send + 'static> Sink<T> for IgnoreSink<T> {
    fn deliver(&mut self, signal: Signal<T>) {
        match signal {
            Signal::OnSubscribe(subscription) => {
                self.sink.deliver(Signal::OnSubscribe(Arc::clone(&subscription)));
                subscription.request(Demand::UNBOUNDED);
            }
            Signal::OnNext(_) => {}
            Signal::OnSuccess(_) | Signal::OnComplete => self.sink.deliver(Signal::OnComplete),
            Signal::OnError(error) => self.sink.deliver(Signal::OnError(error)),
        }
    }
}

// === Collect ===

/// Gathers every element of a stream; succeeds with them on completion.
pub(crate) struct Collect<T> {
    source: EmitterRef<T>,
}

impl<T> Collect<T> {
    pub(crate) fn new(source: EmitterRef<T>) -> Self {
        Self { source }
    }
}

impl<T: Send + 'static> Emitter<Vec<T>> for Collect<T> {
    fn subscribe_sink(&self, sink: BoxSink<Vec<T>>) {
        self.source.subscribe_sink(Box::new(CollectSink {
            sink,
            items: Vec::new(),
        }));
    }

    fn strategy(&self) -> ExecutionStrategy {
        self.source.strategy()
    }
}

struct CollectSink<T> {
    sink: BoxSink<Vec<T>>,
    items: Vec<T>,
}

impl<T: Send + 'static> Sink<T> for CollectSink<T> {
    fn deliver(&mut self, signal: Signal<T>) {
        match signal {
            Signal::OnSubscribe(subscription) => {
                self.sink.deliver(Signal::OnSubscribe(Arc::clone(&subscription)));
                subscription.request(Demand::UNBOUNDED);
            }
            Signal::OnNext(item) => self.items.push(item),
            Signal::OnSuccess(item) => {
                self.items.push(item);
                self.sink.deliver(Signal::OnSuccess(std::mem::take(&mut self.items)));
            }
            Signal::OnComplete => {
                self.sink.deliver(Signal::OnSuccess(std::mem::take(&mut self.items)));
            }
            Signal::OnError(error) => self.sink.deliver(Signal::OnError(error)),
        }
    }
}

// === Collapse ===

/// Turns "at most one element, then complete" into a single-valued outcome.
pub(crate) struct Collapse<T> {
    source: EmitterRef<T>,
}

impl<T> Collapse<T> {
    pub(crate) fn new(source: EmitterRef<T>) -> Self {
        Self { source }
    }
}

impl<T: Send + 'static> Emitter<T> for Collapse<T> {
    fn subscribe_sink(&self, sink: BoxSink<T>) {
        self.source
            .subscribe_sink(Box::new(CollapseSink { sink, value: None }));
    }

    fn strategy(&self) -> ExecutionStrategy {
        self.source.strategy()
    }
}

struct CollapseSink<T> {
    sink: BoxSink<T>,
    value: Option<T>,
}

impl<T: Send + 'static> Sink<T> for CollapseSink<T> {
    fn deliver(&mut self, signal: Signal<T>) {
        match signal {
            Signal::OnNext(value) => self.value = Some(value),
            Signal::OnSuccess(value) => self.sink.deliver(Signal::OnSuccess(value)),
            Signal::OnComplete => match self.value.take() {
                Some(value) => self.sink.deliver(Signal::OnSuccess(value)),
                None => self.sink.deliver(Signal::OnError(SignalError::NoValue)),
            },
            other => self.sink.deliver(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Completion, SignalError, Single, Stream};
    use crate::subscriber::{StreamSubscriber, Subscription, SubscriptionRef};
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default, Clone)]
    struct Log {
        events: Arc<Mutex<Vec<String>>>,
        subscription: Arc<Mutex<Option<SubscriptionRef>>>,
    }

    impl StreamSubscriber<&'static str> for Log {
        fn on_subscribe(&mut self, subscription: SubscriptionRef) {
            *self.subscription.lock() = Some(subscription);
        }
        fn on_next(&mut self, item: &'static str) {
            self.events.lock().push(item.to_string());
        }
        fn on_complete(&mut self) {
            self.events.lock().push("complete".into());
        }
        fn on_error(&mut self, error: SignalError) {
            self.events.lock().push(error.as_label().into());
        }
    }

    #[test]
    fn test_single_as_stream_waits_for_demand() {
        let log = Log::default();
        Single::succeeded("v").to_stream().subscribe(log.clone());
        assert!(log.events.lock().is_empty());

        let subscription = log.subscription.lock().clone().unwrap();
        subscription.request(1);
        assert_eq!(*log.events.lock(), vec!["v", "complete"]);
    }

    #[test]
    fn test_completion_as_stream_is_empty() {
        let log = Log::default();
        Completion::completed().to_stream().subscribe(log.clone());
        assert_eq!(*log.events.lock(), vec!["complete"]);
    }

    #[test]
    fn test_collect_and_ignore() {
        let items = futures::executor::block_on(Stream::from_iter(1..=4).collect().to_future());
        assert_eq!(items, Ok(vec![1, 2, 3, 4]));

        let done = futures::executor::block_on(Stream::from_iter(1..=4).ignore_elements().to_future());
        assert_eq!(done, Ok(()));

        let failed = Single::<u8>::failed(SignalError::failed("x")).to_completion();
        assert!(futures::executor::block_on(failed.to_future()).is_err());
    }
}
