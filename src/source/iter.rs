//! # Stream over a cloneable iterable.
//!
//! Emission is demand-driven: whoever raises demand or cancels while nobody is
//! emitting becomes the emitter ("work in progress" counter), so `on_next`
//! runs on the thread that requested and never overlaps.
//!
//! ## Rules
//! - Completion needs no demand: an exhausted iterator completes immediately.
//! - `request(0)` fails the subscription with `Protocol(NonPositiveRequest)`.
//! - The sink is released on terminal and on cancel.

use std::iter::Peekable;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::delivery::{BoxSink, Emitter, Signal};
use crate::error::{ProtocolViolation, SignalError};
use crate::strategy::ExecutionStrategy;
use crate::subscriber::{Cancellable, Demand, Lifecycle, Subscription, SubscriptionRef};

pub(crate) struct FromIter<I> {
    items: I,
}

impl<I> FromIter<I> {
    pub(crate) fn new(items: I) -> Self {
        Self { items }
    }
}

impl<I> Emitter<I::Item> for FromIter<I>
where
    I: IntoIterator + Clone + Send + Sync + 'static,
    I::IntoIter: Send + 'static,
    I::Item: Send + 'static,
{
    fn subscribe_sink(&self, mut sink: BoxSink<I::Item>) {
        let subscription = Arc::new(IterSubscription {
            state: Mutex::new(IterState {
                items: self.items.clone().into_iter().peekable(),
                sink: None,
            }),
            demand: Demand::new(),
            // Held by this call until the sink is installed.
            wip: AtomicUsize::new(1),
            lifecycle: Lifecycle::new(),
            bad_request: AtomicBool::new(false),
        });

        let handle: SubscriptionRef = subscription.clone();
        sink.deliver(Signal::OnSubscribe(handle));
        subscription.state.lock().sink = Some(sink);
        subscription.drain();
    }

    fn strategy(&self) -> ExecutionStrategy {
        ExecutionStrategy::offload_none()
    }
}

struct IterState<It: Iterator> {
    items: Peekable<It>,
    sink: Option<BoxSink<It::Item>>,
}

struct IterSubscription<It: Iterator> {
    state: Mutex<IterState<It>>,
    demand: Demand,
    wip: AtomicUsize,
    lifecycle: Lifecycle,
    bad_request: AtomicBool,
}

impl<It> IterSubscription<It>
where
    It: Iterator + Send + 'static,
    It::Item: Send + 'static,
{
    fn schedule(&self) {
        if self.wip.fetch_add(1, Ordering::AcqRel) == 0 {
            self.drain();
        }
    }

    /// Caller owns one unit of `wip`.
    fn drain(&self) {
        let mut missed = 1;
        loop {
            {
                let mut state = self.state.lock();
                self.emit(&mut state);
            }
            missed = self.wip.fetch_sub(missed, Ordering::AcqRel) - missed;
            if missed == 0 {
                return;
            }
        }
    }

    fn emit(&self, state: &mut IterState<It>) {
        let Some(mut sink) = state.sink.take() else {
            return;
        };
        loop {
            if self.lifecycle.is_cancelled() {
                return;
            }
            if self.bad_request.load(Ordering::Acquire) {
                if self.lifecycle.try_terminate() {
                    debug!("request(0) received; failing stream");
                    let error = SignalError::Protocol(ProtocolViolation::NonPositiveRequest);
                    sink.deliver(Signal::OnError(error));
                }
                return;
            }
            if state.items.peek().is_none() {
                if self.lifecycle.try_terminate() {
                    sink.deliver(Signal::OnComplete);
                }
                return;
            }
            if !self.demand.try_take() {
                state.sink = Some(sink);
                return;
            }
            if let Some(item) = state.items.next() {
                sink.deliver(Signal::OnNext(item));
            }
        }
    }
}

impl<It> Cancellable for IterSubscription<It>
where
    It: Iterator + Send + 'static,
    It::Item: Send + 'static,
{
    fn cancel(&self) {
        if self.lifecycle.try_cancel() {
            self.schedule();
        }
    }
}

impl<It> Subscription for IterSubscription<It>
where
    It: Iterator + Send + 'static,
    It::Item: Send + 'static,
{
    fn request(&self, n: u64) {
        if n == 0 {
            self.bad_request.store(true, Ordering::Release);
        } else {
            self.demand.add(n);
        }
        self.schedule();
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
        request_on_subscribe: u64,
    }

    impl Sink<u32> for Recording {
        fn deliver(&mut self, signal: Signal<u32>) {
            match signal {
                Signal::OnSubscribe(s) => {
                    self.log.lock().push("subscribe".into());
                    *self.handle.lock() = Some(Arc::clone(&s));
                    if self.request_on_subscribe > 0 {
                        s.request(self.request_on_subscribe);
                    }
                }
                Signal::OnNext(v) => self.log.lock().push(format!("next {v}")),
                Signal::OnComplete => self.log.lock().push("complete".into()),
                Signal::OnError(e) => self.log.lock().push(format!("error {}", e.as_label())),
                Signal::OnSuccess(_) => unreachable!(),
            }
        }
    }

    fn subscribe(items: Vec<u32>, initial: u64) -> (Log, SubscriptionRef) {
        let log = Log::default();
        let handle = Arc::new(Mutex::new(None));
        FromIter::new(items).subscribe_sink(Box::new(Recording {
            log: Arc::clone(&log),
            handle: Arc::clone(&handle),
            request_on_subscribe: initial,
        }));
        let subscription = handle.lock().clone().unwrap();
        (log, subscription)
    }

    #[test]
    fn test_emits_only_what_was_requested() {
        let (log, subscription) = subscribe(vec![1, 2, 3], 2);
        assert_eq!(*log.lock(), vec!["subscribe", "next 1", "next 2"]);

        subscription.request(5);
        assert_eq!(
            *log.lock(),
            vec!["subscribe", "next 1", "next 2", "next 3", "complete"]
        );
    }

    #[test]
    fn test_empty_completes_without_demand() {
        let (log, _subscription) = subscribe(vec![], 0);
        assert_eq!(*log.lock(), vec!["subscribe", "complete"]);
    }

    #[test]
    fn test_request_zero_fails() {
        let (log, subscription) = subscribe(vec![1, 2], 0);
        subscription.request(0);
        subscription.request(1);
        assert_eq!(
            *log.lock(),
            vec!["subscribe", "error signal_protocol_violation"]
        );
    }

    #[test]
    fn test_cancel_stops_emission() {
        let (log, subscription) = subscribe(vec![1, 2, 3], 1);
        subscription.cancel();
        subscription.request(10);
        assert_eq!(*log.lock(), vec!["subscribe", "next 1"]);
    }
}
