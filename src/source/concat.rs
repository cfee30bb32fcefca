//! # Sequencing heterogeneous sources.
//!
//! [`ConcatWith`] appends one source to another. The next source is subscribed
//! only once the previous one terminated successfully, so the completion-time
//! effects of constituent `K` are observed before `K + 1` is even subscribed.
//!
//! ## Architecture
//! ```text
//! downstream ◄── ConcatSink(first) ◄── first constituent
//!      ▲               │ on success: hand the downstream sink over
//!      │               ▼
//!      └────── ConcatSink(next)  ◄── next constituent (subscribed now)
//!
//! downstream.request / cancel ──► ConcatShared ──► active constituent only
//! ```
//!
//! ## Rules
//! - `on_error` of any constituent ends the composite; later ones are never subscribed.
//! - Cancel reaches only the active constituent; after it, nothing else is subscribed.
//! - Demand not yet satisfied by the first constituent is requested from the next one.
//! - Under a stream composite a single's value waits for demand like any element.
//!
//! ## Result variants
//! | self \ next   | Stream<T> | Single<T> | Completion |
//! |---------------|-----------|-----------|------------|
//! | Stream<T>     | Stream<T> | Stream<T> | Stream<T>  |
//! | Single<T>     | Stream<T> | Stream<T> | Single<T>  |
//! | Completion    | Stream<T> | Single<T> | Completion |

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use super::adapt::{Collapse, ScalarDemand};
use super::{Completion, Single, Stream};
use crate::delivery::{BoxSink, Emitter, EmitterRef, Signal, Sink};
use crate::strategy::ExecutionStrategy;
use crate::subscriber::{Cancellable, Demand, Subscription, SubscriptionRef};

/// Appends a source of any variant to `self`.
///
/// # Example
/// ```
/// use sigflow::{Completion, ConcatWith, Single, Stream};
///
/// let all = Stream::from_iter(vec![1, 2])
///     .concat_with(Single::succeeded(3))
///     .concat_with(Completion::completed());
/// assert_eq!(futures::executor::block_on(all.to_future()), Ok(vec![1, 2, 3]));
/// ```
pub trait ConcatWith<Next> {
    type Output;

    /// Subscribes to `next` only after `self` terminates successfully.
    fn concat_with(&self, next: Next) -> Self::Output;
}

// === Stream + _ ===

impl<T: Send + 'static> ConcatWith<Stream<T>> for Stream<T> {
    type Output = Stream<T>;

    fn concat_with(&self, next: Stream<T>) -> Stream<T> {
        Stream::from_emitter(Concat::new(self.emitter(), next.emitter()))
    }
}

impl<T: Send + 'static> ConcatWith<Single<T>> for Stream<T> {
    type Output = Stream<T>;

    fn concat_with(&self, next: Single<T>) -> Stream<T> {
        Stream::from_emitter(Concat::new(self.emitter(), demanded(&next)))
    }
}

impl<T: Send + 'static> ConcatWith<Completion> for Stream<T> {
    type Output = Stream<T>;

    fn concat_with(&self, next: Completion) -> Stream<T> {
        Stream::from_emitter(Concat::new(self.emitter(), next.retype()))
    }
}

// === Single + _ ===

impl<T: Send + 'static> ConcatWith<Stream<T>> for Single<T> {
    type Output = Stream<T>;

    fn concat_with(&self, next: Stream<T>) -> Stream<T> {
        Stream::from_emitter(Concat::new(demanded(self), next.emitter()))
    }
}

impl<T: Send + 'static> ConcatWith<Single<T>> for Single<T> {
    type Output = Stream<T>;

    fn concat_with(&self, next: Single<T>) -> Stream<T> {
        Stream::from_emitter(Concat::new(demanded(self), demanded(&next)))
    }
}

/// The value is delivered after `next` completes.
impl<T: Send + 'static> ConcatWith<Completion> for Single<T> {
    type Output = Single<T>;

    fn concat_with(&self, next: Completion) -> Single<T> {
        let concat: EmitterRef<T> = Arc::new(Concat::new(self.emitter(), next.retype()));
        Single::from_emitter(Collapse::new(concat))
    }
}

// === Completion + _ ===

impl<T: Send + 'static> ConcatWith<Stream<T>> for Completion {
    type Output = Stream<T>;

    fn concat_with(&self, next: Stream<T>) -> Stream<T> {
        Stream::from_emitter(Concat::new(self.retype(), next.emitter()))
    }
}

impl<T: Send + 'static> ConcatWith<Single<T>> for Completion {
    type Output = Single<T>;

    fn concat_with(&self, next: Single<T>) -> Single<T> {
        let concat: EmitterRef<T> = Arc::new(Concat::new(self.retype(), next.emitter()));
        Single::from_emitter(Collapse::new(concat))
    }
}

impl ConcatWith<Completion> for Completion {
    type Output = Completion;

    fn concat_with(&self, next: Completion) -> Completion {
        Completion::from_emitter(Concat::new(self.emitter(), next.emitter()))
    }
}

fn demanded<T: Send + 'static>(single: &Single<T>) -> EmitterRef<T> {
    Arc::new(ScalarDemand::new(single.emitter()))
}

// === Engine ===

/// `first`, then `next`, as one stream-shaped source.
pub(crate) struct Concat<T> {
    first: EmitterRef<T>,
    next: EmitterRef<T>,
}

impl<T> Concat<T> {
    pub(crate) fn new(first: EmitterRef<T>, next: EmitterRef<T>) -> Self {
        Self { first, next }
    }
}

impl<T: Send + 'static> Emitter<T> for Concat<T> {
    fn subscribe_sink(&self, sink: BoxSink<T>) {
        let shared = Arc::new(ConcatShared {
            state: Mutex::new(ConcatState {
                upstream: None,
                outstanding: 0,
                cancelled: false,
            }),
        });
        self.first.subscribe_sink(Box::new(ConcatSink {
            sink: Some(sink),
            shared,
            next: Some(Arc::clone(&self.next)),
        }));
    }

    fn strategy(&self) -> ExecutionStrategy {
        self.first.strategy().merge(self.next.strategy())
    }
}

struct ConcatState {
    /// Subscription of the active constituent; `None` between constituents.
    upstream: Option<SubscriptionRef>,
    /// Requested downstream and not yet emitted.
    outstanding: u64,
    cancelled: bool,
}

/// The composite's subscription, as seen downstream.
struct ConcatShared {
    state: Mutex<ConcatState>,
}

impl ConcatShared {
    fn emitted_one(&self) {
        let mut state = self.state.lock();
        if state.outstanding != Demand::UNBOUNDED {
            state.outstanding = state.outstanding.saturating_sub(1);
        }
    }
}

impl Cancellable for ConcatShared {
    fn cancel(&self) {
        let upstream = {
            let mut state = self.state.lock();
            state.cancelled = true;
            state.upstream.take()
        };
        if let Some(upstream) = upstream {
            upstream.cancel();
        }
    }
}

impl Subscription for ConcatShared {
    fn request(&self, n: u64) {
        let upstream = {
            let mut state = self.state.lock();
            if state.cancelled {
                return;
            }
            state.outstanding = state.outstanding.saturating_add(n);
            state.upstream.clone()
        };
        // request(0) is passed on; the active constituent reports the violation.
        if let Some(upstream) = upstream {
            upstream.request(n);
        }
    }
}

struct ConcatSink<T> {
    sink: Option<BoxSink<T>>,
    shared: Arc<ConcatShared>,
    /// Present while the first constituent is active.
    next: Option<EmitterRef<T>>,
}

impl<T: Send + 'static> ConcatSink<T> {
    fn forward(&mut self, signal: Signal<T>) {
        if let Some(sink) = self.sink.as_mut() {
            sink.deliver(signal);
        }
    }

    fn on_subscribe(&mut self, upstream: SubscriptionRef) {
        if self.next.is_some() {
            self.shared.state.lock().upstream = Some(upstream);
            let handle: SubscriptionRef = self.shared.clone();
            self.forward(Signal::OnSubscribe(handle));
            return;
        }

        let outstanding = {
            let mut state = self.shared.state.lock();
            if state.cancelled {
                None
            } else {
                state.upstream = Some(Arc::clone(&upstream));
                Some(state.outstanding)
            }
        };
        match outstanding {
            None => upstream.cancel(),
            Some(0) => {}
            Some(n) => upstream.request(n),
        }
    }

    fn on_complete(&mut self) {
        let Some(next) = self.next.take() else {
            self.forward(Signal::OnComplete);
            self.sink = None;
            return;
        };

        let cancelled = {
            let mut state = self.shared.state.lock();
            state.upstream = None;
            state.cancelled
        };
        if cancelled {
            self.sink = None;
            return;
        }
        debug!("constituent completed; subscribing to the next one");
        next.subscribe_sink(Box::new(ConcatSink {
            sink: self.sink.take(),
            shared: Arc::clone(&self.shared),
            next: None,
        }));
    }
}

impl<T: Send + 'static> Sink<T> for ConcatSink<T> {
    fn deliver(&mut self, signal: Signal<T>) {
        match signal {
            Signal::OnSubscribe(upstream) => self.on_subscribe(upstream),
            Signal::OnNext(item) => {
                self.shared.emitted_one();
                self.forward(Signal::OnNext(item));
            }
            Signal::OnSuccess(value) => {
                self.shared.emitted_one();
                self.forward(Signal::OnNext(value));
                self.on_complete();
            }
            Signal::OnComplete => self.on_complete(),
            Signal::OnError(error) => {
                self.forward(Signal::OnError(error));
                self.sink = None;
            }
        }
    }
}
