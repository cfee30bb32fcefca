//! # `Stream<T>`: zero or more elements under backpressure.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use super::adapt::{Collect, IgnoreElements};
use super::completion::Completion;
use super::hooks::{Hook, Peek};
use super::iter::FromIter;
use super::produce::{Defer, Never, Produce};
use super::single::Single;
use crate::delivery::{Emitter, EmitterRef, Forwarder, StreamSink};
use crate::error::SignalError;
use crate::executor::ExecutorRef;
use crate::gate::{Always, OffloadGate};
use crate::offload::{gate_ref, Offload, OffloadPlan};
use crate::strategy::{ExecutionContext, ExecutionStrategy, StrategyInfluencer};
use crate::subscriber::StreamSubscriber;

/// Custom stream implementation, wrapped with [`Stream::new`].
///
/// ### Implementation requirements
/// - Call `on_subscribe` exactly once, before any other callback.
/// - Never emit beyond the demand requested through the subscription.
/// - Never call the subscriber concurrently; at most one terminal callback.
/// - Answer `request(0)` with `on_error(Protocol(NonPositiveRequest))`.
pub trait StreamSource<T>: Send + Sync + 'static {
    fn subscribe(&self, subscriber: Box<dyn StreamSubscriber<T>>);

    /// Offloads this source itself requires. Default: none.
    fn strategy(&self) -> ExecutionStrategy {
        ExecutionStrategy::offload_none()
    }
}

struct FromStreamSource<S>(S);

impl<T, S> Emitter<T> for FromStreamSource<S>
where
    T: Send + 'static,
    S: StreamSource<T>,
{
    fn subscribe_sink(&self, sink: crate::delivery::BoxSink<T>) {
        self.0.subscribe(Box::new(Forwarder::new(sink)));
    }

    fn strategy(&self) -> ExecutionStrategy {
        self.0.strategy()
    }
}

/// A cold, unicast source of zero or more elements followed by one terminal signal.
///
/// Cheap to clone; every [`subscribe`](Self::subscribe) starts an independent subscription.
///
/// # Example
/// ```
/// use sigflow::Stream;
///
/// let checked = Stream::from_iter(vec![1, 2, 3]).before_on_next(|n| assert!(*n > 0));
/// let items = futures::executor::block_on(checked.to_future()).unwrap();
/// assert_eq!(items, vec![1, 2, 3]);
/// ```
pub struct Stream<T> {
    emitter: EmitterRef<T>,
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Self {
            emitter: Arc::clone(&self.emitter),
        }
    }
}

impl<T: Send + 'static> Stream<T> {
    /// Wraps a custom source.
    pub fn new(source: impl StreamSource<T>) -> Self {
        Self::from_emitter(FromStreamSource(source))
    }

    pub(crate) fn from_emitter(emitter: impl Emitter<T>) -> Self {
        Self {
            emitter: Arc::new(emitter),
        }
    }

    pub(crate) fn emitter(&self) -> EmitterRef<T> {
        Arc::clone(&self.emitter)
    }

    /// Starts a subscription delivering to `subscriber`.
    pub fn subscribe(&self, subscriber: impl StreamSubscriber<T>) {
        self.emitter
            .subscribe_sink(Box::new(StreamSink::new(Box::new(subscriber))));
    }

    /// Union of every offload declared along this chain.
    pub fn strategy(&self) -> ExecutionStrategy {
        self.emitter.strategy()
    }

    // === Factories ===

    /// Emits the items of `items`, honoring demand, then completes.
    ///
    /// The iterable is cloned for every subscription.
    #[allow(clippy::should_implement_trait)]
    pub fn from_iter<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T> + Clone + Send + Sync + 'static,
        I::IntoIter: Send + 'static,
    {
        Self::from_emitter(FromIter::new(items))
    }

    /// Completes without emitting.
    pub fn empty() -> Self {
        Self::from_emitter(Produce::new(|| Ok(None)))
    }

    /// Fails with `error` right after `on_subscribe`.
    pub fn failed(error: SignalError) -> Self {
        Self::from_emitter(Produce::new(move || Err(error.clone())))
    }

    /// Never emits and never terminates.
    pub fn never() -> Self {
        Self::from_emitter(Never)
    }

    /// Builds a fresh stream for every subscription.
    pub fn defer<F>(factory: F) -> Self
    where
        F: Fn() -> Stream<T> + Send + Sync + 'static,
    {
        Self::from_emitter(Defer::new(move || factory().emitter))
    }

    // === Offloading ===

    /// Offloads `subscribe`, `request` and `cancel` to `executor`.
    #[must_use]
    pub fn subscribe_on(&self, executor: ExecutorRef) -> Self {
        self.subscribe_on_when(executor, Always)
    }

    /// Like [`subscribe_on`](Self::subscribe_on), consulting `gate` at every decision point.
    #[must_use]
    pub fn subscribe_on_when(&self, executor: ExecutorRef, gate: impl OffloadGate) -> Self {
        self.offload_with(ExecutionStrategy::offload_upstream(), executor, gate)
    }

    /// Offloads `on_subscribe`, `on_next`, `on_complete` and `on_error` to `executor`.
    #[must_use]
    pub fn publish_on(&self, executor: ExecutorRef) -> Self {
        self.publish_on_when(executor, Always)
    }

    /// Like [`publish_on`](Self::publish_on), consulting `gate` at every decision point.
    #[must_use]
    pub fn publish_on_when(&self, executor: ExecutorRef, gate: impl OffloadGate) -> Self {
        self.offload_with(ExecutionStrategy::offload_downstream(), executor, gate)
    }

    /// Offloads exactly the signals of `strategy` to `executor`, subject to `gate`.
    #[must_use]
    pub fn offload_with(
        &self,
        strategy: ExecutionStrategy,
        executor: ExecutorRef,
        gate: impl OffloadGate,
    ) -> Self {
        let plan = OffloadPlan::new(strategy, executor, gate_ref(gate));
        Self::from_emitter(Offload::new(self.emitter(), plan))
    }

    /// Offloads with the executor and strategy of `context`.
    #[must_use]
    pub fn offload_in(&self, context: &ExecutionContext) -> Self {
        let plan = OffloadPlan::unconditional(context.strategy(), Arc::clone(context.executor()));
        Self::from_emitter(Offload::new(self.emitter(), plan))
    }

    // === Side effects ===

    /// Runs `f` on every subscribe, before the source is subscribed.
    #[must_use]
    pub fn before_subscribe(&self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.peek(Hook::Subscribe(Arc::new(f)))
    }

    /// Runs `f` on every element, before it is delivered.
    #[must_use]
    pub fn before_on_next(&self, f: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.peek(Hook::Next(Arc::new(f)))
    }

    /// Runs `f` before `on_complete` is delivered.
    #[must_use]
    pub fn before_complete(&self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.peek(Hook::Complete(Arc::new(f)))
    }

    /// Runs `f` before `on_error` is delivered.
    #[must_use]
    pub fn before_error(&self, f: impl Fn(&SignalError) + Send + Sync + 'static) -> Self {
        self.peek(Hook::Error(Arc::new(f)))
    }

    /// Runs `f` once, on the first `cancel`, before the source sees it.
    #[must_use]
    pub fn before_cancel(&self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.peek(Hook::Cancel(Arc::new(f)))
    }

    /// Runs `f` once per subscription, on the terminal signal or the first `cancel`.
    #[must_use]
    pub fn before_finally(&self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.peek(Hook::Finally(Arc::new(f)))
    }

    fn peek(&self, hook: Hook<T>) -> Self {
        Self::from_emitter(Peek::new(self.emitter(), hook))
    }

    // === Conversions ===

    /// Drops every element and keeps the outcome.
    pub fn ignore_elements(&self) -> Completion {
        Completion::from_emitter(IgnoreElements::new(self.emitter()))
    }

    /// Gathers every element into a `Vec`, requesting without bound.
    pub fn collect(&self) -> Single<Vec<T>> {
        Single::from_emitter(Collect::new(self.emitter()))
    }

    /// Subscribes now and resolves with every element once the stream completes.
    ///
    /// Dropping the future cancels the subscription.
    pub fn to_future(&self) -> impl Future<Output = Result<Vec<T>, SignalError>> + Send + 'static {
        self.collect().to_future()
    }
}

impl<T: Send + 'static> StrategyInfluencer for Stream<T> {
    fn required_offloads(&self) -> ExecutionStrategy {
        self.strategy()
    }
}

impl<T: Send + 'static> fmt::Debug for Stream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("strategy", &self.strategy())
            .finish_non_exhaustive()
    }
}
