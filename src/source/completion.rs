//! # `Completion`: work that finishes or fails without a value.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use super::adapt::Retype;
use super::bridge::{self, OneshotSubscriber};
use super::concat::ConcatWith;
use super::hooks::{Hook, Peek};
use super::produce::{Defer, Never, Produce};
use super::single::Single;
use super::stream::Stream;
use crate::delivery::{BoxSink, CompletionSink, Emitter, EmitterRef, Forwarder};
use crate::error::SignalError;
use crate::executor::ExecutorRef;
use crate::gate::{Always, OffloadGate};
use crate::offload::{gate_ref, Offload, OffloadPlan};
use crate::strategy::{ExecutionContext, ExecutionStrategy, StrategyInfluencer};
use crate::subscriber::CompletionSubscriber;

/// Custom completion source, wrapped with [`Completion::new`].
///
/// ### Implementation requirements
/// - Call `on_subscribe` exactly once, before the terminal callback.
/// - Deliver exactly one of `on_complete` / `on_error`, unless cancelled first.
pub trait CompletionSource: Send + Sync + 'static {
    fn subscribe(&self, subscriber: Box<dyn CompletionSubscriber>);

    /// Offloads this source itself requires. Default: none.
    fn strategy(&self) -> ExecutionStrategy {
        ExecutionStrategy::offload_none()
    }
}

struct FromCompletionSource<S>(S);

impl<S: CompletionSource> Emitter<()> for FromCompletionSource<S> {
    fn subscribe_sink(&self, sink: BoxSink<()>) {
        self.0.subscribe(Box::new(Forwarder::new(sink)));
    }

    fn strategy(&self) -> ExecutionStrategy {
        self.0.strategy()
    }
}

/// A cold source that completes or fails, without a value.
///
/// # Example
/// ```
/// use sigflow::{Completion, ConcatWith, Single};
///
/// let flushed_then_read = Completion::completed().concat_with(Single::succeeded("row"));
/// assert_eq!(futures::executor::block_on(flushed_then_read.to_future()), Ok("row"));
/// ```
#[derive(Clone)]
pub struct Completion {
    emitter: EmitterRef<()>,
}

impl Completion {
    /// Wraps a custom source.
    pub fn new(source: impl CompletionSource) -> Self {
        Self::from_emitter(FromCompletionSource(source))
    }

    pub(crate) fn from_emitter(emitter: impl Emitter<()>) -> Self {
        Self {
            emitter: Arc::new(emitter),
        }
    }

    pub(crate) fn emitter(&self) -> EmitterRef<()> {
        Arc::clone(&self.emitter)
    }

    /// The same signals, seen as a source of `T` that never emits a value.
    pub(crate) fn retype<T: Send + 'static>(&self) -> EmitterRef<T> {
        Arc::new(Retype::new(self.emitter()))
    }

    /// Starts a subscription delivering to `subscriber`.
    pub fn subscribe(&self, subscriber: impl CompletionSubscriber) {
        self.emitter
            .subscribe_sink(Box::new(CompletionSink::new(Box::new(subscriber))));
    }

    /// Union of every offload declared along this chain.
    pub fn strategy(&self) -> ExecutionStrategy {
        self.emitter.strategy()
    }

    // === Factories ===

    /// Completes right after `on_subscribe`.
    pub fn completed() -> Self {
        Self::from_emitter(Produce::new(|| Ok(None)))
    }

    /// Fails with `error` right after `on_subscribe`.
    pub fn failed(error: SignalError) -> Self {
        Self::from_emitter(Produce::new(move || Err(error.clone())))
    }

    /// Runs `f` on every subscription, on the subscribing thread.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn() -> Result<(), SignalError> + Send + Sync + 'static,
    {
        Self::from_emitter(Produce::new(move || f().map(|()| None)))
    }

    /// Never terminates.
    pub fn never() -> Self {
        Self::from_emitter(Never)
    }

    /// Builds a fresh completion for every subscription.
    pub fn defer<F>(factory: F) -> Self
    where
        F: Fn() -> Completion + Send + Sync + 'static,
    {
        Self::from_emitter(Defer::new(move || factory().emitter))
    }

    // === Offloading ===

    /// Offloads `subscribe` and `cancel` to `executor`.
    #[must_use]
    pub fn subscribe_on(&self, executor: ExecutorRef) -> Self {
        self.subscribe_on_when(executor, Always)
    }

    #[must_use]
    pub fn subscribe_on_when(&self, executor: ExecutorRef, gate: impl OffloadGate) -> Self {
        self.offload_with(ExecutionStrategy::offload_upstream(), executor, gate)
    }

    /// Offloads `on_subscribe` and the terminal signal to `executor`.
    #[must_use]
    pub fn publish_on(&self, executor: ExecutorRef) -> Self {
        self.publish_on_when(executor, Always)
    }

    #[must_use]
    pub fn publish_on_when(&self, executor: ExecutorRef, gate: impl OffloadGate) -> Self {
        self.offload_with(ExecutionStrategy::offload_downstream(), executor, gate)
    }

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

    #[must_use]
    pub fn offload_in(&self, context: &ExecutionContext) -> Self {
        let plan = OffloadPlan::unconditional(context.strategy(), Arc::clone(context.executor()));
        Self::from_emitter(Offload::new(self.emitter(), plan))
    }

    // === Side effects ===

    #[must_use]
    pub fn before_subscribe(&self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.peek(Hook::Subscribe(Arc::new(f)))
    }

    #[must_use]
    pub fn before_complete(&self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.peek(Hook::Complete(Arc::new(f)))
    }

    #[must_use]
    pub fn before_error(&self, f: impl Fn(&SignalError) + Send + Sync + 'static) -> Self {
        self.peek(Hook::Error(Arc::new(f)))
    }

    #[must_use]
    pub fn before_cancel(&self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.peek(Hook::Cancel(Arc::new(f)))
    }

    #[must_use]
    pub fn before_finally(&self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.peek(Hook::Finally(Arc::new(f)))
    }

    fn peek(&self, hook: Hook<()>) -> Self {
        Self::from_emitter(Peek::new(self.emitter(), hook))
    }

    // === Conversions ===

    /// Succeeds with a clone of `value` once this completes.
    pub fn to_single<T>(&self, value: T) -> Single<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.concat_with(Single::succeeded(value))
    }

    /// An empty stream terminating like this completion.
    pub fn to_stream<T: Send + 'static>(&self) -> Stream<T> {
        Stream::from_emitter(Retype::new(self.emitter()))
    }

    /// Subscribes now and resolves with the outcome.
    ///
    /// Dropping the future cancels the subscription.
    pub fn to_future(&self) -> impl Future<Output = Result<(), SignalError>> + Send + 'static {
        let (subscriber, outcome) = OneshotSubscriber::new();
        self.subscribe(subscriber);
        bridge::await_outcome(outcome)
    }
}

impl StrategyInfluencer for Completion {
    fn required_offloads(&self) -> ExecutionStrategy {
        self.strategy()
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("strategy", &self.strategy())
            .finish_non_exhaustive()
    }
}
