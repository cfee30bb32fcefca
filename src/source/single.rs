//! # `Single<T>`: exactly one value or one error.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use super::adapt::{IgnoreElements, ScalarDemand};
use super::bridge::{self, OneshotSubscriber};
use super::completion::Completion;
use super::hooks::{Hook, Peek};
use super::produce::{Defer, Never, Produce};
use super::stream::Stream;
use crate::delivery::{BoxSink, Emitter, EmitterRef, Forwarder, SingleSink};
use crate::error::SignalError;
use crate::executor::ExecutorRef;
use crate::gate::{Always, OffloadGate};
use crate::offload::{gate_ref, Offload, OffloadPlan};
use crate::strategy::{ExecutionContext, ExecutionStrategy, StrategyInfluencer};
use crate::subscriber::SingleSubscriber;

/// Custom single-valued source, wrapped with [`Single::new`].
///
/// ### Implementation requirements
/// - Call `on_subscribe` exactly once, before the terminal callback.
/// - Deliver exactly one of `on_success` / `on_error`, unless cancelled first.
pub trait SingleSource<T>: Send + Sync + 'static {
    fn subscribe(&self, subscriber: Box<dyn SingleSubscriber<T>>);

    /// Offloads this source itself requires. Default: none.
    fn strategy(&self) -> ExecutionStrategy {
        ExecutionStrategy::offload_none()
    }
}

struct FromSingleSource<S>(S);

impl<T, S> Emitter<T> for FromSingleSource<S>
where
    T: Send + 'static,
    S: SingleSource<T>,
{
    fn subscribe_sink(&self, sink: BoxSink<T>) {
        self.0.subscribe(Box::new(Forwarder::new(sink)));
    }

    fn strategy(&self) -> ExecutionStrategy {
        self.0.strategy()
    }
}

/// A cold source of exactly one value or one error.
///
/// # Example
/// ```
/// use sigflow::Single;
///
/// let answer = Single::from_fn(|| Ok(6 * 7));
/// assert_eq!(futures::executor::block_on(answer.to_future()), Ok(42));
/// ```
pub struct Single<T> {
    emitter: EmitterRef<T>,
}

impl<T> Clone for Single<T> {
    fn clone(&self) -> Self {
        Self {
            emitter: Arc::clone(&self.emitter),
        }
    }
}

impl<T: Send + 'static> Single<T> {
    /// Wraps a custom source.
    pub fn new(source: impl SingleSource<T>) -> Self {
        Self::from_emitter(FromSingleSource(source))
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
    pub fn subscribe(&self, subscriber: impl SingleSubscriber<T>) {
        self.emitter
            .subscribe_sink(Box::new(SingleSink::new(Box::new(subscriber))));
    }

    /// Union of every offload declared along this chain.
    pub fn strategy(&self) -> ExecutionStrategy {
        self.emitter.strategy()
    }

    // === Factories ===

    /// Succeeds with a clone of `value` on every subscription.
    pub fn succeeded(value: T) -> Self
    where
        T: Clone + Sync,
    {
        Self::from_emitter(Produce::new(move || Ok(Some(value.clone()))))
    }

    /// Fails with `error` right after `on_subscribe`.
    pub fn failed(error: SignalError) -> Self {
        Self::from_emitter(Produce::new(move || Err(error.clone())))
    }

    /// Calls `f` on every subscription, on the subscribing thread.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn() -> Result<T, SignalError> + Send + Sync + 'static,
    {
        Self::from_emitter(Produce::new(move || f().map(Some)))
    }

    /// Never terminates.
    pub fn never() -> Self {
        Self::from_emitter(Never)
    }

    /// Builds a fresh single for every subscription.
    pub fn defer<F>(factory: F) -> Self
    where
        F: Fn() -> Single<T> + Send + Sync + 'static,
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

    /// Runs `f` with the value before `on_success` is delivered.
    #[must_use]
    pub fn before_success(&self, f: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.peek(Hook::Success(Arc::new(f)))
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

    fn peek(&self, hook: Hook<T>) -> Self {
        Self::from_emitter(Peek::new(self.emitter(), hook))
    }

    // === Conversions ===

    /// A stream of the value; the value waits for demand.
    pub fn to_stream(&self) -> Stream<T> {
        Stream::from_emitter(ScalarDemand::new(self.emitter()))
    }

    /// Drops the value and keeps the outcome.
    pub fn to_completion(&self) -> Completion {
        Completion::from_emitter(IgnoreElements::new(self.emitter()))
    }

    /// Subscribes now and resolves with the outcome.
    ///
    /// Dropping the future cancels the subscription.
    pub fn to_future(&self) -> impl Future<Output = Result<T, SignalError>> + Send + 'static {
        let (subscriber, outcome) = OneshotSubscriber::new();
        self.subscribe(subscriber);
        bridge::await_outcome(outcome)
    }
}

impl<T: Send + 'static> StrategyInfluencer for Single<T> {
    fn required_offloads(&self) -> ExecutionStrategy {
        self.strategy()
    }
}

impl<T: Send + 'static> fmt::Debug for Single<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Single")
            .field("strategy", &self.strategy())
            .finish_non_exhaustive()
    }
}
