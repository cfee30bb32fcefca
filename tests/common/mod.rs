#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use sigflow::{
    Cancellable, CancellableRef, CompletionSubscriber, Executor, ExecutorConfig, ExecutorRef,
    Lifecycle, RejectedExecution, SignalError, SignalKind, SingleSource, SingleSubscriber,
    StreamSource, StreamSubscriber, Subscription, SubscriptionRef, TokioExecutor, Work,
};
use tokio::runtime::{Builder, Runtime};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

pub const APP: &str = "app";
pub const OFFLOAD: &str = "offload-executor";

pub fn current_thread() -> String {
    thread::current().name().unwrap_or("unnamed").to_string()
}

/// Runs `f` on a fresh thread named [`APP`] and waits for it.
pub fn on_app<R, F>(f: F) -> R
where
    R: Send + 'static,
    F: FnOnce() -> R + Send + 'static,
{
    thread::Builder::new()
        .name(APP.into())
        .spawn(f)
        .expect("spawn app thread")
        .join()
        .expect("app thread panicked")
}

// === Events ===

#[derive(Debug, Clone, PartialEq)]
pub enum Detail {
    None,
    Value(i32),
    Error(SignalError),
}

#[derive(Debug, Clone)]
pub struct Event {
    pub kind: SignalKind,
    pub thread: String,
    pub detail: Detail,
}

impl Event {
    pub fn here(kind: SignalKind, detail: Detail) -> Self {
        Self {
            kind,
            thread: current_thread(),
            detail,
        }
    }

    pub fn on_offload(&self) -> bool {
        self.thread.starts_with(OFFLOAD)
    }

    pub fn on_app(&self) -> bool {
        self.thread == APP
    }
}

pub type EventTx = UnboundedSender<Event>;

/// Receives recorded events with a timeout.
pub struct Probe {
    rx: UnboundedReceiver<Event>,
    rt: Runtime,
}

impl Probe {
    pub fn new() -> (Self, EventTx) {
        let (tx, rx) = unbounded_channel();
        let rt = Builder::new_current_thread()
            .enable_time()
            .build()
            .expect("probe runtime");
        (Self { rx, rt }, tx)
    }

    pub fn next(&mut self) -> Event {
        let rx = &mut self.rx;
        self.rt
            .block_on(async { tokio::time::timeout(Duration::from_secs(5), rx.recv()).await })
            .expect("timed out waiting for an event")
            .expect("every recorder dropped")
    }

    pub fn take(&mut self, n: usize) -> Vec<Event> {
        (0..n).map(|_| self.next()).collect()
    }

    /// Whatever has arrived so far, without waiting.
    pub fn drain_now(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Asserts nothing else arrives for a short while.
    pub fn assert_quiet(&mut self) {
        let rx = &mut self.rx;
        let extra = self
            .rt
            .block_on(async { tokio::time::timeout(Duration::from_millis(100), rx.recv()).await });
        if let Ok(Some(event)) = extra {
            panic!("unexpected event {event:?}");
        }
    }
}

pub fn find(events: &[Event], kind: SignalKind) -> &Event {
    events
        .iter()
        .find(|event| event.kind == kind)
        .unwrap_or_else(|| panic!("no {kind} in {events:?}"))
}

pub fn kinds(events: &[Event]) -> Vec<SignalKind> {
    events.iter().map(|event| event.kind).collect()
}

// === Recorder ===

/// Subscriber of any variant recording every callback with its thread.
pub struct Recorder {
    tx: EventTx,
    initial_request: u64,
    subscription: Arc<Mutex<Option<SubscriptionRef>>>,
    cancellable: Arc<Mutex<Option<CancellableRef>>>,
}

/// Handle to whatever the recorder was given in `on_subscribe`.
#[derive(Clone)]
pub struct Handle {
    subscription: Arc<Mutex<Option<SubscriptionRef>>>,
    cancellable: Arc<Mutex<Option<CancellableRef>>>,
}

impl Handle {
    pub fn request(&self, n: u64) {
        let subscription = self.subscription.lock().clone();
        subscription.expect("stream subscribed").request(n);
    }

    pub fn cancel(&self) {
        let subscription = self.subscription.lock().clone();
        if let Some(subscription) = subscription {
            subscription.cancel();
            return;
        }
        let cancellable = self.cancellable.lock().clone();
        cancellable.expect("subscribed").cancel();
    }
}

impl Recorder {
    pub fn new(tx: EventTx, initial_request: u64) -> (Self, Handle) {
        let subscription = Arc::new(Mutex::new(None));
        let cancellable = Arc::new(Mutex::new(None));
        let handle = Handle {
            subscription: Arc::clone(&subscription),
            cancellable: Arc::clone(&cancellable),
        };
        let recorder = Self {
            tx,
            initial_request,
            subscription,
            cancellable,
        };
        (recorder, handle)
    }

    fn record(&self, kind: SignalKind, detail: Detail) {
        let _ = self.tx.send(Event::here(kind, detail));
    }
}

impl StreamSubscriber<i32> for Recorder {
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        *self.subscription.lock() = Some(Arc::clone(&subscription));
        self.record(SignalKind::OnSubscribe, Detail::None);
        if self.initial_request > 0 {
            subscription.request(self.initial_request);
        }
    }
    fn on_next(&mut self, item: i32) {
        self.record(SignalKind::OnNext, Detail::Value(item));
    }
    fn on_complete(&mut self) {
        self.record(SignalKind::OnComplete, Detail::None);
    }
    fn on_error(&mut self, error: SignalError) {
        self.record(SignalKind::OnError, Detail::Error(error));
    }
}

impl SingleSubscriber<i32> for Recorder {
    fn on_subscribe(&mut self, cancellable: CancellableRef) {
        *self.cancellable.lock() = Some(cancellable);
        self.record(SignalKind::OnSubscribe, Detail::None);
    }
    fn on_success(&mut self, value: i32) {
        self.record(SignalKind::OnComplete, Detail::Value(value));
    }
    fn on_error(&mut self, error: SignalError) {
        self.record(SignalKind::OnError, Detail::Error(error));
    }
}

impl CompletionSubscriber for Recorder {
    fn on_subscribe(&mut self, cancellable: CancellableRef) {
        *self.cancellable.lock() = Some(cancellable);
        self.record(SignalKind::OnSubscribe, Detail::None);
    }
    fn on_complete(&mut self) {
        self.record(SignalKind::OnComplete, Detail::None);
    }
    fn on_error(&mut self, error: SignalError) {
        self.record(SignalKind::OnError, Detail::Error(error));
    }
}

// === Manual sources ===

/// Subscription of a manual source: records `request` and `cancel` with their thread.
struct Recording {
    tx: EventTx,
    lifecycle: Arc<Lifecycle>,
}

impl Cancellable for Recording {
    fn cancel(&self) {
        self.lifecycle.try_cancel();
        let _ = self.tx.send(Event::here(SignalKind::Cancel, Detail::None));
    }
}

impl Subscription for Recording {
    fn request(&self, n: u64) {
        let _ = self.tx.send(Event::here(SignalKind::Request, Detail::Value(n as i32)));
    }
}

struct ManualShared<S: ?Sized> {
    tx: EventTx,
    lifecycle: Arc<Lifecycle>,
    subscriber: Mutex<Option<Box<S>>>,
}

/// Stream driven by the test: records `subscribe` and emits on demand of the test,
/// from whichever thread calls the emit methods.
#[derive(Clone)]
pub struct ManualStream {
    shared: Arc<ManualShared<dyn StreamSubscriber<i32>>>,
}

impl ManualStream {
    pub fn new(tx: EventTx) -> Self {
        Self {
            shared: Arc::new(ManualShared {
                tx,
                lifecycle: Arc::new(Lifecycle::new()),
                subscriber: Mutex::new(None),
            }),
        }
    }

    pub fn next(&self, item: i32) {
        if let Some(subscriber) = self.shared.subscriber.lock().as_mut() {
            subscriber.on_next(item);
        }
    }

    pub fn complete(&self) -> bool {
        if !self.shared.lifecycle.try_terminate() {
            return false;
        }
        if let Some(subscriber) = self.shared.subscriber.lock().as_mut() {
            subscriber.on_complete();
        }
        true
    }

    pub fn fail(&self, error: SignalError) -> bool {
        if !self.shared.lifecycle.try_terminate() {
            return false;
        }
        if let Some(subscriber) = self.shared.subscriber.lock().as_mut() {
            subscriber.on_error(error);
        }
        true
    }
}

impl StreamSource<i32> for ManualStream {
    fn subscribe(&self, mut subscriber: Box<dyn StreamSubscriber<i32>>) {
        // Held through on_subscribe, so emissions wait for it to return.
        let mut slot = self.shared.subscriber.lock();
        let _ = self
            .shared
            .tx
            .send(Event::here(SignalKind::Subscribe, Detail::None));
        subscriber.on_subscribe(Arc::new(Recording {
            tx: self.shared.tx.clone(),
            lifecycle: Arc::clone(&self.shared.lifecycle),
        }));
        *slot = Some(subscriber);
    }
}

/// Single driven by the test.
#[derive(Clone)]
pub struct ManualSingle {
    shared: Arc<ManualShared<dyn SingleSubscriber<i32>>>,
}

impl ManualSingle {
    pub fn new(tx: EventTx) -> Self {
        Self {
            shared: Arc::new(ManualShared {
                tx,
                lifecycle: Arc::new(Lifecycle::new()),
                subscriber: Mutex::new(None),
            }),
        }
    }

    /// Returns `false` when the subscription was cancelled first.
    pub fn succeed(&self, value: i32) -> bool {
        if !self.shared.lifecycle.try_terminate() {
            return false;
        }
        if let Some(subscriber) = self.shared.subscriber.lock().as_mut() {
            subscriber.on_success(value);
        }
        true
    }
}

impl SingleSource<i32> for ManualSingle {
    fn subscribe(&self, mut subscriber: Box<dyn SingleSubscriber<i32>>) {
        let mut slot = self.shared.subscriber.lock();
        let _ = self
            .shared
            .tx
            .send(Event::here(SignalKind::Subscribe, Detail::None));
        subscriber.on_subscribe(Arc::new(Recording {
            tx: self.shared.tx.clone(),
            lifecycle: Arc::clone(&self.shared.lifecycle),
        }));
        *slot = Some(subscriber);
    }
}

// === Executors ===

/// Counts submissions before handing them to the wrapped executor.
pub struct CountingExecutor {
    inner: ExecutorRef,
    submitted: AtomicUsize,
}

impl CountingExecutor {
    pub fn new(inner: ExecutorRef) -> Arc<Self> {
        Arc::new(Self {
            inner,
            submitted: AtomicUsize::new(0),
        })
    }

    pub fn submitted(&self) -> usize {
        self.submitted.load(Ordering::SeqCst)
    }
}

impl Executor for CountingExecutor {
    fn submit(&self, work: Work) -> Result<(), RejectedExecution> {
        self.submitted.fetch_add(1, Ordering::SeqCst);
        self.inner.submit(work)
    }

    fn name(&self) -> &str {
        "counting"
    }
}

/// A two-worker pool whose threads are named [`OFFLOAD`].
pub fn offload_pool() -> Arc<TokioExecutor> {
    let config = ExecutorConfig::named("offload")
        .with_workers(2)
        .with_thread_name(OFFLOAD);
    Arc::new(TokioExecutor::start(&config).expect("offload pool"))
}

/// The pool wrapped in a submission counter.
pub fn counted_pool() -> (Arc<TokioExecutor>, Arc<CountingExecutor>) {
    let pool = offload_pool();
    let inner: ExecutorRef = pool.clone();
    (pool, CountingExecutor::new(inner))
}
