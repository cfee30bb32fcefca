//! # Side-effect hooks.
//!
//! A [`Peek`] runs a callback just before a signal passes through it, on the
//! thread that delivers the signal. Hooks never alter the signals.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::delivery::{BoxSink, Emitter, EmitterRef, Signal, Sink};
use crate::error::SignalError;
use crate::strategy::ExecutionStrategy;
use crate::subscriber::{Cancellable, Subscription, SubscriptionRef};

type Action = Arc<dyn Fn() + Send + Sync>;

pub(crate) enum Hook<T> {
    Subscribe(Action),
    Next(Arc<dyn Fn(&T) + Send + Sync>),
    Success(Arc<dyn Fn(&T) + Send + Sync>),
    Complete(Action),
    Error(Arc<dyn Fn(&SignalError) + Send + Sync>),
    Cancel(Action),
    Finally(Action),
}

impl<T> Clone for Hook<T> {
    fn clone(&self) -> Self {
        match self {
            Hook::Subscribe(f) => Hook::Subscribe(Arc::clone(f)),
            Hook::Next(f) => Hook::Next(Arc::clone(f)),
            Hook::Success(f) => Hook::Success(Arc::clone(f)),
            Hook::Complete(f) => Hook::Complete(Arc::clone(f)),
            Hook::Error(f) => Hook::Error(Arc::clone(f)),
            Hook::Cancel(f) => Hook::Cancel(Arc::clone(f)),
            Hook::Finally(f) => Hook::Finally(Arc::clone(f)),
        }
    }
}

pub(crate) struct Peek<T> {
    source: EmitterRef<T>,
    hook: Hook<T>,
}

impl<T> Peek<T> {
    pub(crate) fn new(source: EmitterRef<T>, hook: Hook<T>) -> Self {
        Self { source, hook }
    }
}

impl<T: Send + 'static> Emitter<T> for Peek<T> {
    fn subscribe_sink(&self, sink: BoxSink<T>) {
        if let Hook::Subscribe(f) = &self.hook {
            f();
        }
        self.source.subscribe_sink(Box::new(PeekSink {
            hook: self.hook.clone(),
            sink,
            once: Arc::new(AtomicBool::new(false)),
        }));
    }

    fn strategy(&self) -> ExecutionStrategy {
        self.source.strategy()
    }
}

struct PeekSink<T> {
    hook: Hook<T>,
    sink: BoxSink<T>,
    once: Arc<AtomicBool>,
}

impl<T: Send + 'static> Sink<T> for PeekSink<T> {
    fn deliver(&mut self, signal: Signal<T>) {
        let signal = match (&self.hook, signal) {
            (Hook::Next(f), Signal::OnNext(item)) => {
                f(&item);
                Signal::OnNext(item)
            }
            (Hook::Success(f), Signal::OnSuccess(value)) => {
                f(&value);
                Signal::OnSuccess(value)
            }
            (Hook::Complete(f), Signal::OnComplete) => {
                f();
                Signal::OnComplete
            }
            (Hook::Error(f), Signal::OnError(error)) => {
                f(&error);
                Signal::OnError(error)
            }
            (Hook::Cancel(f) | Hook::Finally(f), Signal::OnSubscribe(inner)) => {
                Signal::OnSubscribe(Arc::new(OnCancel {
                    inner,
                    action: Arc::clone(f),
                    once: Arc::clone(&self.once),
                }))
            }
            (Hook::Finally(f), signal) if signal.is_terminal() => {
                if !self.once.swap(true, Ordering::AcqRel) {
                    f();
                }
                signal
            }
            (_, signal) => signal,
        };
        self.sink.deliver(signal);
    }
}

/// Subscription running an action once, before the first cancel reaches the source.
struct OnCancel {
    inner: SubscriptionRef,
    action: Action,
    once: Arc<AtomicBool>,
}

impl Cancellable for OnCancel {
    fn cancel(&self) {
        if !self.once.swap(true, Ordering::AcqRel) {
            (self.action)();
        }
        self.inner.cancel();
    }
}

impl Subscription for OnCancel {
    fn request(&self, n: u64) {
        self.inner.request(n);
    }
}
