//! # Downstream end of an offloading operator.

use std::sync::Arc;

use tracing::debug;

use crate::delivery::{BoxSink, Deliver, Signal};
use crate::error::{RejectedExecution, SignalError};
use crate::subscriber::{EmptySubscription, SubscriptionRef};

/// Delivers serialized downstream signals into the next sink.
///
/// The sink is released after the terminal signal; anything arriving later is
/// dropped here (a rejection may have terminated the subscription early).
pub(crate) struct DownstreamTarget<T> {
    sink: Option<BoxSink<T>>,
    subscribed: bool,
}

impl<T> DownstreamTarget<T> {
    pub(crate) fn new(sink: BoxSink<T>) -> Self {
        Self {
            sink: Some(sink),
            subscribed: false,
        }
    }
}

impl<T: Send + 'static> Deliver<Signal<T>> for DownstreamTarget<T> {
    fn deliver(&mut self, signal: Signal<T>) {
        let Some(sink) = self.sink.as_mut() else {
            debug!(signal = signal.kind().as_label(), "dropping signal after terminal");
            if let Signal::OnSubscribe(subscription) = signal {
                subscription.cancel();
            }
            return;
        };

        let terminal = signal.is_terminal();
        if let Signal::OnSubscribe(_) = signal {
            self.subscribed = true;
        }
        sink.deliver(signal);
        if terminal {
            self.sink = None;
        }
    }

    fn reject(&mut self, error: RejectedExecution, pending: Vec<Signal<T>>) {
        let Some(mut sink) = self.sink.take() else {
            return;
        };
        if !self.subscribed {
            let subscription = pending
                .into_iter()
                .find_map(|signal| match signal {
                    Signal::OnSubscribe(subscription) => Some(subscription),
                    _ => None,
                })
                .unwrap_or_else(|| Arc::new(EmptySubscription) as SubscriptionRef);
            self.subscribed = true;
            sink.deliver(Signal::OnSubscribe(subscription));
        }
        sink.deliver(Signal::OnError(SignalError::Rejected(error)));
    }
}
