//! # The offloading operator.
//!
//! ## Architecture
//! ```text
//!                       ┌──────────── Offload<T> ─────────────┐
//! subscriber ◄─ DownstreamDelivery ◄─ OffloadRelay ◄─ source  │
//!            (serial, inline/offload)        │                 │
//!     │                                      └─ wraps subscription
//!     └─► OffloadedSubscription ─► UpstreamDelivery ─► source subscription
//!                                  (serial, inline/offload)
//! ```
//!
//! `subscribe` itself is decided once, before any delivery exists, and is
//! submitted directly to the executor.

use std::sync::Arc;

use tracing::warn;

use super::downstream::DownstreamTarget;
use super::plan::OffloadPlan;
use super::upstream::{DownstreamDelivery, OffloadedSubscription};
use crate::delivery::{BoxSink, Emitter, EmitterRef, SerialDelivery, Signal, Sink};
use crate::executor::Work;
use crate::signals::SignalKind;
use crate::strategy::ExecutionStrategy;
use crate::subscriber::SubscriptionRef;

/// Source decorated with an [`OffloadPlan`].
pub(crate) struct Offload<T> {
    source: EmitterRef<T>,
    plan: Arc<OffloadPlan>,
}

impl<T: Send + 'static> Offload<T> {
    pub(crate) fn new(source: EmitterRef<T>, plan: Arc<OffloadPlan>) -> Self {
        Self { source, plan }
    }
}

impl<T: Send + 'static> Emitter<T> for Offload<T> {
    fn subscribe_sink(&self, sink: BoxSink<T>) {
        let downstream =
            SerialDelivery::new(DownstreamTarget::new(sink), Arc::clone(&self.plan.executor));
        let relay = OffloadRelay {
            plan: Arc::clone(&self.plan),
            downstream: Arc::clone(&downstream),
            source_subscription: None,
        };

        if !self.plan.decide(SignalKind::Subscribe) {
            self.source.subscribe_sink(Box::new(relay));
            return;
        }

        let source = Arc::clone(&self.source);
        let work: Work = Box::new(move || source.subscribe_sink(Box::new(relay)));
        if let Err(rejected) = self.plan.executor.submit(work) {
            warn!(
                executor = %rejected.executor,
                signal = SignalKind::Subscribe.as_label(),
                "executor refused subscribe; failing subscription"
            );
            // Nothing was dispatched yet: the subscriber gets an empty
            // subscription followed by the rejection.
            downstream.fail(rejected);
        }
    }

    fn strategy(&self) -> ExecutionStrategy {
        self.source.strategy().merge(self.plan.strategy)
    }
}

/// Sink handed to the source: decides and dispatches every downstream signal.
struct OffloadRelay<T: Send + 'static> {
    plan: Arc<OffloadPlan>,
    downstream: Arc<DownstreamDelivery<T>>,
    source_subscription: Option<SubscriptionRef>,
}

impl<T: Send + 'static> Sink<T> for OffloadRelay<T> {
    fn deliver(&mut self, signal: Signal<T>) {
        let signal = match signal {
            Signal::OnSubscribe(subscription) => {
                self.source_subscription = Some(Arc::clone(&subscription));
                let wrapped: SubscriptionRef =
                    OffloadedSubscription::new(subscription, Arc::clone(&self.plan), &self.downstream);
                Signal::OnSubscribe(wrapped)
            }
            other => other,
        };

        let kind = signal.kind();
        let offload = self.plan.decide(kind);
        if let Err(rejected) = self.downstream.dispatch(signal, offload) {
            warn!(
                executor = %rejected.executor,
                signal = kind.as_label(),
                "executor refused downstream signal; cancelling source"
            );
            if let Some(subscription) = self.source_subscription.take() {
                subscription.cancel();
            }
        }
    }
}
