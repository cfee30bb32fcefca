//! # Upstream end of an offloading operator.
//!
//! [`OffloadedSubscription`] is what the subscriber receives instead of the
//! source's own subscription. `request` and `cancel` go through their own
//! [`SerialDelivery`], independent from the downstream one.
//!
//! ## Rules
//! - The first `request` decides the route for every later `request` of the subscription.
//! - `cancel` is decided on its own, runs at most once, and discards `on_next`
//!   signals still queued downstream. A terminal already queued is still delivered.
//! - If the executor refuses a `request`, the source subscription is cancelled inline
//!   and the subscriber receives `on_error(Rejected)`.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;

use super::downstream::DownstreamTarget;
use super::plan::OffloadPlan;
use crate::delivery::{Deliver, SerialDelivery, Signal};
use crate::error::{RejectedExecution, SignalError};
use crate::signals::SignalKind;
use crate::subscriber::{Cancellable, Subscription, SubscriptionRef};

pub(crate) type DownstreamDelivery<T> = SerialDelivery<Signal<T>, DownstreamTarget<T>>;

const ROUTE_UNDECIDED: u8 = 0;
const ROUTE_INLINE: u8 = 1;
const ROUTE_OFFLOAD: u8 = 2;

/// Upstream-bound signal.
pub(crate) enum Upstream {
    Request(u64),
    Cancel,
}

/// Runs upstream-bound signals against the source's subscription.
pub(crate) struct UpstreamTarget {
    source: SubscriptionRef,
    cancelled: bool,
}

impl Deliver<Upstream> for UpstreamTarget {
    fn deliver(&mut self, signal: Upstream) {
        if self.cancelled {
            return;
        }
        match signal {
            Upstream::Request(n) => self.source.request(n),
            Upstream::Cancel => {
                self.cancelled = true;
                self.source.cancel();
            }
        }
    }

    fn reject(&mut self, _error: RejectedExecution, _pending: Vec<Upstream>) {
        if !self.cancelled {
            self.cancelled = true;
            self.source.cancel();
        }
    }
}

pub(crate) struct OffloadedSubscription<T: Send + 'static> {
    plan: Arc<OffloadPlan>,
    upstream: Arc<SerialDelivery<Upstream, UpstreamTarget>>,
    /// Released on cancel or refusal. After a terminal the cycle through the
    /// subscriber is broken by the downstream target dropping its sink.
    downstream: Mutex<Option<Arc<DownstreamDelivery<T>>>>,
    request_route: AtomicU8,
    cancelled: AtomicBool,
}

impl<T: Send + 'static> OffloadedSubscription<T> {
    pub(crate) fn new(
        source: SubscriptionRef,
        plan: Arc<OffloadPlan>,
        downstream: &Arc<DownstreamDelivery<T>>,
    ) -> Arc<Self> {
        let upstream = SerialDelivery::new(
            UpstreamTarget {
                source,
                cancelled: false,
            },
            Arc::clone(&plan.executor),
        );
        Arc::new(Self {
            plan,
            upstream,
            downstream: Mutex::new(Some(Arc::clone(downstream))),
            request_route: AtomicU8::new(ROUTE_UNDECIDED),
            cancelled: AtomicBool::new(false),
        })
    }

    fn request_offloaded(&self) -> bool {
        match self.request_route.load(Ordering::Acquire) {
            ROUTE_INLINE => false,
            ROUTE_OFFLOAD => true,
            _ => {
                let offload = self.plan.decide(SignalKind::Request);
                let route = if offload { ROUTE_OFFLOAD } else { ROUTE_INLINE };
                match self.request_route.compare_exchange(
                    ROUTE_UNDECIDED,
                    route,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                ) {
                    Ok(_) => offload,
                    Err(decided) => decided == ROUTE_OFFLOAD,
                }
            }
        }
    }
}

impl<T: Send + 'static> Cancellable for OffloadedSubscription<T> {
    fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        let downstream = self.downstream.lock().take();
        if let Some(downstream) = downstream {
            downstream.discard(|signal| matches!(signal, Signal::OnNext(_)));
        }
        let offload = self.plan.decide(SignalKind::Cancel);
        if let Err(rejected) = self.upstream.dispatch(Upstream::Cancel, offload) {
            warn!(
                executor = %rejected.executor,
                signal = SignalKind::Cancel.as_label(),
                "executor refused cancel; cancelled inline"
            );
        }
    }
}

impl<T: Send + 'static> Subscription for OffloadedSubscription<T> {
    fn request(&self, n: u64) {
        if self.cancelled.load(Ordering::Acquire) {
            return;
        }
        let offload = self.request_offloaded();
        if let Err(rejected) = self.upstream.dispatch(Upstream::Request(n), offload) {
            warn!(
                executor = %rejected.executor,
                signal = SignalKind::Request.as_label(),
                "executor refused request; failing subscription"
            );
            self.cancelled.store(true, Ordering::Release);
            // The refusal has cancelled the source, which may have dropped the
            // last other handle on the downstream delivery.
            let downstream = self.downstream.lock().take();
            if let Some(downstream) = downstream {
                let error = Signal::OnError(SignalError::Rejected(rejected));
                // Inline, so only a downstream refusal can fail here, and that one
                // has already closed the delivery with its own error.
                let _ = downstream.dispatch(error, false);
            }
        }
    }
}
