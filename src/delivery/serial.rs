//! # Per-subscription serial delivery.
//!
//! [`SerialDelivery`] runs the signals of one subscription and one direction one
//! at a time and in trigger order, while letting each signal choose whether it
//! runs inline on the triggering thread or on an executor.
//!
//! ## Architecture
//! ```text
//! dispatch(signal, offload)
//!   │
//!   ├─ closed ─────────────► dropped
//!   ├─ slot busy ──────────► [FIFO queue]  (picked up by the current owner)
//!   └─ slot free ─► claim ─┬─ inline  ─► deliver here ─► drain queue
//!                          └─ offload ─► enqueue ─► executor.submit(drain)
//!
//! drain (owner only):
//!   pop ─► inline item              ─► deliver on this thread
//!       ─► offload item, off-executor ─► hand the slot to the executor, return
//!       ─► queue empty              ─► release the slot
//! ```
//!
//! ## Rules
//! - One owner at a time holds the target; everyone else only enqueues.
//! - The lock is never held while the target runs.
//! - An inline signal triggered while earlier signals are still queued waits its turn
//!   and may therefore run on the executor.
//! - A refused submission closes the delivery: the target receives
//!   [`Deliver::reject`] with everything still pending, later signals are dropped.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::RejectedExecution;
use crate::executor::ExecutorRef;

/// Receiving end of a [`SerialDelivery`].
pub(crate) trait Deliver<S>: Send + 'static {
    fn deliver(&mut self, signal: S);

    /// The executor refused work; `pending` holds the undelivered signals in order.
    fn reject(&mut self, error: RejectedExecution, pending: Vec<S>);
}

struct Pending<S> {
    signal: S,
    offload: bool,
}

struct Slot<S, D> {
    target: Option<D>,
    queue: VecDeque<Pending<S>>,
    active: bool,
    closed: bool,
}

pub(crate) struct SerialDelivery<S, D> {
    slot: Mutex<Slot<S, D>>,
    executor: ExecutorRef,
}

impl<S, D> SerialDelivery<S, D>
where
    S: Send + 'static,
    D: Deliver<S>,
{
    pub(crate) fn new(target: D, executor: ExecutorRef) -> Arc<Self> {
        Arc::new(Self {
            slot: Mutex::new(Slot {
                target: Some(target),
                queue: VecDeque::new(),
                active: false,
                closed: false,
            }),
            executor,
        })
    }

    /// Delivers `signal` after every signal dispatched before it.
    ///
    /// On `Err` the delivery is already closed and the target has been rejected.
    pub(crate) fn dispatch(self: &Arc<Self>, signal: S, offload: bool) -> Result<(), RejectedExecution> {
        let mut slot = self.slot.lock();
        if slot.closed {
            return Ok(());
        }
        if slot.active {
            slot.queue.push_back(Pending { signal, offload });
            return Ok(());
        }

        slot.active = true;
        if offload {
            slot.queue.push_back(Pending { signal, offload });
            drop(slot);
            return self.schedule();
        }

        let Some(mut target) = slot.target.take() else {
            slot.active = false;
            return Ok(());
        };
        drop(slot);
        target.deliver(signal);
        self.drain(target, false)
    }

    /// Drops queued signals matching `pred`.
    pub(crate) fn discard(&self, pred: impl Fn(&S) -> bool) {
        self.slot.lock().queue.retain(|p| !pred(&p.signal));
    }

    fn schedule(self: &Arc<Self>) -> Result<(), RejectedExecution> {
        let this = Arc::clone(self);
        match self.executor.submit(Box::new(move || this.run_offloaded())) {
            Ok(()) => Ok(()),
            Err(rejected) => {
                self.fail(rejected.clone());
                Err(rejected)
            }
        }
    }

    fn run_offloaded(self: Arc<Self>) {
        let target = self.slot.lock().target.take();
        if let Some(target) = target {
            // On the executor nothing is resubmitted, so this cannot be refused.
            let _ = self.drain(target, true);
        }
    }

    fn drain(self: &Arc<Self>, mut target: D, on_executor: bool) -> Result<(), RejectedExecution> {
        loop {
            let mut slot = self.slot.lock();
            if slot.closed {
                slot.active = false;
                return Ok(());
            }
            let Some(next) = slot.queue.pop_front() else {
                slot.target = Some(target);
                slot.active = false;
                return Ok(());
            };
            if next.offload && !on_executor {
                slot.queue.push_front(next);
                slot.target = Some(target);
                drop(slot);
                return self.schedule();
            }
            drop(slot);
            target.deliver(next.signal);
        }
    }

    /// Closes the delivery and rejects the target with everything still pending.
    pub(crate) fn fail(&self, rejected: RejectedExecution) {
        let (target, pending) = {
            let mut slot = self.slot.lock();
            slot.closed = true;
            slot.active = false;
            let pending: Vec<S> = slot.queue.drain(..).map(|p| p.signal).collect();
            (slot.target.take(), pending)
        };
        if let Some(mut target) = target {
            target.reject(rejected, pending);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{Executor, Work};
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Executor whose jobs only run when the test says so.
    #[derive(Default)]
    struct Manual {
        jobs: Mutex<VecDeque<Work>>,
        refuse: AtomicBool,
    }

    impl Manual {
        fn run_all(&self) -> usize {
            let mut ran = 0;
            loop {
                let job = self.jobs.lock().pop_front();
                match job {
                    Some(job) => {
                        job();
                        ran += 1;
                    }
                    None => return ran,
                }
            }
        }
    }

    impl Executor for Manual {
        fn submit(&self, work: Work) -> Result<(), RejectedExecution> {
            if self.refuse.load(Ordering::SeqCst) {
                return Err(RejectedExecution::new("manual", "refused"));
            }
            self.jobs.lock().push_back(work);
            Ok(())
        }
    }

    #[derive(Default, Clone)]
    struct Seen {
        delivered: Arc<Mutex<Vec<u32>>>,
        rejected: Arc<Mutex<Option<Vec<u32>>>>,
    }

    impl Deliver<u32> for Seen {
        fn deliver(&mut self, signal: u32) {
            self.delivered.lock().push(signal);
        }
        fn reject(&mut self, _error: RejectedExecution, pending: Vec<u32>) {
            *self.rejected.lock() = Some(pending);
        }
    }

    fn setup() -> (Arc<Manual>, Seen, Arc<SerialDelivery<u32, Seen>>) {
        let exec = Arc::new(Manual::default());
        let seen = Seen::default();
        let serial = SerialDelivery::new(seen.clone(), exec.clone() as ExecutorRef);
        (exec, seen, serial)
    }

    #[test]
    fn test_inline_runs_immediately() {
        let (exec, seen, serial) = setup();
        serial.dispatch(1, false).unwrap();
        serial.dispatch(2, false).unwrap();
        assert_eq!(*seen.delivered.lock(), vec![1, 2]);
        assert_eq!(exec.run_all(), 0);
    }

    #[test]
    fn test_inline_waits_behind_offloaded() {
        let (exec, seen, serial) = setup();
        serial.dispatch(1, true).unwrap();
        serial.dispatch(2, false).unwrap();
        serial.dispatch(3, true).unwrap();
        assert!(seen.delivered.lock().is_empty());

        assert_eq!(exec.run_all(), 1);
        assert_eq!(*seen.delivered.lock(), vec![1, 2, 3]);

        serial.dispatch(4, false).unwrap();
        assert_eq!(*seen.delivered.lock(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_inline_owner_hands_over_to_executor() {
        let (exec, seen, serial) = setup();
        // After an inline signal releases the slot, an offloaded one goes to the executor.
        serial.dispatch(1, false).unwrap();
        serial.dispatch(2, true).unwrap();
        assert_eq!(*seen.delivered.lock(), vec![1]);
        assert_eq!(exec.run_all(), 1);
        assert_eq!(*seen.delivered.lock(), vec![1, 2]);
    }

    #[test]
    fn test_refusal_rejects_target_with_pending() {
        let (exec, seen, serial) = setup();
        exec.refuse.store(true, Ordering::SeqCst);

        let err = serial.dispatch(1, true).unwrap_err();
        assert_eq!(&*err.executor, "manual");
        assert_eq!(*seen.rejected.lock(), Some(vec![1]));

        serial.dispatch(2, false).unwrap();
        assert!(seen.delivered.lock().is_empty());
    }

    #[test]
    fn test_discard_drops_queued_signals() {
        let (exec, seen, serial) = setup();
        serial.dispatch(1, true).unwrap();
        serial.dispatch(2, true).unwrap();
        serial.dispatch(3, true).unwrap();
        serial.discard(|s| *s == 2);
        exec.run_all();
        assert_eq!(*seen.delivered.lock(), vec![1, 3]);
    }
}
