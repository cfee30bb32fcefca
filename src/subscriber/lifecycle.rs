//! # Lifecycle and demand primitives for source implementations.
//!
//! [`Lifecycle`] decides the race between a terminal signal and cancellation:
//! both go through one compare-and-swap out of `Active`, so exactly one wins.
//!
//! ```text
//!            try_terminate()
//!   Active ───────────────────► Terminated   (deliver the terminal)
//!      │
//!      └──────────────────────► Cancelled    (drop the terminal)
//!            try_cancel()
//! ```
//!
//! [`Demand`] accumulates `request(n)` with saturation at `u64::MAX`, which
//! means "unbounded" and is never decremented.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

const ACTIVE: u8 = 0;
const CANCELLED: u8 = 1;
const TERMINATED: u8 = 2;

/// Atomic `Active → {Cancelled | Terminated}` state of one subscription.
#[derive(Debug)]
pub struct Lifecycle(AtomicU8);

impl Lifecycle {
    pub const fn new() -> Self {
        Self(AtomicU8::new(ACTIVE))
    }

    /// Claims the terminal transition. Returns `true` if the caller must deliver the terminal.
    pub fn try_terminate(&self) -> bool {
        self.transition(TERMINATED)
    }

    /// Claims the cancel transition. Returns `true` if this call cancelled the subscription.
    pub fn try_cancel(&self) -> bool {
        self.transition(CANCELLED)
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::Acquire) == ACTIVE
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire) == CANCELLED
    }

    #[inline]
    pub fn is_terminated(&self) -> bool {
        self.0.load(Ordering::Acquire) == TERMINATED
    }

    fn transition(&self, to: u8) -> bool {
        self.0
            .compare_exchange(ACTIVE, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// Outstanding demand of a stream subscription.
#[derive(Debug, Default)]
pub struct Demand(AtomicU64);

impl Demand {
    /// Unbounded demand.
    pub const UNBOUNDED: u64 = u64::MAX;

    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// Adds `n`, saturating at [`Demand::UNBOUNDED`]. Returns the demand before the call.
    pub fn add(&self, n: u64) -> u64 {
        match self
            .0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                Some(current.saturating_add(n))
            }) {
            Ok(previous) | Err(previous) => previous,
        }
    }

    /// Consumes one unit of demand. Returns `false` when there is none.
    pub fn try_take(&self) -> bool {
        self.0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| match current {
                0 => None,
                Self::UNBOUNDED => Some(Self::UNBOUNDED),
                n => Some(n - 1),
            })
            .is_ok()
    }

    #[inline]
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[test]
    fn test_exactly_one_transition_wins() {
        for _ in 0..200 {
            let lifecycle = Arc::new(Lifecycle::new());
            let wins = Arc::new(AtomicUsize::new(0));

            let handles: Vec<_> = (0..4)
                .map(|i| {
                    let lifecycle = Arc::clone(&lifecycle);
                    let wins = Arc::clone(&wins);
                    std::thread::spawn(move || {
                        let won = if i % 2 == 0 {
                            lifecycle.try_terminate()
                        } else {
                            lifecycle.try_cancel()
                        };
                        if won {
                            wins.fetch_add(1, Ordering::SeqCst);
                        }
                    })
                })
                .collect();
            for h in handles {
                h.join().unwrap();
            }

            assert_eq!(wins.load(Ordering::SeqCst), 1);
            assert!(lifecycle.is_cancelled() ^ lifecycle.is_terminated());
            assert!(!lifecycle.is_active());
        }
    }

    #[test]
    fn test_demand_accumulates_and_saturates() {
        let demand = Demand::new();
        assert!(!demand.try_take());
        demand.add(2);
        assert!(demand.try_take());
        assert!(demand.try_take());
        assert!(!demand.try_take());

        demand.add(u64::MAX - 1);
        demand.add(10);
        assert_eq!(demand.current(), Demand::UNBOUNDED);
        assert!(demand.try_take());
        assert_eq!(demand.current(), Demand::UNBOUNDED);
    }
}
