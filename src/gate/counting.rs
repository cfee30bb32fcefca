//! # Stateful gates.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::OffloadGate;
use crate::signals::SignalKind;

/// Runs the first `n` decisions inline, offloads every decision after that.
///
/// `Countdown::new(1)` is the "false once, then true" gate: with `subscribe_on`
/// the subscribe call stays on the caller while the first request is offloaded.
#[derive(Debug)]
pub struct Countdown {
    remaining: AtomicUsize,
}

impl Countdown {
    pub fn new(inline_first: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(inline_first),
        }
    }

    /// Number of inline answers still to be given.
    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }
}

impl OffloadGate for Countdown {
    fn should_offload(&self, _signal: SignalKind) -> bool {
        self.remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_err()
    }
}

/// Answers from a script, then falls back to a fixed answer.
///
/// Every consulted signal is recorded, which makes it handy for asserting
/// exactly which decision points an operator reached.
#[derive(Debug)]
pub struct Script {
    answers: Mutex<VecDeque<bool>>,
    fallback: bool,
    consulted: Mutex<Vec<SignalKind>>,
}

impl Script {
    pub fn new<I>(answers: I, fallback: bool) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            fallback,
            consulted: Mutex::new(Vec::new()),
        }
    }

    /// Signals the gate was consulted for, in order.
    pub fn consulted(&self) -> Vec<SignalKind> {
        self.consulted.lock().clone()
    }
}

impl OffloadGate for Script {
    fn should_offload(&self, signal: SignalKind) -> bool {
        self.consulted.lock().push(signal);
        self.answers.lock().pop_front().unwrap_or(self.fallback)
    }
}
