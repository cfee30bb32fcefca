//! # Offload executor configuration.
//!
//! Provides [`ExecutorConfig`] the settings used by
//! [`TokioExecutor::start`](crate::TokioExecutor::start) to build an owned worker pool.
//!
//! ## Sentinel values
//! - `workers = 0` → one worker per available core (clamped to [`MAX_DEFAULT_WORKERS`])
//! - `thread_name = ""` → worker threads are named after `name`

use std::num::NonZeroUsize;
use std::thread;

/// Upper bound applied when `workers = 0` is resolved from the machine.
pub const MAX_DEFAULT_WORKERS: usize = 16;

/// Configuration for an owned offload worker pool.
///
/// ## Field semantics
/// - `name`: executor name used in logs and in [`RejectedExecution`](crate::RejectedExecution)
/// - `workers`: number of worker threads (`0` = available parallelism)
/// - `thread_name`: name given to every worker thread (`""` = use `name`)
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to avoid
/// sprinkling sentinel checks (`0`, `""`) across the codebase.
#[derive(Clone, Debug)]
pub struct ExecutorConfig {
    /// Executor name reported in logs and rejections.
    pub name: String,

    /// Number of worker threads.
    ///
    /// - `0` = one per available core, at most [`MAX_DEFAULT_WORKERS`]
    /// - `n > 0` = exactly `n` workers
    pub workers: usize,

    /// Name given to worker threads.
    ///
    /// Signals delivered on this pool observe it through `std::thread::current().name()`.
    pub thread_name: String,
}

impl ExecutorConfig {
    /// Creates a config with the given executor name and default sizing.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the worker count.
    #[must_use]
    #[inline]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Sets the worker thread name.
    #[must_use]
    #[inline]
    pub fn with_thread_name(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = thread_name.into();
        self
    }

    /// Returns the resolved worker count (never 0).
    #[inline]
    pub fn worker_threads(&self) -> usize {
        if self.workers == 0 {
            thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1)
                .min(MAX_DEFAULT_WORKERS)
        } else {
            self.workers
        }
    }

    /// Returns the resolved worker thread name.
    #[inline]
    pub fn thread_name_or_default(&self) -> &str {
        if self.thread_name.is_empty() {
            &self.name
        } else {
            &self.thread_name
        }
    }
}

impl Default for ExecutorConfig {
    /// Default configuration:
    ///
    /// - `name = "sigflow-offload"`
    /// - `workers = 0` (available parallelism)
    /// - `thread_name = ""` (same as `name`)
    fn default() -> Self {
        Self {
            name: "sigflow-offload".to_string(),
            workers: 0,
            thread_name: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_workers_resolves_to_machine() {
        let cfg = ExecutorConfig::default();
        let n = cfg.worker_threads();
        assert!(n >= 1 && n <= MAX_DEFAULT_WORKERS);
    }

    #[test]
    fn test_explicit_workers_are_kept() {
        let cfg = ExecutorConfig::named("io").with_workers(3);
        assert_eq!(cfg.worker_threads(), 3);
    }

    #[test]
    fn test_thread_name_falls_back_to_name() {
        let cfg = ExecutorConfig::named("io");
        assert_eq!(cfg.thread_name_or_default(), "io");
        let cfg = cfg.with_thread_name("io-worker");
        assert_eq!(cfg.thread_name_or_default(), "io-worker");
    }
}
