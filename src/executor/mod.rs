//! Executors: where offloaded signals run.
//!
//! The engine never owns or shuts down an executor; it only holds an
//! [`ExecutorRef`] and submits independent units of [`Work`].
//!
//! ## Contents
//! - [`Executor`]      the submission contract (`submit` may be refused)
//! - [`Immediate`]     runs work inline on the submitting thread
//! - [`TokioExecutor`] runs work on a tokio runtime (borrowed handle or owned pool)
//!
//! ## Rules
//! - `submit` returns promptly; it never waits for the work to run.
//! - A refused submission is reported as [`RejectedExecution`], never as a panic.
//! - Work submitted separately may run concurrently and in any order; ordering
//!   between signals of one subscription is provided by the offloader, not here.

mod immediate;
mod pool;

use std::sync::Arc;

use crate::error::RejectedExecution;

pub use immediate::Immediate;
pub use pool::TokioExecutor;

/// A unit of work handed to an executor.
pub type Work = Box<dyn FnOnce() + Send + 'static>;

/// Shared handle to an executor.
pub type ExecutorRef = Arc<dyn Executor>;

/// Accepts units of work for asynchronous execution.
///
/// ### Implementation requirements
/// - Return without waiting for `work` to run (except inline executors).
/// - Refuse with [`RejectedExecution`] instead of panicking or dropping work silently.
pub trait Executor: Send + Sync + 'static {
    /// Submits `work` for execution.
    fn submit(&self, work: Work) -> Result<(), RejectedExecution>;

    /// Returns the executor name used in logs and rejections.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<E: Executor + ?Sized> Executor for Arc<E> {
    fn submit(&self, work: Work) -> Result<(), RejectedExecution> {
        (**self).submit(work)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
