//! # Tokio-backed executor.
//!
//! [`TokioExecutor`] submits each unit of work as its own tokio task, either on a
//! runtime someone else owns ([`from_handle`](TokioExecutor::from_handle)) or on
//! a pool it builds itself ([`start`](TokioExecutor::start)).
//!
//! ## Architecture
//! ```text
//! submit(work) ──► accepting? ──no──► Err(RejectedExecution)
//!                     │yes
//!                     ▼
//!              handle.spawn(catch_unwind(work))
//!                     └─► panic caught → warn! (worker keeps running)
//! ```
//!
//! ## Rules
//! - After [`shutdown`](TokioExecutor::shutdown) every submission is refused.
//! - Already accepted work is not interrupted by `shutdown`.
//! - An owned runtime is shut down in the background when the executor is dropped,
//!   so dropping the last handle from inside one of its own workers is allowed.

use std::any::Any;
use std::io;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{Executor, Work};
use crate::config::ExecutorConfig;
use crate::error::{RejectedExecution, SignalError};
use crate::source::Completion;

/// Executor running work as tokio tasks.
pub struct TokioExecutor {
    name: Arc<str>,
    handle: Handle,
    accepting: CancellationToken,
    _runtime: Option<OwnedRuntime>,
}

/// Runtime owned by an executor built with [`TokioExecutor::start`].
struct OwnedRuntime(Option<Runtime>);

impl Drop for OwnedRuntime {
    fn drop(&mut self) {
        if let Some(runtime) = self.0.take() {
            runtime.shutdown_background();
        }
    }
}

impl TokioExecutor {
    /// Wraps a runtime owned by someone else.
    pub fn from_handle(name: impl Into<Arc<str>>, handle: Handle) -> Self {
        Self {
            name: name.into(),
            handle,
            accepting: CancellationToken::new(),
            _runtime: None,
        }
    }

    /// Builds and owns a multi-threaded runtime sized by `config`.
    ///
    /// Worker threads are named [`ExecutorConfig::thread_name_or_default`].
    pub fn start(config: &ExecutorConfig) -> io::Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(config.worker_threads())
            .thread_name(config.thread_name_or_default())
            .build()?;

        debug!(
            executor = %config.name,
            workers = config.worker_threads(),
            "offload executor started"
        );

        Ok(Self {
            name: Arc::from(config.name.as_str()),
            handle: runtime.handle().clone(),
            accepting: CancellationToken::new(),
            _runtime: Some(OwnedRuntime(Some(runtime))),
        })
    }

    /// Stops accepting work. Idempotent.
    pub fn shutdown(&self) {
        if !self.accepting.is_cancelled() {
            self.accepting.cancel();
            debug!(executor = %self.name, "offload executor stopped accepting work");
        }
    }

    #[inline]
    pub fn is_shutdown(&self) -> bool {
        self.accepting.is_cancelled()
    }

    /// Returns a completion that stops this executor from accepting work when subscribed.
    pub fn close_async(&self) -> Completion {
        let accepting = self.accepting.clone();
        let name = Arc::clone(&self.name);
        Completion::from_fn(move || -> Result<(), SignalError> {
            accepting.cancel();
            debug!(executor = %name, "offload executor closed");
            Ok(())
        })
    }

    /// Returns the runtime handle work is spawned on.
    pub fn handle(&self) -> &Handle {
        &self.handle
    }
}

impl Executor for TokioExecutor {
    fn submit(&self, work: Work) -> Result<(), RejectedExecution> {
        if self.accepting.is_cancelled() {
            return Err(RejectedExecution::new(
                Arc::clone(&self.name),
                "executor is shut down",
            ));
        }

        let name = Arc::clone(&self.name);
        self.handle.spawn(async move {
            let run = AssertUnwindSafe(async move { work() });
            if let Err(payload) = run.catch_unwind().await {
                warn!(
                    executor = %name,
                    panic = panic_message(payload.as_ref()),
                    "offloaded work panicked"
                );
            }
        });
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for TokioExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokioExecutor")
            .field("name", &self.name)
            .field("shutdown", &self.is_shutdown())
            .field("owned", &self._runtime.is_some())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "<non-string panic payload>"
    }
}
