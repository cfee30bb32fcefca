use super::{Executor, Work};
use crate::error::RejectedExecution;

/// Runs every unit of work inline, on the submitting thread.
///
/// Useful as a default and for deterministic tests; offloading to it changes
/// nothing about threads but still goes through the offloader's serialization.
#[derive(Debug, Clone, Copy, Default)]
pub struct Immediate;

impl Executor for Immediate {
    fn submit(&self, work: Work) -> Result<(), RejectedExecution> {
        work();
        Ok(())
    }

    fn name(&self) -> &str {
        "immediate"
    }
}
