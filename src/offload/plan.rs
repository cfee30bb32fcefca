use std::fmt;
use std::sync::Arc;

use crate::executor::ExecutorRef;
use crate::gate::{Always, GateRef, OffloadGate};
use crate::signals::SignalKind;
use crate::strategy::ExecutionStrategy;

/// What one offloading operator moves, where, and under which condition.
pub(crate) struct OffloadPlan {
    pub(crate) strategy: ExecutionStrategy,
    pub(crate) executor: ExecutorRef,
    gate: GateRef,
}

impl OffloadPlan {
    pub(crate) fn new(strategy: ExecutionStrategy, executor: ExecutorRef, gate: GateRef) -> Arc<Self> {
        Arc::new(Self {
            strategy,
            executor,
            gate,
        })
    }

    pub(crate) fn unconditional(strategy: ExecutionStrategy, executor: ExecutorRef) -> Arc<Self> {
        Self::new(strategy, executor, Arc::new(Always))
    }

    /// Decision for one occurrence of `kind`.
    ///
    /// The gate is consulted only for kinds the strategy flags, and once per call.
    #[inline]
    pub(crate) fn decide(&self, kind: SignalKind) -> bool {
        self.strategy.requires(kind) && self.gate.should_offload(kind)
    }
}

impl fmt::Debug for OffloadPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OffloadPlan")
            .field("strategy", &self.strategy)
            .field("executor", &self.executor.name())
            .finish_non_exhaustive()
    }
}

/// Wraps a caller-supplied gate.
pub(crate) fn gate_ref(gate: impl OffloadGate) -> GateRef {
    Arc::new(gate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::Immediate;
    use crate::gate::Script;

    #[test]
    fn test_gate_only_consulted_for_flagged_kinds() {
        let script = Arc::new(Script::new([], true));
        let plan = OffloadPlan::new(
            ExecutionStrategy::offload_upstream(),
            Arc::new(Immediate),
            script.clone(),
        );

        assert!(!plan.decide(SignalKind::OnSubscribe));
        assert!(!plan.decide(SignalKind::OnNext));
        assert!(plan.decide(SignalKind::Subscribe));
        assert_eq!(script.consulted(), vec![SignalKind::Subscribe]);
    }
}
