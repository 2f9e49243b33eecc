use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::agent::{AgentConfig, SharedAgentRegistry};
use crate::error::Result;
use crate::intake::IntakeQueue;
use crate::model::{WorkflowActionLog, WorkflowExecution};
use crate::router::ConversationRouter;
use crate::store::DynLeadStore;

#[derive(Clone, Copy, Debug, Serialize)]
pub struct QueueStatus {
    pub pending: usize,
    pub processed: usize,
    pub failed: usize,
}

/// Read-only projections for dashboards. Nothing here participates in the
/// orchestration contract.
pub struct Monitor {
    store: DynLeadStore,
    queue: Arc<IntakeQueue>,
    router: Arc<ConversationRouter>,
    registry: SharedAgentRegistry,
}

impl Monitor {
    pub fn new(
        store: DynLeadStore,
        queue: Arc<IntakeQueue>,
        router: Arc<ConversationRouter>,
        registry: SharedAgentRegistry,
    ) -> Self {
        Self {
            store,
            queue,
            router,
            registry,
        }
    }

    pub fn queue_status(&self) -> QueueStatus {
        QueueStatus {
            pending: self.queue.pending(),
            processed: self.queue.processed(),
            failed: self.queue.failed(),
        }
    }

    /// Current lead → agent assignments.
    pub fn assignments(&self) -> HashMap<String, String> {
        self.router.assignments_snapshot()
    }

    pub fn agents(&self) -> Vec<AgentConfig> {
        self.registry.snapshot()
    }

    pub async fn recent_executions(&self, limit: usize) -> Result<Vec<WorkflowExecution>> {
        self.store.recent_executions(limit).await
    }

    pub async fn recent_action_logs(&self, limit: usize) -> Result<Vec<WorkflowActionLog>> {
        self.store.recent_action_logs(limit).await
    }
}
