mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::agent::AgentConfig;
use crate::error::Result;
use crate::model::{
    ActivityRecord, AppointmentRecord, DocumentRecord, Interaction, Lead, LeadData, LeadStatus,
    TaskRecord, WorkflowActionLog, WorkflowExecution,
};
use crate::workflow::WorkflowTemplate;

pub use memory::MemoryStore;

/// Narrow persistence interface the orchestration core depends on. The real
/// datastore lives behind this seam; `MemoryStore` backs tests and demos.
#[async_trait]
pub trait LeadStore: Send + Sync {
    async fn get_lead(&self, id: &str) -> Result<Lead>;

    /// Exact equality on phone or email only; no fuzzy identity resolution.
    async fn find_lead_by_contact(&self, contact: &str) -> Result<Option<Lead>>;

    async fn create_lead(&self, data: LeadData) -> Result<Lead>;

    async fn update_lead_status(&self, id: &str, status: LeadStatus) -> Result<()>;

    async fn append_interaction(&self, interaction: Interaction) -> Result<()>;

    /// Most recent `limit` turns for a lead, oldest first.
    async fn interactions_for(&self, lead_id: &str, limit: usize) -> Result<Vec<Interaction>>;

    async fn append_execution(&self, execution: WorkflowExecution) -> Result<()>;

    async fn finish_execution(
        &self,
        execution_id: &str,
        finished_at: DateTime<Utc>,
    ) -> Result<()>;

    async fn append_action_log(&self, log: WorkflowActionLog) -> Result<()>;

    async fn create_task(&self, task: TaskRecord) -> Result<()>;

    async fn create_appointment(&self, appointment: AppointmentRecord) -> Result<()>;

    async fn create_document(&self, document: DocumentRecord) -> Result<()>;

    async fn log_activity(&self, activity: ActivityRecord) -> Result<()>;

    async fn list_agent_configs(&self, active_only: bool) -> Result<Vec<AgentConfig>>;

    async fn list_workflow_templates(&self, active_only: bool) -> Result<Vec<WorkflowTemplate>>;

    async fn recent_executions(&self, limit: usize) -> Result<Vec<WorkflowExecution>>;

    async fn recent_action_logs(&self, limit: usize) -> Result<Vec<WorkflowActionLog>>;
}

pub type DynLeadStore = Arc<dyn LeadStore>;
