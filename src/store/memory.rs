use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::agent::AgentConfig;
use crate::error::{LeadFlowError, Result};
use crate::model::{
    record_id, ActivityRecord, AppointmentRecord, DocumentRecord, Interaction, Lead, LeadData,
    LeadStatus, TaskRecord, WorkflowActionLog, WorkflowExecution,
};
use crate::workflow::WorkflowTemplate;

use super::LeadStore;

/// In-memory store used by tests and the demo binary.
#[derive(Default)]
pub struct MemoryStore {
    leads: RwLock<HashMap<String, Lead>>,
    interactions: RwLock<Vec<Interaction>>,
    executions: RwLock<Vec<WorkflowExecution>>,
    action_logs: RwLock<Vec<WorkflowActionLog>>,
    tasks: RwLock<Vec<TaskRecord>>,
    appointments: RwLock<Vec<AppointmentRecord>>,
    documents: RwLock<Vec<DocumentRecord>>,
    activities: RwLock<Vec<ActivityRecord>>,
    agent_configs: RwLock<Vec<AgentConfig>>,
    templates: RwLock<Vec<WorkflowTemplate>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_agents(&self, agents: Vec<AgentConfig>) {
        *self.agent_configs.write() = agents;
    }

    pub fn seed_templates(&self, templates: Vec<WorkflowTemplate>) {
        *self.templates.write() = templates;
    }

    // Inspection helpers for tests and dashboards.

    pub fn lead_count(&self) -> usize {
        self.leads.read().len()
    }

    pub fn all_interactions(&self, lead_id: &str) -> Vec<Interaction> {
        self.interactions
            .read()
            .iter()
            .filter(|i| i.lead_id == lead_id)
            .cloned()
            .collect()
    }

    pub fn all_tasks(&self) -> Vec<TaskRecord> {
        self.tasks.read().clone()
    }

    pub fn all_appointments(&self) -> Vec<AppointmentRecord> {
        self.appointments.read().clone()
    }

    pub fn all_documents(&self) -> Vec<DocumentRecord> {
        self.documents.read().clone()
    }

    pub fn all_activities(&self) -> Vec<ActivityRecord> {
        self.activities.read().clone()
    }

    pub fn all_action_logs(&self) -> Vec<WorkflowActionLog> {
        self.action_logs.read().clone()
    }
}

#[async_trait]
impl LeadStore for MemoryStore {
    async fn get_lead(&self, id: &str) -> Result<Lead> {
        self.leads
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| LeadFlowError::LeadNotFound(id.to_string()))
    }

    async fn find_lead_by_contact(&self, contact: &str) -> Result<Option<Lead>> {
        let leads = self.leads.read();
        let mut matches: Vec<&Lead> = leads
            .values()
            .filter(|lead| {
                lead.phone.as_deref() == Some(contact) || lead.email.as_deref() == Some(contact)
            })
            .collect();
        matches.sort_by_key(|lead| lead.created_at);
        Ok(matches.first().map(|lead| (*lead).clone()))
    }

    async fn create_lead(&self, data: LeadData) -> Result<Lead> {
        let lead = Lead {
            id: record_id("lead"),
            name: data.name,
            phone: data.phone,
            email: data.email,
            specialization: data.specialization,
            status: LeadStatus::New,
            source: data.source,
            channel: data.channel,
            urgency: data.urgency,
            claim_value: data.claim_value,
            metadata: data.metadata,
            created_at: Utc::now(),
        };
        self.leads.write().insert(lead.id.clone(), lead.clone());
        Ok(lead)
    }

    async fn update_lead_status(&self, id: &str, status: LeadStatus) -> Result<()> {
        let mut leads = self.leads.write();
        let lead = leads
            .get_mut(id)
            .ok_or_else(|| LeadFlowError::LeadNotFound(id.to_string()))?;
        lead.status = status;
        Ok(())
    }

    async fn append_interaction(&self, interaction: Interaction) -> Result<()> {
        self.interactions.write().push(interaction);
        Ok(())
    }

    async fn interactions_for(&self, lead_id: &str, limit: usize) -> Result<Vec<Interaction>> {
        let interactions = self.interactions.read();
        let of_lead: Vec<Interaction> = interactions
            .iter()
            .filter(|i| i.lead_id == lead_id)
            .cloned()
            .collect();
        let start = of_lead.len().saturating_sub(limit);
        Ok(of_lead[start..].to_vec())
    }

    async fn append_execution(&self, execution: WorkflowExecution) -> Result<()> {
        self.executions.write().push(execution);
        Ok(())
    }

    async fn finish_execution(
        &self,
        execution_id: &str,
        finished_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut executions = self.executions.write();
        let execution = executions
            .iter_mut()
            .find(|e| e.id == execution_id)
            .ok_or_else(|| {
                LeadFlowError::Store(format!("execution `{execution_id}` not found"))
            })?;
        execution.status = crate::model::ExecutionStatus::Completed;
        execution.finished_at = Some(finished_at);
        Ok(())
    }

    async fn append_action_log(&self, log: WorkflowActionLog) -> Result<()> {
        self.action_logs.write().push(log);
        Ok(())
    }

    async fn create_task(&self, task: TaskRecord) -> Result<()> {
        self.tasks.write().push(task);
        Ok(())
    }

    async fn create_appointment(&self, appointment: AppointmentRecord) -> Result<()> {
        self.appointments.write().push(appointment);
        Ok(())
    }

    async fn create_document(&self, document: DocumentRecord) -> Result<()> {
        self.documents.write().push(document);
        Ok(())
    }

    async fn log_activity(&self, activity: ActivityRecord) -> Result<()> {
        self.activities.write().push(activity);
        Ok(())
    }

    async fn list_agent_configs(&self, active_only: bool) -> Result<Vec<AgentConfig>> {
        let configs = self.agent_configs.read();
        Ok(configs
            .iter()
            .filter(|a| !active_only || a.active)
            .cloned()
            .collect())
    }

    async fn list_workflow_templates(&self, active_only: bool) -> Result<Vec<WorkflowTemplate>> {
        let templates = self.templates.read();
        Ok(templates
            .iter()
            .filter(|t| !active_only || t.active)
            .cloned()
            .collect())
    }

    async fn recent_executions(&self, limit: usize) -> Result<Vec<WorkflowExecution>> {
        let executions = self.executions.read();
        let start = executions.len().saturating_sub(limit);
        Ok(executions[start..].to_vec())
    }

    async fn recent_action_logs(&self, limit: usize) -> Result<Vec<WorkflowActionLog>> {
        let logs = self.action_logs.read();
        let start = logs.len().saturating_sub(limit);
        Ok(logs[start..].to_vec())
    }
}
