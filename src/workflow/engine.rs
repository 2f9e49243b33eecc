use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::agent::AgentRole;
use crate::error::{LeadFlowError, Result};
use crate::model::{
    record_id, ActionOutcome, AppointmentRecord, DocumentRecord, ExecutionStatus, Interaction,
    LeadStatus, TaskRecord, WorkflowActionLog, WorkflowExecution,
};
use crate::store::DynLeadStore;

use super::templates::{builtin_templates, render_document_template, render_message_template};
use super::{conditions_hold, ActionKind, WorkflowAction, WorkflowContext, WorkflowTemplate};

#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Wall-clock length of one declared delay minute. Production keeps the
    /// default; tests shrink it so delayed actions run immediately.
    pub minute: Duration,
    pub default_task_due_hours: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            minute: Duration::from_secs(60),
            default_task_due_hours: 24,
        }
    }
}

/// Runs declarative automation templates against a lead, logging every
/// action outcome for auditability.
pub struct WorkflowEngine {
    store: DynLeadStore,
    templates: RwLock<Vec<WorkflowTemplate>>,
    config: EngineConfig,
}

impl WorkflowEngine {
    pub fn new(store: DynLeadStore) -> Self {
        Self {
            store,
            templates: RwLock::new(builtin_templates()),
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_templates(self, templates: Vec<WorkflowTemplate>) -> Self {
        *self.templates.write() = templates;
        self
    }

    /// Appends the store's active templates after the builtins. A store
    /// template with a builtin's id replaces it in place.
    pub async fn load_store_templates(&self) -> Result<usize> {
        let custom = self.store.list_workflow_templates(true).await?;
        let count = custom.len();
        let mut templates = self.templates.write();
        for template in custom {
            match templates.iter_mut().find(|t| t.id == template.id) {
                Some(existing) => *existing = template,
                None => templates.push(template),
            }
        }
        info!(count, "custom workflow templates loaded");
        Ok(count)
    }

    pub fn templates(&self) -> Vec<WorkflowTemplate> {
        self.templates.read().clone()
    }

    /// Runs every applicable template in registry insertion order.
    pub async fn execute(
        &self,
        lead_id: &str,
        role: AgentRole,
        specialization: &str,
        context: &WorkflowContext,
    ) -> Result<()> {
        let selected: Vec<WorkflowTemplate> = self
            .templates
            .read()
            .iter()
            .filter(|t| t.applies_to(role, specialization) && conditions_hold(&t.trigger_conditions, context))
            .cloned()
            .collect();

        debug!(lead = lead_id, templates = selected.len(), "workflow templates selected");
        for template in selected {
            self.run_template(lead_id, &template, context).await?;
        }
        Ok(())
    }

    async fn run_template(
        &self,
        lead_id: &str,
        template: &WorkflowTemplate,
        context: &WorkflowContext,
    ) -> Result<()> {
        info!(lead = lead_id, template = %template.id, "running workflow template");

        let execution_id = record_id("exec");
        self.store
            .append_execution(WorkflowExecution {
                id: execution_id.clone(),
                lead_id: lead_id.to_string(),
                template_id: template.id.clone(),
                status: ExecutionStatus::Running,
                started_at: Utc::now(),
                finished_at: None,
            })
            .await?;

        for action in &template.actions {
            if let Some(minutes) = action.delay_minutes {
                if minutes > 0 {
                    debug!(action = %action.id, minutes, "delaying workflow action");
                    tokio::time::sleep(delay_for(self.config.minute, minutes)).await;
                }
            }

            // Gating sees the live status, not the status at trigger time.
            let live = self.refresh_status(lead_id, context).await;
            if !conditions_hold(&action.conditions, &live) {
                debug!(action = %action.id, "gating conditions not met, skipping");
                self.log_action(&execution_id, &action.id, ActionOutcome::Skipped, None)
                    .await?;
                continue;
            }

            match self.execute_action(lead_id, action, &live).await {
                Ok(()) => {
                    self.log_action(&execution_id, &action.id, ActionOutcome::Success, None)
                        .await?;
                }
                Err(error) => {
                    warn!(action = %action.id, %error, "workflow action failed");
                    self.log_action(
                        &execution_id,
                        &action.id,
                        ActionOutcome::Error,
                        Some(error.to_string()),
                    )
                    .await?;
                }
            }
        }

        self.store
            .finish_execution(&execution_id, Utc::now())
            .await?;
        Ok(())
    }

    async fn refresh_status(&self, lead_id: &str, context: &WorkflowContext) -> WorkflowContext {
        let mut live = context.clone();
        if let Ok(lead) = self.store.get_lead(lead_id).await {
            live.insert(
                "status".to_string(),
                Value::String(lead.status.as_str().to_string()),
            );
        }
        live
    }

    async fn execute_action(
        &self,
        lead_id: &str,
        action: &WorkflowAction,
        context: &WorkflowContext,
    ) -> Result<()> {
        match action.kind {
            ActionKind::SendMessage => self.send_message(lead_id, action, context).await,
            ActionKind::CreateTask => self.create_task(lead_id, action).await,
            ActionKind::ScheduleMeeting => self.schedule_meeting(lead_id, action).await,
            ActionKind::GenerateDocument => self.generate_document(lead_id, action, context).await,
            ActionKind::UpdateStatus => self.update_status(lead_id, action).await,
        }
    }

    async fn send_message(
        &self,
        lead_id: &str,
        action: &WorkflowAction,
        context: &WorkflowContext,
    ) -> Result<()> {
        let template = param_str(action, "template")
            .ok_or_else(|| LeadFlowError::Validation("send_message needs a template".into()))?;
        let content = render_message_template(&template, context);
        let agent_id = context
            .get("agent_id")
            .and_then(Value::as_str)
            .unwrap_or("system");

        self.store
            .append_interaction(Interaction {
                id: record_id("int"),
                lead_id: lead_id.to_string(),
                agent_id: agent_id.to_string(),
                message: format!("Sistema: {content}"),
                response: String::new(),
                sentiment: 0.5,
                created_at: Utc::now(),
            })
            .await
    }

    async fn create_task(&self, lead_id: &str, action: &WorkflowAction) -> Result<()> {
        let due_hours = param_i64(action, "due_hours").unwrap_or(self.config.default_task_due_hours);
        self.store
            .create_task(TaskRecord {
                id: record_id("task"),
                lead_id: lead_id.to_string(),
                title: param_str(action, "title").unwrap_or_else(|| "Tarefa".to_string()),
                description: param_str(action, "description").unwrap_or_default(),
                priority: param_str(action, "priority").unwrap_or_else(|| "medium".to_string()),
                due_at: Utc::now() + ChronoDuration::hours(due_hours),
                created_at: Utc::now(),
            })
            .await
    }

    async fn schedule_meeting(&self, lead_id: &str, action: &WorkflowAction) -> Result<()> {
        self.store
            .create_appointment(AppointmentRecord {
                id: record_id("appt"),
                lead_id: lead_id.to_string(),
                title: param_str(action, "title").unwrap_or_else(|| "Reunião".to_string()),
                duration_minutes: param_i64(action, "duration_minutes").unwrap_or(30) as u32,
                meeting_kind: param_str(action, "type").unwrap_or_else(|| "video_call".to_string()),
                created_at: Utc::now(),
            })
            .await
    }

    async fn generate_document(
        &self,
        lead_id: &str,
        action: &WorkflowAction,
        context: &WorkflowContext,
    ) -> Result<()> {
        let template = param_str(action, "template")
            .ok_or_else(|| LeadFlowError::Validation("generate_document needs a template".into()))?;
        self.store
            .create_document(DocumentRecord {
                id: record_id("doc"),
                lead_id: lead_id.to_string(),
                title: format!("Documento - {template}"),
                content: render_document_template(&template, context),
                template,
                created_at: Utc::now(),
            })
            .await
    }

    /// Direct status write; deliberately bypasses the conversation
    /// heuristic.
    async fn update_status(&self, lead_id: &str, action: &WorkflowAction) -> Result<()> {
        let raw = param_str(action, "new_status")
            .ok_or_else(|| LeadFlowError::Validation("update_status needs new_status".into()))?;
        let status: LeadStatus = serde_json::from_value(Value::String(raw))
            .map_err(|e| LeadFlowError::Serialization(e.to_string()))?;
        self.store.update_lead_status(lead_id, status).await
    }

    async fn log_action(
        &self,
        execution_id: &str,
        action_id: &str,
        outcome: ActionOutcome,
        error: Option<String>,
    ) -> Result<()> {
        self.store
            .append_action_log(WorkflowActionLog {
                execution_id: execution_id.to_string(),
                action_id: action_id.to_string(),
                outcome,
                error,
                executed_at: Utc::now(),
            })
            .await
    }
}

/// Declared delays saturate instead of wrapping; an absurd minute count
/// waits as long as the clock allows rather than not at all.
fn delay_for(minute: Duration, minutes: u64) -> Duration {
    minute.saturating_mul(u32::try_from(minutes).unwrap_or(u32::MAX))
}

fn param_str(action: &WorkflowAction, key: &str) -> Option<String> {
    action
        .parameters
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn param_i64(action: &WorkflowAction, key: &str) -> Option<i64> {
    action.parameters.get(key).and_then(Value::as_i64)
}
