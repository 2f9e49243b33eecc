mod engine;
mod templates;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::agent::AgentRole;

pub use engine::{EngineConfig, WorkflowEngine};
pub use templates::{builtin_templates, render_document_template, render_message_template};

/// Live context a template or action is gated on: status, area, channel,
/// urgency and whatever else the caller knows about the lead.
pub type WorkflowContext = Map<String, Value>;

/// Standard trigger context derived from a lead record.
pub fn lead_context(lead: &crate::model::Lead) -> WorkflowContext {
    let mut context = Map::new();
    context.insert("status".into(), Value::String(lead.status.as_str().into()));
    context.insert(
        "area_juridica".into(),
        Value::String(lead.specialization.clone()),
    );
    if let Ok(source) = serde_json::to_value(lead.source) {
        context.insert("origem".into(), source);
    }
    context.insert("canal".into(), Value::String(lead.channel.as_str().into()));
    if let Ok(urgency) = serde_json::to_value(lead.urgency) {
        context.insert("urgencia".into(), urgency);
    }
    if let Some(value) = lead.claim_value {
        if let Some(number) = serde_json::Number::from_f64(value) {
            context.insert("valor_causa".into(), Value::Number(number));
        }
    }
    context
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowKind {
    LeadQualification,
    ProposalGeneration,
    ContractCreation,
    FollowUp,
    Onboarding,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equals,
    Contains,
    GreaterThan,
    LessThan,
}

/// field / operator / value triple evaluated against a context object.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkflowCondition {
    pub field: String,
    pub operator: ConditionOperator,
    pub value: Value,
}

impl WorkflowCondition {
    pub fn new(field: impl Into<String>, operator: ConditionOperator, value: Value) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    pub fn holds(&self, context: &WorkflowContext) -> bool {
        let Some(actual) = context.get(&self.field) else {
            return false;
        };
        match self.operator {
            ConditionOperator::Equals => actual == &self.value,
            ConditionOperator::Contains => {
                let haystack = value_as_text(actual).to_lowercase();
                let needle = value_as_text(&self.value).to_lowercase();
                haystack.contains(&needle)
            }
            ConditionOperator::GreaterThan => match (value_as_f64(actual), value_as_f64(&self.value)) {
                (Some(a), Some(b)) => a > b,
                _ => false,
            },
            ConditionOperator::LessThan => match (value_as_f64(actual), value_as_f64(&self.value)) {
                (Some(a), Some(b)) => a < b,
                _ => false,
            },
        }
    }
}

/// All conditions must hold; an empty list always passes.
pub fn conditions_hold(conditions: &[WorkflowCondition], context: &WorkflowContext) -> bool {
    conditions.iter().all(|c| c.holds(context))
}

fn value_as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    SendMessage,
    CreateTask,
    ScheduleMeeting,
    GenerateDocument,
    UpdateStatus,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkflowAction {
    pub id: String,
    pub kind: ActionKind,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default)]
    pub delay_minutes: Option<u64>,
    #[serde(default)]
    pub conditions: Vec<WorkflowCondition>,
}

/// Declarative automation unit: trigger conditions plus an ordered list of
/// actions. Immutable at runtime.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkflowTemplate {
    pub id: String,
    pub name: String,
    pub kind: WorkflowKind,
    pub role: AgentRole,
    /// Legal area the template applies to; `"Geral"` is the wildcard.
    pub specialization: String,
    #[serde(default)]
    pub trigger_conditions: Vec<WorkflowCondition>,
    pub actions: Vec<WorkflowAction>,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl WorkflowTemplate {
    pub fn applies_to(&self, role: AgentRole, specialization: &str) -> bool {
        self.active
            && self.role == role
            && (self.specialization == specialization || self.specialization == "Geral")
    }
}

fn default_active() -> bool {
    true
}
