use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Generates a process-unique record id with the given prefix.
pub fn record_id(prefix: &str) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}-{}", prefix, now.as_secs(), seq)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Chat,
    Whatsapp,
    Email,
    Phone,
    Form,
}

impl Channel {
    /// Phone and form contacts are carried over the internal chat transport.
    pub fn normalized(self) -> Channel {
        match self {
            Channel::Phone | Channel::Form => Channel::Chat,
            other => other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Chat => "chat",
            Channel::Whatsapp => "whatsapp",
            Channel::Email => "email",
            Channel::Phone => "phone",
            Channel::Form => "form",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadSource {
    Website,
    Whatsapp,
    Facebook,
    Google,
    Referral,
    Organic,
}

impl LeadSource {
    pub fn from_channel(channel: Channel) -> LeadSource {
        match channel {
            Channel::Whatsapp => LeadSource::Whatsapp,
            Channel::Email | Channel::Chat => LeadSource::Website,
            Channel::Phone | Channel::Form => LeadSource::Organic,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
}

/// Lead lifecycle status. Wire names match the values stored by the
/// production CRM, and workflow trigger conditions compare against them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeadStatus {
    #[serde(rename = "novo_lead")]
    New,
    #[serde(rename = "em_qualificacao")]
    Qualifying,
    #[serde(rename = "proposta_enviada")]
    ProposalSent,
    #[serde(rename = "contrato_assinado")]
    ContractSigned,
    #[serde(rename = "em_atendimento")]
    InService,
    #[serde(rename = "lead_perdido")]
    Lost,
}

impl LeadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LeadStatus::New => "novo_lead",
            LeadStatus::Qualifying => "em_qualificacao",
            LeadStatus::ProposalSent => "proposta_enviada",
            LeadStatus::ContractSigned => "contrato_assinado",
            LeadStatus::InService => "em_atendimento",
            LeadStatus::Lost => "lead_perdido",
        }
    }

    /// Signed and lost leads are terminal for the conversation heuristic;
    /// only an explicit workflow `update_status` action may move them.
    pub fn is_terminal(self) -> bool {
        matches!(self, LeadStatus::ContractSigned | LeadStatus::Lost)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub specialization: String,
    pub status: LeadStatus,
    pub source: LeadSource,
    pub channel: Channel,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub claim_value: Option<f64>,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
    pub created_at: DateTime<Utc>,
}

impl Lead {
    pub fn contact_address(&self) -> Option<&str> {
        self.phone.as_deref().or(self.email.as_deref())
    }
}

/// Payload for creating a lead, either via the direct API path or when the
/// intake queue auto-creates one from an unknown sender.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LeadData {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub specialization: String,
    pub source: LeadSource,
    pub channel: Channel,
    #[serde(default)]
    pub initial_message: Option<String>,
    #[serde(default)]
    pub claim_value: Option<f64>,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InboundMessage {
    pub channel: Channel,
    /// Sender handle: phone number or email address, depending on channel.
    pub from: String,
    pub content: String,
    #[serde(default)]
    pub lead_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

impl InboundMessage {
    pub fn new(channel: Channel, from: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            channel,
            from: from.into(),
            content: content.into(),
            lead_id: None,
            metadata: None,
        }
    }

    pub fn with_lead_id(mut self, lead_id: impl Into<String>) -> Self {
        self.lead_id = Some(lead_id.into());
        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub lead_id: String,
    pub channel: Channel,
    pub to: String,
    pub content: String,
}

/// One conversation turn, append-only.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Interaction {
    pub id: String,
    pub lead_id: String,
    pub agent_id: String,
    pub message: String,
    pub response: String,
    pub sentiment: f32,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Running,
    Completed,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkflowExecution {
    pub id: String,
    pub lead_id: String,
    pub template_id: String,
    pub status: ExecutionStatus,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    Success,
    Error,
    Skipped,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkflowActionLog {
    pub execution_id: String,
    pub action_id: String,
    pub outcome: ActionOutcome,
    #[serde(default)]
    pub error: Option<String>,
    pub executed_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub lead_id: String,
    pub title: String,
    pub description: String,
    pub priority: String,
    pub due_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppointmentRecord {
    pub id: String,
    pub lead_id: String,
    pub title: String,
    pub duration_minutes: u32,
    pub meeting_kind: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub lead_id: String,
    pub template: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Free-form audit entry for lead lifecycle events (assignment, escalation,
/// creation, processing errors).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub lead_id: String,
    pub agent_id: Option<String>,
    pub action: String,
    #[serde(default)]
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
}
