use serde::{Deserialize, Serialize};

/// Functional stage in the lead lifecycle. Wire names match the production
/// CRM's agent-type column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentRole {
    #[serde(rename = "sdr")]
    Qualifier,
    #[serde(rename = "closer")]
    Closer,
    #[serde(rename = "customer_success")]
    SuccessManager,
}

impl AgentRole {
    pub fn description(self) -> &'static str {
        match self {
            AgentRole::Qualifier => "Especialista em Qualificação de Leads",
            AgentRole::Closer => "Especialista em Fechamento de Negócios",
            AgentRole::SuccessManager => "Especialista em Sucesso do Cliente",
        }
    }
}

/// Hands a conversation to another role when any trigger keyword appears in
/// a turn and the confidence scorer clears the threshold.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EscalationRule {
    pub condition: String,
    pub next_role: AgentRole,
    pub trigger_keywords: Vec<String>,
    pub confidence_threshold: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentConfig {
    pub id: String,
    pub name: String,
    pub role: AgentRole,
    /// Legal area this agent is scoped to; `"Geral"` is the wildcard.
    pub specialization: String,
    #[serde(default)]
    pub prompt_base: String,
    #[serde(default = "default_personality")]
    pub personality: String,
    #[serde(default = "default_specializations")]
    pub specializations: Vec<String>,
    #[serde(default = "default_max_interactions")]
    pub max_interactions: u32,
    #[serde(default)]
    pub escalation_rules: Vec<EscalationRule>,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl AgentConfig {
    /// Wildcard agents answer any legal area.
    pub fn is_general(&self) -> bool {
        self.specialization == "Geral" || self.specializations.iter().any(|s| s == "geral")
    }
}

fn default_personality() -> String {
    "Profissional e acessível".to_string()
}

fn default_specializations() -> Vec<String> {
    vec!["geral".to_string()]
}

fn default_max_interactions() -> u32 {
    50
}

fn default_active() -> bool {
    true
}
