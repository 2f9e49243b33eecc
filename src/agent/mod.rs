pub mod config;
pub mod escalation;
pub mod registry;

pub use config::{AgentConfig, AgentRole, EscalationRule};
pub use escalation::{
    ConfidenceScorer, DynConfidenceScorer, EscalationDecision, EscalationEvaluator, FixedScorer,
};
pub use registry::{AgentRegistry, SharedAgentRegistry};
