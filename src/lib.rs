pub mod agent;
pub mod channel;
pub mod cli;
pub mod config;
pub mod error;
pub mod intake;
pub mod llm;
pub mod model;
pub mod monitor;
pub mod router;
pub mod store;
pub mod utils;
pub mod workflow;

pub use agent::{
    AgentConfig, AgentRegistry, AgentRole, ConfidenceScorer, DynConfidenceScorer,
    EscalationDecision, EscalationEvaluator, EscalationRule, FixedScorer, SharedAgentRegistry,
};
pub use channel::{ChannelAdapter, ChannelRegistry, DynChannelAdapter, MemoryChannel};
pub use config::{
    load_agents_from_file, load_agents_from_str, load_templates_from_file, load_templates_from_str,
};
pub use error::{LeadFlowError, Result};
pub use intake::IntakeQueue;
pub use llm::{
    ChatMessage, CompletionClient, CompletionRequest, CompletionResponse, DynCompletionClient,
    LocalEchoClient,
};
pub use model::{
    ActionOutcome, ActivityRecord, AppointmentRecord, Channel, DocumentRecord, ExecutionStatus,
    InboundMessage, Interaction, Lead, LeadData, LeadSource, LeadStatus, OutboundMessage,
    TaskRecord, Urgency, WorkflowActionLog, WorkflowExecution,
};
pub use monitor::{Monitor, QueueStatus};
pub use router::{
    ConversationRouter, KeywordClassifier, RouterConfig, StatusHint, TransitionClassifier,
    FALLBACK_MESSAGE,
};
pub use store::{DynLeadStore, LeadStore, MemoryStore};
pub use utils::{LeadValidator, LoggingConfig};
pub use workflow::{
    builtin_templates, lead_context, ActionKind, ConditionOperator, EngineConfig,
    WorkflowAction, WorkflowCondition, WorkflowContext, WorkflowEngine, WorkflowKind,
    WorkflowTemplate,
};
