use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use crate::agent::{
    AgentConfig, AgentRegistry, AgentRole, EscalationEvaluator, EscalationRule, FixedScorer,
};
use crate::channel::{ChannelRegistry, MemoryChannel};
use crate::intake::IntakeQueue;
use crate::llm::LocalEchoClient;
use crate::monitor::Monitor;
use crate::model::Channel;
use crate::router::ConversationRouter;
use crate::store::MemoryStore;
use crate::workflow::{EngineConfig, WorkflowEngine};

/// Fully wired in-memory pipeline for the demo binary and examples.
pub struct DemoStack {
    pub store: Arc<MemoryStore>,
    pub queue: Arc<IntakeQueue>,
    pub monitor: Monitor,
    pub chat: Arc<MemoryChannel>,
}

pub fn build_demo_stack(agents: Vec<AgentConfig>, minute: Duration) -> DemoStack {
    let store = Arc::new(MemoryStore::new());
    let registry = Arc::new(AgentRegistry::with_agents(agents));

    let chat = Arc::new(MemoryChannel::new());
    let mut channels = ChannelRegistry::new();
    channels.register(Channel::Chat, chat.clone());
    channels.register(Channel::Whatsapp, Arc::new(MemoryChannel::new()));
    channels.register(Channel::Email, Arc::new(MemoryChannel::new()));
    let channels = Arc::new(channels);

    let router = Arc::new(ConversationRouter::new(
        store.clone(),
        registry.clone(),
        Arc::new(LocalEchoClient),
        EscalationEvaluator::new(Arc::new(FixedScorer::default())),
        channels.clone(),
    ));

    let workflows = Arc::new(WorkflowEngine::new(store.clone()).with_config(EngineConfig {
        minute,
        ..EngineConfig::default()
    }));

    let queue = IntakeQueue::start(store.clone(), router.clone(), channels, workflows);
    let monitor = Monitor::new(store.clone(), queue.clone(), router, registry);

    DemoStack {
        store,
        queue,
        monitor,
        chat,
    }
}

/// Trabalhista-focused starter team used when no agent config is given.
pub fn demo_agents() -> Vec<AgentConfig> {
    let base = |id: &str, name: &str, role: AgentRole| AgentConfig {
        id: id.to_string(),
        name: name.to_string(),
        role,
        specialization: "Direito Trabalhista".to_string(),
        prompt_base: String::new(),
        personality: "Profissional e acessível".to_string(),
        specializations: vec!["trabalhista".to_string()],
        max_interactions: 50,
        escalation_rules: Vec::new(),
        active: true,
    };

    let mut sdr = base("sdr-trabalhista", "Ana", AgentRole::Qualifier);
    sdr.escalation_rules = vec![EscalationRule {
        condition: "lead qualificado e pronto para proposta".to_string(),
        next_role: AgentRole::Closer,
        trigger_keywords: vec!["qualificado".to_string(), "proposta".to_string()],
        confidence_threshold: 0.7,
    }];

    let mut closer = base("closer-trabalhista", "Bruno", AgentRole::Closer);
    closer.escalation_rules = vec![EscalationRule {
        condition: "contrato assinado".to_string(),
        next_role: AgentRole::SuccessManager,
        trigger_keywords: vec!["contrato assinado".to_string()],
        confidence_threshold: 0.7,
    }];

    let mut cs = base("cs-geral", "Carla", AgentRole::SuccessManager);
    cs.specialization = "Geral".to_string();
    cs.specializations = vec!["geral".to_string()];

    vec![sdr, closer, cs]
}

pub fn agents_as_json(agents: &[AgentConfig]) -> serde_json::Value {
    json!(agents)
}
