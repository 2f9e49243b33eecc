use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use leadflow::{
    AgentConfig, AgentRegistry, AgentRole, Channel, ChannelRegistry, CompletionClient,
    CompletionRequest, CompletionResponse, ConversationRouter, DynCompletionClient,
    EscalationEvaluator, FixedScorer, InboundMessage, IntakeQueue, LeadData, LeadFlowError,
    LeadSource, LeadStatus, MemoryChannel, MemoryStore, RouterConfig, WorkflowEngine,
    ActionOutcome, EngineConfig, FALLBACK_MESSAGE,
};

/// Echoes the user turn; turns containing `slow` are delayed first.
#[derive(Clone)]
struct EchoClient {
    slow_delay: Duration,
}

#[async_trait]
impl CompletionClient for EchoClient {
    async fn complete(&self, request: CompletionRequest) -> leadflow::Result<CompletionResponse> {
        if request.user.contains("slow") {
            sleep(self.slow_delay).await;
        }
        Ok(CompletionResponse {
            content: format!("[Echo] {}", request.user),
            metadata: None,
        })
    }

    fn clone_dyn(&self) -> DynCompletionClient {
        Arc::new(self.clone())
    }
}

#[derive(Clone)]
struct FailingClient;

#[async_trait]
impl CompletionClient for FailingClient {
    async fn complete(&self, _request: CompletionRequest) -> leadflow::Result<CompletionResponse> {
        Err(LeadFlowError::Completion("service unavailable".to_string()))
    }

    fn clone_dyn(&self) -> DynCompletionClient {
        Arc::new(FailingClient)
    }
}

fn agent(id: &str, role: AgentRole, specialization: &str) -> AgentConfig {
    AgentConfig {
        id: id.to_string(),
        name: id.to_string(),
        role,
        specialization: specialization.to_string(),
        prompt_base: String::new(),
        personality: "Profissional".to_string(),
        specializations: vec!["trabalhista".to_string()],
        max_interactions: 50,
        escalation_rules: Vec::new(),
        active: true,
    }
}

struct Stack {
    store: Arc<MemoryStore>,
    queue: Arc<IntakeQueue>,
    chat: Arc<MemoryChannel>,
}

fn stack(agents: Vec<AgentConfig>, client: DynCompletionClient, router_config: RouterConfig) -> Stack {
    let store = Arc::new(MemoryStore::new());
    let registry = Arc::new(AgentRegistry::with_agents(agents));
    let chat = Arc::new(MemoryChannel::new());
    let mut channels = ChannelRegistry::new();
    channels.register(Channel::Chat, chat.clone());
    channels.register(Channel::Whatsapp, chat.clone());
    channels.register(Channel::Email, chat.clone());
    let channels = Arc::new(channels);

    let router = Arc::new(
        ConversationRouter::new(
            store.clone(),
            registry,
            client,
            EscalationEvaluator::new(Arc::new(FixedScorer::default())),
            channels.clone(),
        )
        .with_config(router_config),
    );
    let workflows = Arc::new(WorkflowEngine::new(store.clone()).with_config(EngineConfig {
        minute: Duration::from_millis(1),
        ..EngineConfig::default()
    }));
    let queue = IntakeQueue::start(store.clone(), router, channels, workflows);
    Stack { store, queue, chat }
}

fn default_stack(agents: Vec<AgentConfig>) -> Stack {
    stack(
        agents,
        Arc::new(EchoClient {
            slow_delay: Duration::from_millis(80),
        }),
        RouterConfig::default(),
    )
}

#[tokio::test]
async fn two_messages_from_same_number_create_one_lead() {
    let s = default_stack(vec![agent("sdr", AgentRole::Qualifier, "Geral")]);

    s.queue
        .submit(InboundMessage::new(Channel::Whatsapp, "+5511888", "primeira"))
        .unwrap();
    s.queue
        .submit(InboundMessage::new(Channel::Whatsapp, "+5511888", "segunda"))
        .unwrap();
    s.queue.drained().await;

    assert_eq!(s.store.lead_count(), 1);
    let lead = s
        .store
        .find_lead_by_contact("+5511888")
        .await
        .unwrap()
        .unwrap();
    let interactions = s.store.all_interactions(&lead.id);
    assert_eq!(interactions.len(), 2);
    assert_eq!(interactions[0].message, "primeira");
    assert_eq!(interactions[1].message, "segunda");
}

#[tokio::test]
async fn interactions_keep_submission_order_across_leads() {
    let s = default_stack(vec![agent("sdr", AgentRole::Qualifier, "Geral")]);
    let a = s
        .store
        .create_lead(LeadData {
            name: "A".to_string(),
            phone: Some("+A".to_string()),
            email: None,
            specialization: "Geral".to_string(),
            source: LeadSource::Website,
            channel: Channel::Chat,
            initial_message: None,
            claim_value: None,
            urgency: Default::default(),
            metadata: Default::default(),
        })
        .await
        .unwrap();

    s.queue
        .submit(InboundMessage::new(Channel::Chat, "+A", "A1"))
        .unwrap();
    s.queue
        .submit(InboundMessage::new(Channel::Chat, "+B", "slow B1"))
        .unwrap();
    s.queue
        .submit(InboundMessage::new(Channel::Chat, "+A", "A2"))
        .unwrap();
    s.queue.drained().await;

    let interactions = s.store.all_interactions(&a.id);
    let messages: Vec<&str> = interactions.iter().map(|i| i.message.as_str()).collect();
    assert_eq!(messages, vec!["A1", "A2"]);
}

#[tokio::test]
async fn completion_failures_do_not_stall_the_queue() {
    let s = stack(
        vec![agent("sdr", AgentRole::Qualifier, "Geral")],
        Arc::new(FailingClient),
        RouterConfig::default(),
    );

    s.queue
        .submit(InboundMessage::new(Channel::Chat, "visitante-1", "olá"))
        .unwrap();
    s.queue
        .submit(InboundMessage::new(Channel::Chat, "visitante-2", "oi"))
        .unwrap();
    s.queue.drained().await;

    assert_eq!(s.queue.processed(), 2);
    assert_eq!(s.queue.failed(), 0);
    let fallbacks = s
        .chat
        .sent()
        .into_iter()
        .filter(|(_, content)| content == FALLBACK_MESSAGE)
        .count();
    assert_eq!(fallbacks, 2);
}

#[tokio::test]
async fn hung_completion_is_bounded_by_timeout() {
    let s = stack(
        vec![agent("sdr", AgentRole::Qualifier, "Geral")],
        Arc::new(EchoClient {
            slow_delay: Duration::from_secs(60),
        }),
        RouterConfig {
            completion_timeout: Duration::from_millis(50),
            ..RouterConfig::default()
        },
    );

    s.queue
        .submit(InboundMessage::new(Channel::Chat, "+C", "slow pedido"))
        .unwrap();
    s.queue
        .submit(InboundMessage::new(Channel::Chat, "+C", "rápido"))
        .unwrap();
    s.queue.drained().await;

    let lead = s.store.find_lead_by_contact("+C").await.unwrap().unwrap();
    let interactions = s.store.all_interactions(&lead.id);
    assert_eq!(interactions.len(), 2);
    assert_eq!(interactions[0].response, FALLBACK_MESSAGE);
    assert_eq!(interactions[1].response, "[Echo] rápido");
}

#[tokio::test]
async fn direct_create_lead_validates_and_dedupes() {
    let s = default_stack(vec![agent("sdr", AgentRole::Qualifier, "Geral")]);

    let invalid = s
        .queue
        .create_lead(LeadData {
            name: "Sem Contato".to_string(),
            phone: None,
            email: None,
            specialization: "Geral".to_string(),
            source: LeadSource::Website,
            channel: Channel::Chat,
            initial_message: None,
            claim_value: None,
            urgency: Default::default(),
            metadata: Default::default(),
        })
        .await;
    assert!(matches!(invalid, Err(LeadFlowError::Validation(_))));

    let data = LeadData {
        name: "Maria".to_string(),
        phone: Some("+5511777".to_string()),
        email: None,
        specialization: "Direito Trabalhista".to_string(),
        source: LeadSource::Website,
        channel: Channel::Chat,
        initial_message: None,
        claim_value: None,
        urgency: Default::default(),
        metadata: Default::default(),
    };
    let first = s.queue.create_lead(data.clone()).await.unwrap();
    let second = s.queue.create_lead(data).await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(s.store.lead_count(), 1);
}

#[tokio::test]
async fn trabalhista_lead_runs_qualification_workflow_end_to_end() {
    let s = default_stack(vec![agent("sdr", AgentRole::Qualifier, "Direito Trabalhista")]);

    let lead = s
        .queue
        .create_lead(LeadData {
            name: "Maria".to_string(),
            phone: Some("+5511666".to_string()),
            email: None,
            specialization: "Direito Trabalhista".to_string(),
            source: LeadSource::Whatsapp,
            channel: Channel::Chat,
            initial_message: Some("Fui demitido sem justa causa".to_string()),
            claim_value: None,
            urgency: Default::default(),
            metadata: Default::default(),
        })
        .await
        .unwrap();

    // Assignment and the qualification template both ran on creation.
    let activities = s.store.all_activities();
    assert!(activities.iter().any(|a| a.action == "lead_assigned"));
    assert!(activities.iter().any(|a| a.action == "lead_created"));

    let executions = s.store.recent_executions(10).await.unwrap();
    assert_eq!(executions.len(), 1);
    assert_eq!(executions[0].template_id, "sdr_qualification_trabalhista");
    assert!(executions[0].finished_at.is_some());

    let logs = s.store.all_action_logs();
    assert_eq!(logs.len(), 3);
    assert!(logs.iter().all(|l| l.outcome == ActionOutcome::Success));

    let system_messages = s
        .store
        .all_interactions(&lead.id)
        .into_iter()
        .filter(|i| i.message.starts_with("Sistema: "))
        .count();
    assert_eq!(system_messages, 2);
    assert_eq!(s.store.all_tasks().len(), 1);

    // The first real turn flows through the router afterwards.
    s.queue
        .submit(InboundMessage::new(
            Channel::Chat,
            "+5511666",
            "Fui demitido sem justa causa",
        ))
        .unwrap();
    s.queue.drained().await;

    let lead = s.store.get_lead(&lead.id).await.unwrap();
    assert_eq!(lead.status, LeadStatus::New);
    let interactions = s.store.all_interactions(&lead.id);
    assert!(interactions
        .iter()
        .any(|i| i.response == "[Echo] Fui demitido sem justa causa"));
}
