use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use leadflow::{
    lead_context, ActionKind, ActionOutcome, AgentRole, Channel, ConditionOperator, EngineConfig,
    LeadData, LeadSource, LeadStatus, MemoryStore, WorkflowAction, WorkflowCondition,
    WorkflowEngine, WorkflowKind, WorkflowTemplate,
};

fn engine(store: Arc<MemoryStore>) -> WorkflowEngine {
    WorkflowEngine::new(store).with_config(EngineConfig {
        minute: Duration::from_millis(20),
        ..EngineConfig::default()
    })
}

async fn seed_lead(store: &MemoryStore) -> leadflow::Lead {
    store
        .create_lead(LeadData {
            name: "Maria".to_string(),
            phone: Some("+5511999".to_string()),
            email: None,
            specialization: "Direito Trabalhista".to_string(),
            source: LeadSource::Website,
            channel: Channel::Chat,
            initial_message: None,
            claim_value: None,
            urgency: Default::default(),
            metadata: Default::default(),
        })
        .await
        .unwrap()
}

fn action(id: &str, kind: ActionKind, parameters: serde_json::Value) -> WorkflowAction {
    WorkflowAction {
        id: id.to_string(),
        kind,
        parameters: parameters.as_object().cloned().unwrap_or_default(),
        delay_minutes: None,
        conditions: Vec::new(),
    }
}

fn template(id: &str, role: AgentRole, specialization: &str, actions: Vec<WorkflowAction>) -> WorkflowTemplate {
    WorkflowTemplate {
        id: id.to_string(),
        name: id.to_string(),
        kind: WorkflowKind::FollowUp,
        role,
        specialization: specialization.to_string(),
        trigger_conditions: Vec::new(),
        actions,
        active: true,
    }
}

#[tokio::test]
async fn gated_action_is_skipped_and_logged_when_status_differs() {
    let store = Arc::new(MemoryStore::new());
    let lead = seed_lead(&store).await;
    store
        .update_lead_status(&lead.id, LeadStatus::Qualifying)
        .await
        .unwrap();

    let mut gated = action(
        "only_for_new",
        ActionKind::SendMessage,
        json!({"template": "sdr_welcome_trabalhista"}),
    );
    gated.conditions = vec![WorkflowCondition::new(
        "status",
        ConditionOperator::Equals,
        json!("novo_lead"),
    )];
    let engine = engine(store.clone()).with_templates(vec![template(
        "gated",
        AgentRole::Qualifier,
        "Direito Trabalhista",
        vec![gated],
    )]);

    // Trigger context still claims the lead is new; gating must look at the
    // live record instead.
    let mut context = lead_context(&lead);
    context.insert("status".into(), json!("novo_lead"));
    engine
        .execute(&lead.id, AgentRole::Qualifier, "Direito Trabalhista", &context)
        .await
        .unwrap();

    let logs = store.all_action_logs();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].outcome, ActionOutcome::Skipped);
    assert!(store.all_interactions(&lead.id).is_empty());
}

#[tokio::test]
async fn status_change_during_delay_skips_the_action() {
    let store = Arc::new(MemoryStore::new());
    let lead = seed_lead(&store).await;

    let mut delayed = action(
        "delayed_message",
        ActionKind::SendMessage,
        json!({"template": "qualification_trabalhista"}),
    );
    delayed.delay_minutes = Some(5); // 100ms under the test clock
    delayed.conditions = vec![WorkflowCondition::new(
        "status",
        ConditionOperator::Equals,
        json!("novo_lead"),
    )];
    let engine = engine(store.clone()).with_templates(vec![template(
        "delayed",
        AgentRole::Qualifier,
        "Direito Trabalhista",
        vec![delayed],
    )]);

    let context = lead_context(&lead);
    let run = {
        let store = store.clone();
        let lead_id = lead.id.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            store
                .update_lead_status(&lead_id, LeadStatus::Lost)
                .await
                .unwrap();
        })
    };
    engine
        .execute(&lead.id, AgentRole::Qualifier, "Direito Trabalhista", &context)
        .await
        .unwrap();
    run.await.unwrap();

    let logs = store.all_action_logs();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].outcome, ActionOutcome::Skipped);
}

#[tokio::test]
async fn failing_action_does_not_stop_the_rest() {
    let store = Arc::new(MemoryStore::new());
    let lead = seed_lead(&store).await;

    let engine = engine(store.clone()).with_templates(vec![template(
        "mixed",
        AgentRole::Qualifier,
        "Direito Trabalhista",
        vec![
            action("broken", ActionKind::UpdateStatus, json!({"new_status": "no_such_status"})),
            action(
                "still_runs",
                ActionKind::CreateTask,
                json!({"title": "Follow-up", "due_hours": 4}),
            ),
        ],
    )]);

    engine
        .execute(&lead.id, AgentRole::Qualifier, "Direito Trabalhista", &lead_context(&lead))
        .await
        .unwrap();

    let logs = store.all_action_logs();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].outcome, ActionOutcome::Error);
    assert!(logs[0].error.is_some());
    assert_eq!(logs[1].outcome, ActionOutcome::Success);
    assert_eq!(store.all_tasks().len(), 1);
}

#[tokio::test]
async fn actions_run_in_declared_order_and_side_effects_land() {
    let store = Arc::new(MemoryStore::new());
    let lead = seed_lead(&store).await;

    let engine = engine(store.clone()).with_templates(vec![template(
        "full",
        AgentRole::Closer,
        "Direito Trabalhista",
        vec![
            action(
                "doc",
                ActionKind::GenerateDocument,
                json!({"template": "proposta_trabalhista"}),
            ),
            action(
                "msg",
                ActionKind::SendMessage,
                json!({"template": "proposal_presentation"}),
            ),
            action(
                "meet",
                ActionKind::ScheduleMeeting,
                json!({"title": "Apresentação", "duration_minutes": 30}),
            ),
            action(
                "advance",
                ActionKind::UpdateStatus,
                json!({"new_status": "proposta_enviada"}),
            ),
        ],
    )]);

    engine
        .execute(&lead.id, AgentRole::Closer, "Direito Trabalhista", &lead_context(&lead))
        .await
        .unwrap();

    let ids: Vec<String> = store
        .all_action_logs()
        .into_iter()
        .map(|l| l.action_id)
        .collect();
    assert_eq!(ids, vec!["doc", "msg", "meet", "advance"]);
    assert_eq!(store.all_documents().len(), 1);
    assert_eq!(store.all_appointments().len(), 1);
    let lead = store.get_lead(&lead.id).await.unwrap();
    assert_eq!(lead.status, LeadStatus::ProposalSent);
}

#[tokio::test]
async fn wildcard_template_applies_to_any_area() {
    let store = Arc::new(MemoryStore::new());
    let lead = seed_lead(&store).await;

    let engine = engine(store.clone()).with_templates(vec![
        template(
            "wildcard",
            AgentRole::Qualifier,
            "Geral",
            vec![action(
                "hello",
                ActionKind::SendMessage,
                json!({"template": "sdr_welcome_trabalhista"}),
            )],
        ),
        template(
            "other_area",
            AgentRole::Qualifier,
            "Direito de Família",
            vec![action(
                "nope",
                ActionKind::SendMessage,
                json!({"template": "sdr_welcome_trabalhista"}),
            )],
        ),
    ]);

    engine
        .execute(&lead.id, AgentRole::Qualifier, "Direito Trabalhista", &lead_context(&lead))
        .await
        .unwrap();

    let executions = store.recent_executions(10).await.unwrap();
    assert_eq!(executions.len(), 1);
    assert_eq!(executions[0].template_id, "wildcard");
}

#[tokio::test]
async fn trigger_conditions_filter_templates() {
    let store = Arc::new(MemoryStore::new());
    let lead = seed_lead(&store).await;

    let mut gated = template(
        "needs_qualifying",
        AgentRole::Qualifier,
        "Direito Trabalhista",
        vec![action(
            "hello",
            ActionKind::SendMessage,
            json!({"template": "sdr_welcome_trabalhista"}),
        )],
    );
    gated.trigger_conditions = vec![WorkflowCondition::new(
        "status",
        ConditionOperator::Equals,
        json!("em_qualificacao"),
    )];
    let engine = engine(store.clone()).with_templates(vec![gated]);

    engine
        .execute(&lead.id, AgentRole::Qualifier, "Direito Trabalhista", &lead_context(&lead))
        .await
        .unwrap();
    assert!(store.recent_executions(10).await.unwrap().is_empty());

    store
        .update_lead_status(&lead.id, LeadStatus::Qualifying)
        .await
        .unwrap();
    let lead = store.get_lead(&lead.id).await.unwrap();
    engine
        .execute(&lead.id, AgentRole::Qualifier, "Direito Trabalhista", &lead_context(&lead))
        .await
        .unwrap();
    assert_eq!(store.recent_executions(10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn store_templates_load_after_builtins() {
    let store = Arc::new(MemoryStore::new());
    store.seed_templates(vec![template(
        "custom_follow_up",
        AgentRole::Closer,
        "Geral",
        vec![action(
            "nudge",
            ActionKind::SendMessage,
            json!({"template": "proposal_presentation"}),
        )],
    )]);

    let engine = WorkflowEngine::new(store.clone());
    let loaded = engine.load_store_templates().await.unwrap();
    assert_eq!(loaded, 1);

    let templates = engine.templates();
    assert_eq!(templates.last().unwrap().id, "custom_follow_up");
    assert!(templates.iter().any(|t| t.id == "sdr_qualification_trabalhista"));
}
