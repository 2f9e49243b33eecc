use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde_json::{json, Map, Value};

use crate::agent::AgentRole;

use super::{
    ActionKind, ConditionOperator, WorkflowAction, WorkflowCondition, WorkflowContext,
    WorkflowKind, WorkflowTemplate,
};

static MESSAGE_TEMPLATES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (
            "sdr_welcome_trabalhista",
            "Olá! Sou especialista em Direito Trabalhista. Vi que você tem uma questão trabalhista. Como posso ajudá-lo?",
        ),
        (
            "qualification_trabalhista",
            "Para te ajudar melhor, preciso entender sua situação. Pode me contar mais detalhes sobre o problema trabalhista?",
        ),
        (
            "proposal_presentation",
            "Preparei uma proposta personalizada para seu caso. Vou enviar os detalhes e podemos agendar uma conversa para esclarecer dúvidas.",
        ),
        (
            "cs_welcome",
            "Parabéns! Seu contrato foi assinado. Agora vamos iniciar o acompanhamento do seu caso. Em breve entrarei em contato com os próximos passos.",
        ),
    ])
});

pub fn render_message_template(template: &str, _context: &WorkflowContext) -> String {
    MESSAGE_TEMPLATES
        .get(template)
        .map(|text| text.to_string())
        .unwrap_or_else(|| "Mensagem automática do sistema.".to_string())
}

pub fn render_document_template(template: &str, context: &WorkflowContext) -> String {
    let area = context
        .get("area_juridica")
        .and_then(Value::as_str)
        .unwrap_or("Geral");
    format!("Documento `{template}` — área {area}.")
}

fn params(pairs: &[(&str, Value)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// Templates every deployment starts with; store-provided templates are
/// appended after these.
pub fn builtin_templates() -> Vec<WorkflowTemplate> {
    vec![
        WorkflowTemplate {
            id: "sdr_qualification_trabalhista".to_string(),
            name: "Qualificação SDR - Direito Trabalhista".to_string(),
            kind: WorkflowKind::LeadQualification,
            role: AgentRole::Qualifier,
            specialization: "Direito Trabalhista".to_string(),
            trigger_conditions: vec![
                WorkflowCondition::new("status", ConditionOperator::Equals, json!("novo_lead")),
                WorkflowCondition::new(
                    "area_juridica",
                    ConditionOperator::Equals,
                    json!("Direito Trabalhista"),
                ),
            ],
            actions: vec![
                WorkflowAction {
                    id: "welcome_message".to_string(),
                    kind: ActionKind::SendMessage,
                    parameters: params(&[
                        ("template", json!("sdr_welcome_trabalhista")),
                        ("personalized", json!(true)),
                    ]),
                    delay_minutes: None,
                    conditions: Vec::new(),
                },
                WorkflowAction {
                    id: "qualification_questions".to_string(),
                    kind: ActionKind::SendMessage,
                    parameters: params(&[("template", json!("qualification_trabalhista"))]),
                    delay_minutes: Some(2),
                    conditions: Vec::new(),
                },
                WorkflowAction {
                    id: "schedule_follow_up".to_string(),
                    kind: ActionKind::CreateTask,
                    parameters: params(&[
                        ("title", json!("Follow-up qualificação trabalhista")),
                        ("description", json!("Verificar respostas e qualificar lead")),
                        ("due_hours", json!(24)),
                    ]),
                    delay_minutes: Some(5),
                    conditions: Vec::new(),
                },
            ],
            active: true,
        },
        WorkflowTemplate {
            id: "closer_proposal_trabalhista".to_string(),
            name: "Proposta Closer - Direito Trabalhista".to_string(),
            kind: WorkflowKind::ProposalGeneration,
            role: AgentRole::Closer,
            specialization: "Direito Trabalhista".to_string(),
            trigger_conditions: vec![
                WorkflowCondition::new(
                    "status",
                    ConditionOperator::Equals,
                    json!("em_qualificacao"),
                ),
                WorkflowCondition::new(
                    "area_juridica",
                    ConditionOperator::Equals,
                    json!("Direito Trabalhista"),
                ),
            ],
            actions: vec![
                WorkflowAction {
                    id: "generate_proposal".to_string(),
                    kind: ActionKind::GenerateDocument,
                    parameters: params(&[
                        ("template", json!("proposta_trabalhista")),
                        ("include_pricing", json!(true)),
                        ("include_timeline", json!(true)),
                    ]),
                    delay_minutes: None,
                    conditions: Vec::new(),
                },
                WorkflowAction {
                    id: "send_proposal".to_string(),
                    kind: ActionKind::SendMessage,
                    parameters: params(&[
                        ("template", json!("proposal_presentation")),
                        ("attach_document", json!(true)),
                    ]),
                    delay_minutes: Some(10),
                    conditions: Vec::new(),
                },
                WorkflowAction {
                    id: "schedule_meeting".to_string(),
                    kind: ActionKind::ScheduleMeeting,
                    parameters: params(&[
                        (
                            "title",
                            json!("Apresentação da Proposta - Direito Trabalhista"),
                        ),
                        ("duration_minutes", json!(30)),
                        ("type", json!("video_call")),
                    ]),
                    delay_minutes: Some(15),
                    conditions: Vec::new(),
                },
            ],
            active: true,
        },
        WorkflowTemplate {
            id: "cs_onboarding_general".to_string(),
            name: "Onboarding Customer Success".to_string(),
            kind: WorkflowKind::Onboarding,
            role: AgentRole::SuccessManager,
            specialization: "Geral".to_string(),
            trigger_conditions: vec![WorkflowCondition::new(
                "status",
                ConditionOperator::Equals,
                json!("contrato_assinado"),
            )],
            actions: vec![
                WorkflowAction {
                    id: "welcome_client".to_string(),
                    kind: ActionKind::SendMessage,
                    parameters: params(&[
                        ("template", json!("cs_welcome")),
                        ("include_next_steps", json!(true)),
                    ]),
                    delay_minutes: None,
                    conditions: Vec::new(),
                },
                WorkflowAction {
                    id: "create_case".to_string(),
                    kind: ActionKind::CreateTask,
                    parameters: params(&[
                        ("title", json!("Novo caso jurídico")),
                        ("description", json!("Iniciar acompanhamento do caso")),
                        ("priority", json!("high")),
                    ]),
                    delay_minutes: Some(30),
                    conditions: Vec::new(),
                },
                WorkflowAction {
                    id: "schedule_kickoff".to_string(),
                    kind: ActionKind::ScheduleMeeting,
                    parameters: params(&[
                        ("title", json!("Kickoff do Caso")),
                        ("duration_minutes", json!(60)),
                        ("type", json!("video_call")),
                    ]),
                    delay_minutes: Some(60),
                    conditions: Vec::new(),
                },
            ],
            active: true,
        },
    ]
}
