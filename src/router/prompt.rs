use crate::agent::{AgentConfig, AgentRole};
use crate::llm::ChatMessage;
use crate::model::{Interaction, Lead};

/// Prefix marking automation-written turns in the interaction log; they are
/// replayed as assistant messages.
pub const SYSTEM_PREFIX: &str = "Sistema: ";

pub fn build_system_prompt(agent: &AgentConfig, lead: &Lead) -> String {
    format!(
        "Você é {name}, um {description} especializado em {area}.\n\
         \n\
         PERSONALIDADE: {personality}\n\
         \n\
         ESPECIALIZAÇÃO: {specializations}\n\
         \n\
         DADOS DO LEAD:\n\
         - Nome: {lead_name}\n\
         - Área de interesse: {lead_area}\n\
         - Status atual: {status}\n\
         \n\
         INSTRUÇÕES ESPECÍFICAS:\n\
         {prompt_base}\n\
         \n\
         REGRAS IMPORTANTES:\n\
         1. Seja profissional mas acessível\n\
         2. Faça perguntas qualificadoras relevantes\n\
         3. Identifique a necessidade jurídica específica\n\
         4. Mantenha o foco na área de {area}\n\
         5. Seja objetivo e direto\n\
         6. Use linguagem jurídica apropriada mas compreensível\n\
         \n\
         {role_instructions}",
        name = agent.name,
        description = agent.role.description(),
        area = agent.specialization,
        personality = agent.personality,
        specializations = agent.specializations.join(", "),
        lead_name = lead.name,
        lead_area = lead.specialization,
        status = lead.status.as_str(),
        prompt_base = agent.prompt_base,
        role_instructions = role_instructions(agent.role),
    )
}

fn role_instructions(role: AgentRole) -> &'static str {
    match role {
        AgentRole::Qualifier => {
            "OBJETIVO: Qualificar o lead e identificar se há uma oportunidade real.\n\
             \n\
             PERGUNTAS CHAVE:\n\
             - Qual é o problema jurídico específico?\n\
             - Qual a urgência da situação?\n\
             - Já tentou resolver antes?\n\
             - Qual o orçamento disponível?\n\
             \n\
             ESCALAÇÃO: Quando o lead estiver qualificado, passe para o Closer."
        }
        AgentRole::Closer => {
            "OBJETIVO: Fechar o negócio e converter o lead em cliente.\n\
             \n\
             FOCO:\n\
             - Apresentar proposta personalizada\n\
             - Negociar valores e condições\n\
             - Superar objeções\n\
             - Fechar o contrato\n\
             \n\
             ESCALAÇÃO: Após fechamento, passe para Customer Success."
        }
        AgentRole::SuccessManager => {
            "OBJETIVO: Garantir satisfação e sucesso do cliente.\n\
             \n\
             FOCO:\n\
             - Onboarding eficiente\n\
             - Acompanhamento do caso\n\
             - Identificar oportunidades de upsell\n\
             - Garantir renovação"
        }
    }
}

/// Replays the bounded interaction tail as chat history. Automation turns
/// (prefixed `Sistema: `) become assistant messages; regular turns expand to
/// their user/assistant pair.
pub fn build_history(interactions: &[Interaction]) -> Vec<ChatMessage> {
    let mut history = Vec::with_capacity(interactions.len() * 2);
    for interaction in interactions {
        if let Some(stripped) = interaction.message.strip_prefix(SYSTEM_PREFIX) {
            history.push(ChatMessage::assistant(stripped));
            continue;
        }
        history.push(ChatMessage::user(&interaction.message));
        if !interaction.response.is_empty() {
            history.push(ChatMessage::assistant(&interaction.response));
        }
    }
    history
}

pub fn welcome_message(agent: &AgentConfig, lead: &Lead) -> String {
    format!(
        "Olá {}! Sou {}, especialista em {}. Como posso ajudá-lo hoje?",
        lead.name, agent.name, agent.specialization
    )
}

pub fn transition_message(agent: &AgentConfig, lead: &Lead) -> String {
    format!(
        "Olá {}! Agora você será atendido por {}, nosso {}.",
        lead.name,
        agent.name,
        agent.role.description()
    )
}
