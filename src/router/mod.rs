mod classify;
mod prompt;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use serde_json::json;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::agent::{AgentConfig, AgentRole, EscalationEvaluator, SharedAgentRegistry};
use crate::channel::ChannelRegistry;
use crate::error::{LeadFlowError, Result};
use crate::llm::{CompletionRequest, DynCompletionClient};
use crate::model::{record_id, ActivityRecord, Interaction, Lead, OutboundMessage};
use crate::store::DynLeadStore;

pub use classify::{KeywordClassifier, StatusHint, TransitionClassifier};
pub use prompt::{
    build_history, build_system_prompt, transition_message, welcome_message, SYSTEM_PREFIX,
};

/// What the lead hears when anything goes wrong; never a technical detail.
pub const FALLBACK_MESSAGE: &str =
    "Desculpe, ocorreu um erro. Nossa equipe foi notificada e entrará em contato em breve.";

#[derive(Clone, Debug)]
pub struct RouterConfig {
    /// Most recent turns replayed to the completion service.
    pub history_limit: usize,
    pub completion_timeout: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            history_limit: 10,
            completion_timeout: Duration::from_secs(30),
        }
    }
}

/// Owns the lead → agent assignment map and drives one conversation turn:
/// completion call, escalation decision, status heuristic, audit trail.
pub struct ConversationRouter {
    store: DynLeadStore,
    registry: SharedAgentRegistry,
    completion: DynCompletionClient,
    evaluator: EscalationEvaluator,
    classifier: Box<dyn TransitionClassifier>,
    channels: Arc<ChannelRegistry>,
    // Process-local only; restart drops active conversations.
    assignments: Mutex<HashMap<String, String>>,
    config: RouterConfig,
}

impl ConversationRouter {
    pub fn new(
        store: DynLeadStore,
        registry: SharedAgentRegistry,
        completion: DynCompletionClient,
        evaluator: EscalationEvaluator,
        channels: Arc<ChannelRegistry>,
    ) -> Self {
        Self {
            store,
            registry,
            completion,
            evaluator,
            classifier: Box::new(KeywordClassifier),
            channels,
            assignments: Mutex::new(HashMap::new()),
            config: RouterConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_classifier(mut self, classifier: Box<dyn TransitionClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn assignment_for(&self, lead_id: &str) -> Option<String> {
        self.assignments.lock().get(lead_id).cloned()
    }

    pub fn assignments_snapshot(&self) -> HashMap<String, String> {
        self.assignments.lock().clone()
    }

    /// Assigns the best qualifier agent for the lead's legal area and sends
    /// the welcome message. With no matching agent the lead is left
    /// unassigned; that is logged, not raised.
    pub async fn process_new_lead(&self, lead_id: &str) -> Result<()> {
        let lead = self.store.get_lead(lead_id).await?;

        let Some(agent) = self
            .registry
            .find_best_agent(AgentRole::Qualifier, &lead.specialization)
        else {
            warn!(lead = lead_id, area = %lead.specialization, "no qualifier agent available");
            return Ok(());
        };

        info!(lead = lead_id, agent = %agent.id, "lead assigned to qualifier");
        self.assignments
            .lock()
            .insert(lead_id.to_string(), agent.id.clone());

        self.store
            .log_activity(ActivityRecord {
                lead_id: lead_id.to_string(),
                agent_id: Some(agent.id.clone()),
                action: "lead_assigned".to_string(),
                metadata: Some(json!({
                    "agent_role": agent.role,
                    "area_juridica": lead.specialization,
                })),
                created_at: Utc::now(),
            })
            .await?;

        self.send_to_lead(&lead, welcome_message(&agent, &lead)).await;
        Ok(())
    }

    /// Generates the reply for one inbound turn. Failures never escape this
    /// boundary; the caller always gets text to deliver.
    pub async fn process_message(&self, lead_id: &str, message: &str) -> String {
        match self.try_process_message(lead_id, message).await {
            Ok(response) => response,
            Err(error) => {
                warn!(lead = lead_id, %error, "message processing failed, using fallback");
                FALLBACK_MESSAGE.to_string()
            }
        }
    }

    async fn try_process_message(&self, lead_id: &str, message: &str) -> Result<String> {
        let agent = match self.resolve_agent(lead_id).await? {
            Some(agent) => agent,
            None => {
                warn!(lead = lead_id, "no agent could be assigned");
                return Ok(FALLBACK_MESSAGE.to_string());
            }
        };
        let lead = self.store.get_lead(lead_id).await?;

        let (response, generated) = match self.generate_response(&agent, &lead, message).await {
            Ok(text) => (text, true),
            Err(error) => {
                warn!(lead = lead_id, %error, "completion failed, answering with fallback");
                (FALLBACK_MESSAGE.to_string(), false)
            }
        };

        if generated {
            self.maybe_escalate(&agent, &lead, message, &response).await;
        }

        self.store
            .append_interaction(Interaction {
                id: record_id("int"),
                lead_id: lead_id.to_string(),
                agent_id: agent.id.clone(),
                message: message.to_string(),
                response: response.clone(),
                sentiment: sentiment(message),
                created_at: Utc::now(),
            })
            .await?;

        if generated {
            self.apply_status_heuristic(&lead, &agent, &response).await;
        }

        Ok(response)
    }

    async fn resolve_agent(&self, lead_id: &str) -> Result<Option<AgentConfig>> {
        if self.assignment_for(lead_id).is_none() {
            self.process_new_lead(lead_id).await?;
        }
        Ok(self
            .assignment_for(lead_id)
            .and_then(|agent_id| self.registry.get(&agent_id)))
    }

    async fn generate_response(
        &self,
        agent: &AgentConfig,
        lead: &Lead,
        message: &str,
    ) -> Result<String> {
        let interactions = self
            .store
            .interactions_for(&lead.id, self.config.history_limit)
            .await?;

        let request = CompletionRequest::new(message)
            .with_system(build_system_prompt(agent, lead))
            .with_history(build_history(&interactions));

        let response = timeout(self.config.completion_timeout, self.completion.complete(request))
            .await
            .map_err(|_| LeadFlowError::Timeout("completion call"))??;
        Ok(response.content)
    }

    async fn maybe_escalate(&self, agent: &AgentConfig, lead: &Lead, message: &str, response: &str) {
        let decision = match self.evaluator.evaluate(agent, message, response).await {
            Ok(decision) => decision,
            Err(error) => {
                warn!(lead = %lead.id, %error, "escalation scoring failed, staying with current agent");
                return;
            }
        };
        let Some(next_role) = decision.next_role.filter(|_| decision.escalate) else {
            return;
        };

        let Some(next_agent) = self.registry.find_best_agent(next_role, &lead.specialization)
        else {
            warn!(lead = %lead.id, ?next_role, "escalation target role has no agent");
            return;
        };

        info!(lead = %lead.id, from = %agent.id, to = %next_agent.id, "escalating conversation");
        self.assignments
            .lock()
            .insert(lead.id.clone(), next_agent.id.clone());

        if let Err(error) = self
            .store
            .log_activity(ActivityRecord {
                lead_id: lead.id.clone(),
                agent_id: Some(next_agent.id.clone()),
                action: "escalated".to_string(),
                metadata: Some(json!({
                    "from_role": agent.role,
                    "to_role": next_role,
                })),
                created_at: Utc::now(),
            })
            .await
        {
            warn!(lead = %lead.id, %error, "failed to log escalation");
        }

        self.send_to_lead(lead, transition_message(&next_agent, lead)).await;
    }

    async fn apply_status_heuristic(&self, lead: &Lead, agent: &AgentConfig, response: &str) {
        if lead.status.is_terminal() {
            return;
        }
        let StatusHint::Move(next) = self.classifier.classify(agent.role, response) else {
            return;
        };
        debug!(lead = %lead.id, status = next.as_str(), "status heuristic transition");
        if let Err(error) = self.store.update_lead_status(&lead.id, next).await {
            warn!(lead = %lead.id, %error, "best-effort status update failed");
        }
    }

    /// Best-effort delivery of a system-initiated message (welcome or
    /// transition); delivery problems are logged and swallowed.
    async fn send_to_lead(&self, lead: &Lead, content: String) {
        let Some(to) = lead.contact_address() else {
            return;
        };
        let outbound = OutboundMessage {
            lead_id: lead.id.clone(),
            channel: lead.channel,
            to: to.to_string(),
            content,
        };
        if let Err(error) = self.channels.dispatch(&outbound).await {
            warn!(lead = %lead.id, %error, "system message delivery failed");
            let _ = self
                .store
                .log_activity(ActivityRecord {
                    lead_id: lead.id.clone(),
                    agent_id: None,
                    action: "delivery_failed".to_string(),
                    metadata: Some(json!({
                        "channel": lead.channel,
                        "error": error.to_string(),
                    })),
                    created_at: Utc::now(),
                })
                .await;
        }
    }
}

/// Sentiment analysis is a stub; every turn scores neutral.
fn sentiment(_message: &str) -> f32 {
    0.5
}
