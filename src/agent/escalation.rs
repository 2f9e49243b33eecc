use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;

use super::config::{AgentConfig, AgentRole, EscalationRule};

/// Estimates how likely a matched rule really warrants a hand-off. May be
/// backed by a secondary model call; the default is a fixed score.
#[async_trait]
pub trait ConfidenceScorer: Send + Sync {
    async fn score(
        &self,
        agent: &AgentConfig,
        rule: &EscalationRule,
        message: &str,
        response: &str,
    ) -> Result<f32>;
}

pub type DynConfidenceScorer = Arc<dyn ConfidenceScorer>;

/// Constant-score stub matching the production system's behavior.
pub struct FixedScorer(pub f32);

impl Default for FixedScorer {
    fn default() -> Self {
        FixedScorer(0.8)
    }
}

#[async_trait]
impl ConfidenceScorer for FixedScorer {
    async fn score(
        &self,
        _agent: &AgentConfig,
        _rule: &EscalationRule,
        _message: &str,
        _response: &str,
    ) -> Result<f32> {
        Ok(self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EscalationDecision {
    pub escalate: bool,
    pub next_role: Option<AgentRole>,
}

impl EscalationDecision {
    pub fn stay() -> Self {
        Self {
            escalate: false,
            next_role: None,
        }
    }

    pub fn to(role: AgentRole) -> Self {
        Self {
            escalate: true,
            next_role: Some(role),
        }
    }
}

pub struct EscalationEvaluator {
    scorer: DynConfidenceScorer,
}

impl EscalationEvaluator {
    pub fn new(scorer: DynConfidenceScorer) -> Self {
        Self { scorer }
    }

    /// Walks the agent's rules in order; the first rule whose keywords match
    /// either side of the turn and whose confidence clears the threshold
    /// wins. No further rules are evaluated after a hit.
    pub async fn evaluate(
        &self,
        agent: &AgentConfig,
        message: &str,
        response: &str,
    ) -> Result<EscalationDecision> {
        let message_lower = message.to_lowercase();
        let response_lower = response.to_lowercase();

        for rule in &agent.escalation_rules {
            let keyword_hit = rule.trigger_keywords.iter().any(|keyword| {
                let keyword = keyword.to_lowercase();
                message_lower.contains(&keyword) || response_lower.contains(&keyword)
            });
            if !keyword_hit {
                continue;
            }

            let confidence = self.scorer.score(agent, rule, message, response).await?;
            debug!(
                agent = %agent.id,
                rule = %rule.condition,
                confidence,
                threshold = rule.confidence_threshold,
                "escalation rule matched keywords"
            );
            if confidence >= rule.confidence_threshold {
                return Ok(EscalationDecision::to(rule.next_role));
            }
        }

        Ok(EscalationDecision::stay())
    }
}
