use crate::agent::AgentRole;
use crate::model::LeadStatus;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusHint {
    Stay,
    Move(LeadStatus),
}

/// Maps a generated reply to a lifecycle-status hint. Substring matching
/// over free-form model output is approximate; this seam exists so a real
/// classifier can replace it without touching the router.
pub trait TransitionClassifier: Send + Sync {
    fn classify(&self, role: AgentRole, response: &str) -> StatusHint;
}

/// Marker words carried over from the production heuristic. Precedence
/// matters: a closer reply mentioning both a proposal and a contract counts
/// as a proposal.
#[derive(Default)]
pub struct KeywordClassifier;

impl TransitionClassifier for KeywordClassifier {
    fn classify(&self, role: AgentRole, response: &str) -> StatusHint {
        let response = response.to_lowercase();
        match role {
            AgentRole::Qualifier if response.contains("qualificado") => {
                StatusHint::Move(LeadStatus::Qualifying)
            }
            AgentRole::Closer if response.contains("proposta") => {
                StatusHint::Move(LeadStatus::ProposalSent)
            }
            AgentRole::Closer if response.contains("contrato") => {
                StatusHint::Move(LeadStatus::ContractSigned)
            }
            _ => StatusHint::Stay,
        }
    }
}
