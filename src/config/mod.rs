use std::path::Path;

use crate::agent::AgentConfig;
use crate::error::{LeadFlowError, Result};
use crate::workflow::WorkflowTemplate;

/// Parses a JSON array of agent configurations.
pub fn load_agents_from_str(raw: &str) -> Result<Vec<AgentConfig>> {
    serde_json::from_str(raw).map_err(|e| LeadFlowError::Serialization(e.to_string()))
}

pub fn load_agents_from_file(path: impl AsRef<Path>) -> Result<Vec<AgentConfig>> {
    let raw = std::fs::read_to_string(path.as_ref())
        .map_err(|e| LeadFlowError::Serialization(e.to_string()))?;
    load_agents_from_str(&raw)
}

/// Parses a JSON array of workflow templates.
pub fn load_templates_from_str(raw: &str) -> Result<Vec<WorkflowTemplate>> {
    serde_json::from_str(raw).map_err(|e| LeadFlowError::Serialization(e.to_string()))
}

pub fn load_templates_from_file(path: impl AsRef<Path>) -> Result<Vec<WorkflowTemplate>> {
    let raw = std::fs::read_to_string(path.as_ref())
        .map_err(|e| LeadFlowError::Serialization(e.to_string()))?;
    load_templates_from_str(&raw)
}
