use thiserror::Error;

pub type Result<T> = std::result::Result<T, LeadFlowError>;

#[derive(Debug, Error)]
pub enum LeadFlowError {
    #[error("invalid lead data: {0}")]
    Validation(String),
    #[error("lead `{0}` not found")]
    LeadNotFound(String),
    #[error("no active `{role}` agent for `{specialization}`")]
    NoAgentAvailable { role: String, specialization: String },
    #[error("completion service error: {0}")]
    Completion(String),
    #[error("{0} timed out")]
    Timeout(&'static str),
    #[error("store error: {0}")]
    Store(String),
    #[error("channel `{0}` has no adapter")]
    ChannelNotRegistered(String),
    #[error("channel send failed: {0}")]
    ChannelSend(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
