use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

use super::types::{CompletionRequest, CompletionResponse};

/// Black-box completion service. Implementations own their transport; the
/// orchestration core only sees this seam and bounds every call with a
/// timeout at the call site.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    fn clone_dyn(&self) -> Arc<dyn CompletionClient>;
}

pub type DynCompletionClient = Arc<dyn CompletionClient>;
