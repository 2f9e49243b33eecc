use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

use super::client::{CompletionClient, DynCompletionClient};
use super::types::{CompletionRequest, CompletionResponse};

/// Offline stand-in for the completion service; echoes the user turn.
#[derive(Default, Clone)]
pub struct LocalEchoClient;

#[async_trait]
impl CompletionClient for LocalEchoClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        Ok(CompletionResponse {
            content: format!("[Echo] {}", request.user),
            metadata: None,
        })
    }

    fn clone_dyn(&self) -> DynCompletionClient {
        Arc::new(LocalEchoClient)
    }
}
