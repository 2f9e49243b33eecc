mod client;
mod echo;
mod types;

pub use client::{CompletionClient, DynCompletionClient};
pub use echo::LocalEchoClient;
pub use types::{ChatMessage, CompletionRequest, CompletionResponse};
