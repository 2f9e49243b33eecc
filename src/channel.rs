use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{LeadFlowError, Result};
use crate::model::{Channel, OutboundMessage};

/// One adapter per transport; each owns its own credentials and config.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    async fn send(&self, to: &str, content: &str) -> Result<bool>;
}

pub type DynChannelAdapter = Arc<dyn ChannelAdapter>;

/// Maps a message's origin channel to the adapter that can answer on it.
/// Phone and form origins are served by the chat adapter.
#[derive(Default)]
pub struct ChannelRegistry {
    adapters: HashMap<Channel, DynChannelAdapter>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, channel: Channel, adapter: DynChannelAdapter) {
        self.adapters.insert(channel, adapter);
    }

    pub fn adapter(&self, channel: Channel) -> Result<&DynChannelAdapter> {
        self.adapters
            .get(&channel.normalized())
            .ok_or_else(|| LeadFlowError::ChannelNotRegistered(channel.as_str().to_string()))
    }

    /// An adapter reporting `false` is a delivery failure like any other;
    /// it surfaces as `ChannelSend` so callers log it.
    pub async fn dispatch(&self, message: &OutboundMessage) -> Result<()> {
        let adapter = self.adapter(message.channel)?;
        let delivered = adapter.send(&message.to, &message.content).await?;
        if !delivered {
            return Err(LeadFlowError::ChannelSend(format!(
                "adapter for `{}` refused delivery to `{}`",
                message.channel.as_str(),
                message.to
            )));
        }
        Ok(())
    }
}

/// Records outbound traffic instead of delivering it; used by tests and the
/// demo binary.
#[derive(Default)]
pub struct MemoryChannel {
    sent: Mutex<Vec<(String, String)>>,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl ChannelAdapter for MemoryChannel {
    async fn send(&self, to: &str, content: &str) -> Result<bool> {
        self.sent.lock().push((to.to_string(), content.to_string()));
        Ok(true)
    }
}
