use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tokio::sync::mpsc;
use tokio::sync::Notify;
use tracing::{error, info, warn};

use crate::agent::AgentRole;
use crate::channel::ChannelRegistry;
use crate::error::{LeadFlowError, Result};
use crate::model::{
    ActivityRecord, Channel, InboundMessage, Lead, LeadData, LeadSource, OutboundMessage,
};
use crate::router::{ConversationRouter, FALLBACK_MESSAGE};
use crate::store::DynLeadStore;
use crate::utils::validation::LeadValidator;
use crate::workflow::{lead_context, WorkflowEngine};

/// Entry point for all inbound traffic. A single consumer task drains the
/// queue strictly one message at a time, so interactions are appended in
/// submission order across all leads. One slow completion call therefore
/// delays everything behind it; that is the accepted trade-off, bounded by
/// the router's per-call timeout.
pub struct IntakeQueue {
    tx: mpsc::UnboundedSender<InboundMessage>,
    inner: Arc<IntakeInner>,
}

struct IntakeInner {
    store: DynLeadStore,
    router: Arc<ConversationRouter>,
    channels: Arc<ChannelRegistry>,
    workflows: Arc<WorkflowEngine>,
    pending: AtomicUsize,
    processed: AtomicUsize,
    failed: AtomicUsize,
    idle: Notify,
}

impl IntakeQueue {
    /// Builds the queue and spawns its consumer loop on the current runtime.
    pub fn start(
        store: DynLeadStore,
        router: Arc<ConversationRouter>,
        channels: Arc<ChannelRegistry>,
        workflows: Arc<WorkflowEngine>,
    ) -> Arc<IntakeQueue> {
        let (tx, mut rx) = mpsc::unbounded_channel::<InboundMessage>();
        let inner = Arc::new(IntakeInner {
            store,
            router,
            channels,
            workflows,
            pending: AtomicUsize::new(0),
            processed: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            idle: Notify::new(),
        });

        let worker = Arc::clone(&inner);
        tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                worker.handle_message(message).await;
                if worker.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
                    worker.idle.notify_waiters();
                }
            }
        });

        Arc::new(IntakeQueue { tx, inner })
    }

    /// Enqueues an inbound message for serialized processing.
    pub fn submit(&self, message: InboundMessage) -> Result<()> {
        self.inner.pending.fetch_add(1, Ordering::SeqCst);
        self.tx.send(message).map_err(|_| {
            self.inner.pending.fetch_sub(1, Ordering::SeqCst);
            LeadFlowError::Store("intake queue consumer is gone".to_string())
        })
    }

    /// Resolves when every submitted message has been processed.
    pub async fn drained(&self) {
        loop {
            let notified = self.inner.idle.notified();
            if self.inner.pending.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }

    pub fn pending(&self) -> usize {
        self.inner.pending.load(Ordering::SeqCst)
    }

    pub fn processed(&self) -> usize {
        self.inner.processed.load(Ordering::SeqCst)
    }

    pub fn failed(&self) -> usize {
        self.inner.failed.load(Ordering::SeqCst)
    }

    /// Direct creation path, bypassing message intake. Validates, dedupes by
    /// exact contact match, then kicks off assignment and automation;
    /// post-create automation failures are logged, never propagated.
    pub async fn create_lead(&self, data: LeadData) -> Result<Lead> {
        self.inner.create_lead(data).await
    }
}

impl IntakeInner {
    async fn handle_message(&self, message: InboundMessage) {
        match self.process_message(&message).await {
            Ok(()) => {
                self.processed.fetch_add(1, Ordering::SeqCst);
            }
            Err(err) => {
                self.failed.fetch_add(1, Ordering::SeqCst);
                error!(from = %message.from, %err, "message processing failed");
                let lead_id = message.lead_id.clone().unwrap_or_default();
                self.send_reply(&message, &lead_id, FALLBACK_MESSAGE).await;
            }
        }
    }

    async fn process_message(&self, message: &InboundMessage) -> Result<()> {
        let lead = self.resolve_lead(message).await?;

        let response = self.router.process_message(&lead.id, &message.content).await;
        if !response.trim().is_empty() {
            self.send_reply(message, &lead.id, &response).await;
        }

        self.store
            .log_activity(ActivityRecord {
                lead_id: lead.id.clone(),
                agent_id: None,
                action: "message_logged".to_string(),
                metadata: Some(json!({
                    "channel": message.channel,
                    "direction": "inbound",
                    "from": message.from,
                    "content": message.content,
                    "response": response,
                })),
                created_at: Utc::now(),
            })
            .await?;
        Ok(())
    }

    /// Known lead id wins; otherwise exact phone/email equality; otherwise a
    /// new lead is auto-created from the sender handle.
    async fn resolve_lead(&self, message: &InboundMessage) -> Result<Lead> {
        if let Some(lead_id) = &message.lead_id {
            return self.store.get_lead(lead_id).await;
        }
        if let Some(existing) = self.store.find_lead_by_contact(&message.from).await? {
            return Ok(existing);
        }

        let (phone, email) = contact_from_handle(message.channel, &message.from);
        self.create_lead(LeadData {
            name: message.from.clone(),
            phone,
            email,
            specialization: "Geral".to_string(),
            source: LeadSource::from_channel(message.channel),
            channel: message.channel,
            initial_message: Some(message.content.clone()),
            claim_value: None,
            urgency: Default::default(),
            metadata: Default::default(),
        })
        .await
    }

    async fn create_lead(&self, data: LeadData) -> Result<Lead> {
        LeadValidator::validate(&data)?;

        for contact in [data.phone.as_deref(), data.email.as_deref()]
            .into_iter()
            .flatten()
        {
            if let Some(existing) = self.store.find_lead_by_contact(contact).await? {
                info!(lead = %existing.id, "lead already exists for contact");
                return Ok(existing);
            }
        }

        let lead = self.store.create_lead(data).await?;
        info!(lead = %lead.id, area = %lead.specialization, "lead created");

        if let Err(err) = self.start_lead_processing(&lead).await {
            warn!(lead = %lead.id, %err, "post-create automation failed");
            let _ = self
                .store
                .log_activity(ActivityRecord {
                    lead_id: lead.id.clone(),
                    agent_id: None,
                    action: "processing_error".to_string(),
                    metadata: Some(json!({ "error": err.to_string() })),
                    created_at: Utc::now(),
                })
                .await;
        }

        Ok(lead)
    }

    async fn start_lead_processing(&self, lead: &Lead) -> Result<()> {
        self.router.process_new_lead(&lead.id).await?;

        self.workflows
            .execute(
                &lead.id,
                AgentRole::Qualifier,
                &lead.specialization,
                &lead_context(lead),
            )
            .await?;

        self.store
            .log_activity(ActivityRecord {
                lead_id: lead.id.clone(),
                agent_id: None,
                action: "lead_created".to_string(),
                metadata: Some(json!({
                    "origem": lead.source,
                    "canal": lead.channel,
                    "area_juridica": lead.specialization,
                })),
                created_at: Utc::now(),
            })
            .await
    }

    async fn send_reply(&self, message: &InboundMessage, lead_id: &str, content: &str) {
        let outbound = outbound_reply(message, lead_id, content);
        if let Err(err) = self.channels.dispatch(&outbound).await {
            warn!(to = %message.from, %err, "reply delivery failed");
        }
    }
}

/// Replies are attributed to the resolved lead, which the sender handle may
/// not carry.
fn outbound_reply(message: &InboundMessage, lead_id: &str, content: &str) -> OutboundMessage {
    OutboundMessage {
        lead_id: lead_id.to_string(),
        channel: message.channel,
        to: message.from.clone(),
        content: content.to_string(),
    }
}

/// Whatsapp and phone handles are phone numbers; email handles are email
/// addresses; chat and form handles are stored wherever they fit so exact
/// contact matching keeps working.
fn contact_from_handle(channel: Channel, handle: &str) -> (Option<String>, Option<String>) {
    match channel {
        Channel::Whatsapp | Channel::Phone => (Some(handle.to_string()), None),
        Channel::Email => (None, Some(handle.to_string())),
        Channel::Chat | Channel::Form => {
            if handle.contains('@') {
                (None, Some(handle.to_string()))
            } else {
                (Some(handle.to_string()), None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replies_carry_the_resolved_lead_id() {
        let message = InboundMessage::new(Channel::Whatsapp, "+5511999", "oi");
        let outbound = outbound_reply(&message, "lead-7", "resposta");
        assert_eq!(outbound.lead_id, "lead-7");
        assert_eq!(outbound.to, "+5511999");
        assert_eq!(outbound.channel, Channel::Whatsapp);
    }

    #[test]
    fn handles_map_to_the_right_contact_field() {
        assert_eq!(
            contact_from_handle(Channel::Whatsapp, "+5511999"),
            (Some("+5511999".to_string()), None)
        );
        assert_eq!(
            contact_from_handle(Channel::Email, "a@b.com"),
            (None, Some("a@b.com".to_string()))
        );
        assert_eq!(
            contact_from_handle(Channel::Chat, "visitor-1"),
            (Some("visitor-1".to_string()), None)
        );
        assert_eq!(
            contact_from_handle(Channel::Chat, "a@b.com"),
            (None, Some("a@b.com".to_string()))
        );
    }
}
