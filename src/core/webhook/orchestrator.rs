use crate::core::ai::AiService;
use crate::core::cache::SessionCache;
use crate::core::conversation::ConversationService;
use crate::core::knowledge::ContextBuilder;
use crate::core::messaging::MessageDispatcher;
use crate::core::webhook::payload::{NormalizedMessage, WebhookPayload};
use serde::Serialize;
use std::sync::Arc;

/// Terminal state of one webhook event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookStatus {
    NoMessage,
    Ignored,
    NoValidMessage,
    Processed,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct WebhookOutcome {
    pub status: WebhookStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WebhookOutcome {
    fn status_only(status: WebhookStatus) -> Self {
        Self {
            status,
            response: None,
            error: None,
        }
    }
}

/// Top-level handler for inbound webhook events.
///
/// All services are injected at construction; the orchestrator owns no
/// state of its own beyond the tenant identity. Only the first message of a
/// batched payload is processed.
pub struct WebhookOrchestrator {
    tenant_id: String,
    conversations: Arc<ConversationService>,
    ai: Arc<AiService>,
    dispatcher: Arc<MessageDispatcher>,
    sessions: Arc<dyn SessionCache>,
    /// Knowledge enhancement is optional: absent when RAG is disabled.
    context: Option<Arc<ContextBuilder>>,
}

impl WebhookOrchestrator {
    pub fn new(
        tenant_id: String,
        conversations: Arc<ConversationService>,
        ai: Arc<AiService>,
        dispatcher: Arc<MessageDispatcher>,
        sessions: Arc<dyn SessionCache>,
        context: Option<Arc<ContextBuilder>>,
    ) -> Self {
        Self {
            tenant_id,
            conversations,
            ai,
            dispatcher,
            sessions,
            context,
        }
    }

    /// Handles one inbound event. Never returns an error: unexpected
    /// failures are caught here and reported as the `error` status.
    pub async fn handle(&self, payload: WebhookPayload) -> WebhookOutcome {
        let Some(message) = payload.messages.first() else {
            tracing::debug!("Webhook carried no messages");
            return WebhookOutcome::status_only(WebhookStatus::NoMessage);
        };

        if message.from_me {
            tracing::debug!("Ignoring own message");
            return WebhookOutcome::status_only(WebhookStatus::Ignored);
        }

        let Some(normalized) = message.normalize() else {
            tracing::debug!("Webhook message had no sender or empty text");
            return WebhookOutcome::status_only(WebhookStatus::NoValidMessage);
        };

        match self.process(&normalized).await {
            Ok(response) => WebhookOutcome {
                status: WebhookStatus::Processed,
                response: Some(response),
                error: None,
            },
            Err(e) => {
                tracing::error!("Webhook processing failed: {}", e);
                WebhookOutcome {
                    status: WebhookStatus::Error,
                    response: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// The processed path: session touch, reply generation, optional
    /// knowledge enhancement, a single conversation write, dispatch.
    /// Each step degrades independently; none can abort the others.
    async fn process(&self, message: &NormalizedMessage) -> anyhow::Result<String> {
        tracing::info!(sender = %message.sender, "Processing inbound message");

        let session = self
            .sessions
            .touch(
                &self.tenant_id,
                &message.sender,
                message.display_name.as_deref(),
            )
            .await;

        let mut reply = self
            .ai
            .respond(&self.tenant_id, &message.sender, &message.text)
            .await;

        if let Some(context) = &self.context {
            reply = context.enhance_response(&message.text, reply).await;
        }

        // Single write per turn, with the reply already attached. The
        // cached display name covers payloads that omit it.
        let display_name = message
            .display_name
            .as_deref()
            .or(session.display_name.as_deref());
        self.conversations
            .record_turn(
                &self.tenant_id,
                &message.sender,
                &message.text,
                Some(&reply),
                display_name,
            )
            .await;

        let delivered = self.dispatcher.send(&message.sender, &reply).await;
        if !delivered {
            tracing::warn!(sender = %message.sender, "Reply was generated but not delivered");
        }

        Ok(reply)
    }
}
