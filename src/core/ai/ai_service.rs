use super::models::{AiConfig, AiMessage};
use crate::core::conversation::{ConversationService, ConversationTurn};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// How many stored turns feed the prompt as context.
const RECENT_HISTORY_LIMIT: usize = 5;

/// Reply when no completion credential is configured.
pub const FALLBACK_NOT_CONFIGURED: &str = "Thank you for reaching out! Our loan consultation \
     service is still being configured. Please try again a little later.";

/// Reply when the completion call fails for any other reason.
pub const FALLBACK_UNAVAILABLE: &str = "Sorry, our consultation service is temporarily \
     unavailable. Please try again in a few minutes.";

/// Built-in consultant persona. Overridable via SYSTEM_PROMPT.
pub const DEFAULT_PERSONA: &str = "You are a professional loan consultant for the Malaysian \
market. You help customers understand personal, housing, and car loan options, eligibility \
criteria, and required documents. Compliance rules you must always follow: never promise or \
guarantee loan approval; always mention that final eligibility depends on document \
verification by the bank; recommend speaking to a licensed officer for complex or borderline \
cases. Keep replies concise, friendly, and specific to Malaysian lending practice.";

#[derive(Debug, Error)]
pub enum AiError {
    #[error("completion API credential not configured")]
    NotConfigured,
    #[error("completion API error: {0}")]
    Provider(String),
}

/// Sends a chat completion request to the hosted model.
#[async_trait]
pub trait AiProvider: Send + Sync {
    async fn chat_complete(
        &self,
        messages: &[AiMessage],
        config: &AiConfig,
    ) -> Result<String, AiError>;
}

/// Generates the reply for an inbound message.
///
/// Infallible by contract: every failure of the completion call maps to one
/// of two fixed fallback strings, never an error the caller has to handle.
pub struct AiService {
    provider: Arc<dyn AiProvider>,
    conversations: Arc<ConversationService>,
    system_prompt: String,
    config: AiConfig,
}

impl AiService {
    pub fn new(
        provider: Arc<dyn AiProvider>,
        conversations: Arc<ConversationService>,
        system_prompt: String,
        config: AiConfig,
    ) -> Self {
        Self {
            provider,
            conversations,
            system_prompt,
            config,
        }
    }

    /// Generates a reply to `message_text`, using the most recent stored
    /// turns for the (tenant, counterpart) pair as context.
    pub async fn respond(
        &self,
        tenant_id: &str,
        counterpart_id: &str,
        message_text: &str,
    ) -> String {
        let history = self
            .conversations
            .recent_history(tenant_id, counterpart_id, RECENT_HISTORY_LIMIT)
            .await;

        let prompt = build_prompt(&history, message_text);
        let messages = vec![
            AiMessage {
                role: "system".to_string(),
                content: self.system_prompt.clone(),
            },
            AiMessage {
                role: "user".to_string(),
                content: prompt,
            },
        ];

        match self.provider.chat_complete(&messages, &self.config).await {
            Ok(reply) => reply,
            Err(AiError::NotConfigured) => {
                tracing::warn!("Completion API not configured, using fallback reply");
                FALLBACK_NOT_CONFIGURED.to_string()
            }
            Err(e) => {
                tracing::warn!("Completion call failed, using fallback reply: {}", e);
                FALLBACK_UNAVAILABLE.to_string()
            }
        }
    }
}

/// Formats stored history plus the current message into the user prompt.
///
/// Turns render as alternating `Customer:` / `Assistant:` lines; the
/// assistant line is omitted when the turn has no stored reply.
fn build_prompt(history: &[ConversationTurn], message_text: &str) -> String {
    let mut lines = Vec::new();

    for turn in history {
        lines.push(format!("Customer: {}", turn.message_text));
        if let Some(response) = turn.response_text.as_deref() {
            if !response.is_empty() {
                lines.push(format!("Assistant: {}", response));
            }
        }
    }

    lines.push(format!("Current message: {}", message_text));
    lines.push(
        "Reply to the current message as the loan consultant, using the conversation above for \
         context."
            .to_string(),
    );

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::conversation::ConversationStore;
    use crate::infra::conversation::InMemoryConversationStore;
    use chrono::Utc;
    use std::sync::Mutex;

    struct FixedProvider {
        reply: String,
        seen_messages: Mutex<Vec<AiMessage>>,
    }

    #[async_trait]
    impl AiProvider for FixedProvider {
        async fn chat_complete(
            &self,
            messages: &[AiMessage],
            _config: &AiConfig,
        ) -> Result<String, AiError> {
            *self.seen_messages.lock().unwrap() = messages.to_vec();
            Ok(self.reply.clone())
        }
    }

    struct ErrProvider {
        error: fn() -> AiError,
    }

    #[async_trait]
    impl AiProvider for ErrProvider {
        async fn chat_complete(
            &self,
            _messages: &[AiMessage],
            _config: &AiConfig,
        ) -> Result<String, AiError> {
            Err((self.error)())
        }
    }

    fn empty_conversations() -> Arc<ConversationService> {
        Arc::new(ConversationService::new(Arc::new(
            InMemoryConversationStore::new(),
        )))
    }

    fn turn(message: &str, response: Option<&str>) -> ConversationTurn {
        ConversationTurn {
            tenant_id: "client_001".to_string(),
            counterpart_id: "60123456789".to_string(),
            display_name: None,
            message_text: message.to_string(),
            response_text: response.map(|s| s.to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_build_prompt_alternating_lines() {
        let history = vec![
            turn("What loans do you offer?", Some("Personal, housing and car loans.")),
            turn("What about rates?", None),
        ];

        let prompt = build_prompt(&history, "Can I apply today?");

        let expected_start = "Customer: What loans do you offer?\n\
                              Assistant: Personal, housing and car loans.\n\
                              Customer: What about rates?\n\
                              Current message: Can I apply today?";
        assert!(prompt.starts_with(expected_start));
        assert!(prompt.ends_with("context."));
    }

    #[test]
    fn test_build_prompt_without_history() {
        let prompt = build_prompt(&[], "Hello");
        assert!(prompt.starts_with("Current message: Hello"));
    }

    #[tokio::test]
    async fn test_respond_returns_provider_reply() {
        let provider = Arc::new(FixedProvider {
            reply: "Here are the requirements.".to_string(),
            seen_messages: Mutex::new(Vec::new()),
        });
        let service = AiService::new(
            provider.clone(),
            empty_conversations(),
            DEFAULT_PERSONA.to_string(),
            AiConfig::default(),
        );

        let reply = service.respond("client_001", "60123456789", "requirements?").await;

        assert_eq!(reply, "Here are the requirements.");

        // Exactly two messages go out: persona then user prompt.
        let seen = provider.seen_messages.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].role, "system");
        assert_eq!(seen[1].role, "user");
        assert!(seen[1].content.contains("Current message: requirements?"));
    }

    #[tokio::test]
    async fn test_respond_includes_stored_history() {
        let store = Arc::new(InMemoryConversationStore::new());
        store.append(&turn("earlier question", Some("earlier answer"))).await.unwrap();
        let provider = Arc::new(FixedProvider {
            reply: "ok".to_string(),
            seen_messages: Mutex::new(Vec::new()),
        });
        let service = AiService::new(
            provider.clone(),
            Arc::new(ConversationService::new(store)),
            DEFAULT_PERSONA.to_string(),
            AiConfig::default(),
        );

        service.respond("client_001", "60123456789", "follow-up").await;

        let seen = provider.seen_messages.lock().unwrap();
        assert!(seen[1].content.contains("Customer: earlier question"));
        assert!(seen[1].content.contains("Assistant: earlier answer"));
    }

    #[tokio::test]
    async fn test_respond_not_configured_fallback() {
        let service = AiService::new(
            Arc::new(ErrProvider {
                error: || AiError::NotConfigured,
            }),
            empty_conversations(),
            DEFAULT_PERSONA.to_string(),
            AiConfig::default(),
        );

        let reply = service.respond("client_001", "60123456789", "hello").await;

        assert_eq!(reply, FALLBACK_NOT_CONFIGURED);
    }

    #[tokio::test]
    async fn test_respond_call_failure_fallback() {
        let service = AiService::new(
            Arc::new(ErrProvider {
                error: || AiError::Provider("HTTP 500".to_string()),
            }),
            empty_conversations(),
            DEFAULT_PERSONA.to_string(),
            AiConfig::default(),
        );

        let reply = service.respond("client_001", "60123456789", "hello").await;

        assert_eq!(reply, FALLBACK_UNAVAILABLE);
        assert!(!reply.is_empty());
    }
}
