use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// One customer message and the reply it received.
///
/// `response_text` is filled in before the turn is appended: the store sees
/// exactly one write per inbound message.
#[derive(Debug, Clone)]
pub struct ConversationTurn {
    pub tenant_id: String,
    pub counterpart_id: String,
    pub display_name: Option<String>,
    pub message_text: String,
    pub response_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Interaction statistics for one customer.
#[derive(Debug, Clone)]
pub struct CustomerStats {
    pub total_messages: i64,
    pub first_interaction: Option<DateTime<Utc>>,
    pub last_interaction: Option<DateTime<Utc>>,
}

#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("storage error: {0}")]
    Storage(String),
}

/// Append-only log of conversation turns keyed by (tenant, counterpart).
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn append(&self, turn: &ConversationTurn) -> Result<(), ConversationError>;

    /// Most recent `limit` turns for the pair, returned in chronological
    /// ascending order.
    async fn recent(
        &self,
        tenant_id: &str,
        counterpart_id: &str,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, ConversationError>;

    async fn stats(
        &self,
        tenant_id: &str,
        counterpart_id: &str,
    ) -> Result<CustomerStats, ConversationError>;
}

/// Best-effort wrapper around a [`ConversationStore`].
///
/// Persistence must never block the chat: a failed append degrades to a
/// logged warning, a failed history read degrades to an empty history.
pub struct ConversationService {
    store: Arc<dyn ConversationStore>,
}

impl ConversationService {
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self { store }
    }

    /// Appends a completed turn. Returns whether the write succeeded.
    pub async fn record_turn(
        &self,
        tenant_id: &str,
        counterpart_id: &str,
        message_text: &str,
        response_text: Option<&str>,
        display_name: Option<&str>,
    ) -> bool {
        let turn = ConversationTurn {
            tenant_id: tenant_id.to_string(),
            counterpart_id: counterpart_id.to_string(),
            display_name: display_name.map(|s| s.to_string()),
            message_text: message_text.to_string(),
            response_text: response_text.map(|s| s.to_string()),
            created_at: Utc::now(),
        };

        match self.store.append(&turn).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    counterpart = counterpart_id,
                    "Failed to persist conversation turn: {}",
                    e
                );
                false
            }
        }
    }

    /// Recent history for the pair, oldest first. Empty on storage failure.
    pub async fn recent_history(
        &self,
        tenant_id: &str,
        counterpart_id: &str,
        limit: usize,
    ) -> Vec<ConversationTurn> {
        match self.store.recent(tenant_id, counterpart_id, limit).await {
            Ok(turns) => turns,
            Err(e) => {
                tracing::warn!(
                    counterpart = counterpart_id,
                    "Failed to load conversation history: {}",
                    e
                );
                Vec::new()
            }
        }
    }

    pub async fn customer_stats(
        &self,
        tenant_id: &str,
        counterpart_id: &str,
    ) -> Option<CustomerStats> {
        match self.store.stats(tenant_id, counterpart_id).await {
            Ok(stats) => Some(stats),
            Err(e) => {
                tracing::warn!(
                    counterpart = counterpart_id,
                    "Failed to load customer stats: {}",
                    e
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Store where every operation fails, to exercise the degradation path.
    struct BrokenStore;

    #[async_trait]
    impl ConversationStore for BrokenStore {
        async fn append(&self, _turn: &ConversationTurn) -> Result<(), ConversationError> {
            Err(ConversationError::Storage("connection refused".to_string()))
        }

        async fn recent(
            &self,
            _tenant_id: &str,
            _counterpart_id: &str,
            _limit: usize,
        ) -> Result<Vec<ConversationTurn>, ConversationError> {
            Err(ConversationError::Storage("connection refused".to_string()))
        }

        async fn stats(
            &self,
            _tenant_id: &str,
            _counterpart_id: &str,
        ) -> Result<CustomerStats, ConversationError> {
            Err(ConversationError::Storage("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_record_turn_degrades_to_false() {
        let service = ConversationService::new(Arc::new(BrokenStore));
        let ok = service
            .record_turn("client_001", "60123456789", "hello", Some("hi"), None)
            .await;
        assert!(!ok);
    }

    #[tokio::test]
    async fn test_recent_history_degrades_to_empty() {
        let service = ConversationService::new(Arc::new(BrokenStore));
        let history = service.recent_history("client_001", "60123456789", 5).await;
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_customer_stats_degrades_to_none() {
        let service = ConversationService::new(Arc::new(BrokenStore));
        assert!(service.customer_stats("client_001", "60123456789").await.is_none());
    }
}
