// In-memory implementation of ConversationStore.
//
// Used by the test suite and as a stand-in when no database is reachable.
// Follows the same contract as the Postgres implementation: `recent` is
// chronological ascending, bounded to the most recent turns.

use crate::core::conversation::{
    ConversationError, ConversationStore, ConversationTurn, CustomerStats,
};
use async_trait::async_trait;
use dashmap::DashMap;

/// Maps (tenant, counterpart) -> turns in insertion order.
pub struct InMemoryConversationStore {
    turns: DashMap<(String, String), Vec<ConversationTurn>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self {
            turns: DashMap::new(),
        }
    }
}

impl Default for InMemoryConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn append(&self, turn: &ConversationTurn) -> Result<(), ConversationError> {
        let key = (turn.tenant_id.clone(), turn.counterpart_id.clone());
        self.turns.entry(key).or_default().push(turn.clone());
        Ok(())
    }

    async fn recent(
        &self,
        tenant_id: &str,
        counterpart_id: &str,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, ConversationError> {
        let key = (tenant_id.to_string(), counterpart_id.to_string());

        let Some(entry) = self.turns.get(&key) else {
            return Ok(Vec::new());
        };

        // Stable sort keeps insertion order for equal timestamps, so the
        // tail is always the most recent turns.
        let mut all = entry.clone();
        all.sort_by_key(|t| t.created_at);

        let start = all.len().saturating_sub(limit);
        Ok(all.split_off(start))
    }

    async fn stats(
        &self,
        tenant_id: &str,
        counterpart_id: &str,
    ) -> Result<CustomerStats, ConversationError> {
        let key = (tenant_id.to_string(), counterpart_id.to_string());

        let Some(entry) = self.turns.get(&key) else {
            return Ok(CustomerStats {
                total_messages: 0,
                first_interaction: None,
                last_interaction: None,
            });
        };

        Ok(CustomerStats {
            total_messages: entry.len() as i64,
            first_interaction: entry.iter().map(|t| t.created_at).min(),
            last_interaction: entry.iter().map(|t| t.created_at).max(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn turn_at(counterpart: &str, message: &str, offset_secs: i64) -> ConversationTurn {
        ConversationTurn {
            tenant_id: "client_001".to_string(),
            counterpart_id: counterpart.to_string(),
            display_name: None,
            message_text: message.to_string(),
            response_text: Some(format!("re: {}", message)),
            created_at: Utc::now() + Duration::seconds(offset_secs),
        }
    }

    #[tokio::test]
    async fn test_round_trip_includes_newest_turn_last() {
        let store = InMemoryConversationStore::new();
        store.append(&turn_at("60123456789", "hello", 0)).await.unwrap();

        let turns = store.recent("client_001", "60123456789", 1).await.unwrap();

        assert_eq!(turns.len(), 1);
        assert_eq!(turns.last().unwrap().message_text, "hello");
    }

    #[tokio::test]
    async fn test_recent_limited_and_ascending() {
        let store = InMemoryConversationStore::new();
        for i in 0..8 {
            store
                .append(&turn_at("60123456789", &format!("msg {}", i), i))
                .await
                .unwrap();
        }

        let turns = store.recent("client_001", "60123456789", 5).await.unwrap();

        // At most 5 turns, the most recent ones, oldest first.
        assert_eq!(turns.len(), 5);
        assert_eq!(turns[0].message_text, "msg 3");
        assert_eq!(turns[4].message_text, "msg 7");
        for pair in turns.windows(2) {
            assert!(pair[0].created_at <= pair[1].created_at);
        }
    }

    #[tokio::test]
    async fn test_recent_scoped_to_pair() {
        let store = InMemoryConversationStore::new();
        store.append(&turn_at("alice", "from alice", 0)).await.unwrap();
        store.append(&turn_at("bob", "from bob", 0)).await.unwrap();

        let turns = store.recent("client_001", "alice", 10).await.unwrap();

        assert_eq!(turns.len(), 1);
        assert!(turns.iter().all(|t| t.counterpart_id == "alice"));
    }

    #[tokio::test]
    async fn test_recent_unknown_pair_is_empty() {
        let store = InMemoryConversationStore::new();
        assert!(store.recent("client_001", "nobody", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stats() {
        let store = InMemoryConversationStore::new();
        store.append(&turn_at("60123456789", "first", 0)).await.unwrap();
        store.append(&turn_at("60123456789", "second", 60)).await.unwrap();

        let stats = store.stats("client_001", "60123456789").await.unwrap();

        assert_eq!(stats.total_messages, 2);
        assert!(stats.first_interaction.unwrap() < stats.last_interaction.unwrap());
    }

    #[tokio::test]
    async fn test_stats_empty_pair() {
        let store = InMemoryConversationStore::new();
        let stats = store.stats("client_001", "nobody").await.unwrap();

        assert_eq!(stats.total_messages, 0);
        assert!(stats.first_interaction.is_none());
    }
}
