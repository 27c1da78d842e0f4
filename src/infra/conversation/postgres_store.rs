use crate::core::conversation::{
    ConversationError, ConversationStore, ConversationTurn, CustomerStats,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};

/// Postgres-backed conversation log.
///
/// The pool connects lazily and re-acquires after failures, so a database
/// outage shows up as per-operation errors (absorbed by the service layer)
/// rather than a crashed process.
pub struct PgConversationStore {
    pool: Pool<Postgres>,
}

impl PgConversationStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS conversations (
                id BIGSERIAL PRIMARY KEY,
                client_id TEXT NOT NULL,
                phone_number TEXT NOT NULL,
                customer_name TEXT,
                message_text TEXT NOT NULL,
                response_text TEXT,
                timestamp TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_conversations_pair_time
            ON conversations(client_id, phone_number, timestamp)
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn storage_err(e: sqlx::Error) -> ConversationError {
    ConversationError::Storage(e.to_string())
}

fn row_to_turn(row: &sqlx::postgres::PgRow) -> ConversationTurn {
    ConversationTurn {
        tenant_id: row.get("client_id"),
        counterpart_id: row.get("phone_number"),
        display_name: row.get("customer_name"),
        message_text: row.get("message_text"),
        response_text: row.get("response_text"),
        created_at: row.get("timestamp"),
    }
}

#[async_trait]
impl ConversationStore for PgConversationStore {
    async fn append(&self, turn: &ConversationTurn) -> Result<(), ConversationError> {
        sqlx::query(
            r#"
            INSERT INTO conversations
                (client_id, phone_number, customer_name, message_text, response_text, timestamp)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&turn.tenant_id)
        .bind(&turn.counterpart_id)
        .bind(&turn.display_name)
        .bind(&turn.message_text)
        .bind(&turn.response_text)
        .bind(turn.created_at)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(())
    }

    async fn recent(
        &self,
        tenant_id: &str,
        counterpart_id: &str,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, ConversationError> {
        let rows = sqlx::query(
            r#"
            SELECT client_id, phone_number, customer_name, message_text, response_text, timestamp
            FROM conversations
            WHERE client_id = $1 AND phone_number = $2
            ORDER BY timestamp DESC
            LIMIT $3
            "#,
        )
        .bind(tenant_id)
        .bind(counterpart_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        // Queried newest-first for the LIMIT; reversed here so the contract
        // stays chronological ascending.
        let mut turns: Vec<ConversationTurn> = rows.iter().map(row_to_turn).collect();
        turns.reverse();
        Ok(turns)
    }

    async fn stats(
        &self,
        tenant_id: &str,
        counterpart_id: &str,
    ) -> Result<CustomerStats, ConversationError> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total_messages,
                MIN(timestamp) AS first_interaction,
                MAX(timestamp) AS last_interaction
            FROM conversations
            WHERE client_id = $1 AND phone_number = $2
            "#,
        )
        .bind(tenant_id)
        .bind(counterpart_id)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(CustomerStats {
            total_messages: row.get("total_messages"),
            first_interaction: row.get::<Option<DateTime<Utc>>, _>("first_interaction"),
            last_interaction: row.get::<Option<DateTime<Utc>>, _>("last_interaction"),
        })
    }
}
