use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Cached per-customer session state.
#[derive(Debug, Clone)]
pub struct CustomerSession {
    pub display_name: Option<String>,
    pub last_seen: DateTime<Utc>,
    pub message_count: u64,
}

/// Session cache keyed by (tenant, counterpart).
///
/// The cache is an external collaborator: this crate ships an in-memory
/// implementation, and a networked backend implements the same trait.
#[async_trait]
pub trait SessionCache: Send + Sync {
    async fn get(&self, tenant_id: &str, counterpart_id: &str) -> Option<CustomerSession>;

    /// Records a sighting of the customer: bumps the message count, updates
    /// last-seen, and remembers the display name when one is supplied.
    /// Returns the session after the update.
    async fn touch(
        &self,
        tenant_id: &str,
        counterpart_id: &str,
        display_name: Option<&str>,
    ) -> CustomerSession;

    /// Connectivity probe for the health endpoint.
    async fn ping(&self) -> bool;
}
