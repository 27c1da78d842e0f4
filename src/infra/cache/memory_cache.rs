// In-memory session cache.
//
// DashMap gives safe concurrent access across webhook requests without a
// Mutex. A networked cache backend would implement the same SessionCache
// trait and slot in unchanged.

use crate::core::cache::{CustomerSession, SessionCache};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

pub struct InMemorySessionCache {
    sessions: DashMap<(String, String), CustomerSession>,
}

impl InMemorySessionCache {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }
}

impl Default for InMemorySessionCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionCache for InMemorySessionCache {
    async fn get(&self, tenant_id: &str, counterpart_id: &str) -> Option<CustomerSession> {
        let key = (tenant_id.to_string(), counterpart_id.to_string());
        self.sessions.get(&key).map(|entry| entry.clone())
    }

    async fn touch(
        &self,
        tenant_id: &str,
        counterpart_id: &str,
        display_name: Option<&str>,
    ) -> CustomerSession {
        let key = (tenant_id.to_string(), counterpart_id.to_string());
        let now = Utc::now();

        let entry = self
            .sessions
            .entry(key)
            .and_modify(|session| {
                session.last_seen = now;
                session.message_count += 1;
                if let Some(name) = display_name {
                    session.display_name = Some(name.to_string());
                }
            })
            .or_insert(CustomerSession {
                display_name: display_name.map(|s| s.to_string()),
                last_seen: now,
                message_count: 1,
            });

        entry.clone()
    }

    async fn ping(&self) -> bool {
        true
    }
}
