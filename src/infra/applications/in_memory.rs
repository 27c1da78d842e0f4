// In-memory implementation of ApplicationStore, for tests and DB-less runs.

use crate::core::applications::{
    ApplicationError, ApplicationStatus, ApplicationStore, LoanApplication,
};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

pub struct InMemoryApplicationStore {
    applications: DashMap<(String, String), Vec<LoanApplication>>,
}

impl InMemoryApplicationStore {
    pub fn new() -> Self {
        Self {
            applications: DashMap::new(),
        }
    }
}

impl Default for InMemoryApplicationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApplicationStore for InMemoryApplicationStore {
    async fn create(&self, application: &LoanApplication) -> Result<(), ApplicationError> {
        let key = (
            application.tenant_id.clone(),
            application.counterpart_id.clone(),
        );
        self.applications
            .entry(key)
            .or_default()
            .push(application.clone());
        Ok(())
    }

    async fn update_status(
        &self,
        tenant_id: &str,
        counterpart_id: &str,
        status: ApplicationStatus,
    ) -> Result<u64, ApplicationError> {
        let key = (tenant_id.to_string(), counterpart_id.to_string());

        let Some(mut entry) = self.applications.get_mut(&key) else {
            return Ok(0);
        };

        let now = Utc::now();
        for application in entry.iter_mut() {
            application.status = status;
            application.updated_at = now;
        }
        Ok(entry.len() as u64)
    }

    async fn for_customer(
        &self,
        tenant_id: &str,
        counterpart_id: &str,
    ) -> Result<Vec<LoanApplication>, ApplicationError> {
        let key = (tenant_id.to_string(), counterpart_id.to_string());

        let Some(entry) = self.applications.get(&key) else {
            return Ok(Vec::new());
        };

        let mut applications = entry.clone();
        applications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(applications)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn application(counterpart: &str, purpose: &str) -> LoanApplication {
        let now = Utc::now();
        LoanApplication {
            tenant_id: "client_001".to_string(),
            counterpart_id: counterpart.to_string(),
            display_name: Some("Aisyah".to_string()),
            loan_amount: Some(150_000.0),
            loan_purpose: Some(purpose.to_string()),
            monthly_income: Some(4_500.0),
            employment_status: Some("employed".to_string()),
            status: ApplicationStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_and_fetch() {
        let store = InMemoryApplicationStore::new();
        store.create(&application("60123456789", "housing")).await.unwrap();

        let applications = store.for_customer("client_001", "60123456789").await.unwrap();

        assert_eq!(applications.len(), 1);
        assert_eq!(applications[0].status, ApplicationStatus::Pending);
        assert_eq!(applications[0].loan_purpose.as_deref(), Some("housing"));
    }

    #[tokio::test]
    async fn test_update_status() {
        let store = InMemoryApplicationStore::new();
        store.create(&application("60123456789", "car")).await.unwrap();

        let updated = store
            .update_status("client_001", "60123456789", ApplicationStatus::Approved)
            .await
            .unwrap();

        assert_eq!(updated, 1);
        let applications = store.for_customer("client_001", "60123456789").await.unwrap();
        assert_eq!(applications[0].status, ApplicationStatus::Approved);
    }

    #[tokio::test]
    async fn test_update_status_unknown_pair_touches_nothing() {
        let store = InMemoryApplicationStore::new();
        let updated = store
            .update_status("client_001", "nobody", ApplicationStatus::Rejected)
            .await
            .unwrap();
        assert_eq!(updated, 0);
    }
}
