use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Status of a loan application. New applications start as `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Reviewing,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Reviewing => "reviewing",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    /// Unknown values map to `Pending` rather than failing the row.
    pub fn parse(s: &str) -> Self {
        match s {
            "reviewing" => ApplicationStatus::Reviewing,
            "approved" => ApplicationStatus::Approved,
            "rejected" => ApplicationStatus::Rejected,
            _ => ApplicationStatus::Pending,
        }
    }
}

/// A loan application captured during consultation.
#[derive(Debug, Clone)]
pub struct LoanApplication {
    pub tenant_id: String,
    pub counterpart_id: String,
    pub display_name: Option<String>,
    pub loan_amount: Option<f64>,
    pub loan_purpose: Option<String>,
    pub monthly_income: Option<f64>,
    pub employment_status: Option<String>,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("storage error: {0}")]
    Storage(String),
}

/// Append/update-only store of loan applications.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn create(&self, application: &LoanApplication) -> Result<(), ApplicationError>;

    /// Updates the status of every application for the pair; returns the
    /// number of rows touched.
    async fn update_status(
        &self,
        tenant_id: &str,
        counterpart_id: &str,
        status: ApplicationStatus,
    ) -> Result<u64, ApplicationError>;

    /// Applications for the pair, newest first.
    async fn for_customer(
        &self,
        tenant_id: &str,
        counterpart_id: &str,
    ) -> Result<Vec<LoanApplication>, ApplicationError>;
}

/// Best-effort wrapper, same policy as the conversation service: storage
/// failures are logged and absorbed.
pub struct ApplicationService {
    store: Arc<dyn ApplicationStore>,
}

impl ApplicationService {
    pub fn new(store: Arc<dyn ApplicationStore>) -> Self {
        Self { store }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_application(
        &self,
        tenant_id: &str,
        counterpart_id: &str,
        display_name: Option<&str>,
        loan_amount: Option<f64>,
        loan_purpose: Option<&str>,
        monthly_income: Option<f64>,
        employment_status: Option<&str>,
    ) -> bool {
        let now = Utc::now();
        let application = LoanApplication {
            tenant_id: tenant_id.to_string(),
            counterpart_id: counterpart_id.to_string(),
            display_name: display_name.map(|s| s.to_string()),
            loan_amount,
            loan_purpose: loan_purpose.map(|s| s.to_string()),
            monthly_income,
            employment_status: employment_status.map(|s| s.to_string()),
            status: ApplicationStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        match self.store.create(&application).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    counterpart = counterpart_id,
                    "Failed to create loan application: {}",
                    e
                );
                false
            }
        }
    }

    pub async fn update_status(
        &self,
        tenant_id: &str,
        counterpart_id: &str,
        status: ApplicationStatus,
    ) -> bool {
        match self.store.update_status(tenant_id, counterpart_id, status).await {
            Ok(updated) => updated > 0,
            Err(e) => {
                tracing::warn!(
                    counterpart = counterpart_id,
                    "Failed to update application status: {}",
                    e
                );
                false
            }
        }
    }

    pub async fn applications_for(
        &self,
        tenant_id: &str,
        counterpart_id: &str,
    ) -> Vec<LoanApplication> {
        match self.store.for_customer(tenant_id, counterpart_id).await {
            Ok(applications) => applications,
            Err(e) => {
                tracing::warn!(
                    counterpart = counterpart_id,
                    "Failed to load loan applications: {}",
                    e
                );
                Vec::new()
            }
        }
    }
}
