use crate::core::applications::{
    ApplicationError, ApplicationStatus, ApplicationStore, LoanApplication,
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};

pub struct PgApplicationStore {
    pool: Pool<Postgres>,
}

impl PgApplicationStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS loan_applications (
                id BIGSERIAL PRIMARY KEY,
                client_id TEXT NOT NULL,
                phone_number TEXT NOT NULL,
                customer_name TEXT,
                loan_amount DOUBLE PRECISION,
                loan_purpose TEXT,
                monthly_income DOUBLE PRECISION,
                employment_status TEXT,
                application_status TEXT NOT NULL DEFAULT 'pending',
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn storage_err(e: sqlx::Error) -> ApplicationError {
    ApplicationError::Storage(e.to_string())
}

#[async_trait]
impl ApplicationStore for PgApplicationStore {
    async fn create(&self, application: &LoanApplication) -> Result<(), ApplicationError> {
        sqlx::query(
            r#"
            INSERT INTO loan_applications
                (client_id, phone_number, customer_name, loan_amount, loan_purpose,
                 monthly_income, employment_status, application_status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&application.tenant_id)
        .bind(&application.counterpart_id)
        .bind(&application.display_name)
        .bind(application.loan_amount)
        .bind(&application.loan_purpose)
        .bind(application.monthly_income)
        .bind(&application.employment_status)
        .bind(application.status.as_str())
        .bind(application.created_at)
        .bind(application.updated_at)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(())
    }

    async fn update_status(
        &self,
        tenant_id: &str,
        counterpart_id: &str,
        status: ApplicationStatus,
    ) -> Result<u64, ApplicationError> {
        let result = sqlx::query(
            r#"
            UPDATE loan_applications
            SET application_status = $1, updated_at = $2
            WHERE client_id = $3 AND phone_number = $4
            "#,
        )
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(tenant_id)
        .bind(counterpart_id)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(result.rows_affected())
    }

    async fn for_customer(
        &self,
        tenant_id: &str,
        counterpart_id: &str,
    ) -> Result<Vec<LoanApplication>, ApplicationError> {
        let rows = sqlx::query(
            r#"
            SELECT client_id, phone_number, customer_name, loan_amount, loan_purpose,
                   monthly_income, employment_status, application_status, created_at, updated_at
            FROM loan_applications
            WHERE client_id = $1 AND phone_number = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(tenant_id)
        .bind(counterpart_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        let applications = rows
            .iter()
            .map(|row| {
                let status: String = row.get("application_status");
                LoanApplication {
                    tenant_id: row.get("client_id"),
                    counterpart_id: row.get("phone_number"),
                    display_name: row.get("customer_name"),
                    loan_amount: row.get("loan_amount"),
                    loan_purpose: row.get("loan_purpose"),
                    monthly_income: row.get("monthly_income"),
                    employment_status: row.get("employment_status"),
                    status: ApplicationStatus::parse(&status),
                    created_at: row.get("created_at"),
                    updated_at: row.get("updated_at"),
                }
            })
            .collect();

        Ok(applications)
    }
}
