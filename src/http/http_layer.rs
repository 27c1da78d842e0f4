// HTTP layer - the webhook surface of the bot.
//
// Thin adapter only: routing, JSON extraction, and status-code mapping.
// All business logic lives behind the orchestrator.
//
// | Method | Path                          | Description                  |
// |--------|-------------------------------|------------------------------|
// | POST   | /webhook                      | Inbound message webhook      |
// | POST   | /client/{client_id}/webhook   | Tenant-scoped webhook alias  |
// | GET    | /health                       | Connectivity and config flags|
// | GET    | /                             | Static status page           |

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use sqlx::{Pool, Postgres};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::core::cache::SessionCache;
use crate::core::webhook::{WebhookOrchestrator, WebhookOutcome, WebhookPayload, WebhookStatus};

/// Dependencies the health endpoint probes.
pub struct HealthContext {
    pub pool: Pool<Postgres>,
    pub sessions: Arc<dyn SessionCache>,
    pub client_id: String,
    pub rag_enabled: bool,
    pub openai_configured: bool,
    pub whatsapp_configured: bool,
}

/// Shared application state, cheap to clone across handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<WebhookOrchestrator>,
    pub health: Arc<HealthContext>,
}

/// Graceful outcomes answer 200; only the caught-exception path is a 500.
fn status_code_for(outcome: &WebhookOutcome) -> StatusCode {
    match outcome.status {
        WebhookStatus::Error => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::OK,
    }
}

async fn handle_webhook(
    State(state): State<AppState>,
    Json(payload): Json<WebhookPayload>,
) -> (StatusCode, Json<WebhookOutcome>) {
    let outcome = state.orchestrator.handle(payload).await;
    (status_code_for(&outcome), Json(outcome))
}

async fn handle_tenant_webhook(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    Json(payload): Json<WebhookPayload>,
) -> (StatusCode, Json<WebhookOutcome>) {
    tracing::debug!(client_id = %client_id, "Webhook via tenant-scoped path");
    let outcome = state.orchestrator.handle(payload).await;
    (status_code_for(&outcome), Json(outcome))
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let health = &state.health;

    let database_ok = sqlx::query("SELECT 1").execute(&health.pool).await.is_ok();
    let cache_ok = health.sessions.ping().await;

    Json(json!({
        "status": "healthy",
        "service": "whatsapp-loan-bot",
        "client_id": health.client_id,
        "rag_enabled": health.rag_enabled,
        "database": if database_ok { "connected" } else { "disconnected" },
        "cache": if cache_ok { "connected" } else { "disconnected" },
        "openai": health.openai_configured,
        "whatsapp_token": health.whatsapp_configured,
    }))
}

async fn index() -> Html<&'static str> {
    Html(
        "<h1>WhatsApp Loan Bot</h1>\
         <p>Webhook endpoint: POST /webhook</p>\
         <p>Health check: GET /health</p>",
    )
}

async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": "unknown path"})),
    )
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/webhook", post(handle_webhook))
        .route("/client/{client_id}/webhook", post(handle_tenant_webhook))
        .route("/health", get(health))
        .route("/", get(index))
        .fallback(not_found)
        .layer(cors)
        .with_state(state)
}

/// Binds the listener and serves until the process is terminated.
pub async fn run_server(state: AppState, port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("Webhook server listening on port {}", port);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(status: WebhookStatus) -> WebhookOutcome {
        WebhookOutcome {
            status,
            response: None,
            error: None,
        }
    }

    #[test]
    fn test_graceful_outcomes_map_to_200() {
        for status in [
            WebhookStatus::NoMessage,
            WebhookStatus::Ignored,
            WebhookStatus::NoValidMessage,
            WebhookStatus::Processed,
        ] {
            assert_eq!(status_code_for(&outcome(status)), StatusCode::OK);
        }
    }

    #[test]
    fn test_error_outcome_maps_to_500() {
        assert_eq!(
            status_code_for(&outcome(WebhookStatus::Error)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
