// This is the entry point of the WhatsApp loan-consultation bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (database, APIs)
// - `http/` = HTTP-specific adapters (webhook routes, health check)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Start the webhook server

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "http/http_layer.rs"]
mod http;
#[path = "infra/infra_layer.rs"]
mod infra;

mod config;

use crate::config::{AppConfig, RagStrategy};
use crate::core::ai::{ai_service::DEFAULT_PERSONA, AiConfig, AiService};
use crate::core::conversation::ConversationService;
use crate::core::knowledge::{ContextBuilder, EmbeddingMatcher, KeywordMatcher, RelevanceMatcher};
use crate::core::messaging::MessageDispatcher;
use crate::core::webhook::WebhookOrchestrator;
use crate::http::{AppState, HealthContext};
use crate::infra::ai::{OpenAiClient, OpenAiEmbedder};
use crate::infra::applications::PgApplicationStore;
use crate::infra::cache::InMemorySessionCache;
use crate::infra::conversation::PgConversationStore;
use crate::infra::messaging::WhapiClient;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

/// Builds the relevance matcher according to configuration. The embedding
/// strategy needs a credential and a successful indexing call; anything
/// short of that falls back to keyword matching so retrieval still works.
async fn build_matcher(config: &AppConfig) -> Option<Arc<dyn RelevanceMatcher>> {
    if !config.rag_enabled {
        tracing::info!("Knowledge retrieval disabled by configuration");
        return None;
    }

    let documents = infra::knowledge::load_documents(&config.knowledge_base_path);

    match (config.rag_strategy, &config.openai_api_key) {
        (RagStrategy::Embedding, Some(api_key)) => {
            let embedder = Arc::new(OpenAiEmbedder::new(
                api_key.clone(),
                config.openai_embedding_model.clone(),
            ));
            match EmbeddingMatcher::index(documents.clone(), embedder).await {
                Ok(matcher) => {
                    tracing::info!("Embedded {} knowledge documents", documents.len());
                    Some(Arc::new(matcher))
                }
                Err(e) => {
                    tracing::warn!("Embedding index failed, using keyword matching: {}", e);
                    Some(Arc::new(KeywordMatcher::new(documents)))
                }
            }
        }
        (RagStrategy::Embedding, None) => {
            tracing::warn!("No embedding credential, using keyword matching");
            Some(Arc::new(KeywordMatcher::new(documents)))
        }
        (RagStrategy::Keyword, _) => Some(Arc::new(KeywordMatcher::new(documents))),
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let config = AppConfig::from_env();
    tracing::info!(client_id = %config.client_id, "Starting WhatsApp loan bot");

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // Create our services with their dependencies.
    // This is the "composition root" where we wire everything together.

    // The pool connects lazily: a down database at boot means degraded
    // operation (empty history, unpersisted turns), not a crashed process.
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect_lazy(&config.database_url())
        .expect("Invalid database URL");

    let conversation_store = Arc::new(PgConversationStore::new(pool.clone()));
    if let Err(e) = conversation_store.migrate().await {
        tracing::warn!("Conversation table migration failed (database down?): {}", e);
    }
    let conversations = Arc::new(ConversationService::new(conversation_store));

    let application_store = PgApplicationStore::new(pool.clone());
    if let Err(e) = application_store.migrate().await {
        tracing::warn!("Application table migration failed (database down?): {}", e);
    }

    let sessions = Arc::new(InMemorySessionCache::new());

    // Knowledge retrieval (optional)
    let context = build_matcher(&config)
        .await
        .map(|matcher| Arc::new(ContextBuilder::new(matcher)));

    // AI reply generation
    let system_prompt = config
        .system_prompt
        .clone()
        .unwrap_or_else(|| DEFAULT_PERSONA.to_string());
    if config.openai_api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY not set - replies will use the fallback text");
    }
    let provider = Arc::new(OpenAiClient::new(config.openai_api_key.clone()));
    let ai = Arc::new(AiService::new(
        provider,
        conversations.clone(),
        system_prompt,
        AiConfig {
            model: config.openai_model.clone(),
            ..AiConfig::default()
        },
    ));

    // Outbound messaging
    if config.whatsapp_token.is_none() {
        tracing::warn!("No WhatsApp token set - replies will not be delivered");
    }
    let gateway = Arc::new(WhapiClient::new(
        config.whatsapp_api_url.clone(),
        config.whatsapp_token.clone(),
    ));
    let dispatcher = Arc::new(MessageDispatcher::new(gateway));

    let orchestrator = Arc::new(WebhookOrchestrator::new(
        config.client_id.clone(),
        conversations,
        ai,
        dispatcher,
        sessions.clone(),
        context,
    ));

    // ========================================================================
    // WEBHOOK SERVER
    // ========================================================================

    let state = AppState {
        orchestrator,
        health: Arc::new(HealthContext {
            pool,
            sessions,
            client_id: config.client_id.clone(),
            rag_enabled: config.rag_enabled,
            openai_configured: config.openai_api_key.is_some(),
            whatsapp_configured: config.whatsapp_token.is_some(),
        }),
    };

    if let Err(e) = http::run_server(state, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
