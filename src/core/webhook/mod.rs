pub mod orchestrator;
pub mod payload;

pub use orchestrator::{WebhookOrchestrator, WebhookOutcome, WebhookStatus};
pub use payload::{InboundMessage, NormalizedMessage, WebhookPayload};
