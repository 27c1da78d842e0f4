pub mod context;
pub mod documents;
pub mod embedder;
pub mod matcher;

pub use context::{ContextBuilder, RetrievedContext};
pub use documents::{default_documents, Document};
pub use embedder::Embedder;
pub use matcher::{EmbeddingMatcher, KeywordMatcher, MatchResult, RelevanceMatcher};
