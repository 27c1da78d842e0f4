use super::documents::Document;
use super::embedder::Embedder;
use async_trait::async_trait;
use std::sync::Arc;

/// Candidates at or below this similarity are discarded.
const MIN_SIMILARITY: f32 = 0.3;

/// The keyword strategy has no ranking signal, so every match carries the
/// same placeholder score.
const KEYWORD_SCORE: f32 = 0.5;

/// A knowledge document matched against a query.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub document: Document,
    pub score: f32,
}

/// Ranks knowledge documents against a query.
///
/// Search is infallible by contract: every failure mode (blank query, no
/// documents, embedding errors) yields an empty result, which callers treat
/// as "no context available" rather than an error.
#[async_trait]
pub trait RelevanceMatcher: Send + Sync {
    async fn search(&self, query: &str, top_k: usize) -> Vec<MatchResult>;
}

/// Cosine similarity between two vectors. Returns 0.0 for mismatched
/// lengths or zero-magnitude inputs.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }
    dot / denom
}

/// Embedding-based matcher: documents are embedded once at construction in
/// a single batched call; queries are embedded per search with the same
/// function.
pub struct EmbeddingMatcher {
    documents: Vec<Document>,
    embeddings: Vec<Vec<f32>>,
    embedder: Arc<dyn Embedder>,
}

impl EmbeddingMatcher {
    /// Embeds every document and builds the matcher. Fails if the embedding
    /// call fails; callers typically fall back to [`KeywordMatcher`].
    pub async fn index(
        documents: Vec<Document>,
        embedder: Arc<dyn Embedder>,
    ) -> anyhow::Result<Self> {
        let texts: Vec<String> = documents.iter().map(|d| d.combined_text()).collect();
        let embeddings = embedder.embed(&texts).await?;
        if embeddings.len() != documents.len() {
            anyhow::bail!(
                "embedding count mismatch: {} documents, {} vectors",
                documents.len(),
                embeddings.len()
            );
        }
        Ok(Self {
            documents,
            embeddings,
            embedder,
        })
    }
}

#[async_trait]
impl RelevanceMatcher for EmbeddingMatcher {
    async fn search(&self, query: &str, top_k: usize) -> Vec<MatchResult> {
        if query.trim().is_empty() || self.documents.is_empty() || top_k == 0 {
            return Vec::new();
        }

        let query_embedding = match self.embedder.embed_query(query).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("Query embedding failed, returning no matches: {}", e);
                return Vec::new();
            }
        };

        let mut matches: Vec<MatchResult> = self
            .documents
            .iter()
            .zip(self.embeddings.iter())
            .filter_map(|(doc, emb)| {
                let score = cosine_similarity(emb, &query_embedding);
                (score > MIN_SIMILARITY).then(|| MatchResult {
                    document: doc.clone(),
                    score,
                })
            })
            .collect();

        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        matches.truncate(top_k);
        matches
    }
}

/// Keyword matcher: no embeddings, no ranking. A document matches when any
/// whitespace-separated query token appears as a substring of its
/// lower-cased `title: body` text; matches are returned in storage order.
pub struct KeywordMatcher {
    documents: Vec<Document>,
}

impl KeywordMatcher {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }
}

#[async_trait]
impl RelevanceMatcher for KeywordMatcher {
    async fn search(&self, query: &str, top_k: usize) -> Vec<MatchResult> {
        let query_lower = query.to_lowercase();
        let tokens: Vec<&str> = query_lower.split_whitespace().collect();
        if tokens.is_empty() {
            return Vec::new();
        }

        self.documents
            .iter()
            .filter(|doc| {
                let text = doc.combined_text().to_lowercase();
                tokens.iter().any(|token| text.contains(token))
            })
            .take(top_k)
            .map(|doc| MatchResult {
                document: doc.clone(),
                score: KEYWORD_SCORE,
            })
            .collect()
    }
}
