use async_trait::async_trait;

/// External embedding function.
///
/// Implementations turn a batch of texts into fixed-length vectors, one per
/// input, in input order. The batch form exists so all knowledge documents
/// can be embedded in a single call at load time.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;

    /// Convenience for embedding a single query string.
    async fn embed_query(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let mut vectors = self.embed(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| anyhow::anyhow!("empty embedding response"))
    }
}
