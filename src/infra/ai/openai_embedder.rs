use crate::core::knowledge::Embedder;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

const EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// OpenAI embeddings client. One request embeds a whole batch, so the
/// knowledge base is indexed with a single call at startup.
pub struct OpenAiEmbedder {
    client: Client,
    api_key: String,
    model: String,
}

impl OpenAiEmbedder {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
        }
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        let payload = json!({
            "model": self.model,
            "input": texts,
        });

        let response = self
            .client
            .post(EMBEDDINGS_URL)
            .timeout(REQUEST_TIMEOUT)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("embeddings API error: {} - {}", status, text);
        }

        let response_json: serde_json::Value = response.json().await?;
        parse_embeddings(&response_json)
    }
}

/// Extracts the `data[].embedding` arrays, in input order.
fn parse_embeddings(json: &serde_json::Value) -> anyhow::Result<Vec<Vec<f32>>> {
    let data = json
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| anyhow::anyhow!("invalid embeddings response: missing data array"))?;

    let mut embeddings = Vec::with_capacity(data.len());
    for item in data {
        let embedding = item
            .get("embedding")
            .and_then(|e| e.as_array())
            .ok_or_else(|| anyhow::anyhow!("invalid embeddings response: missing embedding"))?;

        let vector: Vec<f32> = embedding
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
            .collect();
        embeddings.push(vector);
    }

    Ok(embeddings)
}
