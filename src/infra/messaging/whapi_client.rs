use crate::core::messaging::{GatewayError, MessageGateway};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

/// Fixed bound on the outbound gateway call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// WhatsApp messaging gateway client (Whapi-style API).
///
/// Like the completion client, a missing credential is a valid degraded
/// configuration: every send fails with `NotConfigured` instead of the
/// process refusing to start.
pub struct WhapiClient {
    client: Client,
    api_url: String,
    token: Option<String>,
}

impl WhapiClient {
    pub fn new(api_url: String, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_url,
            token,
        }
    }
}

#[async_trait]
impl MessageGateway for WhapiClient {
    async fn send_text(&self, to: &str, body: &str) -> Result<(), GatewayError> {
        let token = self.token.as_deref().ok_or(GatewayError::NotConfigured)?;

        let payload = json!({
            "to": to,
            "body": body,
        });

        let response = self
            .client
            .post(format!("{}/messages/text", self.api_url))
            .timeout(REQUEST_TIMEOUT)
            .header("Authorization", format!("Bearer {}", token))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(GatewayError::Status(response.status().as_u16()))
        }
    }
}
