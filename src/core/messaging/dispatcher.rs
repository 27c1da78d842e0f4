use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Address suffix the messaging gateway expects on every recipient.
const RECIPIENT_SUFFIX: &str = "@s.whatsapp.net";

/// Appends the gateway address suffix unless already present. Idempotent:
/// normalizing an already-normalized identifier is a no-op.
pub fn normalize_recipient(raw: &str) -> String {
    if raw.ends_with(RECIPIENT_SUFFIX) {
        raw.to_string()
    } else {
        format!("{}{}", raw, RECIPIENT_SUFFIX)
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("messaging credential not configured")]
    NotConfigured,
    #[error("gateway returned status {0}")]
    Status(u16),
    #[error("gateway request failed: {0}")]
    Request(String),
}

/// Outbound messaging gateway.
#[async_trait]
pub trait MessageGateway: Send + Sync {
    async fn send_text(&self, to: &str, body: &str) -> Result<(), GatewayError>;
}

/// Sends replies to the originating chat identity.
///
/// Returns a plain success flag: delivery failure is logged, never raised,
/// so a broken gateway cannot take down message processing.
pub struct MessageDispatcher {
    gateway: Arc<dyn MessageGateway>,
}

impl MessageDispatcher {
    pub fn new(gateway: Arc<dyn MessageGateway>) -> Self {
        Self { gateway }
    }

    pub async fn send(&self, counterpart_id: &str, text: &str) -> bool {
        let recipient = normalize_recipient(counterpart_id);

        match self.gateway.send_text(&recipient, text).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(recipient = %recipient, "Failed to send reply: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingGateway {
        sent_to: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl MessageGateway for RecordingGateway {
        async fn send_text(&self, to: &str, _body: &str) -> Result<(), GatewayError> {
            self.sent_to.lock().unwrap().push(to.to_string());
            if self.fail {
                Err(GatewayError::Status(503))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_normalize_appends_suffix() {
        assert_eq!(normalize_recipient("60123456789"), "60123456789@s.whatsapp.net");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_recipient("60123456789");
        let twice = normalize_recipient(&once);
        assert_eq!(once, twice);
        assert_eq!(once.matches("@s.whatsapp.net").count(), 1);
    }

    #[tokio::test]
    async fn test_send_normalizes_recipient_downstream() {
        let gateway = Arc::new(RecordingGateway {
            sent_to: Mutex::new(Vec::new()),
            fail: false,
        });
        let dispatcher = MessageDispatcher::new(gateway.clone());

        let ok = dispatcher.send("60123456789", "hello").await;

        assert!(ok);
        let sent = gateway.sent_to.lock().unwrap();
        assert_eq!(sent.as_slice(), ["60123456789@s.whatsapp.net"]);
    }

    #[tokio::test]
    async fn test_send_returns_false_on_gateway_failure() {
        let dispatcher = MessageDispatcher::new(Arc::new(RecordingGateway {
            sent_to: Mutex::new(Vec::new()),
            fail: true,
        }));

        assert!(!dispatcher.send("60123456789", "hello").await);
    }
}
