// Inbound webhook payload parsing.
//
// The gateway delivers message text in two shapes: nested under
// `text.body`, or as a top-level `body` field. Both are normalized into one
// canonical record here, before any business logic runs.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub messages: Vec<InboundMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub from_name: Option<String>,
    #[serde(default)]
    pub from_me: bool,
    #[serde(default)]
    pub text: Option<TextBody>,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextBody {
    #[serde(default)]
    pub body: String,
}

/// Canonical form of an inbound message.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedMessage {
    pub sender: String,
    pub text: String,
    pub display_name: Option<String>,
    pub is_self: bool,
}

impl InboundMessage {
    /// Extracts the canonical record, tolerating both payload shapes.
    /// `None` when the sender is missing or the text is empty.
    pub fn normalize(&self) -> Option<NormalizedMessage> {
        let sender = self.from.as_deref().filter(|s| !s.is_empty())?;

        let text = self
            .text
            .as_ref()
            .map(|t| t.body.as_str())
            .filter(|t| !t.is_empty())
            .or(self.body.as_deref().filter(|b| !b.is_empty()))?;

        Some(NormalizedMessage {
            sender: sender.to_string(),
            text: text.to_string(),
            display_name: self.from_name.clone().filter(|n| !n.is_empty()),
            is_self: self.from_me,
        })
    }
}
