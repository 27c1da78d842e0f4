use super::matcher::RelevanceMatcher;
use std::sync::Arc;

/// Rendered form of an empty lookup. Kept byte-for-byte stable: deployments
/// and operators grep for it.
pub const NO_CONTEXT_SENTINEL: &str = "No specific information found in knowledge base.";

/// How many documents a context block draws from.
const CONTEXT_TOP_K: usize = 2;

/// Replies shorter than this many words are considered incomplete and get
/// the knowledge context appended.
const SHORT_REPLY_WORDS: usize = 50;

/// Outcome of a knowledge lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum RetrievedContext {
    Found(String),
    NotFound,
}

impl RetrievedContext {
    pub fn is_found(&self) -> bool {
        matches!(self, RetrievedContext::Found(_))
    }

    /// Text form; `NotFound` renders as the sentinel string.
    pub fn as_text(&self) -> &str {
        match self {
            RetrievedContext::Found(text) => text,
            RetrievedContext::NotFound => NO_CONTEXT_SENTINEL,
        }
    }
}

/// Formats matched knowledge documents into a prompt-ready text block.
pub struct ContextBuilder {
    matcher: Arc<dyn RelevanceMatcher>,
}

impl ContextBuilder {
    pub fn new(matcher: Arc<dyn RelevanceMatcher>) -> Self {
        Self { matcher }
    }

    /// Looks up the query and formats the matches as `"{title}: {body}"`
    /// blocks joined by blank lines, preserving match order.
    pub async fn build_context(&self, query: &str) -> RetrievedContext {
        let matches = self.matcher.search(query, CONTEXT_TOP_K).await;
        if matches.is_empty() {
            return RetrievedContext::NotFound;
        }

        let parts: Vec<String> = matches
            .iter()
            .map(|m| m.document.combined_text())
            .collect();
        RetrievedContext::Found(parts.join("\n\n"))
    }

    /// Appends knowledge context to a generated reply, but only when the
    /// lookup found something AND the reply looks too short to be complete.
    pub async fn enhance_response(&self, query: &str, reply: String) -> String {
        let context = self.build_context(query).await;
        match context {
            RetrievedContext::Found(text)
                if reply.split_whitespace().count() < SHORT_REPLY_WORDS =>
            {
                format!("{}\n\nAdditional information:\n{}", reply, text)
            }
            _ => reply,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::knowledge::documents::Document;
    use crate::core::knowledge::matcher::MatchResult;
    use async_trait::async_trait;

    /// Matcher returning a canned result set regardless of query.
    struct FixedMatcher {
        results: Vec<MatchResult>,
    }

    #[async_trait]
    impl RelevanceMatcher for FixedMatcher {
        async fn search(&self, _query: &str, top_k: usize) -> Vec<MatchResult> {
            self.results.iter().take(top_k).cloned().collect()
        }
    }

    fn builder_with(results: Vec<MatchResult>) -> ContextBuilder {
        ContextBuilder::new(Arc::new(FixedMatcher { results }))
    }

    fn match_for(title: &str, body: &str) -> MatchResult {
        MatchResult {
            document: Document::new(title, body),
            score: 0.9,
        }
    }

    #[tokio::test]
    async fn test_not_found_iff_matcher_empty() {
        let empty = builder_with(vec![]);
        assert_eq!(empty.build_context("anything").await, RetrievedContext::NotFound);

        let full = builder_with(vec![match_for("Doc", "body")]);
        assert!(full.build_context("anything").await.is_found());
    }

    #[tokio::test]
    async fn test_sentinel_text_for_not_found() {
        let builder = builder_with(vec![]);
        let context = builder.build_context("q").await;
        assert_eq!(context.as_text(), NO_CONTEXT_SENTINEL);
    }

    #[tokio::test]
    async fn test_context_joins_matches_in_order() {
        let builder = builder_with(vec![
            match_for("First", "one"),
            match_for("Second", "two"),
        ]);

        let context = builder.build_context("q").await;
        assert_eq!(context.as_text(), "First: one\n\nSecond: two");
    }

    #[tokio::test]
    async fn test_context_limited_to_two_documents() {
        let builder = builder_with(vec![
            match_for("A", "1"),
            match_for("B", "2"),
            match_for("C", "3"),
        ]);

        let context = builder.build_context("q").await;
        assert!(!context.as_text().contains("C: 3"));
    }

    #[tokio::test]
    async fn test_enhance_appends_to_short_reply() {
        let builder = builder_with(vec![match_for("Eligibility", "details here")]);

        let enhanced = builder
            .enhance_response("personal loan", "Short answer.".to_string())
            .await;

        assert!(enhanced.starts_with("Short answer."));
        assert!(enhanced.contains("Additional information:"));
        assert!(enhanced.contains("Eligibility: details here"));
    }

    #[tokio::test]
    async fn test_enhance_leaves_long_reply_alone() {
        let builder = builder_with(vec![match_for("Eligibility", "details here")]);
        let long_reply = "word ".repeat(60).trim_end().to_string();

        let enhanced = builder.enhance_response("personal loan", long_reply.clone()).await;

        assert_eq!(enhanced, long_reply);
    }

    #[tokio::test]
    async fn test_enhance_leaves_reply_alone_without_context() {
        let builder = builder_with(vec![]);

        let enhanced = builder
            .enhance_response("unknown topic", "Short answer.".to_string())
            .await;

        assert_eq!(enhanced, "Short answer.");
    }
}
