use crate::error::Result;
use async_trait::async_trait;

/// Document groups returned by one retrieval query. Each group is an
/// ordered sequence of text passages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RagContext {
    pub groups: Vec<Vec<String>>,
}

impl RagContext {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// All passages in group order, joined with newlines.
    pub fn flattened(&self) -> String {
        self.groups
            .iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Retrieval capability queried before execution. Index construction and
/// ranking live behind this boundary.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn query(&self, prompt: &str) -> Result<RagContext>;
}

/// Append retrieved context to a prompt body after the template prefix.
/// Zero document groups leave the body untouched.
pub(crate) fn augment(body: &str, prefix: &str, context: &RagContext) -> String {
    if context.is_empty() {
        return body.to_string();
    }
    format!("{body}{prefix}{}", context.flattened())
}
