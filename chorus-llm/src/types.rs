use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// Opaque per-call annotations forwarded to the transport untouched.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Schema descriptor instructing the transport to coerce its output into a
/// specific shape instead of free text. The payload always lives under a
/// single `response` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseFormat {
    pub schema: serde_json::Value,
}

impl ResponseFormat {
    /// Free text under the `response` field.
    pub fn text() -> Self {
        Self::wrap(serde_json::json!({ "type": "string" }))
    }

    /// A value conforming to the given JSON Schema fragment under the
    /// `response` field.
    pub fn typed(fragment: serde_json::Value) -> Self {
        Self::wrap(fragment)
    }

    fn wrap(fragment: serde_json::Value) -> Self {
        Self {
            schema: serde_json::json!({
                "type": "object",
                "properties": { "response": fragment },
                "required": ["response"],
            }),
        }
    }
}

/// Normalized tool schema entry the transport forwards to the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    /// JSON Schema.
    pub parameters: serde_json::Value,
}

/// One provider call. Built fresh per call and never mutated after
/// dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Routing identifier, `{provider}/{model}` or a rewritten self-hosted
    /// form.
    pub model: String,
    pub messages: Vec<Message>,
    pub response_format: ResponseFormat,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub tools: Option<Vec<ToolDescriptor>>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub metadata: Metadata,
    /// Observability hook targets, applied by the transport to both its
    /// success and failure notification channels. Last writer wins at the
    /// transport.
    #[serde(default)]
    pub hooks: Vec<String>,
}

/// Token counts exactly as reported by the provider. `total_tokens` is
/// never recomputed locally, even when it disagrees with the parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseChoice {
    pub message: Message,
}

/// Raw output of a completed (non-streaming) provider call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCompletion {
    pub choices: Vec<ResponseChoice>,
    pub usage: TokenUsage,
    /// Provider-computed cost in account currency, when the transport
    /// reports one.
    #[serde(default)]
    pub cost: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkChoice {
    pub delta: ChunkDelta,
}

/// One element of a streaming provider call. Only the terminal chunk
/// carries aggregate usage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
    #[serde(default)]
    pub cost: Option<Decimal>,
}
