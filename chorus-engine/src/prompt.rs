use chorus_llm::{Message, ResponseFormat, Role};
use std::fmt;

/// Desired shape of the model's answer.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResponseKind {
    /// Plain text.
    #[default]
    Text,
    /// A value conforming to the given JSON Schema fragment. A data-only
    /// descriptor; no types are synthesized at runtime.
    Typed(serde_json::Value),
}

/// A prompt body plus the desired response shape.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub body: String,
    pub response_kind: ResponseKind,
}

impl Prompt {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            response_kind: ResponseKind::Text,
        }
    }

    pub fn typed(body: impl Into<String>, schema: serde_json::Value) -> Self {
        Self {
            body: body.into(),
            response_kind: ResponseKind::Typed(schema),
        }
    }
}

/// The three accepted prompt forms: raw text, a structured prompt, or a
/// pre-built message sequence that passes through normalization unchanged.
#[derive(Debug, Clone)]
pub enum PromptInput {
    Text(String),
    Prompt(Prompt),
    Messages(Vec<Message>),
}

impl PromptInput {
    pub fn response_kind(&self) -> ResponseKind {
        match self {
            Self::Prompt(prompt) => prompt.response_kind.clone(),
            Self::Text(_) | Self::Messages(_) => ResponseKind::Text,
        }
    }

    pub(crate) fn response_format(&self) -> ResponseFormat {
        match self.response_kind() {
            ResponseKind::Text => ResponseFormat::text(),
            ResponseKind::Typed(schema) => ResponseFormat::typed(schema),
        }
    }

    /// Role/content form of a (possibly augmented) prompt body.
    pub(crate) fn messages_for(body: String) -> Vec<Message> {
        vec![Message {
            role: Role::User,
            content: body,
        }]
    }
}

/// The prompt text echoed back on responses: the caller's original input,
/// never the augmented form. Message sequences echo their contents joined
/// with newlines.
impl fmt::Display for PromptInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Prompt(prompt) => f.write_str(&prompt.body),
            Self::Messages(messages) => {
                let mut first = true;
                for message in messages {
                    if !first {
                        f.write_str("\n")?;
                    }
                    f.write_str(&message.content)?;
                    first = false;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for PromptInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for PromptInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Prompt> for PromptInput {
    fn from(prompt: Prompt) -> Self {
        Self::Prompt(prompt)
    }
}

impl From<Vec<Message>> for PromptInput {
    fn from(messages: Vec<Message>) -> Self {
        Self::Messages(messages)
    }
}
