use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one backend model: upstream provider plus model name.
/// Immutable once constructed; tags every response it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelId {
    provider: String,
    name: String,
}

impl ModelId {
    pub fn new(provider: &str, name: &str) -> Result<Self> {
        if provider.trim().is_empty() {
            return Err(EngineError::Configuration(
                "model provider must not be empty".to_string(),
            ));
        }
        if name.trim().is_empty() {
            return Err(EngineError::Configuration(
                "model name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            provider: provider.to_string(),
            name: name.to_string(),
        })
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Transport routing identifier, `{provider}/{name}`.
    pub fn routing_id(&self) -> String {
        format!("{}/{}", self.provider, self.name)
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.name)
    }
}
