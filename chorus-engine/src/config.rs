//! Engine configuration loader.

use crate::error::{EngineError, Result};
use crate::executor::SelfHostedEndpoint;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChorusConfig {
    /// Fan-out model list, in execution order. Duplicates are allowed.
    #[serde(default)]
    pub models: Vec<ModelEntry>,
    /// Self-hosted endpoint override applied to every model.
    #[serde(default)]
    pub endpoint: Option<SelfHostedEndpoint>,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub prompts: PromptsConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelEntry {
    pub provider: String,
    pub model: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObservabilityConfig {
    /// Hook targets copied into every request, applied by the transport
    /// to both its success and failure notification channels.
    #[serde(default)]
    pub hooks: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PromptsConfig {
    /// Template prefix inserted between a prompt body and retrieved
    /// context.
    #[serde(default = "default_rag_prefix")]
    pub rag: String,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            rag: default_rag_prefix(),
        }
    }
}

pub(crate) fn default_rag_prefix() -> String {
    "\n\nAnswer using the following context:\n".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    /// Log targets forced off, silencing transport and HTTP internals.
    #[serde(default = "default_quiet_targets")]
    pub quiet_targets: Vec<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            quiet_targets: default_quiet_targets(),
        }
    }
}

fn default_quiet_targets() -> Vec<String> {
    ["hyper", "h2", "reqwest"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl ChorusConfig {
    pub async fn load(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            EngineError::Configuration(format!("read config {}: {e}", path.display()))
        })?;

        let cfg: ChorusConfig = toml::from_str(&contents).map_err(|e| {
            EngineError::Configuration(format!("parse config {}: {e}", path.display()))
        })?;

        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        for entry in &self.models {
            if entry.provider.trim().is_empty() || entry.model.trim().is_empty() {
                return Err(EngineError::Configuration(
                    "model entries need a provider and a model".to_string(),
                ));
            }
        }
        if let Some(endpoint) = &self.endpoint {
            if endpoint.url.trim().is_empty() {
                return Err(EngineError::Configuration(
                    "endpoint.url must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}
