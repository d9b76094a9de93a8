use crate::config::{ChorusConfig, ModelEntry};
use crate::error::{EngineError, Result};
use crate::executor::{Executor, ExecutorSettings, SelfHostedEndpoint, run_blocking};
use crate::id::ModelId;
use crate::processor::{ModelResponse, process_response};
use crate::prompt::PromptInput;
use crate::rag::Retriever;
use crate::tools::ToolInput;
use chorus_llm::Transport;
use std::sync::Arc;

/// Runs the same prompt against an ordered, possibly-duplicated list of
/// models concurrently. All tasks share one transport and one set of
/// executor settings; they share no mutable state.
///
/// Failure is all-or-nothing: the first task to fail aborts the whole
/// fan-out and completed sibling results are discarded.
pub struct MultiModel {
    models: Vec<ModelId>,
    transport: Arc<dyn Transport>,
    settings: ExecutorSettings,
}

impl MultiModel {
    /// Build from `{provider, model}` entries, in order, without
    /// deduplication.
    pub fn new(entries: &[ModelEntry], transport: Arc<dyn Transport>) -> Result<Self> {
        let models = entries
            .iter()
            .map(|entry| ModelId::new(&entry.provider, &entry.model))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            models,
            transport,
            settings: ExecutorSettings::default(),
        })
    }

    /// Assemble a fan-out from a loaded config: model list, endpoint
    /// override, hook targets, and RAG template prefix.
    pub fn from_config(config: &ChorusConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let mut multi = Self::new(&config.models, transport)?
            .with_hooks(config.observability.hooks.clone())
            .with_rag_prefix(config.prompts.rag.clone());
        if let Some(endpoint) = &config.endpoint {
            multi = multi.with_endpoint(endpoint.clone());
        }
        Ok(multi)
    }

    pub fn with_retriever(mut self, retriever: Arc<dyn Retriever>) -> Self {
        self.settings.retriever = Some(retriever);
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolInput>) -> Self {
        self.settings.tools = tools;
        self
    }

    pub fn with_endpoint(mut self, endpoint: SelfHostedEndpoint) -> Self {
        self.settings.endpoint = Some(endpoint);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.settings.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_hooks(mut self, hooks: Vec<String>) -> Self {
        self.settings.hooks = hooks;
        self
    }

    pub fn with_rag_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.settings.rag_prefix = prefix.into();
        self
    }

    pub fn models(&self) -> &[ModelId] {
        &self.models
    }

    /// Ask every model concurrently; results come back in configuration
    /// order regardless of completion order.
    #[tracing::instrument(level = "info", skip_all, fields(models = self.models.len()))]
    pub async fn ask_async(&self, input: impl Into<PromptInput>) -> Result<Vec<ModelResponse>> {
        let input = input.into();
        let tasks = self.models.iter().map(|model| self.task(model, &input));
        futures_util::future::try_join_all(tasks).await
    }

    /// Ask every model and wait on a private runtime. Errors when called
    /// from inside an async context.
    pub fn ask(&self, input: impl Into<PromptInput>) -> Result<Vec<ModelResponse>> {
        run_blocking(self.ask_async(input.into()))
    }

    async fn task(&self, model: &ModelId, input: &PromptInput) -> Result<ModelResponse> {
        let executor = Executor::from_parts(
            model.clone(),
            self.transport.clone(),
            self.settings.clone(),
        );
        let raw = executor
            .execute_async(input, None)
            .await
            .map_err(|e| EngineError::fan_out(model, e))?;
        process_response(&input.to_string(), model, &raw)
            .map_err(|e| EngineError::fan_out(model, e))
    }
}
