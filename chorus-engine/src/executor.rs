use crate::config::default_rag_prefix;
use crate::error::{EngineError, Result};
use crate::id::ModelId;
use crate::prompt::PromptInput;
use crate::rag::{Retriever, augment};
use crate::tools::{ToolInput, resolve_tools};
use chorus_llm::{ChunkStream, CompletionRequest, Metadata, RawCompletion, Transport};
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;

const HOSTED_VLLM_PREFIX: &str = "hosted_vllm";

/// Self-hosted endpoint override. When configured, the routing identifier
/// gains the `hosted_vllm/` prefix and the base URL is composed as
/// `{url}/v{version}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SelfHostedEndpoint {
    pub url: String,
    pub version: u32,
}

impl SelfHostedEndpoint {
    fn base_url(&self) -> String {
        format!("{}/v{}", self.url, self.version)
    }
}

/// Per-executor knobs shared across a fan-out: every model task gets the
/// same retriever, tools, endpoint, cap, and hook targets.
#[derive(Clone)]
pub(crate) struct ExecutorSettings {
    pub retriever: Option<Arc<dyn Retriever>>,
    pub tools: Vec<ToolInput>,
    pub endpoint: Option<SelfHostedEndpoint>,
    pub max_tokens: Option<u32>,
    pub hooks: Vec<String>,
    pub rag_prefix: String,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            retriever: None,
            tools: Vec::new(),
            endpoint: None,
            max_tokens: None,
            hooks: Vec::new(),
            rag_prefix: default_rag_prefix(),
        }
    }
}

/// Drives one model: builds a [`CompletionRequest`] from a prompt and
/// dispatches it through the transport in one of three modes. Transport
/// failures propagate unchanged; nothing is retried here.
pub struct Executor {
    model: ModelId,
    transport: Arc<dyn Transport>,
    settings: ExecutorSettings,
}

impl Executor {
    pub fn new(model: ModelId, transport: Arc<dyn Transport>) -> Self {
        Self {
            model,
            transport,
            settings: ExecutorSettings::default(),
        }
    }

    pub(crate) fn from_parts(
        model: ModelId,
        transport: Arc<dyn Transport>,
        settings: ExecutorSettings,
    ) -> Self {
        Self {
            model,
            transport,
            settings,
        }
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

    /// Observability hook targets copied into every request.
    pub fn with_hooks(mut self, hooks: Vec<String>) -> Self {
        self.settings.hooks = hooks;
        self
    }

    pub fn with_rag_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.settings.rag_prefix = prefix.into();
        self
    }

    pub fn model(&self) -> &ModelId {
        &self.model
    }

    /// Routing identifier and base URL for this call.
    fn resolve_endpoint(&self) -> (String, Option<String>) {
        match &self.settings.endpoint {
            Some(endpoint) => (
                format!("{HOSTED_VLLM_PREFIX}/{}", self.model.routing_id()),
                Some(endpoint.base_url()),
            ),
            None => (self.model.routing_id(), None),
        }
    }

    /// Prompt body with retrieved context appended. Skipped entirely when
    /// no retriever is configured; a retrieval with zero document groups
    /// leaves the body byte-for-byte unchanged.
    async fn augmented_body(&self, body: &str) -> Result<String> {
        let Some(retriever) = self.settings.retriever.as_ref() else {
            return Ok(body.to_string());
        };
        let context = retriever.query(body).await?;
        Ok(augment(body, &self.settings.rag_prefix, &context))
    }

    pub(crate) async fn build_request(
        &self,
        input: &PromptInput,
        metadata: Option<Metadata>,
    ) -> Result<CompletionRequest> {
        let (model, base_url) = self.resolve_endpoint();

        // Augmentation happens on the prompt body, before message
        // normalization. Pre-built message sequences pass through as-is.
        let messages = match input {
            PromptInput::Text(text) => PromptInput::messages_for(self.augmented_body(text).await?),
            PromptInput::Prompt(prompt) => {
                PromptInput::messages_for(self.augmented_body(&prompt.body).await?)
            }
            PromptInput::Messages(messages) => messages.clone(),
        };

        let tools = if self.settings.tools.is_empty() {
            None
        } else {
            Some(resolve_tools(&self.settings.tools)?)
        };

        Ok(CompletionRequest {
            model,
            messages,
            response_format: input.response_format(),
            base_url,
            tools,
            max_tokens: self.settings.max_tokens,
            metadata: metadata.unwrap_or_default(),
            hooks: self.settings.hooks.clone(),
        })
    }

    /// Non-blocking execution: suspends the task while the transport works
    /// and resumes with the raw response.
    #[tracing::instrument(level = "info", skip_all, fields(model = %self.model))]
    pub async fn execute_async(
        &self,
        input: &PromptInput,
        metadata: Option<Metadata>,
    ) -> Result<RawCompletion> {
        let request = self.build_request(input, metadata).await?;
        Ok(self.transport.complete(&request).await?)
    }

    /// Blocking execution on a private runtime. Errors instead of
    /// deadlocking when called from inside an async context.
    pub fn execute(
        &self,
        input: &PromptInput,
        metadata: Option<Metadata>,
    ) -> Result<RawCompletion> {
        run_blocking(self.execute_async(input, metadata))
    }

    /// Streaming execution: resolves to a lazy, ordered, finite sequence
    /// of raw transport chunks. Not restartable.
    #[tracing::instrument(level = "info", skip_all, fields(model = %self.model))]
    pub async fn execute_stream(
        &self,
        input: &PromptInput,
        metadata: Option<Metadata>,
    ) -> Result<ChunkStream> {
        let request = self.build_request(input, metadata).await?;
        Ok(self.transport.complete_stream(&request).await?)
    }
}

/// Run a future to completion on a private current-thread runtime.
pub(crate) fn run_blocking<T>(future: impl Future<Output = Result<T>>) -> Result<T> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(EngineError::BlockingInAsync);
    }
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| EngineError::Configuration(format!("runtime construction failed: {e}")))?;
    runtime.block_on(future)
}
