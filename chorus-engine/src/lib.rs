//! Uniform LLM execution and multi-model fan-out.
//!
//! One request shape for every backend: prompts (optionally augmented with
//! retrieved context and tool descriptors) go in, normalized usage- and
//! cost-annotated responses come out, either as a single value or as a
//! staged stream. The [`MultiModel`] orchestrator runs the same prompt
//! against every configured model concurrently and joins the results in
//! configuration order.

mod config;
mod error;
mod executor;
mod id;
mod model;
mod multi;
mod processor;
mod prompt;
mod rag;
mod telemetry;
mod tools;

pub use config::{
    ChorusConfig, ModelEntry, ObservabilityConfig, PromptsConfig, TelemetryConfig,
};
pub use error::{EngineError, Result};
pub use executor::{Executor, SelfHostedEndpoint};
pub use id::ModelId;
pub use model::Model;
pub use multi::MultiModel;
pub use processor::{
    EventStream, ModelResponse, ModelUsage, StreamEvent, process_response, stage_events,
};
pub use prompt::{Prompt, PromptInput, ResponseKind};
pub use rag::{RagContext, Retriever};
pub use telemetry::init_tracing;
pub use tools::{FunctionDecl, McpTool, ToolInput};

#[cfg(test)]
pub(crate) mod test_support;
