use crate::error::Result;
use crate::executor::{Executor, SelfHostedEndpoint, run_blocking};
use crate::id::ModelId;
use crate::processor::{EventStream, ModelResponse, process_response, stage_events};
use crate::prompt::PromptInput;
use crate::rag::Retriever;
use crate::tools::ToolInput;
use chorus_llm::Transport;
use std::sync::Arc;

/// One configured model: an [`Executor`] composed with the response
/// processor. The convenient surface for single-model callers; the raw
/// execution modes stay available on [`Model::executor`].
pub struct Model {
    executor: Executor,
}

impl Model {
    pub fn new(provider: &str, name: &str, transport: Arc<dyn Transport>) -> Result<Self> {
        Ok(Self {
            executor: Executor::new(ModelId::new(provider, name)?, transport),
        })
    }

    pub fn with_retriever(mut self, retriever: Arc<dyn Retriever>) -> Self {
        self.executor = self.executor.with_retriever(retriever);
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolInput>) -> Self {
        self.executor = self.executor.with_tools(tools);
        self
    }

    pub fn with_endpoint(mut self, endpoint: SelfHostedEndpoint) -> Self {
        self.executor = self.executor.with_endpoint(endpoint);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.executor = self.executor.with_max_tokens(max_tokens);
        self
    }

    pub fn with_hooks(mut self, hooks: Vec<String>) -> Self {
        self.executor = self.executor.with_hooks(hooks);
        self
    }

    pub fn with_rag_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.executor = self.executor.with_rag_prefix(prefix);
        self
    }

    pub fn id(&self) -> &ModelId {
        self.executor.model()
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Ask and wait on a private runtime. Errors when called from inside
    /// an async context.
    pub fn ask(&self, input: impl Into<PromptInput>) -> Result<ModelResponse> {
        run_blocking(self.ask_async(input.into()))
    }

    /// Ask without blocking the thread.
    pub async fn ask_async(&self, input: impl Into<PromptInput>) -> Result<ModelResponse> {
        let input = input.into();
        let raw = self.executor.execute_async(&input, None).await?;
        process_response(&input.to_string(), self.executor.model(), &raw)
    }

    /// Ask with a streaming response: one head announcing the model, a
    /// chunk per content delta, then a tail carrying the accumulated
    /// response and usage. A dispatch failure surfaces here as an error
    /// and produces no events.
    pub async fn ask_stream(&self, input: impl Into<PromptInput>) -> Result<EventStream> {
        let input = input.into();
        let chunks = self.executor.execute_stream(&input, None).await?;
        Ok(stage_events(
            self.executor.model().clone(),
            input.to_string(),
            chunks,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::StreamEvent;
    use crate::rag::RagContext;
    use crate::test_support::{ScriptedTransport, StaticRetriever};
    use chorus_llm::{ChunkChoice, ChunkDelta, RawChunk, TokenUsage, TransportError};
    use futures_util::StreamExt;
    use rust_decimal::Decimal;

    fn usage(prompt: u64, completion: u64, total: u64) -> TokenUsage {
        TokenUsage {
            prompt_tokens: prompt,
            completion_tokens: completion,
            total_tokens: total,
        }
    }

    fn delta_chunk(content: &str) -> RawChunk {
        RawChunk {
            choices: vec![ChunkChoice {
                delta: ChunkDelta {
                    content: Some(content.to_string()),
                },
            }],
            usage: None,
            cost: None,
        }
    }

    fn terminal_chunk(cost: Option<&str>) -> RawChunk {
        RawChunk {
            choices: Vec::new(),
            usage: Some(usage(7, 3, 10)),
            cost: cost.map(|c| c.parse().unwrap()),
        }
    }

    #[tokio::test]
    async fn ask_async_returns_a_normalized_response() {
        let transport = Arc::new(ScriptedTransport::new());
        let model = Model::new("openai", "gpt-4o-mini", transport).unwrap();

        let response = model.ask_async("what is 2+2?").await.unwrap();
        assert_eq!(response.prompt, "what is 2+2?");
        assert_eq!(response.response, "answer from openai/gpt-4o-mini");
        assert_eq!(response.model.routing_id(), "openai/gpt-4o-mini");
        assert_eq!(response.usage.total_tokens, 3);
    }

    #[tokio::test]
    async fn echoed_prompt_is_the_original_not_the_augmented_form() {
        let transport = Arc::new(ScriptedTransport::new());
        let retriever = Arc::new(StaticRetriever {
            context: RagContext {
                groups: vec![vec!["doc".to_string()]],
            },
        });
        let model = Model::new("openai", "gpt-4o-mini", transport.clone())
            .unwrap()
            .with_retriever(retriever)
            .with_rag_prefix("<ctx>");

        let response = model.ask_async("q").await.unwrap();
        assert_eq!(response.prompt, "q");

        let sent = transport.requests.lock().unwrap();
        assert_eq!(sent[0].messages[0].content, "q<ctx>doc");
    }

    #[tokio::test]
    async fn streams_stage_head_chunks_then_tail() {
        let transport = ScriptedTransport::new().with_stream(vec![
            Ok(delta_chunk("Par")),
            Ok(delta_chunk("is")),
            Ok(terminal_chunk(Some("0.000000015"))),
        ]);
        let model = Model::new("openai", "gpt-4o-mini", Arc::new(transport)).unwrap();

        let events: Vec<_> = model
            .ask_stream("capital of France?")
            .await
            .unwrap()
            .collect()
            .await;
        let events: Vec<_> = events.into_iter().map(Result::unwrap).collect();

        assert_eq!(events.len(), 4);
        assert!(matches!(&events[0], StreamEvent::Head { model } if model.name() == "gpt-4o-mini"));
        assert!(matches!(&events[1], StreamEvent::Chunk { delta } if delta == "Par"));
        assert!(matches!(&events[2], StreamEvent::Chunk { delta } if delta == "is"));
        match &events[3] {
            StreamEvent::Tail {
                prompt,
                response,
                usage,
                ..
            } => {
                assert_eq!(prompt, "capital of France?");
                assert_eq!(response, "Paris");
                assert_eq!(usage.total_tokens, 10);
                assert_eq!(
                    usage.cost,
                    Some("0.00000002".parse::<Decimal>().unwrap())
                );
            }
            other => panic!("expected tail, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn terminal_chunk_without_cost_yields_a_costless_tail() {
        let transport = ScriptedTransport::new()
            .with_stream(vec![Ok(delta_chunk("hi")), Ok(terminal_chunk(None))]);
        let model = Model::new("openai", "gpt-4o-mini", Arc::new(transport)).unwrap();

        let events: Vec<_> = model.ask_stream("q").await.unwrap().collect().await;
        let last = events.last().unwrap().as_ref().unwrap();
        assert!(matches!(last, StreamEvent::Tail { usage, .. } if usage.cost.is_none()));
    }

    #[tokio::test]
    async fn dispatch_failure_yields_an_error_and_no_events() {
        let transport = ScriptedTransport::new().failing_for("openai/down");
        let model = Model::new("openai", "down", Arc::new(transport)).unwrap();

        let err = match model.ask_stream("q").await {
            Err(e) => e,
            Ok(_) => panic!("expected error"),
        };
        assert!(matches!(
            err,
            crate::error::EngineError::Transport(TransportError::RateLimited(_))
        ));
    }

    #[test]
    fn blocking_ask_works_outside_a_runtime() {
        let transport = Arc::new(ScriptedTransport::new());
        let model = Model::new("openai", "gpt-4o-mini", transport).unwrap();
        let response = model.ask("ping").unwrap();
        assert_eq!(response.response, "answer from openai/gpt-4o-mini");
    }
}
