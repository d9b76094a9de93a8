//! Shared test doubles.

use crate::error::Result;
use crate::rag::{RagContext, Retriever};
use async_trait::async_trait;
use chorus_llm::{
    ChunkStream, CompletionRequest, Message, RawChunk, RawCompletion, ResponseChoice, Role,
    TokenUsage, Transport, TransportError,
};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

/// Transport double: answers `"answer from {routing id}"`, records every
/// request, and can be scripted with per-model delays, per-model
/// failures, and a one-shot chunk sequence for streaming calls.
pub(crate) struct ScriptedTransport {
    pub requests: Mutex<Vec<CompletionRequest>>,
    delays_ms: HashMap<String, u64>,
    failing: HashSet<String>,
    usage: TokenUsage,
    stream_script: Mutex<Vec<chorus_llm::Result<RawChunk>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            delays_ms: HashMap::new(),
            failing: HashSet::new(),
            usage: TokenUsage {
                prompt_tokens: 1,
                completion_tokens: 2,
                total_tokens: 3,
            },
            stream_script: Mutex::new(Vec::new()),
        }
    }

    pub fn delayed(mut self, routing_id: &str, millis: u64) -> Self {
        self.delays_ms.insert(routing_id.to_string(), millis);
        self
    }

    pub fn failing_for(mut self, routing_id: &str) -> Self {
        self.failing.insert(routing_id.to_string());
        self
    }

    /// Chunks handed out by the next streaming call. Consumed once, like
    /// the real thing.
    pub fn with_stream(self, chunks: Vec<chorus_llm::Result<RawChunk>>) -> Self {
        *self.stream_script.lock().unwrap() = chunks;
        self
    }

    async fn admit(&self, request: &CompletionRequest) -> chorus_llm::Result<()> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(millis) = self.delays_ms.get(&request.model) {
            tokio::time::sleep(Duration::from_millis(*millis)).await;
        }
        if self.failing.contains(&request.model) {
            return Err(TransportError::RateLimited(format!(
                "{} over quota",
                request.model
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn complete(&self, request: &CompletionRequest) -> chorus_llm::Result<RawCompletion> {
        self.admit(request).await?;
        Ok(RawCompletion {
            choices: vec![ResponseChoice {
                message: Message {
                    role: Role::Assistant,
                    content: format!("answer from {}", request.model),
                },
            }],
            usage: self.usage.clone(),
            cost: None,
        })
    }

    async fn complete_stream(&self, request: &CompletionRequest) -> chorus_llm::Result<ChunkStream> {
        self.admit(request).await?;
        let chunks = std::mem::take(&mut *self.stream_script.lock().unwrap());
        Ok(Box::pin(futures_util::stream::iter(chunks)))
    }
}

/// Retriever double returning a fixed context.
pub(crate) struct StaticRetriever {
    pub context: RagContext,
}

#[async_trait]
impl Retriever for StaticRetriever {
    async fn query(&self, _prompt: &str) -> Result<RagContext> {
        Ok(self.context.clone())
    }
}
