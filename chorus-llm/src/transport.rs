use crate::error::Result;
use crate::types::{CompletionRequest, RawChunk, RawCompletion};
use async_trait::async_trait;
use futures_util::Stream;
use std::pin::Pin;

/// Lazy, ordered, finite sequence of raw streaming chunks. Not
/// restartable; a second pass requires a new call.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<RawChunk>> + Send>>;

/// The single abstraction point for every upstream provider and
/// self-hosted endpoint. Implementations own authentication, timeouts,
/// and the vendor wire protocol; callers inherit whatever the
/// implementation enforces.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<RawCompletion>;

    async fn complete_stream(&self, request: &CompletionRequest) -> Result<ChunkStream>;
}
