use crate::id::ModelId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Provider-call failure, passed through verbatim.
    #[error(transparent)]
    Transport(#[from] chorus_llm::TransportError),

    /// Missing or invalid identity, endpoint, tool shape, or config file.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// One model task failed, aborting the whole fan-out. Completed
    /// sibling results are discarded.
    #[error("fan-out aborted by {model}: {source}")]
    FanOut {
        model: String,
        #[source]
        source: Box<EngineError>,
    },

    #[error("blocking entrypoint called from within an async context")]
    BlockingInAsync,
}

impl EngineError {
    pub(crate) fn fan_out(model: &ModelId, source: EngineError) -> Self {
        Self::FanOut {
            model: model.routing_id(),
            source: Box::new(source),
        }
    }
}
