use thiserror::Error;

pub type Result<T> = std::result::Result<T, TransportError>;

/// Failure raised by the provider call. The engine propagates these
/// verbatim; nothing is retried or translated above this boundary.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("authentication rejected: {0}")]
    Auth(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("http error: {0}")]
    Http(String),

    #[error("unexpected response format: {0}")]
    ResponseFormat(String),

    #[error("stream parse error: {0}")]
    StreamParse(String),
}

impl From<serde_json::Error> for TransportError {
    fn from(e: serde_json::Error) -> Self {
        Self::ResponseFormat(e.to_string())
    }
}
