//! Transport boundary for Chorus.
//!
//! Wire-level request and response shapes plus the capability trait every
//! provider call goes through. This crate knows nothing about prompt
//! construction or fan-out; it is the single seam between the engine and
//! whatever actually speaks a vendor's protocol.

mod error;
mod transport;
mod types;

pub use error::{Result, TransportError};
pub use transport::{ChunkStream, Transport};
pub use types::{
    ChunkChoice, ChunkDelta, CompletionRequest, Message, Metadata, RawChunk, RawCompletion,
    ResponseChoice, ResponseFormat, Role, TokenUsage, ToolDescriptor,
};
