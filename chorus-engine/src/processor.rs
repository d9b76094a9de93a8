//! Pure conversion of raw transport output into the stable response
//! shapes. No side effects and no state held across calls.

use crate::error::Result;
use crate::id::ModelId;
use chorus_llm::{ChunkStream, RawChunk, RawCompletion, TransportError};
use futures_util::{Stream, StreamExt};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// Fractional digits kept on reported costs.
const COST_SCALE: u32 = 8;

/// Token counts and derived cost for one model call. Counts are the
/// transport's own numbers, passed through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelUsage {
    pub completion_tokens: u64,
    pub prompt_tokens: u64,
    pub total_tokens: u64,
    pub cost: Option<Decimal>,
}

/// Terminal value of a non-streaming call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    /// The caller's original prompt text, echoed.
    pub prompt: String,
    pub response: String,
    pub model: ModelId,
    pub usage: ModelUsage,
}

/// One stage of a streaming call. A successful stream is exactly one
/// `Head`, zero or more `Chunk`s, then exactly one `Tail`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StreamEvent {
    /// Announces the responding model before any content is available.
    Head { model: ModelId },
    /// One increment of response text.
    Chunk { delta: String },
    /// Final summary: echoed prompt, accumulated response, and usage.
    Tail {
        prompt: String,
        response: String,
        model: ModelId,
        usage: ModelUsage,
    },
}

pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// Half-up to eight fractional digits, in exact decimal arithmetic.
fn round_cost(cost: Decimal) -> Decimal {
    cost.round_dp_with_strategy(COST_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

fn usage_from(raw: &chorus_llm::TokenUsage, cost: Option<Decimal>) -> ModelUsage {
    ModelUsage {
        completion_tokens: raw.completion_tokens,
        prompt_tokens: raw.prompt_tokens,
        total_tokens: raw.total_tokens,
        cost: cost.map(round_cost),
    }
}

/// Normalize a completed transport response.
pub fn process_response(
    prompt: &str,
    model: &ModelId,
    raw: &RawCompletion,
) -> Result<ModelResponse> {
    let choice = raw
        .choices
        .first()
        .ok_or_else(|| TransportError::ResponseFormat("completion missing choices".to_string()))?;

    Ok(ModelResponse {
        prompt: prompt.to_string(),
        response: choice.message.content.clone(),
        model: model.clone(),
        usage: usage_from(&raw.usage, raw.cost),
    })
}

/// Content delta of one raw chunk, when it carries any.
fn chunk_delta(chunk: &RawChunk) -> Option<String> {
    chunk
        .choices
        .first()
        .and_then(|choice| choice.delta.content.clone())
        .filter(|content| !content.is_empty())
}

fn process_tail(
    prompt: &str,
    response: String,
    model: &ModelId,
    chunk: &RawChunk,
) -> Result<StreamEvent> {
    let usage = chunk.usage.as_ref().ok_or_else(|| {
        TransportError::ResponseFormat("terminal chunk missing usage".to_string())
    })?;
    Ok(StreamEvent::Tail {
        prompt: prompt.to_string(),
        response,
        model: model.clone(),
        usage: usage_from(usage, chunk.cost),
    })
}

enum Stage {
    Head,
    Body,
    Done,
}

struct StageState {
    model: ModelId,
    prompt: String,
    chunks: ChunkStream,
    accumulated: String,
    stage: Stage,
}

/// Drive a raw chunk sequence through the head/chunk/tail protocol:
/// exactly one head first, one tail on the usage-bearing terminal chunk,
/// content deltas in between, nothing after the tail. A chunk-level
/// transport error is yielded once and ends the sequence.
pub fn stage_events(model: ModelId, prompt: String, chunks: ChunkStream) -> EventStream {
    let state = StageState {
        model,
        prompt,
        chunks,
        accumulated: String::new(),
        stage: Stage::Head,
    };

    Box::pin(futures_util::stream::unfold(state, |mut state| async move {
        match state.stage {
            Stage::Head => {
                state.stage = Stage::Body;
                let head = StreamEvent::Head {
                    model: state.model.clone(),
                };
                Some((Ok(head), state))
            }
            Stage::Body => loop {
                match state.chunks.next().await {
                    Some(Ok(chunk)) => {
                        let delta = chunk_delta(&chunk);
                        if chunk.usage.is_some() {
                            if let Some(delta) = delta {
                                state.accumulated.push_str(&delta);
                            }
                            state.stage = Stage::Done;
                            let response = std::mem::take(&mut state.accumulated);
                            let tail =
                                process_tail(&state.prompt, response, &state.model, &chunk);
                            return Some((tail, state));
                        }
                        let Some(delta) = delta else {
                            continue;
                        };
                        state.accumulated.push_str(&delta);
                        return Some((Ok(StreamEvent::Chunk { delta }), state));
                    }
                    Some(Err(e)) => {
                        state.stage = Stage::Done;
                        return Some((Err(e.into()), state));
                    }
                    None => return None,
                }
            },
            Stage::Done => None,
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chorus_llm::{Message, ResponseChoice, Role, TokenUsage};

    fn model() -> ModelId {
        ModelId::new("openai", "gpt-4o-mini").unwrap()
    }

    fn completion(content: &str, usage: TokenUsage, cost: Option<&str>) -> RawCompletion {
        RawCompletion {
            choices: vec![ResponseChoice {
                message: Message {
                    role: Role::Assistant,
                    content: content.to_string(),
                },
            }],
            usage,
            cost: cost.map(|c| c.parse().unwrap()),
        }
    }

    #[test]
    fn cost_rounds_half_up_to_eight_digits() {
        let raw = completion(
            "4",
            TokenUsage {
                prompt_tokens: 3,
                completion_tokens: 1,
                total_tokens: 4,
            },
            Some("0.123456785"),
        );
        let normalized = process_response("2+2=", &model(), &raw).unwrap();
        assert_eq!(
            normalized.usage.cost,
            Some("0.12345679".parse::<Decimal>().unwrap())
        );
    }

    #[test]
    fn reported_totals_pass_through_even_when_inconsistent() {
        let raw = completion(
            "ok",
            TokenUsage {
                prompt_tokens: 1,
                completion_tokens: 2,
                total_tokens: 999,
            },
            None,
        );
        let normalized = process_response("p", &model(), &raw).unwrap();
        assert_eq!(normalized.usage.total_tokens, 999);
        assert_eq!(normalized.usage.prompt_tokens, 1);
        assert_eq!(normalized.usage.completion_tokens, 2);
        assert_eq!(normalized.usage.cost, None);
    }

    #[test]
    fn prompt_is_echoed_and_first_choice_extracted() {
        let raw = completion(
            "Paris",
            TokenUsage {
                prompt_tokens: 5,
                completion_tokens: 1,
                total_tokens: 6,
            },
            None,
        );
        let normalized = process_response("capital of France?", &model(), &raw).unwrap();
        assert_eq!(normalized.prompt, "capital of France?");
        assert_eq!(normalized.response, "Paris");
        assert_eq!(normalized.model, model());
    }

    #[test]
    fn missing_choices_surface_as_a_format_error() {
        let raw = RawCompletion {
            choices: Vec::new(),
            usage: TokenUsage {
                prompt_tokens: 0,
                completion_tokens: 0,
                total_tokens: 0,
            },
            cost: None,
        };
        let err = process_response("p", &model(), &raw).unwrap_err();
        assert!(matches!(
            err,
            crate::error::EngineError::Transport(TransportError::ResponseFormat(_))
        ));
    }
}
