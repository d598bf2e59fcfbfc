//! Generative backend client, prompt composition, and output repair.

use thiserror::Error;

use crate::error::ApiError;

pub mod client;
pub mod compose;
pub mod embeddings;

pub use client::{ChatMessage, LlmClient};

/// Generation failures come in two kinds and callers must be able to tell
/// them apart: `Call` means the backend was unreachable or errored (retry
/// the call), `Parse` means the model replied with content that could not
/// be parsed even after fallback extraction (retry with a stricter prompt).
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation call failed: {0}")]
    Call(String),
    #[error("model output could not be parsed as structured data")]
    Parse,
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Call(msg) => ApiError::GenerationCall(msg),
            GenerationError::Parse => ApiError::GenerationParse,
        }
    }
}
