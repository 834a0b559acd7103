//! Error types for event publication.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublishError {
    /// The event could not be encoded.
    #[error("event serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The broker refused the message outright.
    #[error("broker rejected message on {topic}: {reason}")]
    Rejected { topic: String, reason: String },

    /// Every attempt failed or timed out.
    #[error("publish to {topic} failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        topic: String,
        attempts: u32,
        last_error: String,
    },
}
