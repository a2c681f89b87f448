//! LLM integration for model annotation.
//!
//! Sends resolved model metadata to a chat-completion service and recovers
//! character and outfit fields from its reply.

mod client;
mod extract;

use thiserror::Error;

pub use client::{Annotation, LlmClient, LlmConfig, DEFAULT_SYSTEM_PROMPT, SECTION_RULE};
pub use extract::extract_json_object;

/// Errors that can occur during annotation.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Failed to reach the service
    #[error("Request error: {0}")]
    Connection(String),

    /// The service answered with a non-success status
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The body was not a chat completion with at least one choice
    #[error("Unexpected API response")]
    UnexpectedResponse { raw: String },

    /// The reply held no brace-delimited text
    #[error("LLM response does not contain valid JSON")]
    NoJson { raw: String },

    /// The brace-delimited text did not parse
    #[error("Failed to decode JSON from response: {reason}")]
    InvalidJson { reason: String, raw: String },
}

impl LlmError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            LlmError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// What the service or model actually sent, kept for diagnostics.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            LlmError::UnexpectedResponse { raw }
            | LlmError::NoJson { raw }
            | LlmError::InvalidJson { raw, .. } => Some(raw),
            LlmError::Api { body, .. } => Some(body),
            LlmError::Connection(_) => None,
        }
    }
}
