//! Civitai integration: reference parsing, API access and metadata resolution.

mod client;
mod config;
mod identifier;
mod models;
mod resolver;

use thiserror::Error;

pub use client::{CivitaiClient, ModelCatalog};
pub use config::CivitaiConfig;
pub use identifier::{parse_identifier, IdentifierPair};
pub use models::{
    air_id, MetadataBundle, ModelRecord, VersionRecord, VersionSummary, MISSING_DESCRIPTION,
    MISSING_NAME,
};
pub use resolver::{MetadataResolver, ResolveError};

/// Errors from a single Civitai API request.
#[derive(Debug, Error)]
pub enum CivitaiError {
    /// Connection, DNS, TLS or timeout failure
    #[error("Civitai request error: {0}")]
    Connection(String),

    /// The API answered with a non-success status
    #[error("Civitai API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The body was not the expected JSON
    #[error("Failed to parse Civitai response: {0}")]
    Parse(String),
}

impl CivitaiError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            CivitaiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
