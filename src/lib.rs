//! Civitai model annotation node.
//!
//! Resolves a user-supplied Civitai reference (link, model id or AIR
//! identifier) to a concrete model version, fetches its metadata, and asks a
//! chat-completion model for structured character and outfit annotations.
//!
//! The [`processor::Processor`] is the single entry point a pipeline host
//! calls. It always returns six strings and never fails.

pub mod civitai;
pub mod cli;
pub mod config;
pub mod llm;
pub mod processor;
pub mod utils;

pub use civitai::{parse_identifier, IdentifierPair, MetadataBundle};
pub use config::{load_settings, Settings};
pub use processor::{NodeInputs, NodeOutputs, Processor};
