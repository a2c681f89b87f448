//! Best-effort JSON recovery from free-form model output.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use super::LlmError;

/// First `{` to the last `}`, across newlines.
static OBJECT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("object regex should compile"));

/// Pull the JSON object out of a model reply.
///
/// Text around the object is ignored. Output holding several separate
/// objects is taken as one span from the first brace to the last and will
/// usually fail to parse.
pub fn extract_json_object(content: &str) -> Result<Map<String, Value>, LlmError> {
    let span = OBJECT_PATTERN
        .find(content)
        .ok_or_else(|| LlmError::NoJson {
            raw: content.to_string(),
        })?;

    match serde_json::from_str::<Value>(span.as_str()) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(LlmError::InvalidJson {
            reason: format!("expected an object, got {}", other),
            raw: content.to_string(),
        }),
        Err(e) => Err(LlmError::InvalidJson {
            reason: e.to_string(),
            raw: content.to_string(),
        }),
    }
}
