//! LLM client for character and outfit annotation.
//!
//! Talks to an OpenAI-compatible chat-completions endpoint (OpenRouter by
//! default) and recovers a JSON object from the reply.

mod config;
mod prompts;

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

pub use config::LlmConfig;
pub use prompts::{DEFAULT_SYSTEM_PROMPT, SECTION_RULE};

use super::extract::extract_json_object;
use super::LlmError;
use crate::utils::describe_request_error;

/// Structured annotation returned by the model.
///
/// Keys the model left out read as empty strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotation {
    fields: Map<String, Value>,
}

impl Annotation {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Text of a key. Non-string values are rendered as JSON.
    pub fn field(&self, key: &str) -> String {
        match self.fields.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    pub fn character_name(&self) -> String {
        self.field("character_name")
    }

    pub fn character_description(&self) -> String {
        self.field("character_description")
    }

    pub fn s1(&self) -> String {
        self.field("s1")
    }

    pub fn s2(&self) -> String {
        self.field("s2")
    }

    pub fn s3(&self) -> String {
        self.field("s3")
    }
}

/// Chat-completion client. Immutable after construction.
pub struct LlmClient {
    config: LlmConfig,
    client: Client,
}

/// Chat-completions request format.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Chat-completions response format.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl LlmClient {
    /// Create a new LLM client with the given configuration.
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Ask the model to annotate `user_content` and parse its JSON reply.
    pub async fn annotate(
        &self,
        system_prompt: &str,
        user_content: &str,
        token: &str,
    ) -> Result<Annotation, LlmError> {
        info!("Requesting annotation from {}", self.config.model);
        let content = self.complete(system_prompt, user_content, token).await?;
        debug!("Model replied with {} chars", content.len());

        extract_json_object(&content).map(Annotation::new)
    }

    /// Send one system + user exchange and return the first choice's text.
    async fn complete(
        &self,
        system_prompt: &str,
        user_content: &str,
        token: &str,
    ) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_content,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let url = self.config.completions_url();
        let resp = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .header(CONTENT_TYPE, "application/json")
            .header("HTTP-Referer", &self.config.referer)
            .header("X-Title", &self.config.title)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("LLM request failed: {} (URL: {})", e, url);
                LlmError::Connection(describe_request_error(&e))
            })?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| LlmError::Connection(describe_request_error(&e)))?;

        if !status.is_success() {
            warn!("LLM API error: HTTP {}", status);
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) => return Err(LlmError::UnexpectedResponse { raw: body }),
        };

        match parsed.choices.into_iter().next() {
            Some(ChatChoice {
                message:
                    ChatResponseMessage {
                        content: Some(content),
                    },
            }) => Ok(content),
            _ => Err(LlmError::UnexpectedResponse { raw: body }),
        }
    }
}
