//! The host-facing processing node.
//!
//! A node takes four named string inputs and always produces six named
//! string outputs. Failures are never raised to the host: the error text is
//! written into every output slot instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::civitai::{CivitaiClient, MetadataBundle, MetadataResolver, ModelCatalog, ResolveError};
use crate::config::Settings;
use crate::llm::{Annotation, LlmClient, LlmError, DEFAULT_SYSTEM_PROMPT, SECTION_RULE};

/// Node class name registered with the host.
pub const NODE_CLASS: &str = "CivitAIInfoProcessor";

/// Name shown in the host's node picker.
pub const DISPLAY_NAME: &str = "Packreator Processor";

/// Host menu category.
pub const CATEGORY: &str = "CivitAI";

/// Output socket names, in output order.
pub const RETURN_NAMES: [&str; 6] = [
    "lora_air_id",
    "character_name",
    "character_description",
    "s1_outfits",
    "s2_outfit",
    "s3_outfit",
];

/// Host-facing description of the node: inputs, outputs and placement.
pub fn node_descriptor() -> serde_json::Value {
    serde_json::json!({
        "class": NODE_CLASS,
        "display_name": DISPLAY_NAME,
        "category": CATEGORY,
        "inputs": {
            "required": {
                "link_or_id": {
                    "type": "STRING",
                    "multiline": true,
                    "default": "",
                    "placeholder": "Paste a CivitAI link, model ID or AIR ID here..."
                },
                "openrouter_token": {
                    "type": "STRING",
                    "multiline": false,
                    "default": "",
                    "placeholder": "Your OpenRouter API token..."
                }
            },
            "optional": {
                "additional_info": {
                    "type": "STRING",
                    "multiline": true,
                    "default": "",
                    "placeholder": "Additional information about the LORA or run (optional)..."
                },
                "system_prompt": {
                    "type": "STRING",
                    "multiline": true,
                    "default": "",
                    "placeholder": "Your custom system prompt..."
                }
            }
        },
        "return_types": vec!["STRING"; 6],
        "return_names": RETURN_NAMES,
    })
}

/// Inputs supplied by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInputs {
    /// Civitai link, model id or AIR identifier
    pub link_or_id: String,
    /// Bearer token for the completion service
    pub openrouter_token: String,
    /// Extra context passed to the model
    #[serde(default)]
    pub additional_info: String,
    /// Replaces the built-in prompt when not blank
    #[serde(default)]
    pub system_prompt: String,
}

impl NodeInputs {
    pub fn new(link_or_id: impl Into<String>, openrouter_token: impl Into<String>) -> Self {
        Self {
            link_or_id: link_or_id.into(),
            openrouter_token: openrouter_token.into(),
            ..Default::default()
        }
    }

    pub fn with_additional_info(mut self, info: impl Into<String>) -> Self {
        self.additional_info = info.into();
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }
}

/// The six node outputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NodeOutputs {
    pub lora_air_id: String,
    pub character_name: String,
    pub character_description: String,
    pub s1_outfits: String,
    pub s2_outfit: String,
    pub s3_outfit: String,
}

impl NodeOutputs {
    /// Every slot carries the same message.
    pub fn degraded(message: &str) -> Self {
        Self {
            lora_air_id: message.to_string(),
            character_name: message.to_string(),
            character_description: message.to_string(),
            s1_outfits: message.to_string(),
            s2_outfit: message.to_string(),
            s3_outfit: message.to_string(),
        }
    }

    fn from_annotation(air_id: String, annotation: &Annotation) -> Self {
        Self {
            lora_air_id: air_id,
            character_name: annotation.character_name(),
            character_description: annotation.character_description(),
            s1_outfits: annotation.s1(),
            s2_outfit: annotation.s2(),
            s3_outfit: annotation.s3(),
        }
    }

    /// Outputs in socket order.
    pub fn into_array(self) -> [String; 6] {
        [
            self.lora_air_id,
            self.character_name,
            self.character_description,
            self.s1_outfits,
            self.s2_outfit,
            self.s3_outfit,
        ]
    }

    /// True when all six slots hold the same text, as after a failure.
    pub fn is_uniform(&self) -> bool {
        let first = &self.lora_air_id;
        [
            &self.character_name,
            &self.character_description,
            &self.s1_outfits,
            &self.s2_outfit,
            &self.s3_outfit,
        ]
        .iter()
        .all(|s| *s == first)
    }
}

/// Failure of one node invocation.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("{0}")]
    Resolve(#[from] ResolveError),

    #[error("LLM error: {0}")]
    Annotate(#[from] LlmError),

    #[error("Failed to start processing: {0}")]
    Runtime(String),
}

/// Resolves a Civitai reference and annotates it.
pub struct Processor<C = CivitaiClient> {
    resolver: MetadataResolver<C>,
    llm: LlmClient,
}

impl Processor<CivitaiClient> {
    /// Build a processor talking to the configured endpoints.
    pub fn from_settings(settings: &Settings) -> Result<Self, ProcessError> {
        let catalog = CivitaiClient::new(settings.civitai.clone())
            .map_err(|e| ProcessError::Runtime(e.to_string()))?;
        let llm = LlmClient::new(settings.llm.clone())?;
        Ok(Self::new(catalog, llm))
    }
}

impl<C: ModelCatalog> Processor<C> {
    pub fn new(catalog: C, llm: LlmClient) -> Self {
        Self {
            resolver: MetadataResolver::new(catalog),
            llm,
        }
    }

    /// Run the node. Never fails; errors are written into every output.
    pub async fn process(&self, inputs: &NodeInputs) -> NodeOutputs {
        match self.try_process(inputs).await {
            Ok(outputs) => outputs,
            Err(e) => {
                warn!("Processing failed: {}", e);
                NodeOutputs::degraded(&e.to_string())
            }
        }
    }

    /// Run the node from synchronous code.
    ///
    /// Uses a private current-thread runtime, so it must not be called from
    /// inside another tokio runtime; doing so degrades instead of blocking.
    pub fn process_blocking(&self, inputs: &NodeInputs) -> NodeOutputs {
        if tokio::runtime::Handle::try_current().is_ok() {
            let err = ProcessError::Runtime(
                "process_blocking called from within an async runtime".to_string(),
            );
            return NodeOutputs::degraded(&err.to_string());
        }

        match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime.block_on(self.process(inputs)),
            Err(e) => NodeOutputs::degraded(&ProcessError::Runtime(e.to_string()).to_string()),
        }
    }

    /// Run the node, keeping the typed error.
    pub async fn try_process(&self, inputs: &NodeInputs) -> Result<NodeOutputs, ProcessError> {
        let bundle = self.resolver.resolve(&inputs.link_or_id).await?;

        let user_content = compose_user_content(&bundle, &inputs.additional_info);
        let system_prompt = if inputs.system_prompt.trim().is_empty() {
            DEFAULT_SYSTEM_PROMPT
        } else {
            inputs.system_prompt.as_str()
        };

        let annotation = self
            .llm
            .annotate(system_prompt, &user_content, &inputs.openrouter_token)
            .await?;

        info!("Annotated {}", bundle.air_id);
        Ok(NodeOutputs::from_annotation(bundle.air_id, &annotation))
    }
}

/// Build the user message sent to the model.
pub fn compose_user_content(bundle: &MetadataBundle, additional_info: &str) -> String {
    let trigger_words = bundle
        .trained_words
        .iter()
        .map(|word| format!("- {}", word))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "USER INFO: {info}\n\
         Model: {model}\n\
         Version: {version}\n\
         AIR ID: civitai:{air}\n\
         {rule}\n\
         Description:\n\
         {description}\n\
         {rule}\n\
         Trigger Words:\n\
         {words}",
        info = additional_info,
        model = bundle.model_name,
        version = bundle.version_name,
        air = bundle.air_id,
        rule = SECTION_RULE,
        description = bundle.description,
        words = trigger_words,
    )
}
