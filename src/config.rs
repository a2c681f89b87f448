//! Configuration management for the processor.
//!
//! Settings come from built-in defaults, an optional TOML file, and then
//! environment variables, in that order of increasing priority.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::civitai::CivitaiConfig;
use crate::llm::LlmConfig;

/// Top-level settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub civitai: CivitaiConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

impl Settings {
    /// Parse settings from TOML text without touching the environment.
    pub fn from_toml(content: &str) -> Result<Self> {
        let settings: Settings =
            toml::from_str(content).context("Failed to parse config file")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Apply environment overrides to every section.
    pub fn with_env_overrides(self) -> Self {
        Self {
            civitai: self.civitai.with_env_overrides(),
            llm: self.llm.with_env_overrides(),
        }
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.civitai.timeout_secs == 0 {
            bail!("civitai.timeout_secs must be > 0");
        }
        if self.llm.timeout_secs == 0 {
            bail!("llm.timeout_secs must be > 0");
        }
        if self.llm.max_tokens == 0 {
            bail!("llm.max_tokens must be > 0");
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            bail!("llm.temperature must be in [0.0, 2.0]");
        }
        Ok(())
    }
}

/// Load settings from an optional TOML file, then apply env overrides.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let settings = match path {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Settings::from_toml(&content)?
        }
        None => Settings::default(),
    };

    let settings = settings.with_env_overrides();
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_partial_toml() {
        let settings = Settings::from_toml(
            r#"
[civitai]
api_key = "secret"

[llm]
model = "meta-llama/llama-3.1-70b-instruct"
temperature = 0.5
"#,
        )
        .unwrap();

        assert_eq!(settings.civitai.api_key.as_deref(), Some("secret"));
        assert_eq!(settings.civitai.timeout_secs, 30);
        assert_eq!(settings.llm.model, "meta-llama/llama-3.1-70b-instruct");
        assert_eq!(settings.llm.max_tokens, 2048);
    }

    #[test]
    fn test_validation() {
        assert!(Settings::from_toml("[llm]\ntemperature = 3.0").is_err());
        assert!(Settings::from_toml("[civitai]\ntimeout_secs = 0").is_err());
        assert!(Settings::from_toml("[llm]\nmax_tokens = 0").is_err());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(Settings::from_toml("[civitai\n").is_err());
    }
}
