//! Civitai API records and the resolved metadata bundle.

use serde::{Deserialize, Deserializer, Serialize};

/// Shown when the platform omits a name.
pub const MISSING_NAME: &str = "N/A";

/// Shown when a model has no description.
pub const MISSING_DESCRIPTION: &str = "No description provided.";

/// `GET /models/{id}` response, reduced to the fields we use.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRecord {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    /// HTML description.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub model_versions: Vec<VersionSummary>,
}

/// Entry of a model's `modelVersions` list.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VersionSummary {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
}

/// `GET /model-versions/{id}` response, reduced to the fields we use.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model_id: Option<u64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub trained_words: Vec<String>,
}

impl ModelRecord {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(MISSING_NAME)
    }
}

impl VersionRecord {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(MISSING_NAME)
    }
}

/// Fully resolved model version metadata. Both ids are always known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataBundle {
    pub model_name: String,
    pub version_name: String,
    pub model_id: u64,
    pub version_id: u64,
    /// `<model_id>@<version_id>`
    pub air_id: String,
    /// Plain-text description with HTML removed.
    pub description: String,
    pub trained_words: Vec<String>,
}

/// The API sends `null` for some empty lists.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Format the compound identifier for a model version.
pub fn air_id(model_id: u64, version_id: u64) -> String {
    format!("{}@{}", model_id, version_id)
}
