//! Turns partial user input into a complete [`MetadataBundle`].
//!
//! Input may name only a model or only a version. The two gaps are filled in
//! a fixed order:
//!
//! 1. version known, model unknown: the version record names its model
//! 2. model known, version unknown: the first entry of the model's version
//!    list is used, in the order the platform returns it
//!
//! The second step needs the model record, so it can only run once the first
//! has produced a model id.

use thiserror::Error;
use tracing::{debug, info};

use super::client::ModelCatalog;
use super::identifier::parse_identifier;
use super::models::{air_id, MetadataBundle, MISSING_DESCRIPTION};
use super::CivitaiError;
use crate::utils::strip_tags;

/// Why a reference could not be resolved.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Could not extract a valid model or version ID from the input.")]
    NoIdentifier,

    #[error("Could not find the model for version ID {version_id}.")]
    ModelNotFoundForVersion {
        version_id: u64,
        #[source]
        source: Option<CivitaiError>,
    },

    #[error("Failed to fetch information for model ID {model_id}.")]
    ModelUnavailable {
        model_id: u64,
        #[source]
        source: Option<CivitaiError>,
    },

    #[error("The model has no versions listed.")]
    NoVersions,

    #[error("Could not find the ID of the latest version.")]
    LatestVersionMissingId,

    #[error("Failed to fetch information for version ID {version_id}.")]
    VersionUnavailable {
        version_id: u64,
        #[source]
        source: Option<CivitaiError>,
    },
}

impl ResolveError {
    /// HTTP status of the upstream failure, if there was one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ResolveError::ModelNotFoundForVersion { source, .. }
            | ResolveError::ModelUnavailable { source, .. }
            | ResolveError::VersionUnavailable { source, .. } => {
                source.as_ref().and_then(CivitaiError::status_code)
            }
            _ => None,
        }
    }
}

/// Resolves references against a [`ModelCatalog`].
pub struct MetadataResolver<C> {
    catalog: C,
}

impl<C: ModelCatalog> MetadataResolver<C> {
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Resolve a link, AIR identifier or id into full version metadata.
    pub async fn resolve(&self, input: &str) -> Result<MetadataBundle, ResolveError> {
        let ids = parse_identifier(input);
        debug!("Parsed Civitai reference: {}", ids);

        let (model_id, version_id) = match (ids.model_id, ids.version_id) {
            (None, None) => return Err(ResolveError::NoIdentifier),
            (Some(model_id), version_id) => (model_id, version_id),
            (None, Some(version_id)) => {
                let model_id = self.model_for_version(version_id).await?;
                (model_id, Some(version_id))
            }
        };

        let model = match self.catalog.fetch_model(model_id).await {
            Ok(Some(model)) => model,
            Ok(None) => {
                return Err(ResolveError::ModelUnavailable {
                    model_id,
                    source: None,
                })
            }
            Err(e) => {
                return Err(ResolveError::ModelUnavailable {
                    model_id,
                    source: Some(e),
                })
            }
        };

        let version_id = match version_id {
            Some(id) => id,
            None => {
                let latest = model
                    .model_versions
                    .first()
                    .ok_or(ResolveError::NoVersions)?;
                let id = latest.id.ok_or(ResolveError::LatestVersionMissingId)?;
                debug!("Model {} defaulting to first listed version {}", model_id, id);
                id
            }
        };

        let version = match self.catalog.fetch_version(version_id).await {
            Ok(Some(version)) => version,
            Ok(None) => {
                return Err(ResolveError::VersionUnavailable {
                    version_id,
                    source: None,
                })
            }
            Err(e) => {
                return Err(ResolveError::VersionUnavailable {
                    version_id,
                    source: Some(e),
                })
            }
        };

        let description = model
            .description
            .as_deref()
            .map(strip_tags)
            .unwrap_or_else(|| MISSING_DESCRIPTION.to_string());

        info!(
            "Resolved {}@{}: {} / {}",
            model_id,
            version_id,
            model.display_name(),
            version.display_name()
        );

        Ok(MetadataBundle {
            model_name: model.display_name().to_string(),
            version_name: version.display_name().to_string(),
            model_id,
            version_id,
            air_id: air_id(model_id, version_id),
            description,
            trained_words: version.trained_words,
        })
    }

    /// Look up which model a version belongs to.
    async fn model_for_version(&self, version_id: u64) -> Result<u64, ResolveError> {
        match self.catalog.fetch_version(version_id).await {
            Ok(Some(version)) => {
                version
                    .model_id
                    .ok_or(ResolveError::ModelNotFoundForVersion {
                        version_id,
                        source: None,
                    })
            }
            Ok(None) => Err(ResolveError::ModelNotFoundForVersion {
                version_id,
                source: None,
            }),
            Err(e) => Err(ResolveError::ModelNotFoundForVersion {
                version_id,
                source: Some(e),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::civitai::models::{ModelRecord, VersionRecord, VersionSummary};

    /// In-memory catalog that records every lookup.
    #[derive(Default)]
    struct FakeCatalog {
        models: HashMap<u64, ModelRecord>,
        versions: HashMap<u64, VersionRecord>,
        failing: bool,
        calls: Mutex<Vec<String>>,
    }

    impl FakeCatalog {
        fn with_model(mut self, id: u64, record: ModelRecord) -> Self {
            self.models.insert(id, record);
            self
        }

        fn with_version(mut self, id: u64, record: VersionRecord) -> Self {
            self.versions.insert(id, record);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ModelCatalog for FakeCatalog {
        async fn fetch_model(&self, model_id: u64) -> Result<Option<ModelRecord>, CivitaiError> {
            self.calls.lock().unwrap().push(format!("model:{}", model_id));
            if self.failing {
                return Err(CivitaiError::Api {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            Ok(self.models.get(&model_id).cloned())
        }

        async fn fetch_version(
            &self,
            version_id: u64,
        ) -> Result<Option<VersionRecord>, CivitaiError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("version:{}", version_id));
            if self.failing {
                return Err(CivitaiError::Connection("refused".to_string()));
            }
            Ok(self.versions.get(&version_id).cloned())
        }
    }

    fn model(name: &str, description: Option<&str>, versions: &[Option<u64>]) -> ModelRecord {
        ModelRecord {
            id: None,
            name: Some(name.to_string()),
            description: description.map(str::to_string),
            model_versions: versions
                .iter()
                .map(|id| VersionSummary { id: *id, name: None })
                .collect(),
        }
    }

    fn version(name: &str, model_id: Option<u64>, words: &[&str]) -> VersionRecord {
        VersionRecord {
            id: None,
            name: Some(name.to_string()),
            model_id,
            trained_words: words.iter().map(|w| w.to_string()).collect(),
        }
    }

    fn standard_catalog() -> FakeCatalog {
        FakeCatalog::default()
            .with_model(
                12345,
                model("Hero", Some("<p>Hello <b>world</b></p>"), &[Some(67890), Some(11111)]),
            )
            .with_version(67890, version("v2", Some(12345), &["hero", "red cape"]))
            .with_version(11111, version("v1", Some(12345), &[]))
    }

    #[tokio::test]
    async fn test_resolve_air_id_without_fallback() {
        let resolver = MetadataResolver::new(standard_catalog());
        let bundle = resolver.resolve("civitai:12345@67890").await.unwrap();

        assert_eq!(bundle.air_id, "12345@67890");
        assert_eq!(bundle.model_name, "Hero");
        assert_eq!(bundle.version_name, "v2");
        assert_eq!(bundle.description, "Hello world");
        assert_eq!(bundle.trained_words, vec!["hero", "red cape"]);
        assert_eq!(
            resolver.catalog().calls(),
            vec!["model:12345", "version:67890"]
        );
    }

    #[tokio::test]
    async fn test_resolve_version_only_looks_up_model() {
        let resolver = MetadataResolver::new(standard_catalog());
        let bundle = resolver
            .resolve("https://civitai.com/api/v1/model-versions/67890")
            .await
            .unwrap();

        assert_eq!(bundle.model_id, 12345);
        assert_eq!(bundle.version_id, 67890);
        assert_eq!(
            resolver.catalog().calls(),
            vec!["version:67890", "model:12345", "version:67890"]
        );
    }

    #[tokio::test]
    async fn test_resolve_model_only_uses_first_listed_version() {
        let resolver = MetadataResolver::new(standard_catalog());
        let bundle = resolver.resolve("12345").await.unwrap();

        assert_eq!(bundle.air_id, "12345@67890");
        assert_eq!(
            resolver.catalog().calls(),
            vec!["model:12345", "version:67890"]
        );
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent() {
        let resolver = MetadataResolver::new(standard_catalog());
        let first = resolver.resolve("12345").await.unwrap();
        let second = resolver.resolve("12345").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_no_identifier_makes_no_calls() {
        let resolver = MetadataResolver::new(standard_catalog());
        let err = resolver.resolve("   ").await.unwrap_err();
        assert!(matches!(err, ResolveError::NoIdentifier));
        assert!(resolver.catalog().calls().is_empty());
    }

    #[tokio::test]
    async fn test_version_without_model_id_errors() {
        let catalog = FakeCatalog::default().with_version(5, version("v", None, &[]));
        let resolver = MetadataResolver::new(catalog);
        let err = resolver
            .resolve("https://civitai.com/model-versions/5")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::ModelNotFoundForVersion { version_id: 5, .. }
        ));
        assert_eq!(resolver.catalog().calls(), vec!["version:5"]);
    }

    #[tokio::test]
    async fn test_model_without_versions_errors() {
        let catalog = FakeCatalog::default().with_model(1, model("Empty", None, &[]));
        let resolver = MetadataResolver::new(catalog);
        let err = resolver.resolve("1").await.unwrap_err();
        assert!(matches!(err, ResolveError::NoVersions));
    }

    #[tokio::test]
    async fn test_first_version_without_id_errors() {
        let catalog = FakeCatalog::default().with_model(1, model("Odd", None, &[None, Some(2)]));
        let resolver = MetadataResolver::new(catalog);
        let err = resolver.resolve("1").await.unwrap_err();
        assert!(matches!(err, ResolveError::LatestVersionMissingId));
    }

    #[tokio::test]
    async fn test_missing_model_errors() {
        let resolver = MetadataResolver::new(FakeCatalog::default());
        let err = resolver.resolve("404").await.unwrap_err();
        assert!(matches!(
            err,
            ResolveError::ModelUnavailable { model_id: 404, .. }
        ));
        assert_eq!(err.to_string(), "Failed to fetch information for model ID 404.");
    }

    #[tokio::test]
    async fn test_missing_version_errors() {
        let catalog = FakeCatalog::default().with_model(1, model("M", None, &[Some(2)]));
        let resolver = MetadataResolver::new(catalog);
        let err = resolver.resolve("1@3").await.unwrap_err();
        assert!(matches!(
            err,
            ResolveError::VersionUnavailable { version_id: 3, .. }
        ));
    }

    #[tokio::test]
    async fn test_upstream_status_is_kept() {
        let catalog = FakeCatalog {
            failing: true,
            ..Default::default()
        };
        let resolver = MetadataResolver::new(catalog);
        let err = resolver.resolve("1@2").await.unwrap_err();
        assert_eq!(err.status_code(), Some(500));
    }

    #[tokio::test]
    async fn test_missing_description_uses_placeholder() {
        let catalog = FakeCatalog::default()
            .with_model(1, model("M", None, &[Some(2)]))
            .with_version(2, version("v", Some(1), &[]));
        let resolver = MetadataResolver::new(catalog);
        let bundle = resolver.resolve("1").await.unwrap();
        assert_eq!(bundle.description, MISSING_DESCRIPTION);
        assert!(bundle.trained_words.is_empty());
    }
}
