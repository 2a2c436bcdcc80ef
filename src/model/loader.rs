//! File-backed model loader

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use super::artifact::{ModelArtifact, MODEL_FILE_NAME};
use super::{Model, ModelLoader};
use crate::error::{Result, ServeError};

/// Loads [`ModelArtifact`]s from the local filesystem.
///
/// Accepts plain paths and `file://` URIs. Relative paths are resolved
/// against `root` when one is configured. A directory resolves to its
/// `model.json`.
#[derive(Debug, Clone, Default)]
pub struct FileModelLoader {
    root: Option<PathBuf>,
}

impl FileModelLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to resolve relative URIs against `root`
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Map a model URI to the artifact file it names.
    pub fn resolve(&self, uri: &str) -> Result<PathBuf> {
        if uri.trim().is_empty() {
            return Err(ServeError::model_load(uri, "empty model URI"));
        }

        let path = match uri.split_once("://") {
            Some(("file", rest)) => PathBuf::from(rest),
            Some((scheme, _)) => {
                return Err(ServeError::model_load(
                    uri,
                    format!("unsupported URI scheme '{}'", scheme),
                ))
            }
            None if has_scheme(uri) => {
                return Err(ServeError::model_load(uri, "unsupported URI scheme"))
            }
            None => PathBuf::from(uri),
        };

        let path = match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path,
        };

        if path.is_dir() {
            Ok(path.join(MODEL_FILE_NAME))
        } else {
            Ok(path)
        }
    }

    fn read_artifact(&self, uri: &str, path: &Path) -> Result<ModelArtifact> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ServeError::model_load_caused_by(uri, format!("cannot read {}", path.display()), e)
        })?;

        let artifact: ModelArtifact = serde_json::from_str(&text).map_err(|e| {
            ServeError::model_load_caused_by(uri, format!("invalid model artifact {}", path.display()), e)
        })?;

        artifact
            .check()
            .map_err(|reason| ServeError::model_load(uri, reason))?;

        Ok(artifact)
    }
}

/// `runs:/...` and `models:/...` style URIs with a single slash
fn has_scheme(uri: &str) -> bool {
    match uri.split_once(":/") {
        Some((scheme, _)) => {
            scheme.len() > 1 && scheme.chars().all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-')
        }
        None => false,
    }
}

impl ModelLoader for FileModelLoader {
    fn load(&self, uri: &str) -> Result<Arc<dyn Model>> {
        let path = self.resolve(uri)?;
        debug!(uri = %uri, path = %path.display(), "Reading model artifact");
        let artifact = self.read_artifact(uri, &path)?;
        Ok(Arc::new(artifact))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_schemes() {
        let loader = FileModelLoader::new();
        for uri in ["s3://bucket/model", "gs://bucket/model", "runs:/abc/model"] {
            let err = loader.resolve(uri).unwrap_err();
            assert!(matches!(err, ServeError::ModelLoad { .. }), "{}", uri);
        }
    }

    #[test]
    fn test_file_uri_and_root() {
        let loader = FileModelLoader::new().with_root("/srv/models");
        assert_eq!(
            loader.resolve("file:///opt/m/model.json").unwrap(),
            PathBuf::from("/opt/m/model.json")
        );
        assert_eq!(
            loader.resolve("imputer/model.json").unwrap(),
            PathBuf::from("/srv/models/imputer/model.json")
        );
    }

    #[test]
    fn test_empty_uri() {
        assert!(FileModelLoader::new().resolve("").is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = FileModelLoader::new()
            .load("/definitely/not/here/model.json")
            .err()
            .unwrap();
        assert!(err.to_string().contains("cannot read"));
    }
}
