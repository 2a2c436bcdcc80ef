//! Error types for the serving pipeline

use thiserror::Error;

/// Result type alias for serving operations
pub type Result<T> = std::result::Result<T, ServeError>;

/// Every failure the predict pipeline can produce.
///
/// Each variant corresponds to one stage of a request: validating the body,
/// decoding the table, resolving the model and running inference.
#[derive(Error, Debug)]
pub enum ServeError {
    #[error("ValidationError: {0}")]
    Validation(String),

    #[error("SchemaError: {0}")]
    Schema(String),

    #[error("ModelLoadError: failed to load model '{uri}': {reason}")]
    ModelLoad {
        uri: String,
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("InferenceError: {0}")]
    Inference(String),
}

impl ServeError {
    /// Model load failure without an underlying cause
    pub fn model_load(uri: impl Into<String>, reason: impl Into<String>) -> Self {
        ServeError::ModelLoad {
            uri: uri.into(),
            reason: reason.into(),
            source: None,
        }
    }

    /// Model load failure wrapping the error that caused it
    pub fn model_load_caused_by<E>(uri: impl Into<String>, reason: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ServeError::ModelLoad {
            uri: uri.into(),
            reason: reason.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Short machine-readable kind, surfaced only when status codes are enabled
    pub fn kind(&self) -> &'static str {
        match self {
            ServeError::Validation(_) => "validation",
            ServeError::Schema(_) => "schema",
            ServeError::ModelLoad { .. } => "model_load",
            ServeError::Inference(_) => "inference",
        }
    }

    /// Render the error and its cause chain the way `anyhow` prints it.
    pub fn traceback(self) -> String {
        format!("{:?}", anyhow::Error::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ServeError::Schema("missing member 'data'".to_string());
        assert_eq!(err.to_string(), "SchemaError: missing member 'data'");
    }

    #[test]
    fn test_traceback_includes_cause() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = ServeError::model_load_caused_by("models/m1", "cannot read artifact", io_err);
        let trace = err.traceback();
        assert!(trace.contains("ModelLoadError"));
        assert!(trace.contains("models/m1"));
        assert!(trace.contains("no such file"));
    }

    #[test]
    fn test_kind() {
        assert_eq!(ServeError::Validation("x".into()).kind(), "validation");
        assert_eq!(ServeError::model_load("u", "r").kind(), "model_load");
    }
}
