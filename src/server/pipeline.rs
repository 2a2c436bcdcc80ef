//! Predict request lifecycle
//!
//! validate -> decode -> resolve model -> predict -> merge -> encode.
//! Everything here is synchronous; the HTTP handler runs it on a blocking
//! thread and turns any error into a diagnostic response.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::cache::ModelCache;
use crate::error::{Result, ServeError};
use crate::table::{self, EncodeOptions};

/// Body of a predict call
#[derive(Debug, Clone, Deserialize)]
pub struct PredictRequest {
    /// Where the model lives
    pub model_uri: String,
    /// Column the predictions are written to
    pub target: String,
    /// Table JSON, decoded in a later step
    pub data: Value,
}

impl PredictRequest {
    /// Parse and validate a raw request body.
    pub fn parse(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ServeError::Validation(format!("request body is not valid JSON: {}", e)))?;

        let request: PredictRequest = serde_json::from_value(value)
            .map_err(|e| ServeError::Validation(format!("invalid predict request: {}", e)))?;

        request.validate()?;
        Ok(request)
    }

    fn validate(&self) -> Result<()> {
        if self.model_uri.trim().is_empty() {
            return Err(ServeError::Validation("model_uri must not be empty".to_string()));
        }
        if !self.data.is_object() {
            return Err(ServeError::Validation("data must be a JSON object".to_string()));
        }
        Ok(())
    }
}

/// Run one predict request end to end, returning the response table JSON.
pub fn run_predict(cache: &ModelCache, body: &[u8]) -> Result<Value> {
    let PredictRequest {
        model_uri,
        target,
        data,
    } = PredictRequest::parse(body)?;

    let mut table = table::decode(data)?;
    debug!(
        rows = table.height(),
        columns = table.width(),
        target = %target,
        "Decoded request table"
    );

    let model = cache.get(&model_uri)?;

    // Index columns are row labels, not features.
    let features = table.without_column(&target).without_index();
    let predictions = model.predict(&features)?;
    if predictions.len() != table.height() {
        return Err(ServeError::Inference(format!(
            "model returned {} predictions for {} rows",
            predictions.len(),
            table.height()
        )));
    }

    // A target naming an index field becomes a new regular column; the index
    // itself is not written back.
    if table.schema.is_index(&target) {
        table = table.without_column(&target);
    }
    table.set_column(&target, predictions)?;
    Ok(table::encode(&table, EncodeOptions::without_index()))
}
