//! JSON model artifacts
//!
//! An artifact is a `model.json` file tagged by `kind`:
//!
//! ```json
//! {"kind": "linear", "features": ["x"], "coefficients": [2.0], "intercept": 0.0}
//! {"kind": "constant", "value": 52000}
//! ```

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use super::Model;
use crate::error::{Result, ServeError};
use crate::table::TableDocument;

/// File name looked up when a model URI points at a directory
pub const MODEL_FILE_NAME: &str = "model.json";

/// A serialized model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    Linear(LinearModel),
    Constant(ConstantModel),
}

impl ModelArtifact {
    /// Check internal consistency; returns a description of the problem.
    pub fn check(&self) -> std::result::Result<(), String> {
        match self {
            ModelArtifact::Linear(model) => model.check(),
            ModelArtifact::Constant(model) => model.check(),
        }
    }
}

impl Model for ModelArtifact {
    fn predict(&self, table: &TableDocument) -> Result<Vec<Value>> {
        match self {
            ModelArtifact::Linear(model) => model.predict(table),
            ModelArtifact::Constant(model) => model.predict(table),
        }
    }
}

/// Linear regression: `intercept + sum(coefficients[i] * row[features[i]])`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub features: Vec<String>,
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

impl LinearModel {
    fn check(&self) -> std::result::Result<(), String> {
        if self.features.len() != self.coefficients.len() {
            return Err(format!(
                "linear model has {} features but {} coefficients",
                self.features.len(),
                self.coefficients.len()
            ));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err("linear model parameters must be finite".to_string());
        }
        Ok(())
    }

    /// Gather the feature matrix; the flag is true when every value is an integer.
    fn feature_matrix(&self, table: &TableDocument) -> Result<(Array2<f64>, bool)> {
        let mut x = Array2::<f64>::zeros((table.height(), self.features.len()));
        let mut all_int = true;

        for (i, row) in table.data.iter().enumerate() {
            for (j, name) in self.features.iter().enumerate() {
                let number = match row.get(name) {
                    Some(Value::Number(n)) => n,
                    Some(Value::Null) | None => {
                        return Err(ServeError::Inference(format!(
                            "row {} is missing feature '{}'",
                            i, name
                        )))
                    }
                    Some(other) => {
                        return Err(ServeError::Inference(format!(
                            "row {} feature '{}' is not numeric: {}",
                            i, name, other
                        )))
                    }
                };
                all_int &= number.is_i64() || number.is_u64();
                x[[i, j]] = number.as_f64().unwrap_or(f64::NAN);
            }
        }

        Ok((x, all_int))
    }

    pub fn predict(&self, table: &TableDocument) -> Result<Vec<Value>> {
        let (x, all_int) = self.feature_matrix(table)?;
        let coefficients = Array1::from_vec(self.coefficients.clone());
        let y = x.dot(&coefficients) + self.intercept;

        let integral_params = self.intercept.fract() == 0.0
            && self.coefficients.iter().all(|c| c.fract() == 0.0);
        let emit_int = all_int && integral_params;

        y.iter()
            .map(|&v| {
                if emit_int && v.abs() < i64::MAX as f64 {
                    Ok(Value::from(v as i64))
                } else {
                    Number::from_f64(v)
                        .map(Value::Number)
                        .ok_or_else(|| ServeError::Inference(format!("non-finite prediction {}", v)))
                }
            })
            .collect()
    }
}

/// Emits the same value for every row, replacing known values too
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstantModel {
    pub value: Value,
}

impl ConstantModel {
    fn check(&self) -> std::result::Result<(), String> {
        if self.value.is_array() || self.value.is_object() {
            return Err("constant model value must be a scalar".to_string());
        }
        Ok(())
    }

    pub fn predict(&self, table: &TableDocument) -> Result<Vec<Value>> {
        Ok(vec![self.value.clone(); table.height()])
    }
}
