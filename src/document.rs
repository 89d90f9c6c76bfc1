use crate::error::CompareError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;

/// A raw workflow document as loaded from JSON.
///
/// The content is not validated until it is handed to the
/// [`TreeBuilder`](crate::builder::TreeBuilder).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowDocument {
    raw: Value,
}

impl WorkflowDocument {
    pub fn from_value(raw: Value) -> Self {
        Self { raw }
    }

    /// Parses a document from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, CompareError> {
        serde_json::from_str(json)
            .map(Self::from_value)
            .map_err(|e| CompareError::Document(format!("Invalid JSON: {}", e)))
    }

    /// Loads a document from a JSON file.
    pub fn from_file(path: &str) -> Result<Self, CompareError> {
        let content = fs::read_to_string(path).map_err(|e| {
            CompareError::Document(format!("Could not read file '{}': {}", path, e))
        })?;
        Self::from_json_str(&content)
    }

    pub fn as_value(&self) -> &Value {
        &self.raw
    }

    /// The document's `name`, or an empty string when absent.
    pub fn name(&self) -> &str {
        self.raw.get("name").and_then(Value::as_str).unwrap_or("")
    }
}

impl From<Value> for WorkflowDocument {
    fn from(raw: Value) -> Self {
        Self::from_value(raw)
    }
}
