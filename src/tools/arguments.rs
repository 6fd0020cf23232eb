//! Typed access to tool call arguments.

use crate::error::CadreError;

/// Wrapper around decoded tool call arguments providing typed extraction.
#[derive(Debug, Clone)]
pub struct ToolArguments {
    value: serde_json::Value,
}

impl ToolArguments {
    pub fn new(value: serde_json::Value) -> Self {
        Self { value }
    }

    /// Decode a raw argument blob as sent by the model.
    ///
    /// Accepts a JSON value or a JSON-encoded string; `null` and an empty
    /// string both decode to `{}`.
    pub fn parse(raw: &serde_json::Value) -> Result<Self, String> {
        let value = match raw {
            serde_json::Value::Null => serde_json::json!({}),
            serde_json::Value::String(blob) => {
                let trimmed = blob.trim();
                if trimmed.is_empty() {
                    serde_json::json!({})
                } else {
                    serde_json::from_str::<serde_json::Value>(trimmed)
                        .map_err(|e| format!("arguments are not valid JSON: {e}"))?
                }
            }
            other => other.clone(),
        };
        Ok(Self { value })
    }

    /// Get the raw JSON value.
    pub fn raw(&self) -> &serde_json::Value {
        &self.value
    }

    /// Get a string argument by key.
    pub fn get_str(&self, key: &str) -> Result<&str, CadreError> {
        self.value
            .get(key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| CadreError::InvalidArgument(format!("Missing string argument: {key}")))
    }

    /// Get an optional string argument.
    pub fn get_str_opt(&self, key: &str) -> Option<&str> {
        self.value.get(key).and_then(|v| v.as_str())
    }

    /// Get an integer argument.
    pub fn get_i64(&self, key: &str) -> Result<i64, CadreError> {
        self.value
            .get(key)
            .and_then(|v| v.as_i64())
            .ok_or_else(|| CadreError::InvalidArgument(format!("Missing integer argument: {key}")))
    }

    /// Get a float argument.
    pub fn get_f64(&self, key: &str) -> Result<f64, CadreError> {
        self.value
            .get(key)
            .and_then(|v| v.as_f64())
            .ok_or_else(|| CadreError::InvalidArgument(format!("Missing float argument: {key}")))
    }

    /// Get a boolean argument.
    pub fn get_bool(&self, key: &str) -> Result<bool, CadreError> {
        self.value
            .get(key)
            .and_then(|v| v.as_bool())
            .ok_or_else(|| CadreError::InvalidArgument(format!("Missing boolean argument: {key}")))
    }

    /// Deserialize the entire arguments into a typed struct.
    pub fn deserialize<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.value.clone())
    }
}
