//! # Input Files
//!
//! Data and message files may be YAML (`.yaml`/`.yml`) or JSON (anything
//! else). YAML is converted into the JSON value tree the validator works on.

use std::path::Path;

use serde_json::Value;
use sift_core::{Messages, SiftError};

/// Read a data file into a JSON value.
pub fn load_data(path: &Path) -> Result<Value, SiftError> {
    let content = std::fs::read_to_string(path)?;
    parse_value(&content, path)
}

/// Read a custom message file: a flat mapping of key to message.
pub fn load_messages(path: &Path) -> Result<Messages, SiftError> {
    let value = load_data(path)?;
    serde_json::from_value(value).map_err(|e| document_error(path, e))
}

fn parse_value(content: &str, path: &Path) -> Result<Value, SiftError> {
    if is_yaml(path) {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|e| document_error(path, e))?;
        yaml_to_json_value(&yaml).map_err(|e| document_error(path, e))
    } else {
        serde_json::from_str(content).map_err(|e| document_error(path, e))
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}

fn document_error(path: &Path, reason: impl std::fmt::Display) -> SiftError {
    SiftError::Document {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Convert a `serde_yaml::Value` into a `serde_json::Value`.
///
/// Tags are dropped; scalar map keys are stringified.
pub fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::from(u))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(items) => items
            .iter()
            .map(yaml_to_json_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_yaml::Value::Mapping(map) => {
            let mut object = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML key: {other:?}")),
                };
                object.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(object))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}
