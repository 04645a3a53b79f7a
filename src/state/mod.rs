//! Terraform state documents and the per-type state rewriters.

pub mod migrators;
mod path;

pub use path::PathAccess;

use crate::error::StateError;
use serde_json::Value;

/// A parsed `terraform.tfstate` document.
///
/// Keys keep the order they were read in, so writing an untouched document
/// back produces the same key sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct StateDocument {
    root: Value,
}

impl StateDocument {
    pub fn parse(text: &str) -> Result<Self, StateError> {
        let root: Value =
            serde_json::from_str(text).map_err(|e| StateError::JsonParseError(e.to_string()))?;
        Self::from_value(root)
    }

    pub fn from_value(root: Value) -> Result<Self, StateError> {
        if !root.is_object() {
            return Err(StateError::NotAnObject);
        }
        match root.get("resources") {
            None | Some(Value::Array(_)) => Ok(Self { root }),
            Some(other) => Err(StateError::InvalidResources(json_kind(other).to_string())),
        }
    }

    /// Serializes with two-space indentation and a trailing newline.
    pub fn to_pretty_string(&self) -> Result<String, StateError> {
        let mut text = serde_json::to_string_pretty(&self.root)
            .map_err(|e| StateError::SerializeError(e.to_string()))?;
        text.push('\n');
        Ok(text)
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn resources(&self) -> &[Value] {
        match self.root.get("resources") {
            Some(Value::Array(resources)) => resources,
            _ => &[],
        }
    }

    pub fn resources_mut(&mut self) -> &mut [Value] {
        match self.root.get_mut("resources") {
            Some(Value::Array(resources)) => resources,
            _ => &mut [],
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
