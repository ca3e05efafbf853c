//! Workflow definition document
//!
//! The repair loop never interprets a workflow beyond checking that it is a
//! non-empty YAML mapping. The document is carried as a `serde_yaml::Value`
//! so key order and unknown keys survive a load/write cycle untouched.

use serde_yaml::Value;

#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Workflow document is empty")]
    Empty,

    #[error("Workflow document must be a mapping, found {0}")]
    NotAMapping(&'static str),
}

/// An opaque GitHub Actions workflow document
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowDefinition {
    document: Value,
}

impl WorkflowDefinition {
    /// Parse YAML text, rejecting documents with no usable content.
    pub fn parse(text: &str) -> Result<Self, DefinitionError> {
        let document: Value = serde_yaml::from_str(text)?;
        Self::from_value(document)
    }

    pub fn from_value(document: Value) -> Result<Self, DefinitionError> {
        match &document {
            Value::Null => Err(DefinitionError::Empty),
            Value::Mapping(map) if map.is_empty() => Err(DefinitionError::Empty),
            Value::Mapping(_) => Ok(Self { document }),
            other => Err(DefinitionError::NotAMapping(kind_of(other))),
        }
    }

    /// Parse a model completion as a workflow.
    ///
    /// A single enclosing Markdown fence (```` ```yaml ```` ... ```` ``` ````) is
    /// removed first; everything else must be valid YAML on its own.
    pub fn from_model_response(response: &str) -> Result<Self, DefinitionError> {
        Self::parse(strip_code_fence(response))
    }

    pub fn to_yaml(&self) -> Result<String, DefinitionError> {
        Ok(serde_yaml::to_string(&self.document)?)
    }

    pub fn as_value(&self) -> &Value {
        &self.document
    }

    /// Top-level `name:` of the workflow, if it has one
    pub fn name(&self) -> Option<&str> {
        self.document.get("name").and_then(Value::as_str)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") || !trimmed.ends_with("```") || trimmed.len() < 6 {
        return text;
    }

    let inner = &trimmed[..trimmed.len() - 3];
    match inner.find('\n') {
        Some(newline) => &inner[newline + 1..],
        None => text,
    }
}
