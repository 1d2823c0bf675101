//! Tool descriptors in the shape the LLM's function-calling API expects

use serde::Serialize;
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    String,
    Integer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSpec {
    pub name: String,
    pub kind: ParameterKind,
    pub description: String,
}

/// Accepted fields of a tool. Every field is optional on its own, but a
/// schema that declares any field requires at least one to be supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSchema {
    pub properties: Vec<ParameterSpec>,
}

impl ParameterSchema {
    pub fn requires_argument(&self) -> bool {
        !self.properties.is_empty()
    }

    pub fn to_json(&self) -> Value {
        let properties: Map<String, Value> = self
            .properties
            .iter()
            .map(|p| {
                (
                    p.name.clone(),
                    json!({ "type": p.kind, "description": p.description }),
                )
            })
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": [],
            "additionalProperties": false,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: ParameterSchema,
}

impl ToolDescriptor {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters: ParameterSchema::default(),
        }
    }

    pub fn param(mut self, name: &str, kind: ParameterKind, description: &str) -> Self {
        self.parameters.properties.push(ParameterSpec {
            name: name.to_string(),
            kind,
            description: description.to_string(),
        });
        self
    }

    /// Function spec for a chat-completions `functions` array
    pub fn to_function_spec(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "parameters": self.parameters.to_json(),
        })
    }
}
