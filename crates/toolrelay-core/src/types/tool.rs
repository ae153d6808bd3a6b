//! Tool/function calling types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Tool definition offered to the LLM for function calling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// Tool name (function name, also the JSON-RPC method name)
    pub name: String,
    /// Description of what the tool does
    pub description: String,
    /// JSON Schema for the input parameters
    #[serde(rename = "inputSchema", skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,
}

impl Tool {
    /// Create a new tool definition
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: None,
        }
    }

    /// Set the input schema
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.input_schema = Some(schema);
        self
    }
}

/// Tool call requested by the LLM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,
    /// Name of the tool being called
    pub name: String,
    /// Input arguments for the tool
    #[serde(default)]
    pub input: Value,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    /// Arguments as JSON-RPC params
    ///
    /// `Ok(None)` when there is nothing to send (null or an empty object),
    /// `Err` with the offending JSON type when the arguments are not an object.
    pub fn params(&self) -> Result<Option<Map<String, Value>>, &'static str> {
        match &self.input {
            Value::Null => Ok(None),
            Value::Object(map) if map.is_empty() => Ok(None),
            Value::Object(map) => Ok(Some(map.clone())),
            Value::Bool(_) => Err("boolean"),
            Value::Number(_) => Err("number"),
            Value::String(_) => Err("string"),
            Value::Array(_) => Err("array"),
        }
    }
}

/// Tool choice option for requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    /// Let the model decide whether to use tools
    #[default]
    Auto,
    /// Don't use tools
    None,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_creation() {
        let tool = Tool::new("calculate_discharge_date", "Compute a discharge date")
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "start_date": { "type": "string" }
                },
                "required": ["start_date"]
            }));

        assert_eq!(tool.name, "calculate_discharge_date");
        assert!(tool.input_schema.is_some());
    }

    #[test]
    fn test_params_empty_arguments() {
        let null_args = ToolCall::new("call_1", "get_current_time", Value::Null);
        assert_eq!(null_args.params(), Ok(None));

        let empty = ToolCall::new("call_2", "get_current_time", json!({}));
        assert_eq!(empty.params(), Ok(None));
    }

    #[test]
    fn test_params_object_arguments() {
        let call = ToolCall::new(
            "call_123",
            "calculate_discharge_date",
            json!({"start_date": "2024-01-01", "service_days": 10}),
        );

        let params = call.params().unwrap().unwrap();
        assert_eq!(params["service_days"], 10);
        assert_eq!(params["start_date"], "2024-01-01");
    }

    #[test]
    fn test_params_rejects_non_object() {
        let call = ToolCall::new("call_9", "get_current_time", json!("now please"));
        assert_eq!(call.params(), Err("string"));
    }
}
