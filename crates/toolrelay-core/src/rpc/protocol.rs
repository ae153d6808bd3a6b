//! JSON-RPC 2.0 protocol types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Protocol version carried by every request and response
pub const JSONRPC_VERSION: &str = "2.0";

fn default_version() -> String {
    JSONRPC_VERSION.to_string()
}

/// JSON-RPC 2.0 request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default = "default_version")]
    pub jsonrpc: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
    pub id: String,
}

impl JsonRpcRequest {
    /// Create a request without params
    pub fn new(method: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            jsonrpc: default_version(),
            method: method.into(),
            params: None,
            id: id.into(),
        }
    }

    /// Attach params
    pub fn with_params(mut self, params: Map<String, Value>) -> Self {
        self.params = Some(params);
        self
    }
}

/// JSON-RPC 2.0 response
///
/// Exactly one of `result` and `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: String,
}

impl JsonRpcResponse {
    /// Create a success response
    pub fn success(id: impl Into<String>, result: Value) -> Self {
        Self {
            jsonrpc: default_version(),
            result: Some(result),
            error: None,
            id: id.into(),
        }
    }

    /// Create an error response
    pub fn error(id: impl Into<String>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: default_version(),
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
            id: id.into(),
        }
    }
}

/// JSON-RPC 2.0 error object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

/// JSON-RPC error codes used by the tool endpoint
pub mod error_codes {
    pub const METHOD_NOT_FOUND: i32 = -32601;

    /// Tool handler failure, including params the tool's schema rejects
    pub const TOOL_FAILED: i32 = -32000;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_shape() {
        let req = JsonRpcRequest::new("get_current_time", "1");
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({"jsonrpc": "2.0", "method": "get_current_time", "id": "1"})
        );
    }

    #[test]
    fn test_request_version_defaults() {
        let req: JsonRpcRequest =
            serde_json::from_value(json!({"method": "get_current_time", "id": "7"})).unwrap();
        assert_eq!(req.jsonrpc, "2.0");
        assert!(req.params.is_none());
    }

    #[test]
    fn test_request_rejects_array_params() {
        let parsed = serde_json::from_value::<JsonRpcRequest>(json!({
            "jsonrpc": "2.0",
            "method": "get_current_time",
            "params": [1, 2],
            "id": "1"
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_response_serialization() {
        let ok = serde_json::to_value(JsonRpcResponse::success("1", json!({"time": "x"}))).unwrap();
        assert!(ok.get("error").is_none());

        let err = serde_json::to_value(JsonRpcResponse::error(
            "99",
            error_codes::METHOD_NOT_FOUND,
            "Method not found",
        ))
        .unwrap();
        assert_eq!(
            err,
            json!({
                "jsonrpc": "2.0",
                "error": {"code": -32601, "message": "Method not found"},
                "id": "99"
            })
        );
    }
}
