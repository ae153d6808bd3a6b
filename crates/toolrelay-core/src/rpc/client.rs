//! JSON-RPC client for the remote tool endpoint
//!
//! One POST per tool call, bounded by a deadline. `invoke` never fails: any
//! problem becomes fallback text that is fed to the model in place of the
//! tool output, so the conversation can still finish.

use std::time::Duration;

use serde_json::{Map, Value};

use crate::logging::SharedLogger;
use crate::types::ToolCall;

use super::error::{RpcError, RpcResult};
use super::protocol::JsonRpcRequest;

/// Default deadline for a tool call
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(5);

/// Every tool request uses the same id; one call is in flight per request
const REQUEST_ID: &str = "1";

/// Prefix of the text substituted for a failed tool call
pub const FALLBACK_PREFIX: &str = "tool call failed: ";

/// HTTP JSON-RPC client for invoking tools
#[derive(Clone)]
pub struct ToolClient {
    http: reqwest::Client,
    endpoint: String,
    timeout: Duration,
    logger: SharedLogger,
}

impl ToolClient {
    /// Create a client for the given endpoint URL
    pub fn new(endpoint: impl Into<String>, timeout: Duration, logger: SharedLogger) -> RpcResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RpcError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            timeout,
            logger,
        })
    }

    /// Endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Invoke a tool call, returning its result text or fallback text
    pub async fn invoke(&self, call: &ToolCall) -> String {
        match call.params() {
            Ok(params) => self.invoke_method(&call.name, params).await,
            Err(kind) => self.render(&call.name, Err(RpcError::InvalidArguments(kind))),
        }
    }

    /// Invoke a method by name, returning its result text or fallback text
    pub async fn invoke_method(&self, method: &str, params: Option<Map<String, Value>>) -> String {
        let outcome = self.call_method(method, params).await;
        self.render(method, outcome)
    }

    /// Invoke a tool call, exposing the typed failure
    pub async fn call(&self, call: &ToolCall) -> RpcResult<Value> {
        let params = call.params().map_err(RpcError::InvalidArguments)?;
        self.call_method(&call.name, params).await
    }

    /// Send one JSON-RPC request and return its `result`
    pub async fn call_method(
        &self,
        method: &str,
        params: Option<Map<String, Value>>,
    ) -> RpcResult<Value> {
        let mut request = JsonRpcRequest::new(method, REQUEST_ID);
        if let Some(params) = params {
            request = request.with_params(params);
        }

        self.logger.debug(&format!(
            "[ToolClient] Calling {} at {}",
            method, self.endpoint
        ));

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RpcError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;
        let value: Value = serde_json::from_slice(&body)
            .map_err(|e| RpcError::InvalidResponse(format!("undecodable body: {}", e)))?;

        parse_response(value)
    }

    fn transport_error(&self, err: reqwest::Error) -> RpcError {
        if err.is_timeout() {
            RpcError::Timeout(self.timeout.as_millis())
        } else {
            RpcError::ConnectionFailed(err.to_string())
        }
    }

    fn render(&self, method: &str, outcome: RpcResult<Value>) -> String {
        match outcome {
            Ok(value) => render_result(value),
            Err(e) => {
                self.logger
                    .warn(&format!("[ToolClient] {} failed: {}", method, e));
                format!("{}{}", FALLBACK_PREFIX, e)
            }
        }
    }
}

/// Tool output as text: strings verbatim, anything else as compact JSON
pub fn render_result(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

fn parse_response(response: Value) -> RpcResult<Value> {
    if let Some(error) = response.get("error").filter(|e| !e.is_null()) {
        let code = error.get("code").and_then(|c| c.as_i64()).unwrap_or(-1);
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        return Err(RpcError::Remote { code, message });
    }

    let id = response.get("id").unwrap_or(&Value::Null);
    if id.as_str() != Some(REQUEST_ID) {
        return Err(RpcError::InvalidResponse(format!("Mismatched id {}", id)));
    }

    response
        .get("result")
        .cloned()
        .ok_or_else(|| RpcError::InvalidResponse("Missing result field".to_string()))
}
