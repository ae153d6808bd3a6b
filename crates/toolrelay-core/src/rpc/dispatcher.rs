//! Server side of the tool endpoint
//!
//! Resolves a JSON-RPC method against the [`ToolRegistry`], validates params
//! against the tool's schema and runs its handler.

use std::sync::Arc;

use serde_json::Value;

use crate::logging::SharedLogger;
use crate::tools::ToolRegistry;

use super::error::{RpcError, RpcResult};
use super::protocol::{error_codes, JsonRpcRequest, JsonRpcResponse, JSONRPC_VERSION};

/// Dispatches JSON-RPC requests to registered tools
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    logger: SharedLogger,
}

impl Dispatcher {
    /// Create a dispatcher over a shared registry
    pub fn new(registry: Arc<ToolRegistry>, logger: SharedLogger) -> Self {
        Self { registry, logger }
    }

    /// The registry being served
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Handle a raw JSON body
    ///
    /// Structurally invalid requests are an `Err`; everything else, including
    /// unknown methods and failing tools, is an RPC response.
    pub fn handle_value(&self, raw: Value) -> RpcResult<JsonRpcResponse> {
        let request: JsonRpcRequest = serde_json::from_value(raw)
            .map_err(|e| RpcError::InvalidRequest(e.to_string()))?;

        if request.jsonrpc != JSONRPC_VERSION {
            return Err(RpcError::InvalidRequest(format!(
                "unsupported jsonrpc version '{}'",
                request.jsonrpc
            )));
        }

        Ok(self.handle(request))
    }

    /// Handle a parsed request
    pub fn handle(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let JsonRpcRequest { method, params, id, .. } = request;

        let Some(tool) = self.registry.resolve(&method) else {
            self.logger
                .warn(&format!("[Dispatcher] Method not found: {}", method));
            return JsonRpcResponse::error(id, error_codes::METHOD_NOT_FOUND, "Method not found");
        };

        let params = params.unwrap_or_default();

        if let Err(details) = tool.validate(&Value::Object(params.clone())) {
            self.logger.warn(&format!(
                "[Dispatcher] Invalid params for {}: {}",
                method, details
            ));
            return JsonRpcResponse::error(
                id,
                error_codes::TOOL_FAILED,
                format!("Invalid params: {}", details),
            );
        }

        match tool.call(&params) {
            Ok(result) => {
                self.logger.debug(&format!("[Dispatcher] {} succeeded", method));
                JsonRpcResponse::success(id, result)
            }
            Err(e) => {
                let mut message = e.to_string();
                if message.is_empty() {
                    message = format!("Tool '{}' failed", method);
                }
                self.logger
                    .error(&format!("[Dispatcher] {} failed: {}", method, message));
                JsonRpcResponse::error(id, error_codes::TOOL_FAILED, message)
            }
        }
    }
}
