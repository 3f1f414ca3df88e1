//! MCP lifecycle and method dispatch.

use super::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, JSONRPC_VERSION, MCP_PROTOCOL_VERSION};
use super::tools::{self, DispatchError, ToolResult};
use crate::ops::DocumentService;
use serde::Deserialize;
use serde_json::{json, Value};

pub const SERVER_NAME: &str = "wordmcp";

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// Handles one JSON-RPC message at a time.
#[derive(Debug)]
pub struct McpServer {
    service: DocumentService,
    initialized: bool,
}

impl McpServer {
    pub fn new(service: DocumentService) -> Self {
        Self {
            service,
            initialized: false,
        }
    }

    pub fn service(&self) -> &DocumentService {
        &self.service
    }

    /// Whether the client has sent `notifications/initialized`.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Handle one line of input and return the serialized response, if any.
    pub fn handle_line(&mut self, line: &str) -> Option<String> {
        let response = match serde_json::from_str::<Value>(line) {
            Ok(message) => self.handle_message(message)?,
            Err(e) => {
                tracing::warn!(error = %e, "unparseable message");
                JsonRpcResponse::error(Value::Null, JsonRpcError::parse_error(e))
            }
        };
        match serde_json::to_string(&response) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize response");
                None
            }
        }
    }

    /// Handle a decoded message. Notifications produce no response.
    ///
    /// Only a message without an `id` member is a notification; an explicit
    /// `"id": null` is answered with a null id.
    pub fn handle_message(&mut self, message: Value) -> Option<JsonRpcResponse> {
        let id = message.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(message) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, "malformed request");
                return Some(JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_request(format!("Invalid Request: {}", e)),
                ));
            }
        };

        if request.jsonrpc != JSONRPC_VERSION {
            tracing::warn!(version = %request.jsonrpc, "unsupported jsonrpc version");
            return Some(JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_request("Invalid Request: jsonrpc must be \"2.0\""),
            ));
        }

        let Some(id) = request.id.clone() else {
            self.handle_notification(&request);
            return None;
        };

        tracing::debug!(method = %request.method, "request");
        Some(match self.dispatch(request) {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::error(id, error),
        })
    }

    fn handle_notification(&mut self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            "notifications/initialized" => {
                self.initialized = true;
                tracing::info!("client initialized");
            }
            method => tracing::debug!(method, "ignoring notification"),
        }
    }

    fn dispatch(&mut self, request: JsonRpcRequest) -> Result<Value, JsonRpcError> {
        match request.method.as_str() {
            "initialize" => Ok(self.initialize(request.params)),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": tools::catalogue() })),
            "tools/call" => self.call_tool(request.params),
            method => {
                tracing::warn!(method, "unknown method");
                Err(JsonRpcError::method_not_found(method))
            }
        }
    }

    fn initialize(&mut self, params: Option<Value>) -> Value {
        if let Some(client) = params
            .as_ref()
            .and_then(|p| p.get("clientInfo"))
            .and_then(|c| c.get("name"))
            .and_then(Value::as_str)
        {
            tracing::info!(client, "initialize");
        }

        json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": {
                "tools": { "listChanged": false },
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION"),
            },
        })
    }

    fn call_tool(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: CallParams = params
            .ok_or_else(|| JsonRpcError::invalid_params("tools/call requires params"))
            .and_then(|p| {
                serde_json::from_value(p).map_err(|e| {
                    JsonRpcError::invalid_params(format!("failed to decode tools/call params: {}", e))
                })
            })?;

        let outcome = tools::call_tool(&self.service, &params.name, params.arguments)
            .map_err(|e: DispatchError| {
                tracing::warn!(tool = %params.name, error = %e, "rejected tool call");
                JsonRpcError::invalid_params(e.to_string())
            })?;

        let result = match outcome {
            Ok(value) => ToolResult::success(value),
            Err(err) => {
                tracing::warn!(tool = %params.name, kind = %err.kind(), error = %err, "tool failed");
                ToolResult::failure(&err)
            }
        };
        serde_json::to_value(result).map_err(|e| JsonRpcError::internal(e.to_string()))
    }
}
