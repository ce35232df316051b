use serde::Serialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite};
use tokio::sync::mpsc;

use crate::mcp::gateway::Gateway;
use crate::output::spawn_line_writer;
use crate::toolkit::Toolkit;

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "projectdiscovery-mcp";

/// A request whose `id` is absent is a notification; `"id": null` is kept as a
/// request with a null id.
#[derive(Debug)]
struct JsonRpcRequest {
    id: Option<Value>,
    method: String,
    params: Option<Value>,
}

impl JsonRpcRequest {
    /// Parse one line; the error is the response to send back.
    fn parse(line: &str) -> Result<Self, JsonRpcResponse> {
        let value: Value = serde_json::from_str(line)
            .map_err(|e| JsonRpcResponse::error(None, -32700, format!("Parse error: {}", e)))?;
        let id = value.get("id").cloned();
        let Some(method) = value.get("method").and_then(Value::as_str) else {
            return Err(JsonRpcResponse::error(id, -32600, "Invalid Request"));
        };
        Ok(Self { id, method: method.to_string(), params: value.get("params").cloned() })
    }
}

#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    jsonrpc: &'static str,
    id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

impl JsonRpcResponse {
    fn result(id: Option<Value>, result: Value) -> Self {
        Self { jsonrpc: "2.0", id, result: Some(result), error: None }
    }

    fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(JsonRpcError { code, message: message.into() }),
        }
    }

    fn into_value(self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| {
            json!({"jsonrpc": "2.0", "error": {"code": -32603, "message": "Internal error"}})
        })
    }
}

/// MCP server: newline-delimited JSON-RPC over a byte stream (stdio in production).
pub struct McpServer<T: ?Sized> {
    gateway: Gateway<T>,
}

impl<T: Toolkit + ?Sized + 'static> McpServer<T> {
    pub fn new(gateway: Gateway<T>) -> Self {
        Self { gateway }
    }

    pub async fn run_stdio(&self) -> std::io::Result<()> {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        tracing::info!("{} running on stdio", SERVER_NAME);
        self.serve(stdin, tokio::io::stdout()).await
    }

    /// Serve requests from `reader` until end of input. Tool calls run
    /// concurrently; all responses go through one writer so lines never
    /// interleave. Returns once every in-flight call has answered.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<Value>(256);
        let writer_task = spawn_line_writer(writer, rx);

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let request = match JsonRpcRequest::parse(line) {
                Ok(r) => r,
                Err(resp) => {
                    let _ = tx.send(resp.into_value()).await;
                    continue;
                }
            };

            if request.method == "tools/call" && request.id.is_some() {
                let gateway = self.gateway.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let resp = handle_tool_call(&gateway, request.id, request.params).await;
                    let _ = tx.send(resp.into_value()).await;
                });
                continue;
            }

            if let Some(resp) = self.handle_request(request) {
                let _ = tx.send(resp.into_value()).await;
            }
        }

        drop(tx);
        writer_task
            .await
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?
    }

    fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id else {
            tracing::debug!(method = %request.method, "notification");
            return None;
        };
        let resp = match request.method.as_str() {
            "initialize" => JsonRpcResponse::result(
                Some(id),
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": { "tools": {} },
                    "serverInfo": { "name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION") }
                }),
            ),
            "tools/list" => JsonRpcResponse::result(Some(id), json!({ "tools": self.gateway.list_tools() })),
            "ping" | "shutdown" => JsonRpcResponse::result(Some(id), json!({})),
            other => JsonRpcResponse::error(Some(id), -32601, format!("Method not found: {}", other)),
        };
        Some(resp)
    }
}

async fn handle_tool_call<T: Toolkit + ?Sized>(gateway: &Gateway<T>, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
    let Some(params) = params else {
        return JsonRpcResponse::error(id, -32602, "Missing params");
    };
    let Some(name) = params.get("name").and_then(|v| v.as_str()) else {
        return JsonRpcResponse::error(id, -32602, "Missing tool name");
    };
    let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);
    let envelope = gateway.call(name, arguments).await;
    JsonRpcResponse::result(id, envelope.to_content())
}
