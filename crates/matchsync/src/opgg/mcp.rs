//! Minimal MCP client over streamable HTTP.
//!
//! Supports the subset the OP.GG server needs: the `initialize` handshake,
//! `tools/call`, and session termination. Responses may come back as a plain
//! JSON body or as a server-sent event stream.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;

use super::types::{JsonRpcRequest, JsonRpcResponse, ToolCallResult};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::provider::{ProviderError, Result};
use crate::retry::RetryingFetcher;
use crate::sync::ProgressCallback;

/// MCP protocol revision sent during `initialize`.
pub const PROTOCOL_VERSION: &str = "2025-03-26";

const SESSION_HEADER: &str = "Mcp-Session-Id";

/// One MCP session against a streamable-HTTP endpoint.
pub struct McpClient {
    fetcher: RetryingFetcher,
    endpoint: String,
    session_id: Mutex<Option<String>>,
    connected: Mutex<bool>,
    next_id: AtomicU64,
}

impl McpClient {
    pub fn new(fetcher: RetryingFetcher, endpoint: impl Into<String>) -> Self {
        Self {
            fetcher,
            endpoint: endpoint.into(),
            session_id: Mutex::new(None),
            connected: Mutex::new(false),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn session_id(&self) -> Option<String> {
        self.session_id.lock().await.clone()
    }

    /// Run the `initialize` handshake once; later calls are no-ops.
    pub async fn connect(&self, on_progress: Option<&ProgressCallback>) -> Result<()> {
        let mut connected = self.connected.lock().await;
        if *connected {
            return Ok(());
        }

        let params = serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            },
        });
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let response = self
            .post(&JsonRpcRequest::call(id, "initialize", params), on_progress)
            .await?;

        if let Some(session) = response.header(SESSION_HEADER) {
            *self.session_id.lock().await = Some(session.to_string());
        }
        parse_rpc_response(&response, id)?;

        self.post(&JsonRpcRequest::notification("notifications/initialized"), on_progress)
            .await?;

        tracing::info!(endpoint = %self.endpoint, "Connected to MCP server");
        *connected = true;
        Ok(())
    }

    /// Call a tool and return its result.
    ///
    /// # Errors
    ///
    /// [`ProviderError::Mcp`] when the server answers with a JSON-RPC error or
    /// the tool reports `isError`.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<ToolCallResult> {
        self.connect(on_progress).await?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let params = serde_json::json!({ "name": name, "arguments": arguments });
        let response = self
            .post(&JsonRpcRequest::call(id, "tools/call", params), on_progress)
            .await?;

        let result: ToolCallResult = serde_json::from_value(parse_rpc_response(&response, id)?)?;
        if result.is_error {
            let message = result
                .content
                .iter()
                .filter_map(|c| c.text.as_deref())
                .collect::<Vec<_>>()
                .join("\n");
            return Err(ProviderError::Mcp(format!("tool {name} failed: {message}")));
        }
        Ok(result)
    }

    /// Terminate the session. Servers that do not support termination answer
    /// 405, which is ignored.
    ///
    /// The local session is dropped even when the request fails, so the next
    /// call starts a fresh handshake.
    pub async fn disconnect(&self) -> Result<()> {
        let mut connected = self.connected.lock().await;
        *connected = false;
        let Some(session) = self.session_id.lock().await.take() else {
            return Ok(());
        };

        let request = HttpRequest {
            method: HttpMethod::Delete,
            url: self.endpoint.clone(),
            headers: vec![(SESSION_HEADER.to_string(), session)],
            body: Vec::new(),
        };
        match self.fetcher.send(request, None).await {
            Ok(_) => {}
            Err(e) if e.status() == Some(405) => {
                tracing::debug!("MCP server does not support session termination");
            }
            Err(e) => return Err(e),
        }

        tracing::debug!(endpoint = %self.endpoint, "Disconnected from MCP server");
        Ok(())
    }

    async fn post(
        &self,
        message: &JsonRpcRequest,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<HttpResponse> {
        let mut request = HttpRequest::post_json(&self.endpoint, &serde_json::to_value(message)?)
            .header("Accept", "application/json, text/event-stream")
            .header("MCP-Protocol-Version", PROTOCOL_VERSION);
        if let Some(session) = self.session_id.lock().await.as_deref() {
            request = request.header(SESSION_HEADER, session);
        }
        self.fetcher.send(request, on_progress).await
    }
}

/// Extract the result for request `id` from a JSON or SSE response body.
fn parse_rpc_response(response: &HttpResponse, id: u64) -> Result<serde_json::Value> {
    let is_sse = response
        .header("content-type")
        .is_some_and(|ct| ct.starts_with("text/event-stream"));

    let messages: Vec<JsonRpcResponse> = if is_sse {
        sse_data(&response.text())
            .iter()
            .filter_map(|data| serde_json::from_str(data).ok())
            .collect()
    } else {
        vec![serde_json::from_slice(&response.body)?]
    };

    let message = messages
        .into_iter()
        .find(|m| m.id.as_ref().and_then(serde_json::Value::as_u64) == Some(id))
        .ok_or_else(|| ProviderError::Mcp(format!("no response for request {id}")))?;

    if let Some(error) = message.error {
        return Err(ProviderError::Mcp(format!("{} (code {})", error.message, error.code)));
    }
    message
        .result
        .ok_or_else(|| ProviderError::Mcp(format!("empty result for request {id}")))
}

/// Data payloads of a server-sent event stream, one per event.
fn sse_data(body: &str) -> Vec<String> {
    let mut events = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in body.lines() {
        if line.is_empty() {
            if !current.is_empty() {
                events.push(current.join("\n"));
                current.clear();
            }
        } else if let Some(data) = line.strip_prefix("data:") {
            current.push(data.strip_prefix(' ').unwrap_or(data));
        }
    }
    if !current.is_empty() {
        events.push(current.join("\n"));
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json_response(value: serde_json::Value) -> HttpResponse {
        HttpResponse::json(200, &value)
    }

    #[test]
    fn sse_data_joins_multiline_events() {
        let body = "event: message\ndata: {\"a\":\ndata: 1}\n\n: comment\ndata: {\"b\":2}\n";
        assert_eq!(sse_data(body), vec!["{\"a\":\n1}", "{\"b\":2}"]);
    }

    #[test]
    fn parses_plain_json_result() {
        let response = json_response(serde_json::json!({"jsonrpc": "2.0", "id": 3, "result": {"ok": true}}));
        assert_eq!(parse_rpc_response(&response, 3).unwrap()["ok"], true);
    }

    #[test]
    fn parses_sse_result_matching_id() {
        let body = concat!(
            "event: message\n",
            "data: {\"jsonrpc\":\"2.0\",\"method\":\"notifications/progress\"}\n\n",
            "event: message\n",
            "data: {\"jsonrpc\":\"2.0\",\"id\":7,\"result\":{\"value\":42}}\n\n",
        );
        let response = HttpResponse {
            status: 200,
            headers: vec![("Content-Type".to_string(), "text/event-stream".to_string())],
            body: body.as_bytes().to_vec(),
        };
        assert_eq!(parse_rpc_response(&response, 7).unwrap()["value"], 42);
    }

    #[test]
    fn json_rpc_error_is_mcp_error() {
        let response = json_response(serde_json::json!({
            "jsonrpc": "2.0", "id": 1,
            "error": {"code": -32602, "message": "Unknown tool"}
        }));
        let err = parse_rpc_response(&response, 1).unwrap_err();
        assert!(matches!(err, ProviderError::Mcp(ref m) if m.contains("Unknown tool")));
    }

    #[test]
    fn missing_id_is_mcp_error() {
        let response = json_response(serde_json::json!({"jsonrpc": "2.0", "id": 2, "result": {}}));
        assert!(matches!(parse_rpc_response(&response, 9), Err(ProviderError::Mcp(_))));
    }
}
