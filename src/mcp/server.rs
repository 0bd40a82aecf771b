//! MCP server: exposes the Jira tools as an MCP endpoint.
//!
//! [`handle_message`] is transport-agnostic; the stdio loop and the axum
//! `/mcp` handler both feed it parsed JSON-RPC 2.0 messages.
//!
//! Supported methods:
//! - `initialize`: server info + capabilities
//! - `notifications/*`: client notifications (no response)
//! - `ping`: health check
//! - `tools/list`: the tool catalog
//! - `tools/call`: execute a tool
//! - `resources/list`, `prompts/list`: always empty

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

use crate::state::AppState;
use crate::tools;

pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "jira-mcp-server";

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;

/// Handle one JSON-RPC message (or a batch of them).
///
/// Returns `None` when nothing should be sent back: notifications, stray
/// responses from the client, or a batch made only of those.
pub async fn handle_message(state: &AppState, message: &Value) -> Option<Value> {
    match message {
        Value::Array(batch) if batch.is_empty() => Some(json_rpc_error(
            Value::Null,
            INVALID_REQUEST,
            "Invalid request: empty batch",
        )),
        Value::Array(batch) => {
            let mut responses = Vec::with_capacity(batch.len());
            for item in batch {
                if let Some(response) = handle_single(state, item).await {
                    responses.push(response);
                }
            }
            (!responses.is_empty()).then(|| Value::Array(responses))
        }
        single => handle_single(state, single).await,
    }
}

async fn handle_single(state: &AppState, request: &Value) -> Option<Value> {
    if !request.is_object() {
        return Some(json_rpc_error(
            Value::Null,
            INVALID_REQUEST,
            "Invalid request: expected a JSON object",
        ));
    }

    let method = request.get("method").and_then(|m| m.as_str());
    let id = request.get("id").cloned();

    tracing::debug!(method = method.unwrap_or(""), "MCP server: incoming message");

    let (method, id) = match (method, id) {
        (Some(method), Some(id)) => (method, id),
        // Notification, no reply.
        (Some(_), None) => return None,
        // A response to something we never send; ignore it.
        (None, _) if request.get("result").is_some() || request.get("error").is_some() => {
            return None;
        }
        (None, id) => {
            return Some(json_rpc_error(
                id.unwrap_or(Value::Null),
                INVALID_REQUEST,
                "Invalid request: missing method",
            ));
        }
    };

    let response = match method {
        "initialize" => handle_initialize(request, &id),
        "ping" => json_rpc_result(&id, json!({})),
        "tools/list" => handle_tools_list(&id),
        "tools/call" => handle_tools_call(state, request, &id).await,
        "resources/list" => json_rpc_result(&id, json!({ "resources": [] })),
        "prompts/list" => json_rpc_result(&id, json!({ "prompts": [] })),
        _ => json_rpc_error(id, METHOD_NOT_FOUND, &format!("Method not found: {}", method)),
    };
    Some(response)
}

// ── HTTP transport ──────────────────────────────────────────────────────────

/// MCP JSON-RPC 2.0 endpoint handler (`POST /mcp`).
///
/// A body that is not JSON gets a `-32700` response with a null id.
pub async fn mcp_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let request: Value = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!("MCP: unparseable request body: {}", e);
            let error = json_rpc_error(Value::Null, PARSE_ERROR, &format!("Parse error: {e}"));
            return (StatusCode::OK, Json(error)).into_response();
        }
    };

    match handle_message(&state, &request).await {
        Some(response) => (StatusCode::OK, Json(response)).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

// ── initialize ──────────────────────────────────────────────────────────────

fn handle_initialize(request: &Value, id: &Value) -> Value {
    let protocol_version = request
        .pointer("/params/protocolVersion")
        .and_then(|v| v.as_str())
        .unwrap_or(DEFAULT_PROTOCOL_VERSION);

    if let Some(client) = request.pointer("/params/clientInfo/name").and_then(|v| v.as_str()) {
        tracing::info!(client = %client, protocol_version = %protocol_version, "MCP: client initialized");
    }

    json_rpc_result(
        id,
        json!({
            "protocolVersion": protocol_version,
            "capabilities": {
                "tools": { "listChanged": false }
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            },
            "instructions": "Jira tools: fetch, search (JQL), create, comment on, update and transition issues."
        }),
    )
}

// ── tools/list ──────────────────────────────────────────────────────────────

fn handle_tools_list(id: &Value) -> Value {
    json_rpc_result(id, json!({ "tools": tools::catalog() }))
}

// ── tools/call ──────────────────────────────────────────────────────────────

async fn handle_tools_call(state: &AppState, request: &Value, id: &Value) -> Value {
    let params = request.get("params").cloned().unwrap_or(json!({}));
    let tool_name = params.get("name").and_then(|n| n.as_str()).unwrap_or("");
    let arguments = params
        .get("arguments")
        .filter(|a| !a.is_null())
        .cloned()
        .unwrap_or(json!({}));

    if tool_name.is_empty() {
        return json_rpc_error(id.clone(), INVALID_PARAMS, "Missing 'name' in params");
    }

    tracing::info!(tool = %tool_name, "MCP server: tools/call");

    let output = tools::execute_tool(tool_name, &arguments, state).await;
    json_rpc_result(
        id,
        json!({
            "content": [{ "type": "text", "text": output.text }],
            "isError": output.is_error
        }),
    )
}

// ── JSON-RPC helpers ────────────────────────────────────────────────────────

fn json_rpc_result(id: &Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result
    })
}

pub fn json_rpc_error(id: Value, code: i32, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": code,
            "message": message
        }
    })
}
