//! Line-delimited JSON-RPC 2.0 tool adapter.
//!
//! `attic tools` reads one request per line on stdin and writes one
//! response per line on stdout, sharing the single connection (and its
//! one-command-in-flight rule) with the rest of the client. Server `ERR:`
//! replies are ordinary results with `success: false`; only transport and
//! input failures become JSON-RPC errors.

use std::io::BufRead;
use std::io::Write;

use attic_ipc::AtticClient;
use attic_ipc::ClientError;
use attic_protocol::Reply;
use serde::Deserialize;
use serde::Serialize;
use serde_json::json;
use serde_json::Value;

use crate::translate::translate;
use crate::translate::Mode;

const PARSE_ERROR: i32 = -32700;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;

// Domain errors, following the JSON-RPC server-error range.
const GENERIC_ERROR: i32 = -32000;
const TIMEOUT: i32 = -32001;
const CONNECTION_LOST: i32 = -32002;
const NOT_CONNECTED: i32 = -32003;
const INVALID_INPUT: i32 = -32004;

#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    #[allow(dead_code)]
    jsonrpc: String,
    pub id: u64,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

impl RpcRequest {
    fn param_str(&self, key: &str) -> Option<&str> {
        self.params
            .as_ref()
            .and_then(|p| p.get(key))
            .and_then(|v| v.as_str())
    }

    fn require_str(&self, key: &str) -> Result<&str, RpcResponse> {
        self.param_str(key)
            .ok_or_else(|| RpcResponse::error(self.id, INVALID_PARAMS, &format!("Missing '{key}' param")))
    }
}

#[derive(Debug, Serialize)]
pub struct RpcResponse {
    jsonrpc: String,
    id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
}

#[derive(Debug, Serialize)]
struct RpcError {
    code: i32,
    message: String,
}

impl RpcResponse {
    pub fn success(id: u64, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: u64, code: i32, message: &str) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.to_string(),
            }),
        }
    }
}

/// Serve requests from stdin until end-of-input.
pub fn run(client: &AtticClient) -> std::io::Result<()> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<RpcRequest>(&line) {
            Ok(request) => dispatch(client, &request),
            Err(err) => RpcResponse::error(0, PARSE_ERROR, &format!("Invalid request: {err}")),
        };

        serde_json::to_writer(&mut stdout, &response)?;
        stdout.write_all(b"\n")?;
        stdout.flush()?;
    }
    Ok(())
}

pub fn dispatch(client: &AtticClient, request: &RpcRequest) -> RpcResponse {
    match request.method.as_str() {
        "command" => {
            let line = match request.require_str("line") {
                Ok(line) => line,
                Err(response) => return response,
            };
            let mode = match parse_mode(request.param_str("mode").unwrap_or("monitor")) {
                Some(mode) => mode,
                None => {
                    return RpcResponse::error(request.id, INVALID_PARAMS, "Unknown mode")
                }
            };

            let commands = match translate(mode, line) {
                Ok(commands) => commands,
                Err(err) => {
                    return RpcResponse::error(request.id, INVALID_INPUT, &err.to_string())
                }
            };

            let mut results = Vec::new();
            for command in &commands {
                match client.send(command) {
                    Ok(reply) => results.push(reply_to_json(command, &reply)),
                    Err(err) => return client_error_response(request.id, &err),
                }
            }
            RpcResponse::success(request.id, json!({ "results": results }))
        }

        "raw" => {
            let command = match request.require_str("command") {
                Ok(command) => command,
                Err(response) => return response,
            };
            match client.send(command) {
                Ok(reply) => RpcResponse::success(request.id, reply_to_json(command, &reply)),
                Err(err) => client_error_response(request.id, &err),
            }
        }

        "events" => {
            let events: Vec<Value> = client
                .drain_events()
                .into_iter()
                .map(|event| json!({ "kind": event.kind, "data": event.data }))
                .collect();
            RpcResponse::success(request.id, json!({ "events": events }))
        }

        "status" => RpcResponse::success(
            request.id,
            json!({
                "connected": client.is_connected(),
                "socket": client.connected_path(),
            }),
        ),

        other => RpcResponse::error(
            request.id,
            METHOD_NOT_FOUND,
            &format!("Method not found: {other}"),
        ),
    }
}

fn parse_mode(name: &str) -> Option<Mode> {
    match name {
        "monitor" => Some(Mode::Monitor),
        "basic" => Some(Mode::Basic { turbo: false }),
        "basic_turbo" => Some(Mode::Basic { turbo: true }),
        "dos" => Some(Mode::Dos),
        _ => None,
    }
}

fn reply_to_json(command: &str, reply: &Reply) -> Value {
    json!({
        "command": command,
        "success": reply.success,
        "payload": reply.payload,
        "lines": reply.lines(),
    })
}

fn client_error_response(id: u64, err: &ClientError) -> RpcResponse {
    let code = match err {
        ClientError::Timeout => TIMEOUT,
        ClientError::ConnectionClosed | ClientError::ConnectionLost(_) => CONNECTION_LOST,
        ClientError::NotConnected => NOT_CONNECTED,
        ClientError::Protocol(_) => INVALID_INPUT,
        _ => GENERIC_ERROR,
    };
    RpcResponse::error(id, code, &err.to_string())
}
