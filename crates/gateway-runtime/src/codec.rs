//! Line-framed JSON-RPC codec (C2).
//!
//! Outbound messages are single JSON objects terminated by `\n`; a writer
//! serializes access so two concurrent writes cannot interleave bytes of
//! distinct messages (enforced by the caller holding the backend's stdin
//! lock, see `backend.rs`).
//!
//! Inbound bytes are accumulated and framed by newline. A chunk that is
//! itself one complete JSON object with no trailing newline is also
//! recognized, so backends that emit a single `write()` per message without
//! a newline still parse. Malformed lines are skipped, never re-parsed:
//! each call to `feed` only ever returns forward progress.

use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// Build the `initialize` request body sent as frame id 1.
pub fn encode_initialize_request(client_name: &str, client_version: &str) -> String {
    encode_request(
        Value::from(1),
        "initialize",
        serde_json::json!({
            "protocolVersion": "2025-03-26",
            "clientInfo": { "name": client_name, "version": client_version },
            "capabilities": {},
        }),
    )
}

/// Build the `notifications/initialized` frame (no id).
pub fn encode_initialized_notification() -> String {
    encode_notification("notifications/initialized", Value::Null)
}

/// Build a generic request frame, newline-terminated.
pub fn encode_request(id: Value, method: &str, params: Value) -> String {
    let frame = serde_json::json!({
        "jsonrpc": JSONRPC_VERSION,
        "id": id,
        "method": method,
        "params": params,
    });
    format!("{}\n", frame)
}

/// Build a notification frame (no `id` field), newline-terminated.
pub fn encode_notification(method: &str, params: Value) -> String {
    let mut frame = serde_json::json!({
        "jsonrpc": JSONRPC_VERSION,
        "method": method,
    });
    if !params.is_null() {
        frame["params"] = params;
    }
    format!("{}\n", frame)
}

/// Accumulates inbound bytes from a backend's stdout and yields parsed
/// JSON-RPC objects as lines complete. One instance per backend.
#[derive(Default)]
pub struct LineFramer {
    buffer: Vec<u8>,
}

impl LineFramer {
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Feed a chunk of bytes read from stdout. Returns `(parsed, malformed)`:
    /// successfully parsed JSON objects, and the raw malformed lines skipped
    /// along the way (for the caller to log).
    pub fn feed(&mut self, chunk: &[u8]) -> (Vec<Value>, Vec<String>) {
        self.buffer.extend_from_slice(chunk);

        // A whole chunk that parses as one object, with no newline
        // anywhere in the buffer, is accepted directly — some backends
        // write a full JSON-RPC message with no trailing newline per
        // syscall.
        if !self.buffer.contains(&b'\n') {
            if let Ok(text) = std::str::from_utf8(&self.buffer) {
                if let Ok(value) = serde_json::from_str::<Value>(text) {
                    self.buffer.clear();
                    return (vec![value], Vec::new());
                }
            }
            return (Vec::new(), Vec::new());
        }

        let mut parsed = Vec::new();
        let mut malformed = Vec::new();

        loop {
            let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') else {
                break;
            };
            let line_bytes: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line_bytes[..line_bytes.len() - 1]).into_owned();
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<Value>(trimmed) {
                Ok(value) => parsed.push(value),
                Err(_) => malformed.push(line),
            }
        }

        (parsed, malformed)
    }
}

/// Extract the `id` field of a parsed JSON-RPC object, if any. Notifications
/// (outbound only) and malformed/id-less inbound frames have no id.
pub fn message_id(value: &Value) -> Option<&Value> {
    value.get("id").filter(|v| !v.is_null())
}

/// Split a parsed JSON-RPC response object into `Ok(result)` or
/// `Err(message)` depending on whether an `error` member is present.
pub fn response_outcome(value: &Value) -> Result<Value, String> {
    if let Some(error) = value.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("backend returned an error")
            .to_string();
        Err(message)
    } else {
        Ok(value.get("result").cloned().unwrap_or(Value::Null))
    }
}
