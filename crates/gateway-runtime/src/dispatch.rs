//! Request Dispatcher (C4): correlation-id bookkeeping and single-use
//! delivery channels for one backend.
//!
//! This is also the primitive the Initialization FSM (`init.rs`) rides on:
//! the handshake's `id = 1` request is dispatched through the same
//! pending-waiter table as any other call, just with its own deadline and
//! with the "not ready yet" guard skipped. Unifying the two avoids a second,
//! parallel implementation of the at-most-once delivery guarantee.

use crate::codec::{encode_request, message_id, response_outcome};
use crate::error::{GatewayError, Result};
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::process::ChildStdin;
use tokio::sync::{oneshot, Mutex};
use tokio::time::{timeout, Duration};

type Outcome = std::result::Result<Value, String>;

/// Per-backend correlation table. Owns no process handle directly — the
/// caller supplies the stdin writer to serialize outbound frames.
pub struct Dispatcher {
    server_id: String,
    pending: DashMap<String, oneshot::Sender<Outcome>>,
    stdin: Arc<Mutex<ChildStdin>>,
}

impl Dispatcher {
    pub fn new(server_id: impl Into<String>, stdin: Arc<Mutex<ChildStdin>>) -> Self {
        Self {
            server_id: server_id.into(),
            pending: DashMap::new(),
            stdin,
        }
    }

    /// Mint a correlation id, register a waiter, write the framed request,
    /// and await the matching response within `deadline`. `id` is caller
    /// supplied so the handshake can pin the literal integer `1`; ordinary
    /// dispatch mints a fresh UUID string.
    pub async fn call(&self, id: Value, method: &str, params: Value, deadline: Duration) -> Result<Value> {
        let key = id_key(&id);
        let (tx, rx) = oneshot::channel();
        self.pending.insert(key.clone(), tx);

        let frame = encode_request(id, method, params);
        eprintln!("DEBUG call key={} about to write_frame", key);
        if let Err(e) = self.write_frame(&frame).await {
            self.pending.remove(&key);
            return Err(GatewayError::SpawnFailed(
                self.server_id.clone(),
                format!("write failed: {}", e),
            ));
        }

        eprintln!("DEBUG call key={} wrote frame, waiting", key);
        let r = timeout(deadline, rx).await;
        eprintln!("DEBUG call key={} timeout result variant done", key);
        match r {
            Ok(Ok(Ok(result))) => Ok(result),
            Ok(Ok(Err(message))) => Err(GatewayError::RemoteError(message)),
            Ok(Err(_recv_dropped)) => Err(GatewayError::NotReady(
                self.server_id.clone(),
                "backend exited before responding".to_string(),
            )),
            Err(_elapsed) => {
                self.pending.remove(&key);
                Err(GatewayError::Timeout(format!(
                    "{} {}",
                    self.server_id, method
                )))
            }
        }
    }

    /// Write a pre-framed notification (no response expected).
    pub async fn notify(&self, frame: &str) -> std::io::Result<()> {
        self.write_frame(frame).await
    }

    async fn write_frame(&self, frame: &str) -> std::io::Result<()> {
        let mut stdin = self.stdin.lock().await;
        stdin.write_all(frame.as_bytes()).await?;
        stdin.flush().await
    }

    /// Route one parsed inbound object to its waiter, if any is registered.
    /// Unmatched ids are dropped silently (logged by the caller).
    pub fn complete(&self, value: &Value) -> bool {
        let Some(id) = message_id(value) else {
            return false;
        };
        let key = id_key(id);
        eprintln!("DEBUG complete key={}", key);
        if let Some((_, tx)) = self.pending.remove(&key) {
            let _ = tx.send(response_outcome(value));
            eprintln!("DEBUG complete key={} matched+sent", key);
            true
        } else {
            eprintln!("DEBUG complete key={} NOT FOUND", key);
            false
        }
    }

    /// Fail every currently-registered waiter, e.g. on backend exit.
    pub fn fail_all(&self, message: &str) {
        let keys: Vec<String> = self.pending.iter().map(|e| e.key().clone()).collect();
        for key in keys {
            if let Some((_, tx)) = self.pending.remove(&key) {
                let _ = tx.send(Err(message.to_string()));
            }
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

fn id_key(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn fresh_id() -> Value {
    Value::String(uuid::Uuid::new_v4().to_string())
}
