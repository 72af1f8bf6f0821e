//! Gateway Facade (C8): the sole surface the REST layer sees. No
//! REST-specific types leak past this module.

use crate::backend::{Backend, InitState};
use crate::confirmation::{ConfirmationStore, Resolution};
use crate::dispatch::fresh_id;
use crate::error::{GatewayError, Result};
use crate::registry::{ServerRecord, ServerRegistry};
use crate::risk::{self, Gate};
use chrono::Utc;
use gateway_config::ServerConfig;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

const DISPATCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Snapshot of one registered server, shaped for `GET /servers` (§6).
pub struct ServerSnapshot {
    pub id: String,
    pub connected: bool,
    pub pid: u32,
    pub initialization_state: &'static str,
    pub risk_level: Option<u8>,
    pub risk_description: Option<&'static str>,
    pub running_in_docker: bool,
}

/// The engine. Cloning is cheap — it is a handle over `Arc`-wrapped state,
/// matching the ambient stack's requirement that the REST binding hold a
/// clone with no gateway state of its own (§4.9).
#[derive(Clone)]
pub struct Gateway {
    registry: Arc<ServerRegistry>,
    confirmations: Arc<ConfirmationStore>,
    started_at: Instant,
}

impl Gateway {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(ServerRegistry::new()),
            confirmations: Arc::new(ConfirmationStore::new()),
            started_at: Instant::now(),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn list_servers(&self) -> Vec<ServerSnapshot> {
        self.registry
            .list()
            .into_iter()
            .map(|(id, record)| snapshot(&id, &record))
            .collect()
    }

    /// Spawn, insert, and drive the handshake for a new server. Returns once
    /// the handshake has settled into `initialized`, `timeout`, or `error` —
    /// the record is visible in the registry immediately after spawn
    /// succeeds, before the handshake even starts (§3 invariant), so a
    /// caller racing `list_servers` may observe it mid-handshake.
    pub async fn start_server(&self, id: &str, config: ServerConfig) -> Result<()> {
        if self.registry.contains(id) {
            return Err(GatewayError::Conflict(id.to_string()));
        }

        let plan = risk::plan_spawn(&config);
        let backend = Backend::spawn(id, &plan.command, &plan.args, &plan.env).await?;

        let record = ServerRecord {
            backend: backend.clone(),
            config,
            original_command: plan.original_command,
            running_in_docker: plan.command == "docker",
        };
        self.registry.insert(id, record)?;

        self.spawn_exit_watcher(id.to_string(), backend.clone());

        crate::init::perform_handshake(&backend).await
    }

    pub async fn stop_server(&self, id: &str) -> Result<()> {
        let record = self
            .registry
            .remove(id)
            .ok_or_else(|| GatewayError::NotFound(format!("server '{}'", id)))?;
        record
            .backend
            .stop()
            .await
            .map_err(|e| GatewayError::SpawnFailed(id.to_string(), e.to_string()))
    }

    /// Dispatch `method`/`params` to `server_id`, applying the risk gate.
    /// `approval_token` is `Some` only when the Confirmation Store is
    /// re-issuing a previously-parked call.
    pub async fn call(
        &self,
        server_id: &str,
        method: &str,
        params: Value,
        pre_approved: bool,
    ) -> Result<Value> {
        let record = self
            .registry
            .get(server_id)
            .ok_or_else(|| GatewayError::NotFound(format!("server '{}'", server_id)))?;

        let state = record.init_state();
        if state != InitState::Initialized {
            return Err(GatewayError::NotReady(
                server_id.to_string(),
                state.as_str().to_string(),
            ));
        }

        if risk::wants_confirmation(&record.config, method, pre_approved) {
            let confirmation_id = self.confirmations.create(server_id, method, params.clone());
            let Gate::RequireConfirmation(payload) = risk::gate_dispatch(
                &record.config,
                server_id,
                &confirmation_id,
                method,
                &params,
                Utc::now(),
                pre_approved,
            ) else {
                unreachable!("wants_confirmation implies RequireConfirmation");
            };
            return Ok(payload);
        }

        let gate = risk::gate_dispatch(
            &record.config,
            server_id,
            "",
            method,
            &params,
            Utc::now(),
            pre_approved,
        );

        let result = record
            .backend
            .dispatcher()
            .call(fresh_id(), method, params, DISPATCH_TIMEOUT)
            .await?;

        Ok(match gate {
            Gate::WrapWithEnvironment(annotation) => risk::merge_environment(result, annotation),
            _ => result,
        })
    }

    /// Resolve a pending confirmation (`POST /confirmations/:cid`, §6).
    pub async fn confirm(&self, confirmation_id: &str, approve: bool) -> Result<Value> {
        match self.confirmations.resolve(confirmation_id, approve) {
            Resolution::NotFound => Err(GatewayError::NotFound(format!(
                "confirmation '{}'",
                confirmation_id
            ))),
            Resolution::Expired => Err(GatewayError::Expired(confirmation_id.to_string())),
            Resolution::Rejected => Ok(serde_json::json!({"status": "rejected"})),
            Resolution::Approved(pending) => {
                let result = self
                    .call(&pending.server_id, &pending.method, pending.params, true)
                    .await;
                self.confirmations.remove(confirmation_id);
                result
            }
        }
    }

    /// Snapshot of current server ids, used by the Shutdown Coordinator
    /// (`shutdown.rs`) to fan out concurrent stops without holding the
    /// registry locked across each stop's await.
    pub(crate) fn server_ids(&self) -> Vec<String> {
        self.registry.list().into_iter().map(|(id, _)| id).collect()
    }

    fn spawn_exit_watcher(&self, id: String, backend: Arc<Backend>) {
        let registry = self.registry.clone();
        tokio::spawn(async move {
            let _ = backend.wait_for_exit().await;
            backend.dispatcher().fail_all("backend exited");
            registry.remove(&id);
            eprintln!("[server {}] process exited, record removed", id);
        });
    }
}

impl Default for Gateway {
    fn default() -> Self {
        Self::new()
    }
}

fn snapshot(id: &str, record: &ServerRecord) -> ServerSnapshot {
    ServerSnapshot {
        id: id.to_string(),
        connected: record.init_state() == InitState::Initialized,
        pid: record.backend.pid,
        initialization_state: record.init_state().as_str(),
        risk_level: record.config.risk_level.map(|r| r as u8),
        risk_description: record.config.risk_level.map(|r| r.description()),
        running_in_docker: record.running_in_docker,
    }
}
