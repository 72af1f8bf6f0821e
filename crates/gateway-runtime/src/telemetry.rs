//! Telemetry / Health (C12, ambient): uptime and a per-server snapshot for
//! `GET /health` and `GET /servers`. Deliberately smaller than a full
//! metrics subsystem — no counters beyond what §6 asks for.

use crate::facade::Gateway;
use serde_json::Value;

pub struct HealthReport {
    pub uptime_seconds: u64,
    pub server_count: usize,
    pub servers: Vec<Value>,
}

pub fn health_report(gateway: &Gateway) -> HealthReport {
    let snapshots = gateway.list_servers();
    let servers: Vec<Value> = snapshots.iter().map(server_to_json).collect();
    HealthReport {
        uptime_seconds: gateway.uptime().as_secs(),
        server_count: servers.len(),
        servers,
    }
}

pub fn server_to_json(snapshot: &crate::facade::ServerSnapshot) -> Value {
    let mut value = serde_json::json!({
        "id": snapshot.id,
        "connected": snapshot.connected,
        "pid": snapshot.pid,
        "initialization_state": snapshot.initialization_state,
    });
    if let Some(level) = snapshot.risk_level {
        value["risk_level"] = serde_json::json!(level);
        value["risk_description"] = serde_json::json!(snapshot.risk_description);
        value["running_in_docker"] = serde_json::json!(snapshot.running_in_docker);
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_gateway_reports_zero_servers() {
        let gateway = Gateway::new();
        let report = health_report(&gateway);
        assert_eq!(report.server_count, 0);
        assert!(report.servers.is_empty());
    }
}
