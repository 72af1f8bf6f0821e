//! Server Registry (C7): server-id -> backend process handle, risk level,
//! config, initialization state. A `DashMap` gives each operation its own
//! critical section without a registry-wide lock held across an await.

use crate::backend::{Backend, InitState};
use crate::error::{GatewayError, Result};
use dashmap::DashMap;
use gateway_config::ServerConfig;
use std::sync::Arc;

pub struct ServerRecord {
    pub backend: Arc<Backend>,
    pub config: ServerConfig,
    pub original_command: String,
    pub running_in_docker: bool,
}

impl ServerRecord {
    pub fn init_state(&self) -> InitState {
        self.backend.init_state()
    }
}

#[derive(Default)]
pub struct ServerRegistry {
    records: DashMap<String, Arc<ServerRecord>>,
}

impl ServerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new record. Fails with `Conflict` if `id` is already
    /// registered — a record becomes visible to the registry only once its
    /// spawn has fully succeeded (§3 invariant).
    pub fn insert(&self, id: &str, record: ServerRecord) -> Result<()> {
        use dashmap::mapref::entry::Entry;
        match self.records.entry(id.to_string()) {
            Entry::Occupied(_) => Err(GatewayError::Conflict(id.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(record));
                Ok(())
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<ServerRecord>> {
        self.records.get(id).map(|r| r.clone())
    }

    pub fn remove(&self, id: &str) -> Option<Arc<ServerRecord>> {
        self.records.remove(id).map(|(_, r)| r)
    }

    pub fn list(&self) -> Vec<(String, Arc<ServerRecord>)> {
        self.records
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_config() -> ServerConfig {
        ServerConfig {
            command: "true".to_string(),
            args: vec![],
            env: vec![],
            risk_level: None,
            docker: None,
        }
    }

    #[tokio::test]
    async fn duplicate_insert_is_a_conflict() {
        let registry = ServerRegistry::new();
        let backend = Backend::spawn("s", "true", &[], &[]).await.unwrap();
        let record = ServerRecord {
            backend: backend.clone(),
            config: dummy_config(),
            original_command: "true".to_string(),
            running_in_docker: false,
        };
        registry.insert("s", record).unwrap();

        let record2 = ServerRecord {
            backend,
            config: dummy_config(),
            original_command: "true".to_string(),
            running_in_docker: false,
        };
        assert!(matches!(registry.insert("s", record2), Err(GatewayError::Conflict(_))));
    }

    #[tokio::test]
    async fn remove_then_get_returns_none() {
        let registry = ServerRegistry::new();
        let backend = Backend::spawn("s", "true", &[], &[]).await.unwrap();
        registry
            .insert(
                "s",
                ServerRecord {
                    backend,
                    config: dummy_config(),
                    original_command: "true".to_string(),
                    running_in_docker: false,
                },
            )
            .unwrap();
        assert!(registry.get("s").is_some());
        registry.remove("s");
        assert!(registry.get("s").is_none());
    }
}
