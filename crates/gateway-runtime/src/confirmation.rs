//! Confirmation Store (C6): pending human-approval tickets for MEDIUM-risk
//! `tools/call`s, with lazy 10-minute expiry. No background sweeper —
//! expiry is checked on access, matching §4.5.

use crate::risk::confirmation_ttl;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PendingConfirmation {
    pub server_id: String,
    pub method: String,
    pub params: Value,
    pub created_at: DateTime<Utc>,
}

pub enum Resolution {
    /// Approved and still present — caller should dispatch now, then call
    /// `remove` once the dispatch completes.
    Approved(PendingConfirmation),
    Rejected,
    Expired,
    NotFound,
}

#[derive(Default)]
pub struct ConfirmationStore {
    entries: DashMap<String, PendingConfirmation>,
}

impl ConfirmationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, server_id: &str, method: &str, params: Value) -> String {
        let id = Uuid::new_v4().to_string();
        self.entries.insert(
            id.clone(),
            PendingConfirmation {
                server_id: server_id.to_string(),
                method: method.to_string(),
                params,
                created_at: Utc::now(),
            },
        );
        id
    }

    /// Resolve an id. `approve = false` removes and reports rejected;
    /// `approve = true` leaves the entry in place (single-use — the caller
    /// removes it via `remove` after dispatching) unless it has expired.
    pub fn resolve(&self, id: &str, approve: bool) -> Resolution {
        let Some(entry) = self.entries.get(id) else {
            return Resolution::NotFound;
        };

        if Utc::now() - entry.created_at > confirmation_ttl() {
            drop(entry);
            self.entries.remove(id);
            return Resolution::Expired;
        }

        if !approve {
            let pending = entry.clone();
            drop(entry);
            self.entries.remove(id);
            let _ = pending;
            return Resolution::Rejected;
        }

        Resolution::Approved(entry.clone())
    }

    /// Remove a single-use entry after its approved dispatch completes.
    pub fn remove(&self, id: &str) {
        self.entries.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn unknown_id_is_not_found() {
        let store = ConfirmationStore::new();
        assert!(matches!(store.resolve("missing", true), Resolution::NotFound));
    }

    #[test]
    fn reject_removes_the_entry() {
        let store = ConfirmationStore::new();
        let id = store.create("s", "tools/call", serde_json::json!({}));
        assert!(matches!(store.resolve(&id, false), Resolution::Rejected));
        assert!(matches!(store.resolve(&id, true), Resolution::NotFound));
    }

    #[test]
    fn approve_leaves_entry_for_caller_to_remove() {
        let store = ConfirmationStore::new();
        let id = store.create("s", "tools/call", serde_json::json!({"name": "t"}));
        match store.resolve(&id, true) {
            Resolution::Approved(pending) => assert_eq!(pending.server_id, "s"),
            _ => panic!("expected Approved"),
        }
        store.remove(&id);
        assert!(matches!(store.resolve(&id, true), Resolution::NotFound));
    }

    #[test]
    fn expired_entry_is_removed_and_reported() {
        let store = ConfirmationStore::new();
        let id = store.create("s", "tools/call", serde_json::json!({}));
        // Backdate manually to simulate 11 minutes of age.
        if let Some(mut entry) = store.entries.get_mut(&id) {
            entry.created_at = Utc::now() - Duration::minutes(11);
        }
        assert!(matches!(store.resolve(&id, true), Resolution::Expired));
        assert!(matches!(store.resolve(&id, true), Resolution::NotFound));
    }
}
