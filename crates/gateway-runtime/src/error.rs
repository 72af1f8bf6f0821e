use thiserror::Error;

/// Pure error taxonomy for the gateway engine (§7). Carries no HTTP
/// dependency — the REST binding maps each variant to a status code.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid server config for '{0}': {1}")]
    ConfigInvalid(String, String),

    #[error("failed to spawn server '{0}': {1}")]
    SpawnFailed(String, String),

    #[error("server '{0}' is not ready ({1})")]
    NotReady(String, String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("server '{0}' already registered")]
    Conflict(String),

    #[error("backend returned an error: {0}")]
    RemoteError(String),

    #[error("timed out waiting for {0}")]
    Timeout(String),

    #[error("confirmation '{0}' has expired")]
    Expired(String),
}

pub type Result<T> = std::result::Result<T, GatewayError>;
