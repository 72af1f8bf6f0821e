use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {0}: {1}")]
    IoError(PathBuf, #[source] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("invalid server config for '{0}': {1}")]
    Invalid(String, String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
