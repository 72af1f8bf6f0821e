//! # gateway-config
//!
//! Configuration parsing, environment overrides, and risk-policy admission
//! for mcp-gateway.
//!
//! The config file and the `POST /servers` API body share a permissive wire
//! format (`ServerConfigRaw`): an invalid `riskLevel` or an incomplete
//! `docker` block is never a parse error, it is resolved during admission
//! (`validator`) into either a warning (file/env sources) or a hard error
//! (API source).
//!
//! ## Quick Start
//!
//! ```rust
//! use gateway_config::{parse_config_from_str, admit_lenient};
//!
//! let json = r#"{
//!     "mcpServers": {
//!         "echo": { "command": "echo", "args": ["hi"] }
//!     }
//! }"#;
//!
//! let file = parse_config_from_str(json).expect("valid config");
//! let raw = file.mcp_servers.get("echo").unwrap().clone();
//! let admitted = admit_lenient("echo", raw);
//! assert_eq!(admitted.config.command, "echo");
//! ```

pub mod env;
pub mod error;
pub mod parser;
pub mod types;
pub mod validator;

pub use env::discover_overrides;
pub use error::{ConfigError, Result};
pub use parser::{default_config_path, load_config_file, parse_config_from_str};
pub use types::{DockerConfig, DockerConfigRaw, McpConfigFile, RiskLevel, ServerConfig, ServerConfigRaw};
pub use validator::{admit_lenient, admit_strict, Admitted};
