//! # gateway-runtime
//!
//! Subprocess supervision and JSON-RPC request multiplexing for
//! `mcp-gateway`: spawning backend processes, completing their stdio
//! handshake, correlating asynchronous responses to concurrent callers, and
//! interposing the three-tier risk gate.
//!
//! This crate is pure — it has no HTTP dependency and no REST-specific
//! types. [`Gateway`] is the entire surface a front end needs.
//!
//! ## Quick Start
//!
//! ```no_run
//! use gateway_runtime::Gateway;
//! use gateway_config::ServerConfig;
//!
//! # #[tokio::main]
//! # async fn main() -> gateway_runtime::Result<()> {
//! let gateway = Gateway::new();
//! let config = ServerConfig {
//!     command: "my-mcp-server".to_string(),
//!     args: vec![],
//!     env: vec![],
//!     risk_level: None,
//!     docker: None,
//! };
//! gateway.start_server("example", config).await?;
//! let tools = gateway.call("example", "tools/list", serde_json::json!({}), false).await?;
//! # let _ = tools;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod codec;
pub mod confirmation;
pub mod dispatch;
pub mod error;
pub mod facade;
pub mod init;
pub mod registry;
pub mod risk;
pub mod shutdown;
pub mod telemetry;

pub use error::{GatewayError, Result};
pub use facade::{Gateway, ServerSnapshot};
