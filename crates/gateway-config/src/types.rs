use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Risk policy attached to a backend, governing how the gateway dispatches to it.
///
/// Absence of a `RiskLevel` on a `ServerConfig` is a distinct state ("no risk
/// policy applied") from any of the three variants here — see `ServerConfig::risk_level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum RiskLevel {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl RiskLevel {
    pub fn from_u64(value: u64) -> Option<Self> {
        match value {
            1 => Some(RiskLevel::Low),
            2 => Some(RiskLevel::Medium),
            3 => Some(RiskLevel::High),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low risk: dispatched directly with no gating",
            RiskLevel::Medium => "medium risk: requires human confirmation before dispatch",
            RiskLevel::High => "high risk: executed in an isolated container",
        }
    }
}

/// Docker execution environment for a HIGH-risk server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DockerConfig {
    pub image: String,
    #[serde(default)]
    pub volumes: Vec<String>,
    #[serde(default)]
    pub network: Option<String>,
}

/// Admitted, immutable-after-admission server configuration.
///
/// `env` is an ordered list rather than a `HashMap` because the docker argv
/// rewrite for HIGH-risk servers (§4.4a) must emit `-e KEY=VALUE` flags in the
/// same order the keys were written in the source JSON or environment payload.
#[derive(Debug, Clone, Serialize)]
pub struct ServerConfig {
    pub command: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub risk_level: Option<RiskLevel>,
    pub docker: Option<DockerConfig>,
}

/// Wire-format mirror of `ServerConfig` as it appears in the config file, the
/// `POST /servers` body, or an environment-variable override. Deliberately
/// permissive: an invalid `risk_level` or an incomplete `docker` block is not
/// a deserialization error, it is an admission decision (see `validator`).
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ServerConfigRaw {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_ordered_map")]
    pub env: Vec<(String, String)>,
    #[serde(rename = "riskLevel", default)]
    pub risk_level: Option<serde_json::Value>,
    #[serde(default)]
    pub docker: Option<DockerConfigRaw>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DockerConfigRaw {
    pub image: Option<String>,
    #[serde(default)]
    pub volumes: Vec<String>,
    #[serde(default)]
    pub network: Option<String>,
}

/// Root shape of the on-disk/API config: `{ "mcpServers": { "<id>": ServerConfigRaw } }`.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct McpConfigFile {
    #[serde(rename = "mcpServers", default)]
    pub mcp_servers: HashMap<String, ServerConfigRaw>,
}

/// Deserializes a JSON object into an order-preserving `Vec<(String, String)>`,
/// rejecting non-string values. Relies on `serde_json`'s `preserve_order`
/// feature so the vector reflects source order, not hash order.
fn deserialize_ordered_map<'de, D>(deserializer: D) -> std::result::Result<Vec<(String, String)>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error as _;

    let map = serde_json::Map::deserialize(deserializer)?;
    let mut out = Vec::with_capacity(map.len());
    for (key, value) in map {
        let value = value
            .as_str()
            .ok_or_else(|| D::Error::custom(format!("env value for '{}' must be a string", key)))?
            .to_string();
        out.push((key, value));
    }
    Ok(out)
}
