//! Risk Gate (C5): spawn-time docker rewrite and dispatch-time gating.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use gateway_config::{DockerConfig, RiskLevel, ServerConfig};
use serde_json::Value;

/// Command and args actually exec'd for `config`, and `env` to apply to the
/// child process. For LOW/MEDIUM/unset this is the original command as-is;
/// for HIGH it is the deterministic `docker run --rm ...` rewrite of §4.4a.
/// `env` is always returned so the caller applies it uniformly — for the
/// docker rewrite the env vars are baked into `-e` flags instead, so the
/// returned env is empty in that case.
pub struct SpawnPlan {
    pub command: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub original_command: String,
}

pub fn plan_spawn(config: &ServerConfig) -> SpawnPlan {
    match (config.risk_level, &config.docker) {
        (Some(RiskLevel::High), Some(docker)) => docker_rewrite(config, docker),
        _ => SpawnPlan {
            command: config.command.clone(),
            args: config.args.clone(),
            env: config.env.clone(),
            original_command: config.command.clone(),
        },
    }
}

fn docker_rewrite(config: &ServerConfig, docker: &DockerConfig) -> SpawnPlan {
    let mut argv = vec!["run".to_string(), "--rm".to_string()];

    for (key, value) in &config.env {
        argv.push("-e".to_string());
        argv.push(format!("{}={}", key, value));
    }

    for volume in &docker.volumes {
        argv.push("-v".to_string());
        argv.push(volume.clone());
    }

    if let Some(network) = &docker.network {
        argv.push("--network".to_string());
        argv.push(network.clone());
    }

    argv.push(docker.image.clone());

    if config.command != "npm" && config.command != "npx" {
        argv.push(config.command.clone());
    }

    argv.extend(config.args.iter().cloned());

    SpawnPlan {
        command: "docker".to_string(),
        args: argv,
        env: Vec::new(),
        original_command: config.command.clone(),
    }
}

pub fn confirmation_ttl() -> ChronoDuration {
    ChronoDuration::minutes(10)
}

/// Outcome of applying the dispatch-time gate (§4.4b) before a call reaches
/// the backend.
pub enum Gate {
    /// Dispatch as-is.
    Proceed,
    /// Park as a pending confirmation instead of dispatching.
    RequireConfirmation(Value),
    /// Dispatch, then merge `execution_environment` into the result.
    WrapWithEnvironment(Value),
}

/// Would this call be parked as a MEDIUM confirmation rather than dispatched?
/// Cheap and pure so the facade can check it before minting a confirmation
/// id (the id itself is owned by the Confirmation Store, not the gate).
pub fn wants_confirmation(config: &ServerConfig, method: &str, pre_approved: bool) -> bool {
    matches!(config.risk_level, Some(RiskLevel::Medium)) && method == "tools/call" && !pre_approved
}

/// Decide how to handle a call before it reaches the backend. Call
/// `wants_confirmation` first; when it is true, mint `confirmation_id` via
/// the Confirmation Store before calling this.
#[allow(clippy::too_many_arguments)]
pub fn gate_dispatch(
    config: &ServerConfig,
    server_id: &str,
    confirmation_id: &str,
    method: &str,
    params: &Value,
    now: DateTime<Utc>,
    pre_approved: bool,
) -> Gate {
    match config.risk_level {
        None | Some(RiskLevel::Low) => Gate::Proceed,
        Some(RiskLevel::Medium) => {
            if !wants_confirmation(config, method, pre_approved) {
                Gate::Proceed
            } else {
                let expires_at = now + confirmation_ttl();
                Gate::RequireConfirmation(serde_json::json!({
                    "requires_confirmation": true,
                    "confirmation_id": confirmation_id,
                    "risk_level": RiskLevel::Medium as u8,
                    "risk_description": RiskLevel::Medium.description(),
                    "server_id": server_id,
                    "method": method,
                    "tool_name": params.get("name").cloned().unwrap_or(Value::Null),
                    "expires_at": expires_at.to_rfc3339(),
                }))
            }
        }
        Some(RiskLevel::High) => {
            let image = config
                .docker
                .as_ref()
                .map(|d| d.image.clone())
                .unwrap_or_default();
            Gate::WrapWithEnvironment(serde_json::json!({
                "execution_environment": {
                    "risk_level": RiskLevel::High as u8,
                    "risk_description": RiskLevel::High.description(),
                    "docker": true,
                    "docker_image": image,
                }
            }))
        }
    }
}

/// Merge an `execution_environment` annotation into a dispatch result.
pub fn merge_environment(mut result: Value, annotation: Value) -> Value {
    if let (Value::Object(result_map), Value::Object(annotation_map)) = (&mut result, annotation) {
        for (k, v) in annotation_map {
            result_map.insert(k, v);
        }
        result
    } else {
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_config::DockerConfig;

    fn high_config() -> ServerConfig {
        ServerConfig {
            command: "node".to_string(),
            args: vec!["server.js".to_string()],
            env: vec![("A".to_string(), "1".to_string()), ("B".to_string(), "2".to_string())],
            risk_level: Some(RiskLevel::High),
            docker: Some(DockerConfig {
                image: "img:1".to_string(),
                volumes: vec!["/host:/container".to_string()],
                network: Some("bridge".to_string()),
            }),
        }
    }

    #[test]
    fn docker_rewrite_matches_deterministic_ordering() {
        let plan = plan_spawn(&high_config());
        assert_eq!(plan.command, "docker");
        assert_eq!(
            plan.args,
            vec![
                "run", "--rm", "-e", "A=1", "-e", "B=2", "-v", "/host:/container",
                "--network", "bridge", "img:1", "node", "server.js",
            ]
        );
        assert_eq!(plan.original_command, "node");
    }

    #[test]
    fn npm_command_is_not_appended_after_image() {
        let mut config = high_config();
        config.command = "npx".to_string();
        config.args = vec!["some-mcp-server".to_string()];
        let plan = plan_spawn(&config);
        assert!(!plan.args.contains(&"npx".to_string()));
        assert!(plan.args.contains(&"some-mcp-server".to_string()));
    }

    #[test]
    fn low_risk_is_not_rewritten() {
        let config = ServerConfig {
            command: "echo".to_string(),
            args: vec![],
            env: vec![],
            risk_level: Some(RiskLevel::Low),
            docker: None,
        };
        let plan = plan_spawn(&config);
        assert_eq!(plan.command, "echo");
    }

    #[test]
    fn medium_tools_call_requires_confirmation() {
        let config = ServerConfig {
            command: "echo".to_string(),
            args: vec![],
            env: vec![],
            risk_level: Some(RiskLevel::Medium),
            docker: None,
        };
        let gate = gate_dispatch(
            &config,
            "s",
            "c1",
            "tools/call",
            &serde_json::json!({"name": "t"}),
            Utc::now(),
            false,
        );
        assert!(matches!(gate, Gate::RequireConfirmation(_)));
    }

    #[test]
    fn medium_preapproved_proceeds() {
        let config = ServerConfig {
            command: "echo".to_string(),
            args: vec![],
            env: vec![],
            risk_level: Some(RiskLevel::Medium),
            docker: None,
        };
        let gate = gate_dispatch(
            &config,
            "s",
            "c1",
            "tools/call",
            &serde_json::json!({}),
            Utc::now(),
            true,
        );
        assert!(matches!(gate, Gate::Proceed));
    }

    #[test]
    fn high_wraps_with_execution_environment() {
        let gate = gate_dispatch(
            &high_config(),
            "s",
            "c1",
            "tools/call",
            &serde_json::json!({}),
            Utc::now(),
            false,
        );
        let Gate::WrapWithEnvironment(annotation) = gate else {
            panic!("expected WrapWithEnvironment");
        };
        let merged = merge_environment(serde_json::json!({"ok": true}), annotation);
        assert_eq!(merged["execution_environment"]["docker_image"], "img:1");
    }
}
