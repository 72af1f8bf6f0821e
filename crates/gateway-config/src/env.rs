//! Environment-variable server overrides (§6).
//!
//! For each `MCP_SERVER_<NAME>_COMMAND` found in the process environment, a
//! server named lowercase `<NAME>` is admitted from the matching
//! `_ARGS`/`_ENV`/`_RISK_LEVEL`/`_DOCKER_CONFIG` suffixes.

use crate::types::{DockerConfigRaw, ServerConfigRaw};
use std::collections::HashMap;

const PREFIX: &str = "MCP_SERVER_";
const COMMAND_SUFFIX: &str = "_COMMAND";

/// Scan `vars` (normally `std::env::vars()`) for `MCP_SERVER_<NAME>_COMMAND`
/// entries and build one `ServerConfigRaw` per name found. Parse failures for
/// `_ENV`/`_DOCKER_CONFIG` are logged and the corresponding field is treated
/// as absent, matching §6's "parse failures logged, ignored" rule.
pub fn discover_overrides<I>(vars: I) -> HashMap<String, ServerConfigRaw>
where
    I: IntoIterator<Item = (String, String)>,
{
    let vars: HashMap<String, String> = vars.into_iter().collect();
    let mut out = HashMap::new();

    for key in vars.keys() {
        let Some(name) = key
            .strip_prefix(PREFIX)
            .and_then(|rest| rest.strip_suffix(COMMAND_SUFFIX))
        else {
            continue;
        };
        if name.is_empty() {
            continue;
        }

        let server_id = name.to_lowercase();
        let command = vars[key].clone();

        let args = vars
            .get(&format!("{}{}_ARGS", PREFIX, name))
            .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_default();

        let env = vars
            .get(&format!("{}{}_ENV", PREFIX, name))
            .and_then(|v| match serde_json::from_str::<serde_json::Value>(v) {
                Ok(value) => ordered_env_from_value(&server_id, value),
                Err(e) => {
                    eprintln!(
                        "[config] server '{}': _ENV is not valid JSON ({}); ignored",
                        server_id, e
                    );
                    None
                }
            })
            .unwrap_or_default();

        let risk_level = vars
            .get(&format!("{}{}_RISK_LEVEL", PREFIX, name))
            .and_then(|v| match v.parse::<u64>() {
                Ok(n) => Some(serde_json::json!(n)),
                Err(_) => {
                    eprintln!(
                        "[config] server '{}': _RISK_LEVEL '{}' is not an integer; ignored",
                        server_id, v
                    );
                    None
                }
            });

        let docker = vars
            .get(&format!("{}{}_DOCKER_CONFIG", PREFIX, name))
            .and_then(
                |v| match serde_json::from_str::<DockerConfigRaw>(v) {
                    Ok(cfg) => Some(cfg),
                    Err(e) => {
                        eprintln!(
                            "[config] server '{}': _DOCKER_CONFIG is not valid ({}); ignored",
                            server_id, e
                        );
                        None
                    }
                },
            );

        out.insert(
            server_id,
            ServerConfigRaw {
                command,
                args,
                env,
                risk_level,
                docker,
            },
        );
    }

    out
}

fn ordered_env_from_value(server_id: &str, value: serde_json::Value) -> Option<Vec<(String, String)>> {
    let serde_json::Value::Object(map) = value else {
        eprintln!(
            "[config] server '{}': _ENV must be a JSON object; ignored",
            server_id
        );
        return None;
    };
    let mut out = Vec::with_capacity(map.len());
    for (k, v) in map {
        match v.as_str() {
            Some(s) => out.push((k, s.to_string())),
            None => {
                eprintln!(
                    "[config] server '{}': _ENV value for '{}' is not a string; ignored",
                    server_id, k
                );
                return None;
            }
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn discovers_a_single_server() {
        let found = discover_overrides(vars(&[
            ("MCP_SERVER_FOO_COMMAND", "echo"),
            ("MCP_SERVER_FOO_ARGS", "a, b ,c"),
            ("UNRELATED", "x"),
        ]));
        let foo = &found["foo"];
        assert_eq!(foo.command, "echo");
        assert_eq!(foo.args, vec!["a", "b", "c"]);
    }

    #[test]
    fn high_risk_without_docker_config_is_still_raw_high() {
        // demotion happens in the validator, not here
        let found = discover_overrides(vars(&[
            ("MCP_SERVER_FOO_COMMAND", "echo"),
            ("MCP_SERVER_FOO_RISK_LEVEL", "3"),
        ]));
        let foo = &found["foo"];
        assert_eq!(foo.risk_level, Some(serde_json::json!(3)));
        assert!(foo.docker.is_none());
    }

    #[test]
    fn invalid_env_json_is_ignored_not_fatal() {
        let found = discover_overrides(vars(&[
            ("MCP_SERVER_FOO_COMMAND", "echo"),
            ("MCP_SERVER_FOO_ENV", "{not json"),
        ]));
        assert!(found["foo"].env.is_empty());
    }

    #[test]
    fn invalid_risk_level_is_ignored() {
        let found = discover_overrides(vars(&[
            ("MCP_SERVER_FOO_COMMAND", "echo"),
            ("MCP_SERVER_FOO_RISK_LEVEL", "not-a-number"),
        ]));
        assert!(found["foo"].risk_level.is_none());
    }

    #[test]
    fn name_with_no_command_is_not_discovered() {
        let found = discover_overrides(vars(&[("MCP_SERVER_FOO_ARGS", "a")]));
        assert!(found.is_empty());
    }
}
