use crate::{ConfigError, McpConfigFile, Result};
use std::path::Path;

/// Parse the `{ "mcpServers": {...} }` JSON document from a string.
pub fn parse_config_from_str(json: &str) -> Result<McpConfigFile> {
    serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load the config file at `path`. A missing file is not an error — it
/// yields an empty `McpConfigFile`, matching §6's "missing file is not an
/// error" rule.
pub fn load_config_file(path: &Path) -> Result<McpConfigFile> {
    if !path.exists() {
        return Ok(McpConfigFile::default());
    }

    let content =
        std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;

    parse_config_from_str(&content)
}

/// Resolve the config file path from `$MCP_CONFIG_PATH`, falling back to
/// `./mcp_config.json`.
pub fn default_config_path() -> std::path::PathBuf {
    std::env::var("MCP_CONFIG_PATH")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| std::path::PathBuf::from("./mcp_config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let json = r#"{
            "mcpServers": {
                "echo": { "command": "echo", "args": ["hi"] }
            }
        }"#;
        let config = parse_config_from_str(json).unwrap();
        assert_eq!(config.mcp_servers.len(), 1);
        let echo = &config.mcp_servers["echo"];
        assert_eq!(echo.command, "echo");
        assert_eq!(echo.args, vec!["hi".to_string()]);
    }

    #[test]
    fn parse_invalid_json_is_a_parse_error() {
        let result = parse_config_from_str("not json at all {{{");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn missing_file_yields_empty_config() {
        let config = load_config_file(Path::new("/nonexistent/mcp_config.json")).unwrap();
        assert!(config.mcp_servers.is_empty());
    }

    #[test]
    fn env_preserves_insertion_order() {
        let json = r#"{
            "mcpServers": {
                "s": {
                    "command": "x",
                    "env": { "FIRST": "1", "SECOND": "2", "THIRD": "3" }
                }
            }
        }"#;
        let config = parse_config_from_str(json).unwrap();
        let env = &config.mcp_servers["s"].env;
        assert_eq!(
            env,
            &vec![
                ("FIRST".to_string(), "1".to_string()),
                ("SECOND".to_string(), "2".to_string()),
                ("THIRD".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn loads_real_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mcp_config.json");
        std::fs::write(&path, r#"{"mcpServers":{"a":{"command":"true"}}}"#).unwrap();
        let config = load_config_file(&path).unwrap();
        assert_eq!(config.mcp_servers.len(), 1);
    }
}
