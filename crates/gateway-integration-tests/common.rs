//! Stub MCP backends used across the integration/e2e test binaries.
//!
//! Each helper returns a `(command, args)` pair spawning a `bash -c` one-liner
//! that behaves like a minimal MCP server over line-delimited JSON-RPC: it
//! answers `initialize` directly, swallows `notifications/initialized`, and
//! for everything else either echoes back a correlated result or logs what
//! it received to a file the test can inspect afterward.

use std::sync::Mutex;

pub static PATH_GUARD: Mutex<()> = Mutex::new(());

/// Extracts the request id (quoted or bare) and echoes
/// `{"result":{"echo":<id>}}` for every non-handshake line.
pub fn echo_stub() -> (String, Vec<String>) {
    let script = r#"
while IFS= read -r line; do
  case "$line" in
    *'"method":"initialize"'*)
      printf '%s\n' '{"jsonrpc":"2.0","id":1,"result":{"protocolVersion":"2025-03-26"}}'
      ;;
    *'"method":"notifications/initialized"'*)
      ;;
    *)
      id=$(printf '%s' "$line" | sed -n 's/.*"id":\("[^"]*"\|[0-9][0-9]*\).*/\1/p')
      if [ -n "$id" ]; then
        sleep 0.0$((RANDOM % 4))
        printf '{"jsonrpc":"2.0","id":%s,"result":{"echo":%s}}\n' "$id" "$id"
      fi
      ;;
  esac
done
"#;
    ("bash".to_string(), vec!["-c".to_string(), script.to_string()])
}

/// Like [`echo_stub`] but appends every non-handshake line, verbatim, to
/// `log_path` instead of racing to reply — used to assert a gated call
/// never reached the backend.
pub fn logging_stub(log_path: &std::path::Path) -> (String, Vec<String>) {
    let script = r#"
log="$1"
while IFS= read -r line; do
  case "$line" in
    *'"method":"initialize"'*)
      printf '%s\n' '{"jsonrpc":"2.0","id":1,"result":{"protocolVersion":"2025-03-26"}}'
      ;;
    *'"method":"notifications/initialized"'*)
      ;;
    *)
      printf '%s\n' "$line" >> "$log"
      id=$(printf '%s' "$line" | sed -n 's/.*"id":\("[^"]*"\|[0-9][0-9]*\).*/\1/p')
      if [ -n "$id" ]; then
        printf '{"jsonrpc":"2.0","id":%s,"result":{"ok":true}}\n' "$id"
      fi
      ;;
  esac
done
"#;
    (
        "bash".to_string(),
        vec![
            "-c".to_string(),
            script.to_string(),
            "stub".to_string(),
            log_path.display().to_string(),
        ],
    )
}

/// Handshakes normally, then never answers anything else — for the timeout
/// scenario.
pub fn silent_stub() -> (String, Vec<String>) {
    let script = r#"
while IFS= read -r line; do
  case "$line" in
    *'"method":"initialize"'*)
      printf '%s\n' '{"jsonrpc":"2.0","id":1,"result":{"protocolVersion":"2025-03-26"}}'
      ;;
    *)
      ;;
  esac
done
"#;
    ("bash".to_string(), vec!["-c".to_string(), script.to_string()])
}

/// Installs a fake `docker` executable (which just behaves like
/// [`echo_stub`]) at the front of `PATH` for the duration of the returned
/// guard's lifetime, restoring the previous `PATH` on drop. Callers must
/// hold [`PATH_GUARD`] for the guard's lifetime since `PATH` is process-wide.
pub struct FakeDockerPath {
    _dir: tempfile::TempDir,
    previous: Option<String>,
}

impl FakeDockerPath {
    pub fn install() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let docker_path = dir.path().join("docker");
        std::fs::write(
            &docker_path,
            "#!/bin/bash\n".to_string()
                + r#"
while IFS= read -r line; do
  id=$(printf '%s' "$line" | sed -n 's/.*"id":\("[^"]*"\|[0-9][0-9]*\).*/\1/p')
  if [ -n "$id" ]; then
    printf '{"jsonrpc":"2.0","id":%s,"result":{"echo":%s}}\n' "$id" "$id"
  fi
done
"#,
        )
        .unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&docker_path, std::fs::Permissions::from_mode(0o755)).unwrap();
        }

        let previous = std::env::var("PATH").ok();
        let new_path = match &previous {
            Some(p) => format!("{}:{}", dir.path().display(), p),
            None => dir.path().display().to_string(),
        };
        std::env::set_var("PATH", new_path);

        Self { _dir: dir, previous }
    }
}

impl Drop for FakeDockerPath {
    fn drop(&mut self) {
        match &self.previous {
            Some(p) => std::env::set_var("PATH", p),
            None => std::env::remove_var("PATH"),
        }
    }
}
