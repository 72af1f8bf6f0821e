//! Backend Process Handle (C1): owns one spawned child — stdin writer,
//! stdout/stderr readers, exit watcher.

use crate::codec::LineFramer;
use crate::dispatch::Dispatcher;
use crate::error::{GatewayError, Result};
use std::process::Stdio;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;

/// Per-backend initialization state (§3 `ServerRecord.initState`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    Starting,
    Initialized,
    Timeout,
    Error,
}

impl InitState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => InitState::Initialized,
            2 => InitState::Timeout,
            3 => InitState::Error,
            _ => InitState::Starting,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            InitState::Starting => 0,
            InitState::Initialized => 1,
            InitState::Timeout => 2,
            InitState::Error => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InitState::Starting => "starting",
            InitState::Initialized => "initialized",
            InitState::Timeout => "timeout",
            InitState::Error => "error",
        }
    }
}

/// One spawned backend process and the machinery multiplexing its stdio.
pub struct Backend {
    pub server_id: String,
    pub pid: u32,
    state: AtomicU8,
    dispatcher: Arc<Dispatcher>,
    child: Mutex<Child>,
}

impl Backend {
    /// Spawn `command args` with `env` applied (ordered, §3), piping stdio.
    /// The command/args passed in are already risk-rewritten (see `risk.rs`)
    /// — this module knows nothing about docker.
    pub async fn spawn(
        server_id: impl Into<String>,
        command: &str,
        args: &[String],
        env: &[(String, String)],
    ) -> Result<Arc<Self>> {
        let server_id = server_id.into();
        let mut cmd = Command::new(command);
        cmd.args(args);
        for (k, v) in env {
            cmd.env(k, v);
        }
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            GatewayError::SpawnFailed(server_id.clone(), e.to_string())
        })?;

        let pid = child.id().unwrap_or_default();
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| GatewayError::SpawnFailed(server_id.clone(), "no stdin pipe".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| GatewayError::SpawnFailed(server_id.clone(), "no stdout pipe".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| GatewayError::SpawnFailed(server_id.clone(), "no stderr pipe".into()))?;

        let dispatcher = Arc::new(Dispatcher::new(server_id.clone(), Arc::new(Mutex::new(stdin))));

        let backend = Arc::new(Self {
            server_id: server_id.clone(),
            pid,
            state: AtomicU8::new(InitState::Starting.as_u8()),
            dispatcher: dispatcher.clone(),
            child: Mutex::new(child),
        });

        tokio::spawn(read_stdout(server_id.clone(), stdout, dispatcher));
        tokio::spawn(read_stderr(server_id, stderr));

        Ok(backend)
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn init_state(&self) -> InitState {
        InitState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn set_init_state(&self, state: InitState) {
        self.state.store(state.as_u8(), Ordering::Release);
    }

    /// Kill the child and wait for exit. Idempotent: a second call on an
    /// already-reaped child is a no-op error that callers should ignore.
    pub async fn stop(&self) -> std::io::Result<()> {
        let mut child = self.child.lock().await;
        if child.try_wait()?.is_none() {
            child.start_kill()?;
        }
        child.wait().await?;
        self.dispatcher.fail_all("server stopped");
        Ok(())
    }

    /// Block until the child exits on its own (crash, self-termination).
    pub async fn wait_for_exit(&self) -> std::io::Result<std::process::ExitStatus> {
        let mut child = self.child.lock().await;
        child.wait().await
    }
}

async fn read_stdout(
    server_id: String,
    mut stdout: tokio::process::ChildStdout,
    dispatcher: Arc<Dispatcher>,
) {
    let mut framer = LineFramer::new();
    let mut buf = [0u8; 4096];
    loop {
        eprintln!("DEBUG read_stdout {} about to read", server_id);
        let n = match stdout.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                eprintln!("DEBUG read_stdout {} read {} bytes: {:?}", server_id, n, String::from_utf8_lossy(&buf[..n]));
                n
            }
            Err(e) => {
                eprintln!("[server {}] stdout read error: {}", server_id, e);
                break;
            }
        };
        let (parsed, malformed) = framer.feed(&buf[..n]);
        for line in malformed {
            eprintln!("[server {}] malformed line: {}", server_id, line);
        }
        for value in parsed {
            if !dispatcher.complete(&value) {
                eprintln!(
                    "[server {}] dropped unmatched/id-less frame: {}",
                    server_id, value
                );
            }
        }
    }
    dispatcher.fail_all("backend exited");
}

async fn read_stderr(server_id: String, stderr: tokio::process::ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => eprintln!("[server {} stderr] {}", server_id, line),
            Ok(None) => break,
            Err(e) => {
                eprintln!("[server {} stderr] read error: {}", server_id, e);
                break;
            }
        }
    }
}
