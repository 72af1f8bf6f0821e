use crate::routes;
use anyhow::{Context, Result};
use gateway_config::{admit_lenient, default_config_path, discover_overrides, load_config_file};
use gateway_runtime::{shutdown, Gateway};
use std::path::Path;

/// Boot the gateway: admit every configured server (file + environment
/// overrides, both lenient per §4.8), start each one, bind the REST
/// listener, then block until a termination signal arrives and every
/// backend has been torn down.
pub async fn execute(config_path: Option<&str>, bind: &str) -> Result<()> {
    let path = config_path
        .map(std::path::PathBuf::from)
        .unwrap_or_else(default_config_path);

    println!("Starting mcp-gateway...");
    println!("  Config: {}", path.display());

    let file = load_config_file(Path::new(&path))
        .with_context(|| format!("failed to parse {}", path.display()))?;

    let gateway = Gateway::new();

    let mut sources = file.mcp_servers;
    sources.extend(discover_overrides(std::env::vars()));

    for (id, raw) in sources {
        let admitted = admit_lenient(&id, raw);
        for warning in &admitted.warnings {
            eprintln!("[config] {}: {}", id, warning);
        }
        match gateway.start_server(&id, admitted.config).await {
            Ok(()) => println!("  started: {}", id),
            Err(e) => eprintln!("[server {}] failed to start: {}", id, e),
        }
    }

    let app = routes::router(gateway.clone());
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {}", bind))?;
    println!("  Listening: {}", bind);
    println!();

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.context("server error")?;
        }
        _ = shutdown::wait_for_signal_and_shutdown(&gateway) => {}
    }

    Ok(())
}
