mod commands;
mod error;
mod routes;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "mcp-gateway")]
#[command(about = "Multiplexing gateway for locally-spawned MCP servers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway: spawn every configured server and serve the REST API
    Serve {
        /// Path to the mcp_config.json file (defaults to $MCP_CONFIG_PATH or ./mcp_config.json)
        #[arg(short, long)]
        config: Option<String>,

        /// Address to bind the REST listener to
        #[arg(short, long, default_value = "127.0.0.1:7890")]
        bind: String,
    },

    /// Validate the config file and environment overrides without starting anything
    Check {
        /// Path to the mcp_config.json file (defaults to $MCP_CONFIG_PATH or ./mcp_config.json)
        #[arg(short, long)]
        config: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, bind } => {
            commands::serve::execute(config.as_deref(), &bind).await?;
        }
        Commands::Check { config } => {
            commands::check::execute(config.as_deref())?;
        }
    }

    Ok(())
}
