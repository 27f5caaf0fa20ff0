//! ollama-relay binary entry point

use std::path::PathBuf;

use clap::Parser;
use color_eyre::Result;
use ollama_relay::config::{Dialect, RelaySettings};

/// Thin HTTP proxy relaying chat-completion requests to a local Ollama server
#[derive(Debug, Parser)]
#[command(name = "ollama-relay", version, about)]
struct Cli {
    /// Address to bind on
    #[arg(long, env = "RELAY_HOST")]
    host: Option<String>,

    /// Port to bind on
    #[arg(long, env = "RELAY_PORT")]
    port: Option<u16>,

    /// Base URL of the Ollama server
    #[arg(long, env = "RELAY_BACKEND_URL")]
    backend_url: Option<String>,

    /// Backend request timeout in seconds
    #[arg(long, env = "RELAY_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Upstream dialect to speak
    #[arg(long, value_enum, env = "RELAY_DIALECT")]
    dialect: Option<Dialect>,

    /// Path to a JSON settings file
    #[arg(long, env = "RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install error handler
    color_eyre::install()?;

    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        "ollama_relay=debug"
    } else {
        "ollama_relay=info"
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // File settings first, CLI flags win
    let mut settings = match &cli.config {
        Some(path) => RelaySettings::load_from_path(path)?,
        None => RelaySettings::default(),
    };
    if let Some(host) = cli.host {
        settings.host = host;
    }
    if let Some(port) = cli.port {
        settings.port = port;
    }
    if let Some(backend_url) = cli.backend_url {
        settings.backend_url = backend_url;
    }
    if let Some(timeout_secs) = cli.timeout_secs {
        settings.timeout_secs = timeout_secs;
    }
    if let Some(dialect) = cli.dialect {
        settings.dialect = dialect;
    }

    ollama_relay::server::serve(&settings).await?;

    Ok(())
}
