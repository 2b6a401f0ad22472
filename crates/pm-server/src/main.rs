//! PawMe Connect server binary

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pm_config::ConfigManager;
use pm_oauth::ConnectionStore;
use pm_server::state::AppState;

/// PawMe Connect - social platform connections for the PawMe admin dashboard
#[derive(Parser, Debug)]
#[command(name = "pawme-connect")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Address to bind (overrides the configured host)
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides the configured port)
    #[arg(long)]
    port: Option<u16>,

    /// Path to settings.yaml (defaults to the OS config location)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "pm_server=info,pm_oauth=info,pm_providers=info,pm_config=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    info!("Starting PawMe Connect...");

    let config_manager = match cli.config {
        Some(path) => ConfigManager::load_from_path(path).await?,
        None => ConfigManager::load().await?,
    };
    info!(
        "Configuration loaded from {}",
        config_manager.config_path().display()
    );

    let store = ConnectionStore::new(pm_config::paths::connections_file()?).await?;

    let state = AppState::new(Arc::new(config_manager), Arc::new(store));
    info!("Supported providers: {}", state.registry.names().join(", "));

    let server = state.config.get().server;
    let host = cli.host.unwrap_or(server.host);
    let port = cli.port.unwrap_or(server.port);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    pm_server::serve(state, addr).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["pawme-connect"]).unwrap();
        assert!(cli.host.is_none());
        assert!(cli.port.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::try_parse_from([
            "pawme-connect",
            "--host",
            "0.0.0.0",
            "--port",
            "9000",
            "--config",
            "/tmp/settings.yaml",
        ])
        .unwrap();

        assert_eq!(cli.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(cli.port, Some(9000));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/settings.yaml")));
    }

    #[test]
    fn test_cli_rejects_bad_port() {
        let cli = Cli::try_parse_from(["pawme-connect", "--port", "not-a-port"]);
        assert!(cli.is_err());
    }
}
