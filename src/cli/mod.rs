use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::server;
use crate::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "todo-api")]
#[command(about = "User and todo API with JWT bearer authentication")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Interface to bind (overrides HOST)")]
    pub host: Option<String>,

    #[arg(long, global = true, help = "Port to listen on (overrides PORT)")]
    pub port: Option<u16>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve,

    #[command(about = "Create missing database tables and exit")]
    Migrate,
}

impl Cli {
    /// Apply command-line overrides on top of the environment
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env().context("invalid configuration")?;
    cli.apply(&mut config);

    tracing::info!("Starting todo-api in {:?} mode", config.environment);

    let store = DatabaseManager::connect(&config.database)
        .await
        .context("failed to open database")?;
    store.migrate().await.context("failed to migrate database")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Migrate => {
            tracing::info!("Migration complete");
            Ok(())
        }
        Commands::Serve => {
            let bind_addr = config.bind_addr();
            let state = AppState::new(config, store).context("failed to build token service")?;

            let listener = tokio::net::TcpListener::bind(&bind_addr)
                .await
                .with_context(|| format!("failed to bind {}", bind_addr))?;
            tracing::info!("todo-api listening on http://{}", bind_addr);

            server::serve(listener, state, server::shutdown_signal()).await?;
            tracing::info!("Server stopped");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve_without_subcommand() {
        let cli = Cli::try_parse_from(["todo-api"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::try_parse_from(["todo-api", "--port", "4100", "--host", "0.0.0.0", "serve"]).unwrap();
        let mut config = AppConfig::for_tests();
        cli.apply(&mut config);

        assert_eq!(config.bind_addr(), "0.0.0.0:4100");
        assert!(matches!(cli.command, Some(Commands::Serve)));
    }

    #[test]
    fn parses_migrate() {
        let cli = Cli::try_parse_from(["todo-api", "migrate"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Migrate)));
    }
}
