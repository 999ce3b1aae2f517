//! CLI entrypoint for steward
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod args;
mod logging;
mod repl;
mod wiring;

use anyhow::Result;
use args::Cli;
use clap::Parser;
use repl::{StewardRepl, read_snapshot};
use std::sync::Arc;
use steward_domain::session::SessionId;
use steward_infrastructure::config::ConfigLoader;
use tracing::info;
use wiring::ConfigSource;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        println!("Configuration sources (lowest to highest priority):");
        for line in ConfigLoader::describe_sources(cli.config.as_deref()) {
            println!("  {}", line);
        }
        return Ok(());
    }

    let source = ConfigSource {
        explicit: cli.config.clone(),
        files_enabled: !cli.no_config,
    };
    let config = source.load()?;

    let _log_guard = logging::init(cli.verbose, config.logging.dir_path().as_deref())?;
    info!("Starting steward");

    if !config.repl.color {
        colored::control::set_override(false);
    }

    // === Dependency Injection ===
    let orchestrator = Arc::new(wiring::build_orchestrator(&config)?);

    let mut session = SessionId::new(cli.session.clone().unwrap_or_else(|| config.repl.session_id.clone()));
    if let Some(path) = &cli.restore {
        let snapshot = read_snapshot(path)?;
        session = snapshot.state.id.clone();
        orchestrator.restore(snapshot);
    }

    let mut repl = StewardRepl::new(orchestrator, session, source)
        .with_history(config.repl.history_path())
        .with_trace(cli.verbose > 0);
    repl.run().await
}
