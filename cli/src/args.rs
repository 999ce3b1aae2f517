//! Command-line arguments

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for steward
#[derive(Parser, Debug)]
#[command(name = "steward")]
#[command(author, version, about = "Personal assistant that routes, confirms and runs tool calls")]
#[command(long_about = r#"
Steward turns each request into a plan, runs the tools it needs and replies.

Every request goes through the same steps:
1. Routing: small talk is answered directly, everything else is planned
2. Confirmation: risky tool calls wait for yes / no / edit
3. Finalization: the reply comes from the fast or the quality backend

Configuration files are loaded from (lowest to highest priority):
1. ~/.config/steward/config.toml      Global config
2. ./steward.toml or ./.steward.toml  Project-level config
3. --config <path>                    Explicit config file
4. STEWARD_* environment variables    e.g. STEWARD_POLICY__CONFIRM_MODERATE=true

Example:
  steward
  steward --config ./assistant.toml -vv
  steward --session work
"#)]
pub struct Cli {
    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Session id (overrides [repl].session_id)
    #[arg(short, long, value_name = "ID")]
    pub session: Option<String>,

    /// Resume a session from a snapshot file
    #[arg(long, value_name = "PATH")]
    pub restore: Option<PathBuf>,
}
