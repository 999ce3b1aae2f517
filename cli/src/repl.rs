//! Interactive REPL

use crate::wiring::{ConfigSource, report_issues};
use colored::Colorize;
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use steward_application::{Orchestrator, ReplyKind, TurnOutcome};
use steward_domain::session::{SessionId, SessionSnapshot};
use steward_infrastructure::config::build_risk_registry;
use tracing::warn;

const HISTORY_CAPACITY: usize = 1000;

/// Result of a slash command
enum CommandResult {
    Exit,
    Continue,
}

/// Interactive REPL over one session
pub struct StewardRepl {
    orchestrator: Arc<Orchestrator>,
    session: SessionId,
    source: ConfigSource,
    history_path: Option<PathBuf>,
    show_trace: bool,
}

impl StewardRepl {
    pub fn new(orchestrator: Arc<Orchestrator>, session: SessionId, source: ConfigSource) -> Self {
        Self {
            orchestrator,
            session,
            source,
            history_path: None,
            show_trace: false,
        }
    }

    pub fn with_history(mut self, path: Option<PathBuf>) -> Self {
        self.history_path = path;
        self
    }

    /// Print route, tier and call results under each reply
    pub fn with_trace(mut self, show: bool) -> Self {
        self.show_trace = show;
        self
    }

    fn editor(&self) -> Reedline {
        let editor = Reedline::create();
        let Some(path) = &self.history_path else {
            return editor;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match FileBackedHistory::with_file(HISTORY_CAPACITY, path.clone()) {
            Ok(history) => editor.with_history(Box::new(history)),
            Err(e) => {
                warn!("History disabled: {}", e);
                editor
            }
        }
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let mut editor = self.editor();
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("steward".to_string()),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome();

        loop {
            match editor.read_line(&prompt) {
                Ok(Signal::Success(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if line.starts_with('/') {
                        match self.handle_command(line).await {
                            CommandResult::Exit => break,
                            CommandResult::Continue => continue,
                        }
                    }
                    self.process(line).await;
                }
                Ok(Signal::CtrlC) => {
                    println!("^C");
                    continue;
                }
                Ok(_) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "steward - personal assistant".cyan().bold());
        println!("{} {}", "Session:".bold(), self.session);
        println!("Type {} for commands, {} to exit.", "/help".cyan(), "/quit".cyan());
        println!();
    }

    async fn process(&self, line: &str) {
        match self.orchestrator.handle_turn(&self.session, line).await {
            Ok(outcome) => self.print_outcome(&outcome),
            Err(e) => eprintln!("{} {}", "Error:".red().bold(), e),
        }
    }

    fn print_outcome(&self, outcome: &TurnOutcome) {
        let reply = match outcome.kind {
            ReplyKind::Answer => outcome.reply.normal(),
            ReplyKind::ConfirmationPrompt => outcome.reply.yellow().bold(),
            ReplyKind::Reprompt => outcome.reply.yellow(),
            ReplyKind::MenuPrompt => outcome.reply.cyan(),
        };
        println!("{}", reply);

        if self.show_trace {
            let route = outcome.route.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string());
            let intent = outcome.intent.as_deref().unwrap_or("-");
            let tier = outcome.tier.map(|t| t.to_string()).unwrap_or_else(|| "-".to_string());
            println!(
                "{}",
                format!("[turn {} {}/{} tier={} phase={}]", outcome.turn, route, intent, tier, outcome.phase).dimmed()
            );
            for call in &outcome.calls {
                println!("{}", format!("  {} {} ({})", call.id, call.name, call.status).dimmed());
            }
        }
        println!();
    }

    async fn handle_command(&mut self, line: &str) -> CommandResult {
        let mut parts = line.splitn(2, char::is_whitespace);
        let command = parts.next().unwrap_or_default();
        let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());

        match command {
            "/quit" | "/exit" | "/q" => {
                println!("Bye!");
                return CommandResult::Exit;
            }
            "/help" | "/h" | "/?" => print_help(),
            "/reload" => self.reload(),
            "/snapshot" => self.snapshot(arg.map(Path::new)).await,
            "/restore" => match arg {
                Some(path) => self.restore(Path::new(path)),
                None => println!("Usage: /restore <path>"),
            },
            "/new" => {
                self.orchestrator.end_session(&self.session);
                println!("Started a fresh session {}.", self.session);
            }
            other => println!("Unknown command: {}. Type /help.", other),
        }
        CommandResult::Continue
    }

    /// Re-read configuration and swap in the new risk registry.
    fn reload(&self) {
        let registry = self.source.load().and_then(|config| {
            report_issues(&config.risk.validate());
            Ok(build_risk_registry(&config.risk)?)
        });
        match registry {
            Ok(registry) => {
                self.orchestrator.reload_risk_registry(registry);
                println!("{}", "Risk registry reloaded.".green());
            }
            Err(e) => eprintln!("{} {:#}", "Reload failed:".red().bold(), e),
        }
    }

    async fn snapshot(&self, path: Option<&Path>) {
        let json = match self.orchestrator.snapshot(&self.session).await {
            Ok(snapshot) => snapshot.to_json(),
            Err(e) => {
                println!("Nothing to snapshot yet ({}).", e);
                return;
            }
        };
        match (json, path) {
            (Ok(json), Some(path)) => match std::fs::write(path, json) {
                Ok(()) => println!("Snapshot written to {}.", path.display()),
                Err(e) => eprintln!("{} {}", "Cannot write snapshot:".red().bold(), e),
            },
            (Ok(json), None) => println!("{}", json),
            (Err(e), _) => eprintln!("{} {}", "Snapshot failed:".red().bold(), e),
        }
    }

    fn restore(&mut self, path: &Path) {
        match read_snapshot(path) {
            Ok(snapshot) => {
                self.session = snapshot.state.id.clone();
                self.orchestrator.restore(snapshot);
                println!("Restored session {}.", self.session);
            }
            Err(e) => eprintln!("{} {:#}", "Restore failed:".red().bold(), e),
        }
    }
}

/// Load a snapshot file written by `/snapshot <path>`.
pub fn read_snapshot(path: &Path) -> anyhow::Result<SessionSnapshot> {
    let json = std::fs::read_to_string(path)?;
    Ok(SessionSnapshot::from_json(&json)?)
}

fn print_help() {
    println!();
    println!("{}", "Commands:".bold());
    println!("  /help               Show this help");
    println!("  /reload             Re-read the risk registry from configuration");
    println!("  /snapshot [path]    Print the session snapshot, or write it to a file");
    println!("  /restore <path>     Resume a session from a snapshot file");
    println!("  /new                Forget this session and start over");
    println!("  /quit               Exit");
    println!();
    println!("When a tool call needs confirmation, answer yes, no, or edit field=value.");
    println!();
}
