//! CLI entrypoint for roundtable
//!
//! This is the main binary that wires together all layers using
//! dependency injection: configuration is loaded from TOML files, the
//! oracle and participants become subprocess adapters, and the run is
//! reported to the console and optionally to a JSONL transcript.

use anyhow::{Context, Result, bail};
use clap::Parser;
use roundtable_application::{
    ParticipantAgent, RunConversationUseCase, TurnEvent, TurnEventSink,
};
use roundtable_infrastructure::{
    CommandOracle, CommandParticipant, ConfigError, ConfigLoader, FileConfig,
    JsonlTranscriptLogger,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// CLI arguments for roundtable
#[derive(Parser, Debug)]
#[command(name = "roundtable")]
#[command(author, version, about = "Turn-routing orchestrator for cooperating agents")]
#[command(long_about = r#"
Roundtable runs a task through a fixed roster of command-line agents,
one speaker per turn. A routing oracle picks who speaks next; the run
ends when the terminal authority signs off, when the oracle says to
stop, or when the iteration cap is reached.

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./roundtable.toml   Project-level config
3. ~/.config/roundtable/config.toml   Global config

Example:
  roundtable "Add retry logic to the fetch endpoint"
  roundtable --transcript run.jsonl "Fix issue #42"
"#)]
struct Cli {
    /// The task to hand to the roster (the opening message)
    task: Option<String>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress per-round console output
    #[arg(short, long)]
    quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    show_config: bool,

    /// Write a JSONL transcript of turn events to this path
    #[arg(long, value_name = "PATH")]
    transcript: Option<PathBuf>,

    /// Override the configured iteration cap
    #[arg(long, value_name = "N")]
    max_iterations: Option<usize>,
}

/// Prints round separators and participant replies as turn events arrive.
struct ConsoleReporter {
    round: AtomicUsize,
}

impl ConsoleReporter {
    fn new() -> Self {
        Self {
            round: AtomicUsize::new(0),
        }
    }
}

impl TurnEventSink for ConsoleReporter {
    fn on_event(&self, event: &TurnEvent) {
        match event {
            TurnEvent::SpeakerSelected { name } => {
                let round = self.round.fetch_add(1, Ordering::SeqCst) + 1;
                println!();
                println!("-- round {}: {} --", round, name);
            }
            TurnEvent::MessagesAppended { messages } => {
                for message in messages {
                    println!("{}", message.text);
                }
            }
            TurnEvent::Terminated { reason } => {
                println!();
                println!("Conversation ended: {}", reason);
            }
        }
    }
}

/// Forwards each event to every registered sink in order.
struct FanOutSink {
    sinks: Vec<Box<dyn TurnEventSink>>,
}

impl TurnEventSink for FanOutSink {
    fn on_event(&self, event: &TurnEvent) {
        for sink in &self.sinks {
            sink.on_event(event);
        }
    }
}

fn build_agents(config: &FileConfig) -> Result<Vec<Arc<dyn ParticipantAgent>>> {
    let mut agents: Vec<Arc<dyn ParticipantAgent>> = Vec::with_capacity(config.participants.len());
    for section in &config.participants {
        let mut agent =
            CommandParticipant::new(section.profile(), &section.command, section.args.clone())
                .with_context(|| format!("Participant {}", section.name))?;
        if let Some(secs) = section.timeout_secs {
            agent = agent.with_timeout(Duration::from_secs(secs));
        }
        agents.push(Arc::new(agent));
    }
    Ok(agents)
}

fn build_oracle(config: &FileConfig) -> Result<Arc<CommandOracle>> {
    let command = config
        .oracle
        .command
        .as_ref()
        .ok_or(ConfigError::NoOracleCommand)
        .context("Set [oracle] command in roundtable.toml")?;
    let mut oracle = CommandOracle::new(command, config.oracle.args.clone())
        .context("Routing oracle")?;
    if let Some(secs) = config.oracle.timeout_secs {
        oracle = oracle.with_timeout(Duration::from_secs(secs));
    }
    Ok(Arc::new(oracle))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if cli.show_config {
        if let Some(path) = ConfigLoader::global_config_path() {
            println!("Global config:  {}", path.display());
        }
        match ConfigLoader::project_config_path() {
            Some(path) => println!("Project config: {}", path.display()),
            None => println!("Project config: (none found)"),
        }
        return Ok(());
    }

    let Some(task) = cli.task else {
        bail!("A task is required. Pass the opening message as the first argument.");
    };

    info!("Starting roundtable");

    let mut file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("Loading configuration")?
    };
    if let Some(cap) = cli.max_iterations {
        file_config.orchestrator.max_iterations = cap;
    }

    let orchestrator_config = file_config
        .orchestrator_config()
        .context("Invalid configuration")?;

    // === Dependency Injection ===
    let oracle = build_oracle(&file_config)?;
    let agents = build_agents(&file_config)?;

    let mut sinks: Vec<Box<dyn TurnEventSink>> = Vec::new();
    if !cli.quiet {
        sinks.push(Box::new(ConsoleReporter::new()));
    }
    if let Some(path) = &cli.transcript {
        match JsonlTranscriptLogger::new(path) {
            Some(logger) => {
                info!("Writing transcript to {}", logger.path().display());
                sinks.push(Box::new(logger));
            }
            None => warn!("Transcript disabled: could not open {}", path.display()),
        }
    }
    let sink = FanOutSink { sinks };

    // Ctrl-C cancels the run at the next suspension point
    let token = CancellationToken::new();
    let signal_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling run");
            signal_token.cancel();
        }
    });

    let use_case = RunConversationUseCase::new(agents, oracle, orchestrator_config)?
        .with_cancellation_token(token);

    let outcome = use_case.execute(&task, &sink).await?;

    if !cli.quiet {
        println!(
            "Completed after {} turn{} ({})",
            outcome.iterations,
            if outcome.iterations == 1 { "" } else { "s" },
            outcome.reason
        );
    }

    Ok(())
}
