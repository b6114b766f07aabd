use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use odin_autonomy::{AutonomyGovernor, HealthStatus};
use odin_config::{ConfigLoader, OdinConfig};
use odin_core::{MissionPhase, OdinError, Subsystem};

mod boundaries;
mod evaluate;
mod simulate;

/// ODIN Navigator autonomy governor
#[derive(Parser)]
#[command(name = "odin", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to odin.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level override (e.g. debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all log output (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the decision boundary table
    Boundaries {
        /// Evaluate restrictions and tightening for this mission phase
        #[arg(short, long)]
        phase: Option<MissionPhase>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Evaluate a proposed autonomous action
    Evaluate {
        /// Subsystem that owns the action (power, thermal, comms, ...)
        subsystem: Subsystem,
        /// Action name, e.g. shed_non_critical_loads
        action: String,
        /// Confidence score, 0-100
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        confidence: u8,
        /// Mission phase to evaluate in (defaults to the configured phase)
        #[arg(short, long)]
        phase: Option<MissionPhase>,
        /// Evaluate with emergency mode active
        #[arg(long)]
        emergency: bool,
        /// Reasoning line supplied by the analysis (repeatable)
        #[arg(short, long = "reason")]
        reasons: Vec<String>,
        /// Health of the action's subsystem
        #[arg(long, value_parser = parse_health, default_value = "nominal")]
        health: HealthStatus,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the governor status summary
    Status {
        /// Mission phase to report for (defaults to the configured phase)
        #[arg(short, long)]
        phase: Option<MissionPhase>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run a scripted mission pass and print the governor event stream
    Simulate {
        /// Print events as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Show current configuration
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions for bash, zsh, or fish
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_health(s: &str) -> std::result::Result<HealthStatus, String> {
    match s.to_ascii_lowercase().as_str() {
        "nominal" => Ok(HealthStatus::Nominal),
        "degraded" => Ok(HealthStatus::Degraded),
        "critical" => Ok(HealthStatus::Critical),
        "offline" => Ok(HealthStatus::Offline),
        _ => Err(format!(
            "invalid health `{s}` (expected nominal, degraded, critical, offline)"
        )),
    }
}

impl Cli {
    pub async fn run(self) -> odin_core::Result<()> {
        // Load config first so we can use it for log format
        let config_loader = ConfigLoader::load(self.config.as_deref())?;
        let config = config_loader.get();

        // Resolve log level: --verbose > --quiet > --log-level > config
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            self.log_level
                .as_deref()
                .unwrap_or(config.logging.level.as_str())
        };
        init_logging(&config, log_level)?;

        match self.command {
            Commands::Boundaries { phase, json } => boundaries::cmd_boundaries(&config, phase, json),
            Commands::Evaluate {
                subsystem,
                action,
                confidence,
                phase,
                emergency,
                reasons,
                health,
                json,
            } => evaluate::cmd_evaluate(
                &config,
                evaluate::EvaluateArgs {
                    subsystem,
                    action,
                    confidence,
                    phase,
                    emergency,
                    reasons,
                    health,
                    json,
                },
            ),
            Commands::Status { phase, json } => Self::cmd_status(&config, phase, json),
            Commands::Simulate { json } => simulate::cmd_simulate(&config, json).await,
            Commands::Config { json } => Self::cmd_config(&config, json),
            Commands::Completions { shell } => Self::cmd_completions(shell),
        }
    }

    fn cmd_status(
        config: &OdinConfig,
        phase: Option<MissionPhase>,
        json: bool,
    ) -> odin_core::Result<()> {
        let governor = build_governor(config, phase)?;
        let status = governor.get_autonomy_status();

        if json {
            println!("{}", serde_json::to_string_pretty(&status)?);
            return Ok(());
        }

        println!("\x1b[1mAutonomy Governor\x1b[0m");
        println!("{}", "-".repeat(40));
        println!("  mission phase      {}", status.mission_phase);
        println!(
            "  emergency mode     {}",
            if status.emergency_mode { "\x1b[31mACTIVE\x1b[0m" } else { "off" }
        );
        println!("  operator present   {}", status.operator_present);
        println!("  pending actions    {}", status.pending_actions);
        println!("  urgent actions     {}", status.urgent_actions);
        println!("  recent overrides   {}", status.recent_overrides);
        println!(
            "  boundaries         {} active / {} total",
            status.active_boundaries, status.total_boundaries
        );
        Ok(())
    }

    fn cmd_config(config: &OdinConfig, json: bool) -> odin_core::Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(config)?);
        } else {
            println!(
                "{}",
                toml::to_string_pretty(config).map_err(|e| OdinError::Config(e.to_string()))?
            );
        }
        Ok(())
    }

    fn cmd_completions(shell: Shell) -> odin_core::Result<()> {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "odin", &mut std::io::stdout());
        Ok(())
    }
}

/// Install the tracing subscriber. `RUST_LOG` wins over `level`. Logs go to
/// `logging.file` (appended, no ANSI) when set, stdout otherwise.
fn init_logging(config: &OdinConfig, level: &str) -> odin_core::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    let (writer, ansi) = log_writer(config.logging.file.as_deref())?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi);
    match config.logging.format.as_str() {
        "json" => builder.json().with_target(true).init(),
        "compact" => builder.compact().with_target(false).init(),
        _ => builder.with_target(false).init(),
    }
    Ok(())
}

fn log_writer(file: Option<&Path>) -> odin_core::Result<(BoxMakeWriter, bool)> {
    match file {
        Some(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            Ok((BoxMakeWriter::new(Mutex::new(file)), false))
        }
        None => Ok((BoxMakeWriter::new(std::io::stdout), true)),
    }
}

/// Build a governor from config, optionally switched to `phase`.
fn build_governor(
    config: &OdinConfig,
    phase: Option<MissionPhase>,
) -> odin_core::Result<AutonomyGovernor> {
    let mut governor = AutonomyGovernor::from_config(config)?;
    if let Some(phase) = phase {
        governor.update_mission_phase(phase);
    }
    Ok(governor)
}
