//! Headless combat client.
//!
//! Drives the client from JSON commands without a renderer. Designed for CI
//! transcript checks and manual debugging.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode - read commands from stdin
//! cargo run -p knights_headless
//!
//! # Replay a transcript as the red team
//! cargo run -p knights_headless -- run --transcript match.jsonl --team 1
//!
//! # Check a config file
//! cargo run -p knights_headless -- validate-config --path client.ron
//! ```
//!
//! # Protocol
//!
//! Input (stdin or transcript): JSON commands, one per line
//! Output (stdout): JSON responses, one per line
//! Logs (stderr): Debug information

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use knights_client::{load_config_from_file, ClientConfig};
use knights_headless::runner::{HeadlessConfig, HeadlessRunner, RunnerError};

#[derive(Parser)]
#[command(name = "knights_headless")]
#[command(about = "Headless combat client for transcript replay and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive one client session
    Run {
        /// Transcript to replay instead of reading stdin
        #[arg(short, long)]
        transcript: Option<PathBuf>,

        /// Client configuration (RON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the configured team
        #[arg(long)]
        team: Option<u8>,

        /// Enable training-mode highlights
        #[arg(long)]
        training: bool,

        /// Output state after every command
        #[arg(long)]
        auto_state: bool,

        /// Stop on the first malformed command
        #[arg(long)]
        strict: bool,
    },

    /// Load and validate a client configuration
    ValidateConfig {
        /// Config file to check
        #[arg(short, long)]
        path: PathBuf,
    },
}

struct RunArgs {
    transcript: Option<PathBuf>,
    config: Option<PathBuf>,
    team: Option<u8>,
    training: bool,
    auto_state: bool,
    strict: bool,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for protocol)
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match cli.command {
        Some(Commands::Run {
            transcript,
            config,
            team,
            training,
            auto_state,
            strict,
        }) => cmd_run(RunArgs {
            transcript,
            config,
            team,
            training,
            auto_state,
            strict,
        }),
        Some(Commands::ValidateConfig { path }) => cmd_validate_config(path),
        None => cmd_run(RunArgs {
            transcript: None,
            config: None,
            team: None,
            training: false,
            auto_state: false,
            strict: false,
        }),
    }
}

/// Run one session from stdin or a transcript
fn cmd_run(args: RunArgs) {
    let mut client_config = match args.config {
        Some(path) => match load_config_from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load config");
                eprintln!("FATAL: {e}");
                std::process::exit(1);
            }
        },
        None => ClientConfig::default(),
    };
    if let Some(team) = args.team {
        client_config.team = team;
    }
    client_config.training_mode |= args.training;

    let mut runner = HeadlessRunner::new(
        client_config,
        HeadlessConfig {
            auto_state: args.auto_state,
            strict: args.strict,
        },
    );

    let stdout = io::stdout();
    let result: Result<_, RunnerError> = match args.transcript {
        Some(path) => {
            tracing::info!(path = %path.display(), "Replaying transcript");
            match File::open(&path) {
                Ok(file) => runner.run(BufReader::new(file), stdout.lock()),
                Err(e) => Err(RunnerError::Io(e)),
            }
        }
        None => {
            tracing::info!("Starting interactive session");
            runner.run(io::stdin().lock(), stdout.lock())
        }
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Run failed");
        eprintln!("FATAL: {e}");
        std::process::exit(1);
    }
}

/// Load a config file and report every problem
fn cmd_validate_config(path: PathBuf) {
    match load_config_from_file(&path) {
        Ok(config) => {
            tracing::info!(path = %path.display(), team = config.team, "Config is valid");
            eprintln!("OK: {}", path.display());
        }
        Err(e) => {
            tracing::error!(error = %e, path = %path.display(), "Config rejected");
            eprintln!("INVALID: {e}");
            std::process::exit(1);
        }
    }
}
