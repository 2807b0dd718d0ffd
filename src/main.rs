// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{error, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use app_config::{Config, ProviderKind};
use app_controller::Controller;

mod app_config;
mod app_controller;
mod checkpoint;
mod document;
mod errors;
mod file_utils;
mod planner;
mod providers;
mod reassembly;
mod segmenter;
mod translator;

/// CLI wrapper for ProviderKind to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliProvider {
    Api,
    Agent,
}

impl From<CliProvider> for ProviderKind {
    fn from(cli_provider: CliProvider) -> Self {
        match cli_provider {
            CliProvider::Api => ProviderKind::Api,
            CliProvider::Agent => ProviderKind::Agent,
        }
    }
}

/// CLI wrapper for log levels to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LevelFilter {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LevelFilter::Error,
            CliLogLevel::Warn => LevelFilter::Warn,
            CliLogLevel::Info => LevelFilter::Info,
            CliLogLevel::Debug => LevelFilter::Debug,
            CliLogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// doctran - checkpointed batch document translation
///
/// Translates the text of an XML document with an AI backend, batch by
/// batch, checkpointing after every batch so an interrupted run can resume.
#[derive(Parser, Debug)]
#[command(name = "doctran")]
#[command(version)]
#[command(about = "AI-powered document translation with checkpointed resume")]
#[command(long_about = "doctran extracts the translatable text of an XML document, translates it \
batch by batch with an AI backend, and reassembles the document preserving its structure and \
encoding.

Progress is checkpointed to <OUTPUT>.state.json after every batch and a running partial snapshot \
is kept at <OUTPUT>.partial, so an interrupted run restarted with the same configuration only \
translates the remaining items.

EXAMPLES:
    doctran --input sutta.xml --output sutta.ko.xml
    doctran --input sutta.xml --output sutta.ko.xml -m gpt-5 --provider agent
    doctran --input sutta.xml --output sutta.ko.xml --max-batch-chars 2000 --no-resume

PROVIDERS:
    api    - Direct HTTP API (requires OPENAI_API_KEY)
    agent  - Subprocess coding agent (codex exec)")]
struct CommandLineOptions {
    /// Input document path
    #[arg(short, long, value_name = "INPUT")]
    input: PathBuf,

    /// Output document path
    #[arg(short, long, value_name = "OUTPUT")]
    output: PathBuf,

    /// Model identifier forwarded to the provider
    #[arg(short, long)]
    model: Option<String>,

    /// Max characters per translation batch
    #[arg(long, default_value_t = 5000)]
    max_batch_chars: usize,

    /// Checkpoint state JSON path (defaults to <OUTPUT>.state.json)
    #[arg(long)]
    state_file: Option<PathBuf>,

    /// Progress log file path (defaults to <OUTPUT>.progress.log)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Ignore an existing checkpoint and start from scratch
    #[arg(long)]
    no_resume: bool,

    /// Translation backend to use
    #[arg(short, long, value_enum, default_value_t = CliProvider::Api)]
    provider: CliProvider,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() {
    let cli = CommandLineOptions::parse();

    let level = cli
        .log_level
        .clone()
        .map(LevelFilter::from)
        .unwrap_or(LevelFilter::Info);
    if let Err(e) = CustomLogger::init(level) {
        eprintln!("ERROR: failed to initialize logger: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: CommandLineOptions) -> Result<()> {
    // The system instruction is process-wide and immutable after startup.
    if let Ok(instruction) = std::env::var("DOCTRAN_SYSTEM_PROMPT") {
        if !instruction.trim().is_empty() {
            translator::set_system_instruction(instruction);
        }
    }

    let config = Config {
        input: cli.input,
        output: cli.output,
        model: cli.model,
        max_batch_chars: cli.max_batch_chars,
        state_file: cli.state_file,
        log_file: cli.log_file,
        resume: !cli.no_resume,
        provider: cli.provider.into(),
    };

    let controller = Controller::with_config(config)?;
    controller.run().await
}
