// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info};
use std::io::Write;
use std::path::PathBuf;

use retitle::app_config::{Config, LogLevel};
use retitle::app_controller::{self, Controller};
use retitle::migration::RunOptions;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

// Global so the flags work before or after `run`
#[derive(Args, Debug, Clone, Default)]
struct RunArgs {
    /// Report how many records each step would touch without writing
    #[arg(long, global = true)]
    dry_run: bool,

    /// Abort when a step matches no records
    #[arg(long, global = true)]
    require_matches: bool,

    /// Record completed steps and resume after the last one
    #[arg(long, global = true)]
    checkpoint: bool,

    /// Forget recorded steps of this plan before running
    #[arg(long, global = true, requires = "checkpoint")]
    reset_checkpoints: bool,
}

impl From<RunArgs> for RunOptions {
    fn from(args: RunArgs) -> Self {
        RunOptions {
            dry_run: args.dry_run,
            require_matches: args.require_matches,
            checkpoint: args.checkpoint,
            reset_checkpoints: args.reset_checkpoints,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the migration plan (default command)
    Run,

    /// Print the plan without touching the database
    Plan,

    /// Print record counts for every title the plan mentions
    Status,

    /// Generate shell completions for retitle
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// retitle - version title migrations for a text corpus
#[derive(Parser, Debug)]
#[command(name = "retitle")]
#[command(version)]
#[command(about = "Rename version titles across corpus texts and history")]
#[command(long_about = "retitle renames version titles in the texts and history tables of a corpus
database, then deletes the versions that were moved aside.

Without a config file it runs the built-in plan that gives the Westminster
Leningrad Codex the names of the legacy Tanach versions.

EXAMPLES:
    retitle                                  # Run the built-in plan on the default database
    retitle --dry-run                        # Show what each step would touch
    retitle -d corpus.db run --checkpoint    # Resume-safe run on a given database
    retitle plan                             # Print the plan and its fingerprint
    retitle status                           # Count records per title
    retitle completions bash > retitle.bash  # Generate bash completions")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long = "config", default_value = "retitle.json", global = true)]
    config_path: PathBuf,

    /// Database file (overrides the config file)
    #[arg(short, long, env = "RETITLE_DATABASE", global = true)]
    database: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,

    #[command(flatten)]
    run: RunArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI color for log level
    fn decoration(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌ ", "1;31"),
            Level::Warn => ("🚧 ", "1;33"),
            Level::Info => ("", "1;32"),
            Level::Debug => ("🔍 ", "1;36"),
            Level::Trace => ("📋 ", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (emoji, color) = Self::decoration(record.level());

            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {}{}\x1B[0m",
                color,
                now,
                emoji,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the config is known
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "retitle", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = Config::load(&cli.config_path)?;
    if let Some(database) = &cli.database {
        config.database_path = Some(database.clone());
    }
    if let Some(level) = cli.log_level {
        config.log_level = level.into();
    }
    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;

    match cli.command {
        Some(Commands::Plan) => {
            print!("{}", controller.describe_plan());
        }
        Some(Commands::Status) => {
            let repo = controller.open_repository()?;
            let rows = controller.status(&repo).await?;
            print!("{}", app_controller::format_status(&rows));
        }
        // Handled before the config was loaded
        Some(Commands::Completions { .. }) => {}
        Some(Commands::Run) | None => run(&controller, cli.run.into()).await?,
    }

    Ok(())
}

async fn run(controller: &Controller, options: RunOptions) -> Result<()> {
    let report = controller.run(options).await?;

    if report.dry_run {
        print!("{}", app_controller::format_report(&report));
    } else {
        info!(
            "Done: {} record(s) affected in {} step(s)",
            report.total_affected(),
            report.executed_steps()
        );
    }

    Ok(())
}
