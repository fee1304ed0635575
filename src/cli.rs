//! Command-line interface components.
//!
//! Environment variables are read here and nowhere else: they fill in the
//! explicit `Config` handed to the library.

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::{Config, ExecutorConfig};
use crate::constants::{
    DEFAULT_DB_PORT, DEFAULT_EXECUTOR_PROGRAM, DEFAULT_INPUT_FILE, DEFAULT_OUTPUT_DIR,
    DEFAULT_WORKERS,
};
use crate::execution::CommandExecutorFactory;
use crate::models::{ParsedRecord, ProcessingSummary};
use crate::parser::RecordStream;
use crate::processor::TaskProcessor;

#[derive(Parser, Debug)]
#[command(name = "taskscript")]
#[command(about = "Stream task records and generate verification scripts from their results")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the task records owned by a person
    List(ListArgs),
    /// Execute task records and save verification scripts
    Generate(GenerateArgs),
}

/// Options shared by every command
#[derive(ClapArgs, Debug, Clone)]
pub struct SourceArgs {
    /// Task file to read
    #[arg(
        short = 'i',
        long = "input",
        value_name = "FILE",
        env = "TASKSCRIPT_INPUT",
        default_value = DEFAULT_INPUT_FILE
    )]
    pub input_path: PathBuf,

    /// Owner whose records are selected (exact match)
    #[arg(short = 'O', long = "owner", value_name = "NAME", env = "TASKSCRIPT_OWNER")]
    pub owner: String,

    /// Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only show errors
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,
}

impl SourceArgs {
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output format for records
    #[arg(long = "format", value_enum, default_value = "human")]
    pub format: OutputFormat,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Directory for generated verification scripts
    #[arg(short = 'o', long = "output", value_name = "DIR", default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Number of parallel workers
    #[arg(short = 'j', long = "workers", value_name = "COUNT", default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Size the worker pool to the number of CPU cores
    #[arg(long = "auto-workers", conflicts_with = "workers")]
    pub auto_workers: bool,

    /// Capacity of the work queue (defaults to two slots per worker)
    #[arg(long = "queue-capacity", value_name = "COUNT")]
    pub queue_capacity: Option<usize>,

    /// Client program that executes scripts
    #[arg(
        long = "executor",
        value_name = "PROGRAM",
        env = "TASKSCRIPT_EXECUTOR",
        default_value = DEFAULT_EXECUTOR_PROGRAM
    )]
    pub executor: String,

    /// Extra argument for the executor program (repeatable)
    #[arg(long = "executor-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub executor_args: Vec<String>,

    /// Database host
    #[arg(long = "host", env = "DDB_HOST", default_value = "localhost")]
    pub host: String,

    /// Database port
    #[arg(long = "port", env = "DDB_PORT", default_value_t = DEFAULT_DB_PORT)]
    pub port: u16,

    /// Database user
    #[arg(long = "user", env = "DDB_USER", default_value = "")]
    pub user: String,

    /// Database password
    #[arg(long = "password", env = "DDB_PASSWD", default_value = "", hide_env_values = true)]
    pub password: String,

    /// Disable the progress spinner
    #[arg(long = "no-progress")]
    pub no_progress: bool,
}

impl GenerateArgs {
    /// Build the processing configuration from arguments
    pub fn to_config(&self) -> Config {
        let executor = ExecutorConfig {
            program: self.executor.clone(),
            args: self.executor_args.clone(),
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            password: self.password.clone(),
        };

        let mut config = Config::new(&self.source.input_path, &self.source.owner)
            .with_output_dir(&self.output_dir)
            .with_executor(executor);

        config = if self.auto_workers {
            config.with_auto_workers()
        } else {
            config.with_workers(self.workers)
        };

        if let Some(capacity) = self.queue_capacity {
            config = config.with_queue_capacity(capacity);
        }

        if !self.no_progress && !self.source.quiet {
            config = config.with_progress();
        }

        config
    }
}

/// Output format options for listed records
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// One JSON object per line
    Json,
}

/// Set up structured logging
pub fn setup_logging(source: &SourceArgs) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = source.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("taskscript={}", log_level)));

    // try_init: a subscriber may already be installed (tests)
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .try_init();

    debug!("Logging initialized at level: {}", log_level);
}

/// Run the selected command
pub async fn run(command: Commands, cancellation_token: CancellationToken) -> Result<()> {
    match command {
        Commands::List(args) => {
            setup_logging(&args.source);
            list_records(&args)
        }
        Commands::Generate(args) => {
            setup_logging(&args.source);
            generate_scripts(&args, cancellation_token).await
        }
    }
}

fn list_records(args: &ListArgs) -> Result<()> {
    let mut stream = RecordStream::open(&args.source.input_path, args.source.owner.as_str())
        .with_context(|| format!("Cannot read tasks for {}", args.source.owner))?;

    for record in stream.by_ref() {
        match args.format {
            OutputFormat::Human => print_record(&record),
            OutputFormat::Json => println!("{}", serde_json::to_string(&record)?),
        }
    }

    if let Some(e) = stream.take_error() {
        return Err(e).context("Task file could not be read to the end");
    }

    let stats = stream.stats();
    eprintln!(
        "{} {} of {} records belong to {} ({} skipped, {} malformed)",
        "Listed".bright_green(),
        stats.records_yielded.to_string().bright_white().bold(),
        stats.records_seen,
        args.source.owner.bright_cyan(),
        stats.records_skipped(),
        stats.records_malformed
    );
    Ok(())
}

fn print_record(record: &ParsedRecord) {
    println!(
        "{} {}",
        format!("[{}]", record.id).bright_yellow().bold(),
        record.question.bright_white()
    );
    println!("  {}", "prepareCode:".bright_cyan());
    for line in record.prepare_code.lines() {
        println!("    {}", line);
    }
    println!("  {}", "runCode:".bright_cyan());
    for line in record.run_code.lines() {
        println!("    {}", line);
    }
    println!();
}

async fn generate_scripts(args: &GenerateArgs, cancellation_token: CancellationToken) -> Result<()> {
    let config = args.to_config();
    let factory = CommandExecutorFactory::new(config.executor.clone());
    let processor = TaskProcessor::new(config, factory).context("Invalid configuration")?;

    println!(
        "{} {} ({} workers)",
        "Processing tasks for".bright_green().bold(),
        processor.config().owner_filter.bright_cyan(),
        processor.config().workers
    );

    let summary = processor.run(cancellation_token).await?;
    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &ProcessingSummary) {
    println!("\n{}", "--- Parallel Processing Summary ---".bright_green().bold());
    println!(
        "Total records processed (or attempted): {} out of {} submitted in {:.2?}.",
        summary.processed.to_string().bright_white().bold(),
        summary.submitted,
        summary.elapsed
    );
    if summary.malformed_records > 0 {
        println!(
            "{} {} malformed records were skipped",
            "Warning:".bright_yellow(),
            summary.malformed_records
        );
    }

    if summary.all_succeeded() {
        println!("All tasks processed successfully (or no tasks to process).");
        return;
    }

    println!(
        "{} {:.1}% of processed tasks succeeded",
        "Success rate:".bright_yellow(),
        summary.success_rate()
    );
    println!("\n{}", "--- Details of Failed Tasks ---".bright_red().bold());
    for failure in &summary.failed {
        println!(
            "  ID: {}, Reason: {}",
            failure.id.bright_yellow(),
            failure.message
        );
    }
}
