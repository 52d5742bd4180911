use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{PlanParams, SyncParams};

#[derive(Parser)]
#[command(
    name = "visitplan",
    version,
    about = "Working-day aware visit scheduling with remote record synchronization",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML); environment variables are used otherwise
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a visit schedule from unplanned candidates
    Plan {
        /// Candidate JSON file; fetched from the record store when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Schedule output path
        #[arg(short, long, default_value = "schedule.json")]
        output: PathBuf,

        /// First date to consider (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        start: Option<NaiveDate>,

        /// Candidates per working day
        #[arg(long)]
        shops: Option<u32>,

        /// Groups per working day
        #[arg(long)]
        groups: Option<u32>,

        /// Only schedule these regions (repeatable)
        #[arg(long = "region")]
        regions: Vec<String>,

        /// Only schedule these districts (repeatable)
        #[arg(long = "district")]
        districts: Vec<String>,

        /// Leave out restricted-transit candidates
        #[arg(long, default_value = "false")]
        exclude_restricted: bool,
    },

    /// Push a schedule to the record store
    Sync {
        /// Schedule JSON produced by `plan`
        #[arg(short, long, default_value = "schedule.json")]
        schedule: PathBuf,

        /// Override the configured concurrency
        #[arg(long)]
        concurrency: Option<usize>,

        /// Run one extra pass over failed items
        #[arg(long, default_value = "false")]
        retry_failed: bool,

        /// Write items still failing at the end to this file
        #[arg(long)]
        failed_output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = commands::load_config(cli.config.as_deref())?;

    // Initialize tracing/logging
    let log_format = cli.log_format.as_deref().unwrap_or(&config.logging.format);
    setup_tracing(log_format, &config.logging.level, cli.verbose)?;

    tracing::info!("visitplan starting");

    match cli.command {
        Commands::Plan {
            input,
            output,
            start,
            shops,
            groups,
            regions,
            districts,
            exclude_restricted,
        } => {
            tracing::info!(
                input = ?input,
                output = %output.display(),
                start = ?start,
                "Starting plan command"
            );
            commands::plan(
                config,
                PlanParams {
                    input,
                    output,
                    start,
                    shops,
                    groups,
                    regions,
                    districts,
                    exclude_restricted,
                },
            )
            .await?;
        }

        Commands::Sync {
            schedule,
            concurrency,
            retry_failed,
            failed_output,
        } => {
            tracing::info!(
                schedule = %schedule.display(),
                concurrency = ?concurrency,
                retry_failed = %retry_failed,
                "Starting sync command"
            );
            commands::sync(
                config,
                SyncParams {
                    schedule,
                    concurrency,
                    retry_failed,
                    failed_output,
                },
            )
            .await?;
        }
    }

    tracing::info!("visitplan completed successfully");
    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("visitplan=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .or_else(|_| tracing_subscriber::EnvFilter::try_new(format!("visitplan={level},warn")))?
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
