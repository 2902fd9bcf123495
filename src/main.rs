use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use usage_ingest::accounts::JsonAccountFile;
use usage_ingest::classify_line;
use usage_ingest::config::Config;
use usage_ingest::display::DisplayManager;
use usage_ingest::logging::init_logging;
use usage_ingest::{run_ingestion, IncompleteRun, IngestOptions};

#[derive(Parser)]
#[command(name = "usage-ingest")]
#[command(about = "Validate telecom usage logs and forward accepted records to billing")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a usage log file
    Ingest {
        /// Usage log to read
        input: PathBuf,
        /// JSON account list ([{"phone": ..., "account_id": ...}])
        #[arg(long)]
        accounts: Option<PathBuf>,
        /// Error log to append rejected lines to
        #[arg(long)]
        error_log: Option<PathBuf>,
        /// JSONL file receiving accepted records
        #[arg(long)]
        output: Option<PathBuf>,
        /// Validate and log errors without writing accepted records
        #[arg(long)]
        dry_run: bool,
        /// Output the run summary in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Classify and validate a single line without side effects
    Check {
        /// The line to check, e.g. "TEXT 1234567890 9876543210 2024-03-01;10:15:30 512B"
        line: String,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    };
    let _log_guard = init_logging(&config);

    let json = match &cli.command {
        Commands::Ingest { json, .. } | Commands::Check { json, .. } => *json,
    };

    if let Err(e) = run(cli.command, &config) {
        handle_error(e, json);
    }
}

fn run(command: Commands, config: &Config) -> Result<()> {
    let display = DisplayManager::new(config.output.json_pretty);

    match command {
        Commands::Ingest {
            input,
            accounts,
            error_log,
            output,
            dry_run,
            json,
        } => {
            let accounts_file = accounts
                .or_else(|| config.ingest.accounts_file.clone())
                .context("No account list given; pass --accounts or set USAGE_INGEST_ACCOUNTS")?;

            let options = IngestOptions {
                input,
                error_log: error_log.unwrap_or_else(|| config.ingest.error_log.clone()),
                accepted_output: if dry_run {
                    None
                } else {
                    Some(output.unwrap_or_else(|| config.ingest.accepted_output.clone()))
                },
                timestamp_format: config.output.timestamp_format.clone(),
            };

            let summary = match run_ingestion(&options, &JsonAccountFile::new(accounts_file)) {
                Ok(summary) => summary,
                Err(e) => {
                    if let Some(incomplete) = e.downcast_ref::<IncompleteRun>() {
                        if !json {
                            display.display_summary(&incomplete.summary, &options.error_log, false);
                        }
                    }
                    return Err(e);
                }
            };
            display.display_summary(&summary, &options.error_log, json);
        }
        Commands::Check { line, json } => {
            let outcome = classify_line(&line);
            display.display_check(&line, &outcome, json);
        }
    }

    Ok(())
}

fn handle_error(e: anyhow::Error, json: bool) -> ! {
    if json {
        println!("{}", serde_json::json!({ "error": format!("{:#}", e) }));
    } else {
        eprintln!("Error: {:#}", e);
    }
    process::exit(1);
}
