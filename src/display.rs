//! Output Formatting and Display Management
//!
//! Renders the outcome of an ingestion run, or of a single checked line, either
//! as colored terminal text or as JSON for scripting.
//!
//! ### Run summary
//! - Lines read, accepted records per kind, comments
//! - Rejections per error kind, with the error log location
//! - Delivery failures and error-log write failures, one per line
//!
//! ### JSON Output
//! ```json
//! {
//!   "summary": { "lines_read": 5, "text": 1, "call": 0, ... },
//!   "error_log": "usage-errors.log"
//! }
//! ```

use crate::error::LineError;
use crate::ingest::IngestSummary;
use crate::models::{Classification, UsageRecord};
use colored::Colorize;
use std::path::Path;

pub struct DisplayManager {
    json_pretty: bool,
}

impl Default for DisplayManager {
    fn default() -> Self {
        Self::new(false)
    }
}

impl DisplayManager {
    pub fn new(json_pretty: bool) -> Self {
        Self { json_pretty }
    }

    pub fn summary_json(&self, summary: &IngestSummary, error_log: &Path) -> serde_json::Value {
        serde_json::json!({
            "summary": summary,
            "accepted": summary.accepted(),
            "rejected": summary.rejected(),
            "error_log": error_log.display().to_string(),
        })
    }

    pub fn check_json(&self, line: &str, outcome: &Result<Classification, LineError>) -> serde_json::Value {
        match outcome {
            Ok(Classification::Comment) => serde_json::json!({
                "line": line,
                "kind": "comment",
            }),
            Ok(Classification::Usage(record)) => serde_json::json!({
                "line": line,
                "kind": record.kind(),
                "record": record,
            }),
            Err(err) => serde_json::json!({
                "line": line,
                "kind": err.kind(),
                "error": err.to_string(),
            }),
        }
    }

    fn print_json(&self, value: &serde_json::Value) {
        let rendered = if self.json_pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        match rendered {
            Ok(json_str) => println!("{}", json_str),
            Err(e) => eprintln!("Error serializing output to JSON: {}", e),
        }
    }

    pub fn display_summary(&self, summary: &IngestSummary, error_log: &Path, json_output: bool) {
        if json_output {
            self.print_json(&self.summary_json(summary, error_log));
            return;
        }

        println!("\n{}", "=".repeat(60).bright_cyan());
        println!("{}", "Usage Ingestion Report".bright_white().bold());
        println!("{}", "=".repeat(60).bright_cyan());

        println!(
            "\n{} {} lines • {} accepted • {} rejected • {} comments\n",
            "📊".bright_yellow(),
            summary.lines_read.to_string().bright_white().bold(),
            summary.accepted().to_string().bright_green().bold(),
            summary.rejected().to_string().bright_red().bold(),
            summary.comments.to_string().bright_white()
        );

        println!("{} Accepted:", "✅".bright_green());
        println!("   TEXT: {}", summary.text.to_string().bright_white());
        println!("   CALL: {}", summary.call.to_string().bright_white());
        println!("   INTERNET: {}", summary.internet.to_string().bright_white());

        if summary.rejected() > 0 {
            println!("\n{} Rejected:", "❌".bright_red());
            println!(
                "   INVALID FORMAT: {}",
                summary.invalid_format.to_string().bright_red()
            );
            println!(
                "   UNKNOWN RECORD TYPE: {}",
                summary.unknown.to_string().bright_red()
            );
            println!("   NO ACCOUNT: {}", summary.no_account.to_string().bright_red());
            println!(
                "   Details in {}",
                error_log.display().to_string().bright_cyan()
            );
        }

        if !summary.delivery_failures.is_empty() {
            println!("\n{} Delivery failures:", "⚠️".bright_yellow());
            for failure in &summary.delivery_failures {
                println!(
                    "   line {} ({}): {}",
                    failure.line_number.to_string().bright_white(),
                    failure.kind,
                    failure.message.bright_yellow()
                );
            }
        }

        if !summary.log_write_failures.is_empty() {
            println!("\n{} Error log write failures:", "⚠️".bright_yellow());
            for failure in &summary.log_write_failures {
                println!(
                    "   line {}: {}",
                    failure.line_number.to_string().bright_white(),
                    failure.message.bright_yellow()
                );
            }
        }

        println!();
    }

    pub fn display_check(
        &self,
        line: &str,
        outcome: &Result<Classification, LineError>,
        json_output: bool,
    ) {
        if json_output {
            self.print_json(&self.check_json(line, outcome));
            return;
        }

        match outcome {
            Ok(Classification::Comment) => {
                println!("{} {}", "COMMENT".bright_blue().bold(), "(ignored)".dimmed());
            }
            Ok(Classification::Usage(record)) => {
                println!(
                    "{} {}",
                    record.kind().label().bright_green().bold(),
                    describe(record)
                );
            }
            Err(err) => {
                println!(
                    "{} {}",
                    err.kind().label().bright_red().bold(),
                    err.to_string().bright_white()
                );
            }
        }
    }
}

fn describe(record: &UsageRecord) -> String {
    match record {
        UsageRecord::Text(r) => format!(
            "{} -> {} at {}, {} bytes",
            r.source_phone, r.dest_phone, r.sent_at, r.byte_count
        ),
        UsageRecord::Call(r) => format!(
            "{} -> {} from {} to {} ({}s)",
            r.source_phone,
            r.dest_phone,
            r.start_at,
            r.end_at,
            r.duration_seconds()
        ),
        UsageRecord::Internet(r) => format!(
            "{} at {}, {} MB",
            r.source_phone, r.used_at, r.megabytes
        ),
    }
}
