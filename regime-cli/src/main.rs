use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use regime_cli::commands;
use regime_cli::{AppConfig, logging};
use regime_core::{ActivityClassification, ComparisonEngine};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Brazilian tax regime calculator and comparison tool.
///
/// Requests are JSON documents read from `--input` or stdin; results are
/// written to stdout as JSON.
#[derive(Debug, Parser)]
#[command(name = "regime", version)]
struct Cli {
    /// TOML configuration file overriding statutory defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON request file; stdin when omitted.
    #[arg(long, short, global = true)]
    input: Option<PathBuf>,

    /// Pretty-print the JSON output.
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Simplified regime (Simples Nacional) liability.
    Simplified,
    /// Payroll ratio (Fator R) with guidance checkpoints.
    PayrollRatio,
    /// Presumed-profit liability for one period.
    Presumed,
    /// Actual-profit liability for one period.
    Actual,
    /// Compare every regime for a profile and recommend one.
    Diagnose,
    /// What-if scenarios against a profile.
    Simulate,
    /// Diagnose every profile of a CSV file.
    Batch {
        /// Profiles CSV.
        path: PathBuf,
    },
    /// Look up a CNAE activity code.
    Activity {
        /// Code as `NNNN-N/NN` or seven digits.
        code: String,
    },
    /// Diagnose a company from its monthly history CSV.
    History {
        /// History CSV.
        path: PathBuf,
        #[arg(long)]
        company: String,
        #[arg(long)]
        activity: ActivityClassification,
        /// Reference month (any day of it); today when omitted.
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
}

// ─── I/O helpers ─────────────────────────────────────────────────────────────

fn read_request<T: DeserializeOwned>(input: Option<&Path>) -> Result<T> {
    let raw = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("cannot read request file {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("cannot read request from stdin")?;
            buf
        }
    };
    serde_json::from_str(&raw).context("invalid JSON request")
}

fn write_response<T: Serialize>(
    value: &T,
    pretty: bool,
) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("cannot serialise response")?;
    println!("{out}");
    Ok(())
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    logging::init_logging(&config.logging)?;
    debug!(?config, "configuration loaded");

    let engine = ComparisonEngine::new(config.engine).context("invalid engine configuration")?;
    let input = cli.input.as_deref();
    let pretty = cli.pretty;

    match cli.command {
        Command::Simplified => {
            let request = read_request(input)?;
            write_response(&commands::simplified(&engine, &request)?, pretty)
        }
        Command::PayrollRatio => {
            let request = read_request(input)?;
            write_response(&commands::payroll_ratio(&engine, &request)?, pretty)
        }
        Command::Presumed => {
            let request = read_request(input)?;
            write_response(&commands::presumed(&engine, &request)?, pretty)
        }
        Command::Actual => {
            let request = read_request(input)?;
            write_response(&commands::actual(&engine, &request)?, pretty)
        }
        Command::Diagnose => {
            let report = commands::diagnose(&engine, read_request(input)?)?;
            info!(best = ?report.comparison.best_regime, "diagnosis complete");
            write_response(&report, pretty)
        }
        Command::Simulate => {
            let outcomes = commands::simulate(&engine, read_request(input)?)?;
            write_response(&outcomes, pretty)
        }
        Command::Batch { path } => write_response(&commands::batch(&engine, &path)?, pretty),
        Command::Activity { code } => write_response(&commands::activity(&code)?, pretty),
        Command::History {
            path,
            company,
            activity,
            as_of,
        } => {
            let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
            let report = commands::history(&engine, &path, &company, as_of, activity).await?;
            write_response(&report, pretty)
        }
    }
}
