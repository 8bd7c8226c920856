use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use spendlens_core::{DateRange, TransactionRecord, TransactionStore};
use spendlens_ingest::{parse_expense_csv_path, validate_new, RawTransaction};
use spendlens_insights::{
    category_summary, chart_data, report_download, total_spent, trends, ChartRequest,
    ReportRequest,
};
use std::path::PathBuf;
use tracing::warn;

use crate::config::load_config;
use crate::store::JsonlStore;

mod config;
mod logging;
mod setup;
mod state;
mod store;

#[derive(Parser, Debug)]
#[command(
    name = "spendlens",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("SPENDLENS_BUILD_SHA"), ")"),
    about = "Record expenses and report on where the money went"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive setup: owner label, timezone, default period
    Setup,

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Record one expense
    Add {
        #[arg(long)]
        amount: String,

        /// food, travel, bills, entertainment or other
        #[arg(long)]
        category: String,

        /// YYYY-MM-DD, YYYY-MM-DD HH:MM (owner timezone) or RFC 3339
        #[arg(long)]
        date: String,

        #[arg(long)]
        description: Option<String>,
    },

    /// List recorded expenses, newest first
    List {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Delete an expense by id
    Delete { id: String },

    /// Import expenses from a CSV with date,amount,category[,description] columns
    Import {
        #[arg(long)]
        csv: PathBuf,
    },

    /// Print trend chart data and recent transactions as JSON
    Chart {
        /// weekly or monthly (default: config [report].default_period)
        #[arg(long)]
        period: Option<String>,
    },

    /// Print the trailing-year trend series as JSON
    Trends {
        /// weekly or monthly (default: config [report].default_period)
        #[arg(long)]
        period: Option<String>,
    },

    /// Print category totals as JSON
    Categories,

    /// Print the total spent across all expenses
    Total,

    /// Render the expense report PDF
    Report {
        /// Report type; only "download" is supported
        #[arg(long = "type")]
        report_type: Option<String>,

        #[arg(long)]
        period: Option<String>,

        /// Output path (default: config [report].filename)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the effective config.toml
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Setup => setup::run_setup()?,

        Command::Config { command } => match command {
            ConfigCommand::Show => {
                let cfg = load_config()?;
                println!("# {}", state::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },

        Command::Add {
            amount,
            category,
            date,
            description,
        } => {
            let raw = RawTransaction {
                amount: Some(amount),
                date: Some(date),
                category: Some(category),
                description,
            };
            add(raw).await?;
        }

        Command::List { limit } => list(limit).await?,

        Command::Delete { id } => {
            let cfg = load_config()?;
            let removed = open_store()?
                .delete(&cfg.owner_id(), &id)
                .await
                .with_context(|| format!("deleting {id}"))?;
            println!("Deleted {} ({} {})", removed.id, removed.category, removed.amount);
        }

        Command::Import { csv } => import(csv).await?,

        Command::Chart { period } => {
            let cfg = load_config()?;
            let request = ChartRequest {
                period: Some(period.unwrap_or_else(|| cfg.report.default_period.to_string())),
            };
            let response =
                chart_data(&open_store()?, &cfg.owner_id(), &request, cfg.report.recent_limit).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }

        Command::Trends { period } => {
            let cfg = load_config()?;
            let request = ChartRequest {
                period: Some(period.unwrap_or_else(|| cfg.report.default_period.to_string())),
            };
            let series =
                trends(&open_store()?, &cfg.owner_id(), &request, &spendlens_core::SystemClock).await?;
            println!("{}", serde_json::to_string_pretty(&series)?);
        }

        Command::Categories => {
            let cfg = load_config()?;
            let series = category_summary(&open_store()?, &cfg.owner_id()).await?;
            println!("{}", serde_json::to_string_pretty(&series)?);
        }

        Command::Total => {
            let cfg = load_config()?;
            let total = total_spent(&open_store()?, &cfg.owner_id()).await?;
            println!("${:.2}", total);
        }

        Command::Report {
            report_type,
            period,
            out,
        } => {
            let cfg = load_config()?;
            let request = ReportRequest {
                report_type,
                period: Some(period.unwrap_or_else(|| cfg.report.default_period.to_string())),
            };
            let report = report_download(
                &open_store()?,
                &cfg.owner_id(),
                &cfg.owner.label,
                &request,
                &spendlens_core::SystemClock,
            )
            .await?;

            let out = out.unwrap_or_else(|| PathBuf::from(&cfg.report.filename));
            std::fs::write(&out, &report.bytes).with_context(|| format!("write {}", out.display()))?;
            println!(
                "Wrote {} ({} bytes, {})",
                out.display(),
                report.content_length(),
                report.content_type
            );
        }
    }

    Ok(())
}

fn open_store() -> Result<JsonlStore> {
    Ok(JsonlStore::new(state::ledger_path()?))
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

async fn add(raw: RawTransaction) -> Result<()> {
    let cfg = load_config()?;
    let new = validate_new(&raw, &cfg.owner.timezone)?;
    let record = new.into_record(cfg.owner_id(), new_id());

    let store = open_store()?;
    store
        .append(std::slice::from_ref(&record))
        .await
        .with_context(|| format!("append to {}", store.path().display()))?;

    println!(
        "Added {} | {} | {} | ${:.2}",
        record.id,
        record.date(),
        record.category,
        record.amount
    );
    Ok(())
}

async fn list(limit: usize) -> Result<()> {
    let cfg = load_config()?;
    let store = open_store()?;
    let mut records: Vec<TransactionRecord> = store.find(&cfg.owner_id(), DateRange::all()).await?;
    if records.is_empty() {
        println!("No expenses recorded in {}", store.path().display());
        return Ok(());
    }

    records.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
    for r in records.iter().take(limit) {
        println!(
            "{} | {} | {:<13} | {:>10} | {}",
            r.id,
            r.date(),
            r.category.as_str(),
            format!("${:.2}", r.amount),
            r.description.as_deref().unwrap_or("")
        );
    }
    if records.len() > limit {
        println!("... {} more (pass --limit)", records.len() - limit);
    }
    Ok(())
}

async fn import(csv: PathBuf) -> Result<()> {
    if !csv.exists() {
        bail!("CSV not found: {} (pass --csv <path>)", csv.display());
    }
    let cfg = load_config()?;
    let import = parse_expense_csv_path(&csv, &cfg.owner.timezone)?;

    for rejected in &import.rejected {
        warn!(line = rejected.line, reason = %rejected.reason, "skipping CSV row");
    }

    let owner = cfg.owner_id();
    let records: Vec<TransactionRecord> = import
        .rows
        .into_iter()
        .map(|new| new.into_record(owner.clone(), new_id()))
        .collect();

    let store = open_store()?;
    store
        .append(&records)
        .await
        .with_context(|| format!("append to {}", store.path().display()))?;

    println!("Imported {} expenses from {}", records.len(), csv.display());
    if !import.rejected.is_empty() {
        println!("Skipped {} rows:", import.rejected.len());
        for r in &import.rejected {
            println!("- line {}: {}", r.line, r.reason);
        }
    }
    Ok(())
}
