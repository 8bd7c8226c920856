use anyhow::Result;
use std::io::{self, Write};

use crate::config::{load_config, parse_period, save_config};
use crate::state::config_path;

fn prompt(label: &str, current: &str) -> Result<String> {
    print!("{} [{}]: ", label, current);
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    let s = s.trim();
    Ok(if s.is_empty() { current.to_string() } else { s.to_string() })
}

/// Ask until `check` accepts the answer.
fn prompt_valid<T>(label: &str, current: &str, check: impl Fn(&str) -> Result<T>) -> Result<String> {
    loop {
        let answer = prompt(label, current)?;
        match check(&answer) {
            Ok(_) => return Ok(answer),
            Err(e) => println!("  {e:#}"),
        }
    }
}

pub fn run_setup() -> Result<()> {
    println!("SpendLens setup\n");
    // keeps the existing owner id so recorded transactions stay visible
    let mut cfg = load_config()?;

    cfg.owner.label = prompt("Name shown on reports", &cfg.owner.label)?;
    cfg.owner.timezone = prompt_valid("Timezone (IANA)", &cfg.owner.timezone, |tz| {
        Ok(spendlens_ingest::parse_timezone(tz)?)
    })?;
    let period = prompt_valid(
        "Default period (weekly/monthly)",
        cfg.report.default_period.as_str(),
        parse_period,
    )?;
    cfg.report.default_period = parse_period(&period)?;

    save_config(&cfg)?;

    println!("\nWrote {}", config_path()?.display());
    println!("Owner id: {}", cfg.owner.id);
    println!("\nNext recommended steps:");
    println!("- spendlens add --amount 12.50 --category food --date 2024-01-05");
    println!("- spendlens import --csv expenses.csv");
    println!("- spendlens report --type download");

    Ok(())
}
