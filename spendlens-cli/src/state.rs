use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Overrides the data directory (default `~/.spendlens`)
pub const HOME_ENV: &str = "SPENDLENS_HOME";

pub fn spendlens_home() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(HOME_ENV).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".spendlens"))
}

pub fn ensure_spendlens_home() -> Result<PathBuf> {
    let dir = spendlens_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_spendlens_home()?.join("config.toml"))
}

pub fn ledger_path() -> Result<PathBuf> {
    Ok(ensure_spendlens_home()?.join("transactions.jsonl"))
}
