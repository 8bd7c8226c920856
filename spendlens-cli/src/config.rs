use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use spendlens_core::{Granularity, OwnerId, RECENT_TABLE_LIMIT};
use spendlens_insights::REPORT_FILENAME;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::state::config_path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub owner: OwnerSection,
    #[serde(default)]
    pub report: ReportSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerSection {
    pub id: String,
    #[serde(default = "default_label")]
    pub label: String,
    /// IANA name used to read local dates and times
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSection {
    pub default_period: Granularity,
    pub recent_limit: usize,
    /// Default output path for `spendlens report`
    pub filename: String,
}

fn default_label() -> String {
    "owner".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            default_period: Granularity::default(),
            recent_limit: RECENT_TABLE_LIMIT,
            filename: REPORT_FILENAME.to_string(),
        }
    }
}

impl Config {
    /// Fresh config with a newly minted owner id
    pub fn new_owner() -> Self {
        Self {
            owner: OwnerSection {
                id: uuid::Uuid::new_v4().to_string(),
                label: default_label(),
                timezone: default_timezone(),
            },
            report: ReportSection::default(),
        }
    }

    pub fn owner_id(&self) -> OwnerId {
        OwnerId::new(self.owner.id.clone())
    }

    pub fn validate(&self) -> Result<()> {
        if self.owner.id.trim().is_empty() {
            bail!("[owner].id must not be empty");
        }
        spendlens_ingest::parse_timezone(&self.owner.timezone).context("[owner].timezone")?;
        if self.report.recent_limit == 0 {
            bail!("[report].recent_limit must be at least 1");
        }
        Ok(())
    }
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: Config = toml::from_str(&s).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Load `config.toml`, writing a default one first if none exists so the
/// owner id stays stable across runs.
pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        let cfg = Config::new_owner();
        save_config_to(&p, &cfg)?;
        tracing::info!(path = %p.display(), "wrote default config");
        return Ok(cfg);
    }
    load_config_from(&p)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    save_config_to(&config_path()?, cfg)
}

/// Parse a period name for config/setup purposes.
pub fn parse_period(text: &str) -> Result<Granularity> {
    Ok(Granularity::from_str(text.trim())?)
}
