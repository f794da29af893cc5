use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ScrapeError;

/// Name of the optional config file (any format the `config` crate reads).
const CONFIG_FILE: &str = "dsb_scraper";
const ENV_PREFIX: &str = "DSB";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_plan_link_text")]
    pub plan_link_text: String,
    #[serde(default = "default_page_timeout_ms")]
    pub page_timeout_ms: u64,
    #[serde(default = "default_frame_probe_timeout_ms")]
    pub frame_probe_timeout_ms: u64,
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default)]
    pub interval_seconds: Option<u64>,
    /// Only read the first table-bearing frame of the first page, failing
    /// when it holds no schedule table.
    #[serde(default)]
    pub single_frame: bool,
}

fn default_base_url() -> String {
    "https://www.dsbmobile.de/".to_string()
}

fn default_plan_link_text() -> String {
    "dsbmobile_schueler".to_string()
}

fn default_page_timeout_ms() -> u64 {
    10_000
}

fn default_frame_probe_timeout_ms() -> u64 {
    2_000
}

fn default_max_pages() -> usize {
    20
}

fn default_settle_delay_ms() -> u64 {
    2_000
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36".to_string()
}

impl Config {
    /// Reads `dsb_scraper.{toml,json,yaml}` if present, then `DSB_*` variables.
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .context("Failed to read configuration")?;

        let config: Config = settings
            .try_deserialize()
            .context("Invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ScrapeError> {
        if self.username.trim().is_empty() {
            return Err(ScrapeError::MissingConfig("username"));
        }
        if self.password.is_empty() {
            return Err(ScrapeError::MissingConfig("password"));
        }
        if self.max_pages == 0 {
            return Err(ScrapeError::InvalidConfig {
                field: "max_pages",
                reason: "must be at least 1",
            });
        }
        if self.interval_seconds == Some(0) {
            return Err(ScrapeError::InvalidConfig {
                field: "interval_seconds",
                reason: "must be at least 1 (omit it to run once)",
            });
        }
        Ok(())
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_millis(self.page_timeout_ms)
    }

    pub fn frame_probe_timeout(&self) -> Duration {
        Duration::from_millis(self.frame_probe_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}
