use anyhow::{bail, Result};
use chrono::Local;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info};

mod config;
mod driver;
mod error;
mod models;
mod output;
mod pagination;
mod parsers;
mod scanner;
mod utils;

use crate::config::Config;
use crate::driver::{HttpDriver, PlanDriver};
use crate::scanner::{within, ScanOptions};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dsb_scraper=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting DSB scraper");

    let config = Arc::new(Config::load()?);

    let Some(seconds) = config.interval_seconds else {
        return run_once(&config).await;
    };

    let mut interval = interval(Duration::from_secs(seconds));
    loop {
        interval.tick().await;

        info!("--- Starting new check cycle at {} ---", Local::now().format("%Y-%m-%d %H:%M:%S"));
        if let Err(e) = run_once(&config).await {
            error!("Check cycle failed: {:#}", e);
        }
        info!("Check cycle completed, waiting {} seconds", seconds);
    }
}

async fn run_once(config: &Arc<Config>) -> Result<()> {
    let client = utils::http::create_client(config)?;
    let mut driver = HttpDriver::new(client, config.clone());

    let logged_in = within(
        config.page_timeout(),
        "login",
        driver.login(&config.username, &config.password),
    )
    .await?;
    info!("Login attempt completed: {}", if logged_in { "SUCCESS" } else { "FAILED" });
    if !logged_in {
        bail!("Login failed for user {}", config.username);
    }

    within(config.page_timeout(), "plan link", driver.open_plan()).await?;

    let options = ScanOptions::from(config.as_ref());
    let result = if config.single_frame {
        pagination::collect_first_day(&mut driver, &options).await?
    } else {
        pagination::collect_all_days(&mut driver, &options).await
    };
    output::write_result(&result, config.output_path.as_deref())
}
