//! Pagination Merge Loop: walks result pages and folds their days together.

use anyhow::Result;
use std::collections::BTreeMap;
use tracing::{error, info};

use crate::driver::PlanDriver;
use crate::models::{DayCandidate, DayRecord, ExtractionResult};
use crate::parsers::now_timestamp;
use crate::scanner::{scan_page, scan_single_frame, ScanOptions};

/// Days seen so far, keyed by plan date, plus the first "Stand:" stamp.
#[derive(Debug, Default)]
pub struct DayAccumulator {
    days: BTreeMap<String, DayRecord>,
    last_update: Option<String>,
}

impl DayAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one candidate in. The first non-null stamp wins; candidates
    /// without a date are dropped; a known date is merged group-wise.
    pub fn absorb(&mut self, candidate: DayCandidate, page: usize) {
        if self.last_update.is_none() {
            if let Some(stamp) = candidate.last_update {
                info!("Captured last_update: {}", stamp);
                self.last_update = Some(stamp);
            }
        }

        let Some(date) = candidate.record.date.clone() else {
            info!("Skipping entry with null date from page {}", page);
            return;
        };

        match self.days.get_mut(&date) {
            Some(existing) => {
                info!("Merging data for {} from page {} with existing data", date, page);
                existing.merge_from(candidate.record);
            }
            None => {
                info!("Adding new data for {} from page {}", date, page);
                self.days.insert(date, candidate.record);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn last_update(&self) -> Option<&str> {
        self.last_update.as_deref()
    }

    /// Days come out in ascending date order.
    pub fn finish(self, last_scrape: String) -> ExtractionResult {
        ExtractionResult {
            last_update: self.last_update,
            last_scrape,
            days: self.days.into_values().collect(),
        }
    }
}

async fn process_page<D: PlanDriver>(
    driver: &mut D,
    options: &ScanOptions,
    days: &mut DayAccumulator,
    page: usize,
) -> Result<bool> {
    let candidates = scan_page(driver, options).await?;
    info!("Found {} days on page {}", candidates.len(), page);

    for candidate in candidates {
        days.absorb(candidate, page);
    }

    driver.next_page().await
}

/// Scans every result page, at most `options.max_pages` of them.
///
/// Any failure ends pagination; whatever was gathered until then is kept.
pub async fn collect_all_days<D: PlanDriver>(driver: &mut D, options: &ScanOptions) -> ExtractionResult {
    let mut days = DayAccumulator::new();
    let mut pages_processed = 0;

    info!("Starting multi-page data extraction...");

    for page in 1..=options.max_pages {
        info!("=== Processing page {} ===", page);
        pages_processed = page;

        match process_page(driver, options, &mut days, page).await {
            Ok(true) => {
                if page == options.max_pages {
                    info!("Reached maximum pages limit");
                }
            }
            Ok(false) => {
                info!("No more pages available (button disabled or not found)");
                break;
            }
            Err(e) => {
                error!("Error processing page {}: {:#}", page, e);
                break;
            }
        }
    }

    info!("=== Completed extraction ===");
    info!("Total pages processed: {}", pages_processed);
    info!("Unique days extracted: {}", days.len());
    info!("Last update: {}", days.last_update().unwrap_or("not found"));

    let result = days.finish(now_timestamp());
    info!(
        "Date range: {} to {}",
        result.days.first().and_then(|d| d.date.as_deref()).unwrap_or("unknown"),
        result.days.last().and_then(|d| d.date.as_deref()).unwrap_or("unknown")
    );
    info!("Last scrape: {}", result.last_scrape);

    result
}

/// Reads only the designated frame of the current page; errors propagate.
pub async fn collect_first_day<D: PlanDriver>(driver: &mut D, options: &ScanOptions) -> Result<ExtractionResult> {
    let candidate = scan_single_frame(driver, options).await?;

    let mut days = DayAccumulator::new();
    days.absorb(candidate, 1);
    if days.is_empty() {
        info!("Designated frame carries no plan date");
    }
    Ok(days.finish(now_timestamp()))
}
