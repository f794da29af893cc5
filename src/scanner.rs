//! Frame Scanner: finds the schedule-bearing sub-documents of one page.
//!
//! Two policies are offered. [`scan_page`] aggregates over every frame and
//! skips anything that does not hold a schedule table. [`scan_single_frame`]
//! treats the first table-bearing frame as the designated one and fails when
//! it lacks a schedule table.

use anyhow::Result;
use chrono::FixedOffset;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::config::Config;
use crate::driver::PlanDriver;
use crate::error::ScrapeError;
use crate::models::{DayCandidate, DayRecord};
use crate::parsers::{available_tables, extract_frame, group_entries, local_offset, FrameData};

/// Safety cap on result pages per run.
pub const MAX_PAGES: usize = 20;

#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Bound on page-level waits; exceeding it fails the call.
    pub page_timeout: Duration,
    /// Bound on the "does this frame have a table" probe; exceeding it skips the frame.
    pub probe_timeout: Duration,
    pub max_pages: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            page_timeout: Duration::from_secs(10),
            probe_timeout: Duration::from_secs(2),
            max_pages: MAX_PAGES,
        }
    }
}

impl From<&Config> for ScanOptions {
    fn from(config: &Config) -> Self {
        Self {
            page_timeout: config.page_timeout(),
            probe_timeout: config.frame_probe_timeout(),
            max_pages: config.max_pages,
        }
    }
}

/// Runs a page-level wait, turning an elapsed timeout into an error.
pub async fn within<T, F>(limit: Duration, what: &'static str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(ScrapeError::Timeout { what, after: limit }.into()),
    }
}

async fn probe<D: PlanDriver>(driver: &mut D, frame: &D::Frame, limit: Duration) -> bool {
    match timeout(limit, driver.has_table(frame)).await {
        Ok(Ok(found)) => found,
        Ok(Err(e)) => {
            debug!("Probe of {:?} failed: {}", frame, e);
            false
        }
        Err(_) => false,
    }
}

fn to_candidate(data: FrameData) -> DayCandidate {
    DayCandidate {
        record: DayRecord {
            date: data.date,
            messages: group_entries(&data.table),
        },
        last_update: data.last_update,
    }
}

async fn evaluate<D: PlanDriver>(
    driver: &mut D,
    frame: &D::Frame,
    offset: FixedOffset,
) -> Result<Option<DayCandidate>> {
    let html = driver.frame_html(frame).await?;
    Ok(extract_frame(&html, offset).map(to_candidate))
}

/// Collects one candidate per schedule-bearing frame, in frame order.
pub async fn scan_page<D: PlanDriver>(driver: &mut D, options: &ScanOptions) -> Result<Vec<DayCandidate>> {
    let frames = within(options.page_timeout, "frames", driver.frames()).await?;
    info!("Found {} total frames", frames.len());

    let offset = local_offset();
    let mut days = Vec::new();

    for (i, frame) in frames.iter().enumerate() {
        if !probe(driver, frame, options.probe_timeout).await {
            debug!("Frame {}: no tables, skipping", i + 1);
            continue;
        }
        info!("--- Processing frame {} ---", i + 1);

        match evaluate(driver, frame, offset).await {
            Ok(Some(candidate)) => {
                info!(
                    "Successfully extracted data for {}",
                    candidate.record.date.as_deref().unwrap_or("unknown date")
                );
                days.push(candidate);
            }
            Ok(None) => info!("No schedule data found in frame {}", i + 1),
            Err(e) => info!("Frame {}: error occurred, skipping: {}", i + 1, e),
        }
    }

    info!(
        "Completed extraction for {} days from {} frames on current page",
        days.len(),
        frames.len()
    );
    Ok(days)
}

/// Extracts the schedule of the first frame that shows a table.
///
/// Fails with [`ScrapeError::NoFrames`] when no frame has a table and with
/// [`ScrapeError::NoScheduleTable`] when that frame has no "Stunde" table.
pub async fn scan_single_frame<D: PlanDriver>(driver: &mut D, options: &ScanOptions) -> Result<DayCandidate> {
    let frames = within(options.page_timeout, "frames", driver.frames()).await?;

    let mut designated = None;
    for frame in &frames {
        if probe(driver, frame, options.probe_timeout).await {
            designated = Some(frame);
            break;
        }
    }
    let frame = designated.ok_or(ScrapeError::NoFrames)?;
    info!("Found frame with tables");

    let html = driver.frame_html(frame).await?;
    match extract_frame(&html, local_offset()) {
        Some(data) => Ok(to_candidate(data)),
        None => Err(ScrapeError::no_schedule_table(&available_tables(&html)).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::fixture::FixtureDriver;
    use crate::parsers::document::tests::monitor_page;
    use pretty_assertions::assert_eq;

    fn schedule(date: &str, class: &str) -> String {
        monitor_page(
            date,
            "19.09.2025 09:04",
            &format!(
                "<tr><td colspan=\"7\">{class}</td></tr>\
                 <tr><td>1</td><td>Meyer</td><td>M</td><td>M</td><td>101</td><td>---</td><td>---</td></tr>"
            ),
        )
    }

    const NO_TABLE: &str = "<html><body><p>Menu</p></body></html>";
    const OTHER_TABLE: &str = "<table><tr><td>Klasse</td></tr></table>";

    #[tokio::test]
    async fn test_scan_page_skips_frames_without_schedule() {
        let mut driver = FixtureDriver::new(vec![vec![
            NO_TABLE.to_string(),
            schedule("19.9.2025 Freitag", "10a"),
            OTHER_TABLE.to_string(),
            schedule("22.9.2025 Montag", "5b"),
        ]]);

        let days = scan_page(&mut driver, &ScanOptions::default()).await.unwrap();

        let dates: Vec<_> = days.iter().map(|d| d.record.date.clone()).collect();
        assert_eq!(dates, vec![Some("2025-09-19".to_string()), Some("2025-09-22".to_string())]);
        assert!(days[0].record.messages.contains_key("10a"));
        assert_eq!(days[1].record.messages["5b"][0].raum_neu, None);
        assert!(days.iter().all(|d| d.last_update.as_deref().unwrap().starts_with("2025-09-19T09:04:00")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_scan_page_skips_frame_whose_table_check_times_out() {
        let mut driver = FixtureDriver::new(vec![vec![
            schedule("18.9.2025", "9a"),
            schedule("19.9.2025", "10a"),
        ]]);
        driver.slow_frames = vec![0];

        let days = scan_page(&mut driver, &ScanOptions::default()).await.unwrap();

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].record.date.as_deref(), Some("2025-09-19"));
    }

    #[tokio::test]
    async fn test_scan_page_skips_frame_whose_table_check_fails() {
        let mut driver = FixtureDriver::new(vec![vec![
            schedule("18.9.2025", "9a"),
            schedule("19.9.2025", "10a"),
        ]]);
        driver.broken_frames = vec![1];

        let days = scan_page(&mut driver, &ScanOptions::default()).await.unwrap();

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].record.date.as_deref(), Some("2025-09-18"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_frame_passes_over_slow_frame() {
        let mut driver = FixtureDriver::new(vec![vec![
            schedule("18.9.2025", "9a"),
            schedule("19.9.2025", "10a"),
        ]]);
        driver.slow_frames = vec![0];

        let day = scan_single_frame(&mut driver, &ScanOptions::default()).await.unwrap();

        assert_eq!(day.record.date.as_deref(), Some("2025-09-19"));
    }

    #[tokio::test]
    async fn test_scan_page_propagates_frame_enumeration_failure() {
        let mut driver = FixtureDriver::new(vec![vec![NO_TABLE.to_string()]]);
        driver.fail_on_page = Some(0);

        assert!(scan_page(&mut driver, &ScanOptions::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_single_frame_is_strict() {
        let mut driver = FixtureDriver::new(vec![vec![
            NO_TABLE.to_string(),
            OTHER_TABLE.to_string(),
            schedule("19.9.2025", "10a"),
        ]]);

        let err = scan_single_frame(&mut driver, &ScanOptions::default()).await.unwrap_err();
        match err.downcast_ref::<ScrapeError>() {
            Some(ScrapeError::NoScheduleTable { available }) => assert_eq!(available, "Table 1: \"Klasse\""),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_single_frame_without_tables() {
        let mut driver = FixtureDriver::new(vec![vec![NO_TABLE.to_string()]]);

        let err = scan_single_frame(&mut driver, &ScanOptions::default()).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<ScrapeError>(), Some(ScrapeError::NoFrames)));
    }

    #[tokio::test]
    async fn test_single_frame_extracts_schedule() {
        let mut driver = FixtureDriver::new(vec![vec![NO_TABLE.to_string(), schedule("1.10.2025", "7c")]]);

        let day = scan_single_frame(&mut driver, &ScanOptions::default()).await.unwrap();
        assert_eq!(day.record.date.as_deref(), Some("2025-10-01"));
        assert_eq!(day.record.messages["7c"].len(), 1);
    }

    #[tokio::test]
    async fn test_within_reports_timeout() {
        let err = within(Duration::from_millis(10), "frames", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<(), anyhow::Error>(())
        })
        .await
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ScrapeError>(),
            Some(ScrapeError::Timeout { what: "frames", .. })
        ));
    }
}
