//! Pure extraction of one rendered sub-document.
//!
//! Nothing here touches the driver or engine state: the input is the HTML a
//! frame rendered, the output is what the scanner needs from it.

use chrono::FixedOffset;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use super::{element_text, parse_last_update, parse_plan_date};
use crate::models::RawTable;

static TABLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table").expect("Invalid table selector"));
static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr").expect("Invalid row selector"));
static CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td, th").expect("Invalid cell selector"));
static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".mon_title").expect("Invalid title selector"));

/// Marker the first cell of a schedule table contains.
const SCHEDULE_MARKER: &str = "stunde";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameData {
    pub date: Option<String>,
    pub last_update: Option<String>,
    pub table: RawTable,
}

/// Extracts the schedule table, plan date and "Stand:" stamp of a document.
///
/// Returns `None` when no table starts with a "Stunde" cell.
pub fn extract_frame(html: &str, offset: FixedOffset) -> Option<FrameData> {
    let document = Html::parse_document(html);
    let table = find_schedule_table(&document)?;

    Some(FrameData {
        date: plan_date(&document),
        last_update: last_update(&document, offset),
        table: read_rows(table),
    })
}

pub fn has_table(html: &str) -> bool {
    Html::parse_document(html).select(&TABLE_SELECTOR).next().is_some()
}

/// First-cell text of every table, `"empty"` for tables without cells.
pub fn available_tables(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&TABLE_SELECTOR)
        .map(|table| first_cell_text(table).unwrap_or_else(|| "empty".to_string()))
        .collect()
}

fn first_cell_text(table: ElementRef<'_>) -> Option<String> {
    let first_row = table.select(&ROW_SELECTOR).next()?;
    first_row.select(&CELL_SELECTOR).next().map(element_text)
}

fn find_schedule_table(document: &Html) -> Option<ElementRef<'_>> {
    document.select(&TABLE_SELECTOR).find(|table| {
        first_cell_text(*table)
            .map(|text| text.to_lowercase().contains(SCHEDULE_MARKER))
            .unwrap_or(false)
    })
}

fn read_rows(table: ElementRef<'_>) -> RawTable {
    table
        .select(&ROW_SELECTOR)
        .map(|row| row.select(&CELL_SELECTOR).map(element_text).collect::<Vec<_>>())
        .filter(|cells| !cells.is_empty())
        .collect()
}

fn plan_date(document: &Html) -> Option<String> {
    let title = document.select(&TITLE_SELECTOR).next()?;
    parse_plan_date(&element_text(title))
}

fn last_update(document: &Html, offset: FixedOffset) -> Option<String> {
    let text = document.root_element().text().collect::<String>();
    parse_last_update(&text, offset)
}
