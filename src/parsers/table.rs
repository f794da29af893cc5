use tracing::debug;

use crate::models::{Messages, RawTable, ScheduleEntry, GENERAL_GROUP};
use super::{is_dash_sentinel, normalize_cell};

/// Groups the rows of a schedule table by class.
///
/// The header row is dropped. A row with a single non-blank cell opens a
/// group (a dash cell opens [`GENERAL_GROUP`]); reopening a group name
/// starts it over empty. Multi-cell rows are appended to the open group;
/// rows before the first group and blank single-cell rows are ignored.
pub fn group_entries(table: &RawTable) -> Messages {
    let mut messages = Messages::new();
    let mut current: Option<String> = None;

    for row in table.iter().skip(1) {
        match row.as_slice() {
            [cell] if !cell.trim().is_empty() => {
                let key = if is_dash_sentinel(cell) {
                    GENERAL_GROUP.to_string()
                } else {
                    cell.trim().to_string()
                };
                messages.insert(key.clone(), Vec::new());
                current = Some(key);
            }
            cells if cells.len() > 1 => match current.as_ref().and_then(|key| messages.get_mut(key)) {
                Some(entries) => entries.push(ScheduleEntry::from_cells(cells, normalize_cell)),
                None => debug!("Skipping row outside of any class group: {:?}", cells),
            },
            _ => {}
        }
    }

    messages
}
