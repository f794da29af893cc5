use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One table as rendered: rows of trimmed cell texts, header row included.
pub type RawTable = Vec<Vec<String>>;

/// Entries grouped by class name (or [`super::GENERAL_GROUP`]).
pub type Messages = BTreeMap<String, Vec<ScheduleEntry>>;

/// A single substitution for one lesson period of one class.
///
/// A field is `None` when the source cell was a dash sentinel ("no change").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub stunde: Option<String>,
    pub vertreter: Option<String>,
    pub fach_vorher: Option<String>,
    pub fach_neu: Option<String>,
    pub raum_vorher: Option<String>,
    pub raum_neu: Option<String>,
    pub text: Option<String>,
}

impl ScheduleEntry {
    /// Builds an entry from positional cells; missing trailing cells become `""`.
    pub fn from_cells<F>(cells: &[String], normalize: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let cell = |idx: usize| match cells.get(idx) {
            Some(text) => normalize(text),
            None => Some(String::new()),
        };

        Self {
            stunde: cell(0),
            vertreter: cell(1),
            fach_vorher: cell(2),
            fach_neu: cell(3),
            raum_vorher: cell(4),
            raum_neu: cell(5),
            text: cell(6),
        }
    }
}
