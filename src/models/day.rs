use serde::{Deserialize, Serialize};

use super::Messages;

/// All substitutions published for one calendar day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRecord {
    /// Plan date as `YYYY-MM-DD`, `None` when the title carried no date.
    pub date: Option<String>,
    pub messages: Messages,
}

impl DayRecord {
    /// Shallow merge: every group of `other` replaces the same group here.
    /// Groups only present in `self` are kept untouched.
    pub fn merge_from(&mut self, other: DayRecord) {
        for (group, entries) in other.messages {
            self.messages.insert(group, entries);
        }
    }
}

/// One frame's contribution: the day it describes plus the raw "Stand:" stamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCandidate {
    pub record: DayRecord,
    pub last_update: Option<String>,
}

/// Final artifact of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub last_update: Option<String>,
    pub last_scrape: String,
    pub days: Vec<DayRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScheduleEntry;
    use pretty_assertions::assert_eq;

    fn entry(stunde: &str) -> ScheduleEntry {
        ScheduleEntry {
            stunde: Some(stunde.to_string()),
            ..Default::default()
        }
    }

    fn day(groups: &[(&str, Vec<ScheduleEntry>)]) -> DayRecord {
        DayRecord {
            date: Some("2025-09-19".to_string()),
            messages: groups
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        }
    }

    #[test]
    fn test_merge_disjoint_groups_unions_keys() {
        let mut existing = day(&[("10a", vec![entry("1")])]);
        existing.merge_from(day(&[("10b", vec![entry("2")])]));

        assert_eq!(existing, day(&[("10a", vec![entry("1")]), ("10b", vec![entry("2")])]));
    }

    #[test]
    fn test_merge_replaces_whole_group() {
        let mut existing = day(&[("10a", vec![entry("1"), entry("2")])]);
        existing.merge_from(day(&[("10a", vec![entry("3")])]));

        assert_eq!(existing.messages["10a"], vec![entry("3")]);
    }

    #[test]
    fn test_merge_with_itself_is_unchanged() {
        let original = day(&[("10a", vec![entry("1")]), ("general", vec![])]);
        let mut merged = original.clone();
        merged.merge_from(original.clone());

        assert_eq!(merged, original);
    }

    #[test]
    fn test_serializes_nulls_and_field_names() {
        let result = ExtractionResult {
            last_update: None,
            last_scrape: "2025-09-19T10:00:00+02:00".to_string(),
            days: vec![day(&[("10a", vec![entry("3")])])],
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["last_update"], serde_json::Value::Null);
        assert_eq!(json["days"][0]["date"], "2025-09-19");
        let first = &json["days"][0]["messages"]["10a"][0];
        assert_eq!(first["stunde"], "3");
        for field in ["vertreter", "fach_vorher", "fach_neu", "raum_vorher", "raum_neu", "text"] {
            assert_eq!(first[field], serde_json::Value::Null, "{field}");
        }
    }
}
