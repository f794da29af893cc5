use std::time::Duration;
use thiserror::Error;

/// Failures the extraction engine names itself.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("No table with \"Stunde\" found. Available: {available}")]
    NoScheduleTable { available: String },

    #[error("No frame with tables found")]
    NoFrames,

    #[error("Timed out after {after:?} waiting for {what}")]
    Timeout { what: &'static str, after: Duration },

    #[error("Login form not found on {0}")]
    LoginFormNotFound(String),

    #[error("Element containing \"{0}\" not found")]
    PlanLinkNotFound(String),

    #[error("Missing configuration value: {0}")]
    MissingConfig(&'static str),

    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: &'static str },
}

impl ScrapeError {
    pub fn no_schedule_table(first_cells: &[String]) -> Self {
        let available = first_cells
            .iter()
            .enumerate()
            .map(|(i, text)| format!("Table {}: \"{}\"", i + 1, text))
            .collect::<Vec<_>>()
            .join(", ");
        ScrapeError::NoScheduleTable { available }
    }
}
