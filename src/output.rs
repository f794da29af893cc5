use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::models::ExtractionResult;

pub fn to_json(result: &ExtractionResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("Failed to serialize extraction result")
}

/// Writes the result to `path`, or to stdout when no path is configured.
pub fn write_result(result: &ExtractionResult, path: Option<&str>) -> Result<()> {
    let json = to_json(result)?;

    match path {
        Some(path) => {
            let path = Path::new(path);
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(path, json + "\n")
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {} days to {}", result.days.len(), path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
