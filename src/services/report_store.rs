//! Report Persistence
//!
//! Reports are written as pretty-printed JSON to a caller-chosen path.

use std::path::Path;

use release_cascade_core::CoreResult;
use release_cascade_pipeline::ReportSnapshot;

/// Write `snapshot` to `path`, creating parent directories as needed.
pub fn save_report(snapshot: &ReportSnapshot, path: impl AsRef<Path>) -> CoreResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, json)?;

    tracing::info!(path = %path.display(), run_id = %snapshot.run_id, "Saved build report");
    Ok(())
}

/// Read a report previously written by [`save_report`].
pub fn load_report(path: impl AsRef<Path>) -> CoreResult<ReportSnapshot> {
    let content = std::fs::read_to_string(path.as_ref())?;
    Ok(serde_json::from_str(&content)?)
}
