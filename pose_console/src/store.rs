//! Pose library persistence.
//!
//! The on-disk format is a pretty-printed JSON array of records in
//! insertion order.  Mirrors are never written; the library re-derives
//! them on load.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use pose_match::{HandPoseRecord, PoseLibrary};

/// Write the library (records only, insertion order) to `path`.
pub fn save_library(path: impl AsRef<Path>, library: &PoseLibrary) -> Result<()> {
    let path = path.as_ref();
    let records: Vec<&HandPoseRecord> = library.records().collect();
    let json = serde_json::to_string_pretty(&records)?;
    fs::write(path, json)
        .with_context(|| format!("failed to write pose library to {}", path.display()))?;
    Ok(())
}

/// Read a library back from `path`, re-deriving every mirror.
pub fn load_library(path: impl AsRef<Path>) -> Result<PoseLibrary> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read pose library from {}", path.display()))?;
    let records: Vec<HandPoseRecord> = serde_json::from_str(&json)?;
    let library = PoseLibrary::from_records(records)
        .with_context(|| format!("pose library at {} is not loadable", path.display()))?;
    Ok(library)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
