//! Completion markers.
//!
//! A case counts as done only once `.complete.json` exists in its directory.
//! The marker is written after the merge succeeds, so an interrupted or failed
//! run leaves a directory without one.
use crate::case::CaseParameters;
use crate::paths::SweepPaths;
use crate::util::now_epoch_ms;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;

pub const MARKER_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionMarker {
    pub schema_version: u32,
    pub case_id: String,
    pub sequence_number: usize,
    pub radius: f64,
    pub depth_cm: f64,
    pub soil_permittivity: f64,
    pub root_permittivity: f64,
    pub antenna_label: String,
    /// SHA-256 of the rendered input the outputs were produced from.
    pub input_sha256: String,
    pub completed_at_epoch_ms: u128,
}

/// On-disk state of a case, derived from its directory and marker.
#[derive(Debug, Clone, PartialEq)]
pub enum CaseState {
    Pending,
    Incomplete { reason: String },
    Complete(Box<CompletionMarker>),
}

impl CaseState {
    pub fn label(&self) -> &'static str {
        match self {
            CaseState::Pending => "pending",
            CaseState::Incomplete { .. } => "incomplete",
            CaseState::Complete(_) => "complete",
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, CaseState::Complete(_))
    }
}

impl fmt::Display for CaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseState::Incomplete { reason } => write!(f, "incomplete ({reason})"),
            other => f.write_str(other.label()),
        }
    }
}

pub fn write_marker(
    paths: &SweepPaths,
    params: &CaseParameters,
    antenna_label: &str,
    input_sha256: &str,
) -> Result<CompletionMarker> {
    let marker = CompletionMarker {
        schema_version: MARKER_SCHEMA_VERSION,
        case_id: params.case_id.clone(),
        sequence_number: params.index,
        radius: params.radius,
        depth_cm: params.depth_cm,
        soil_permittivity: params.soil_permittivity,
        root_permittivity: params.root_permittivity,
        antenna_label: antenna_label.to_string(),
        input_sha256: input_sha256.to_string(),
        completed_at_epoch_ms: now_epoch_ms()?,
    };
    let path = paths.marker_path(&params.case_id);
    let text = serde_json::to_string_pretty(&marker).context("serialize completion marker")?;
    fs::write(&path, text.as_bytes()).with_context(|| format!("write {}", path.display()))?;
    Ok(marker)
}

/// Load a marker; `Ok(None)` when the file does not exist.
pub fn load_marker(paths: &SweepPaths, case_id: &str) -> Result<Option<CompletionMarker>> {
    let path = paths.marker_path(case_id);
    if !path.is_file() {
        return Ok(None);
    }
    let bytes = fs::read(&path).with_context(|| format!("read marker {}", path.display()))?;
    let marker: CompletionMarker = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse marker {}", path.display()))?;
    Ok(Some(marker))
}

/// Classify a case as pending, incomplete, or complete.
///
/// `input_sha256` is the digest of the input the case would be rendered with
/// now; a marker recorded for different input is stale. An unreadable marker
/// makes the case incomplete so it gets re-run.
pub fn case_state(paths: &SweepPaths, case_id: &str, input_sha256: &str) -> CaseState {
    if !paths.case_dir(case_id).is_dir() {
        return CaseState::Pending;
    }
    match load_marker(paths, case_id) {
        Ok(Some(marker)) if marker.case_id != case_id => CaseState::Incomplete {
            reason: format!("marker belongs to {}", marker.case_id),
        },
        Ok(Some(marker)) if marker.input_sha256 != input_sha256 => CaseState::Incomplete {
            reason: "input changed".to_string(),
        },
        Ok(Some(marker)) => CaseState::Complete(Box::new(marker)),
        Ok(None) => CaseState::Incomplete {
            reason: "no completion marker".to_string(),
        },
        Err(err) => CaseState::Incomplete {
            reason: format!("{err:#}"),
        },
    }
}
