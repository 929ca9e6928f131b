//! Summary CSV of completed cases.
//!
//! The summary is rebuilt from completion markers every time it is written,
//! so cases finished by earlier runs are never lost.
use crate::case::CaseParameters;
use crate::config::SweepConfig;
use crate::marker::{case_state, CaseState};
use crate::paths::SweepPaths;
use crate::render::input_digest;
use crate::util::format_value;
use anyhow::{anyhow, Context, Result};
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRecord {
    #[serde(rename = "Simulation No.")]
    pub sequence_number: usize,
    #[serde(rename = "Radius", serialize_with = "serialize_value")]
    pub radius: f64,
    #[serde(rename = "Depth (cm)", serialize_with = "serialize_value")]
    pub depth_cm: f64,
    #[serde(rename = "Soil Permittivity", serialize_with = "serialize_value")]
    pub soil_permittivity: f64,
    #[serde(rename = "Root Permittivity", serialize_with = "serialize_value")]
    pub root_permittivity: f64,
    #[serde(rename = "Antenna")]
    pub antenna_label: String,
    #[serde(rename = "Folder Name")]
    pub case_id: String,
}

impl SummaryRecord {
    pub fn new(params: &CaseParameters, antenna_label: &str) -> Self {
        Self {
            sequence_number: params.index,
            radius: params.radius,
            depth_cm: params.depth_cm,
            soil_permittivity: params.soil_permittivity,
            root_permittivity: params.root_permittivity,
            antenna_label: antenna_label.to_string(),
            case_id: params.case_id.clone(),
        }
    }
}

fn serialize_value<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_value(*value))
}

/// Walk the plan in order and keep every complete case, first occurrence of
/// each case id only.
pub fn collect_summary(
    paths: &SweepPaths,
    config: &SweepConfig,
    cases: &[CaseParameters],
) -> Result<Vec<SummaryRecord>> {
    let mut seen = BTreeSet::new();
    let mut records = Vec::new();
    for case in cases {
        if !seen.insert(case.case_id.as_str()) {
            continue;
        }
        let digest = input_digest(case, config)?;
        if let CaseState::Complete(marker) = case_state(paths, &case.case_id, &digest) {
            records.push(SummaryRecord::new(case, &marker.antenna_label));
        }
    }
    Ok(records)
}

/// Replace the summary at `path` with `records`.
///
/// The file is written next to its destination and renamed into place so a
/// crash never leaves a truncated summary.
pub fn write_summary(path: &Path, records: &[SummaryRecord]) -> Result<()> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let temp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("create temp summary in {}", parent.display()))?;

    let mut writer = csv::Writer::from_writer(temp);
    if records.is_empty() {
        writer
            .write_record(SUMMARY_COLUMNS)
            .context("write summary header")?;
    }
    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("write summary row for {}", record.case_id))?;
    }
    let mut temp = writer
        .into_inner()
        .map_err(|err| anyhow!("flush summary: {}", err.error()))?;
    temp.flush().context("flush summary")?;
    temp.persist(path)
        .with_context(|| format!("write summary {}", path.display()))?;
    Ok(())
}

pub const SUMMARY_COLUMNS: [&str; 7] = [
    "Simulation No.",
    "Radius",
    "Depth (cm)",
    "Soil Permittivity",
    "Root Permittivity",
    "Antenna",
    "Folder Name",
];
