//! Simulation plan loading.
//!
//! The plan is a CSV file whose header uses the sweep's original Spanish column
//! names. Rows are returned in file order and never modified afterwards.
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const RADIUS_COLUMN: &str = "Radio";
pub const DEPTH_COLUMN: &str = "Profundidad (cm)";
pub const SOIL_PERMITTIVITY_COLUMN: &str = "Permitividad Suelo";
pub const ROOT_PERMITTIVITY_COLUMN: &str = "Permitividad Ramas";

pub const PLAN_COLUMNS: [&str; 4] = [
    RADIUS_COLUMN,
    DEPTH_COLUMN,
    SOIL_PERMITTIVITY_COLUMN,
    ROOT_PERMITTIVITY_COLUMN,
];

/// One row of the sweep: root radius (m), burial depth (cm), and the two
/// relative permittivities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanRow {
    #[serde(rename = "Radio")]
    pub radius: f64,
    #[serde(rename = "Profundidad (cm)")]
    pub depth_cm: f64,
    #[serde(rename = "Permitividad Suelo")]
    pub soil_permittivity: f64,
    #[serde(rename = "Permitividad Ramas")]
    pub root_permittivity: f64,
}

/// Load the plan from `path`, failing on a missing file, a missing column, or
/// any cell that is not a number.
pub fn load_plan(path: &Path) -> Result<Vec<PlanRow>> {
    let bytes = fs::read(path).with_context(|| format!("read plan {}", path.display()))?;
    parse_plan(&bytes).with_context(|| format!("load plan {}", path.display()))
}

pub fn parse_plan(bytes: &[u8]) -> Result<Vec<PlanRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);
    let headers = reader.headers().context("read plan header")?.clone();
    for column in PLAN_COLUMNS {
        if !headers.iter().any(|header| header == column) {
            return Err(anyhow!("plan is missing column {column:?}"));
        }
    }

    let mut rows = Vec::new();
    for (idx, record) in reader.deserialize::<PlanRow>().enumerate() {
        let row = record.with_context(|| format!("parse plan row {}", idx + 1))?;
        rows.push(row);
    }
    Ok(rows)
}

/// Header-only plan written by `init` so users can fill in rows.
pub fn plan_stub() -> String {
    let mut out = String::new();
    for (idx, column) in PLAN_COLUMNS.iter().enumerate() {
        if idx > 0 {
            out.push(',');
        }
        out.push_str(column);
    }
    out.push('\n');
    out
}
