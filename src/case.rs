//! Per-row case derivation.
use crate::config::SweepConfig;
use crate::plan::PlanRow;
use crate::util::format_value;
use serde::Serialize;

/// Parameters for one simulation case, derived from a single plan row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseParameters {
    /// 1-based plan row number; doubles as the summary sequence number.
    pub index: usize,
    pub radius: f64,
    pub depth_cm: f64,
    pub soil_permittivity: f64,
    pub root_permittivity: f64,
    /// Height of the cylinder axis above the domain floor, in meters.
    pub z_start: f64,
    pub case_id: String,
}

pub fn derive_case(index: usize, row: &PlanRow, config: &SweepConfig) -> CaseParameters {
    CaseParameters {
        index,
        radius: row.radius,
        depth_cm: row.depth_cm,
        soil_permittivity: row.soil_permittivity,
        root_permittivity: row.root_permittivity,
        z_start: z_start(row.depth_cm, config.domain_depth, config.antenna_offset),
        case_id: case_id(row, &config.antenna_tag),
    }
}

/// Derive every case in plan order.
pub fn derive_cases(rows: &[PlanRow], config: &SweepConfig) -> Vec<CaseParameters> {
    rows.iter()
        .enumerate()
        .map(|(idx, row)| derive_case(idx + 1, row, config))
        .collect()
}

pub fn z_start(depth_cm: f64, domain_depth: f64, antenna_offset: f64) -> f64 {
    round_to_millimeters(domain_depth - antenna_offset - depth_cm / 100.0)
}

pub fn case_id(row: &PlanRow, antenna_tag: &str) -> String {
    format!(
        "radius_{}_depth_{}_soil_{}_root_{}_antenna_{}",
        format_value(row.radius),
        format_value(row.depth_cm),
        format_value(row.soil_permittivity),
        format_value(row.root_permittivity),
        antenna_tag
    )
}

/// Round to three decimals on the exact binary value, ties to even.
fn round_to_millimeters(meters: f64) -> f64 {
    let rounded = format!("{meters:.3}").parse::<f64>().unwrap_or(meters);
    // avoid rendering "-0"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(radius: f64, depth_cm: f64, soil: f64, root: f64) -> PlanRow {
        PlanRow {
            radius,
            depth_cm,
            soil_permittivity: soil,
            root_permittivity: root,
        }
    }

    #[test]
    fn z_start_subtracts_offset_and_depth() {
        assert_eq!(z_start(10.0, 0.485, 0.065), 0.32);
        assert_eq!(z_start(0.0, 0.485, 0.065), 0.42);
        assert_eq!(z_start(15.5, 0.485, 0.065), 0.265);
        assert_eq!(z_start(42.0, 0.485, 0.065), 0.0);
        assert_eq!(format_value(z_start(42.0, 0.485, 0.065)), "0");
        assert_eq!(z_start(50.0, 0.485, 0.065), -0.08);
    }

    #[test]
    fn z_start_rounds_to_millimeters() {
        assert_eq!(z_start(12.34, 0.485, 0.065), 0.297);
        assert_eq!(z_start(7.77, 0.485, 0.065), 0.342);
    }

    #[test]
    fn z_start_rounds_the_stored_value_not_its_scaled_copy() {
        // 0.4195 and 0.4105 are stored just below the midpoint
        assert_eq!(z_start(0.05, 0.485, 0.065), 0.419);
        assert_eq!(z_start(0.95, 0.485, 0.065), 0.41);
        assert_eq!(format_value(z_start(0.95, 0.485, 0.065)), "0.41");
    }

    #[test]
    fn derives_reference_case() {
        let config = SweepConfig::default();
        let case = derive_case(1, &row(0.01, 10.0, 6.0, 3.0), &config);
        assert_eq!(case.index, 1);
        assert_eq!(case.z_start, 0.32);
        assert_eq!(
            case.case_id,
            "radius_0.01_depth_10_soil_6_root_3_antenna_GSSI1500"
        );
    }

    #[test]
    fn case_id_is_deterministic_and_distinguishes_each_parameter() {
        let base = row(0.01, 10.0, 6.0, 3.0);
        let variants = [
            base,
            row(0.02, 10.0, 6.0, 3.0),
            row(0.01, 11.0, 6.0, 3.0),
            row(0.01, 10.0, 6.5, 3.0),
            row(0.01, 10.0, 6.0, 3.5),
            row(0.1, 10.0, 6.0, 3.0),
        ];
        let ids: Vec<String> = variants.iter().map(|r| case_id(r, "GSSI1500")).collect();
        for (i, a) in ids.iter().enumerate() {
            for b in ids.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
        assert_eq!(case_id(&base, "GSSI1500"), case_id(&base, "GSSI1500"));
    }

    #[test]
    fn derive_cases_numbers_rows_from_one() {
        let rows = [row(0.01, 10.0, 6.0, 3.0), row(0.02, 20.0, 6.0, 3.0)];
        let cases = derive_cases(&rows, &SweepConfig::default());
        let indices: Vec<usize> = cases.iter().map(|case| case.index).collect();
        assert_eq!(indices, vec![1, 2]);
        assert_eq!(cases[1].z_start, 0.22);
    }
}
