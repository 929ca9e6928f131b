//! Typed paths into a sweep base directory.
//!
//! Every file the workflow touches is derived here so the layout stays in one
//! place: `<base>/<case_id>/` per case plus a handful of root-level files.
use crate::config::{SweepConfig, DEFAULT_PLAN_FILE, DEFAULT_SUMMARY_FILE};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "sweep.json";
pub const LOCK_FILE: &str = ".gprsweep.lock";
pub const MARKER_FILE: &str = ".complete.json";
pub const INPUT_EXTENSION: &str = "in";

/// Convenience wrapper for locating sweep artifacts.
#[derive(Debug, Clone)]
pub struct SweepPaths {
    root: PathBuf,
    plan_file: String,
    summary_file: String,
}

impl SweepPaths {
    /// Paths rooted at `root` using the default plan and summary names.
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            plan_file: DEFAULT_PLAN_FILE.to_string(),
            summary_file: DEFAULT_SUMMARY_FILE.to_string(),
        }
    }

    /// Paths rooted at `root` using the file names from `config`.
    pub fn from_config(root: PathBuf, config: &SweepConfig) -> Self {
        Self {
            root,
            plan_file: config.plan_file.clone(),
            summary_file: config.summary_file.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.root.join(LOCK_FILE)
    }

    pub fn plan_path(&self) -> PathBuf {
        self.root.join(&self.plan_file)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.root.join(&self.summary_file)
    }

    /// Return the `<base>/<case_id>/` directory.
    pub fn case_dir(&self, case_id: &str) -> PathBuf {
        self.root.join(case_id)
    }

    /// Return the rendered simulator input `<case_id>/<case_id>.in`.
    pub fn input_path(&self, case_id: &str) -> PathBuf {
        self.case_dir(case_id).join(format!("{case_id}.{INPUT_EXTENSION}"))
    }

    /// Return the base path handed to the merge tool (input without extension).
    pub fn output_stem(&self, case_id: &str) -> PathBuf {
        self.case_dir(case_id).join(case_id)
    }

    /// Return the merged output the merge tool is expected to produce.
    pub fn merged_output_path(&self, case_id: &str) -> PathBuf {
        self.case_dir(case_id).join(format!("{case_id}_merged.out"))
    }

    pub fn marker_path(&self, case_id: &str) -> PathBuf {
        self.case_dir(case_id).join(MARKER_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_paths_share_the_case_directory() {
        let paths = SweepPaths::new(PathBuf::from("/sweep"));
        let id = "radius_0.01_depth_10_soil_6_root_3_antenna_GSSI1500";
        let dir = paths.case_dir(id);
        assert_eq!(dir, PathBuf::from("/sweep").join(id));
        assert_eq!(paths.input_path(id), dir.join(format!("{id}.in")));
        assert_eq!(paths.output_stem(id), dir.join(id));
        assert_eq!(
            paths.merged_output_path(id),
            dir.join(format!("{id}_merged.out"))
        );
        assert_eq!(paths.marker_path(id), dir.join(".complete.json"));
    }

    #[test]
    fn file_names_follow_config() {
        let config = SweepConfig {
            plan_file: "plan.csv".to_string(),
            summary_file: "out.csv".to_string(),
            ..SweepConfig::default()
        };
        let paths = SweepPaths::from_config(PathBuf::from("/sweep"), &config);
        assert_eq!(paths.plan_path(), PathBuf::from("/sweep/plan.csv"));
        assert_eq!(paths.summary_path(), PathBuf::from("/sweep/out.csv"));

        let defaults = SweepPaths::new(PathBuf::from("/sweep"));
        assert_eq!(
            defaults.plan_path(),
            PathBuf::from("/sweep/Simulation_Plan.csv")
        );
        assert_eq!(
            defaults.summary_path(),
            PathBuf::from("/sweep/simulation_summary.csv")
        );
    }
}
