//! Sweep configuration helpers.
//!
//! Every setting has a compiled-in default; `sweep.json` in the base directory
//! may override any subset of them.
use crate::paths::SweepPaths;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_SCHEMA_VERSION: u32 = 1;

pub const DEFAULT_PLAN_FILE: &str = "Simulation_Plan.csv";
pub const DEFAULT_SUMMARY_FILE: &str = "simulation_summary.csv";
pub const DEFAULT_ANTENNA_TAG: &str = "GSSI1500";
pub const DEFAULT_ANTENNA_LABEL: &str = "GSSI 1500";
pub const DEFAULT_SIMULATOR_COMMAND: &str = "python -m gprMax";
pub const DEFAULT_MERGE_COMMAND: &str = "python -m tools.outputfiles_merge";
pub const DEFAULT_MODEL_RUNS: u32 = 54;
pub const DEFAULT_VISUALIZATION_EXTENSION: &str = "vti";
/// Height of the simulation domain along z, in meters.
pub const DEFAULT_DOMAIN_DEPTH: f64 = 0.485;
/// Air gap between the domain top and the soil surface, in meters.
pub const DEFAULT_ANTENNA_OFFSET: f64 = 0.065;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepConfig {
    pub schema_version: u32,
    pub plan_file: String,
    pub summary_file: String,
    pub antenna_tag: String,
    pub antenna_label: String,
    pub simulator_command: String,
    pub merge_command: String,
    pub model_runs: u32,
    pub visualization_extension: String,
    pub domain_depth: f64,
    pub antenna_offset: f64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            schema_version: CONFIG_SCHEMA_VERSION,
            plan_file: DEFAULT_PLAN_FILE.to_string(),
            summary_file: DEFAULT_SUMMARY_FILE.to_string(),
            antenna_tag: DEFAULT_ANTENNA_TAG.to_string(),
            antenna_label: DEFAULT_ANTENNA_LABEL.to_string(),
            simulator_command: DEFAULT_SIMULATOR_COMMAND.to_string(),
            merge_command: DEFAULT_MERGE_COMMAND.to_string(),
            model_runs: DEFAULT_MODEL_RUNS,
            visualization_extension: DEFAULT_VISUALIZATION_EXTENSION.to_string(),
            domain_depth: DEFAULT_DOMAIN_DEPTH,
            antenna_offset: DEFAULT_ANTENNA_OFFSET,
        }
    }
}

/// A program plus its leading arguments, split from a config string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn parse(raw: &str, field: &str) -> Result<Self> {
        let mut words =
            shell_words::split(raw).with_context(|| format!("parse {field} {raw:?}"))?;
        if words.is_empty() {
            return Err(anyhow!("{field} must be non-empty"));
        }
        let program = words.remove(0);
        Ok(Self {
            program,
            args: words,
        })
    }

    /// Render the command line for log output.
    pub fn display_with(&self, extra: &[String]) -> String {
        let mut words = Vec::with_capacity(1 + self.args.len() + extra.len());
        words.push(self.program.as_str());
        words.extend(self.args.iter().map(String::as_str));
        words.extend(extra.iter().map(String::as_str));
        shell_words::join(words)
    }
}

/// Load `sweep.json`, falling back to defaults when the file is absent.
pub fn load_config_or_default(base_dir: &Path) -> Result<SweepConfig> {
    let path = SweepPaths::new(base_dir.to_path_buf()).config_path();
    if !path.is_file() {
        return Ok(SweepConfig::default());
    }
    let bytes = fs::read(&path).with_context(|| format!("read config {}", path.display()))?;
    let config: SweepConfig = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse config {}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Persist a config in a stable JSON format.
pub fn write_config(base_dir: &Path, config: &SweepConfig) -> Result<()> {
    let path = SweepPaths::new(base_dir.to_path_buf()).config_path();
    fs::create_dir_all(base_dir)
        .with_context(|| format!("create base dir {}", base_dir.display()))?;
    let text = serde_json::to_string_pretty(config).context("serialize sweep config")?;
    fs::write(&path, text.as_bytes()).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn validate_config(config: &SweepConfig) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported sweep config schema_version {}",
            config.schema_version
        ));
    }
    validate_file_name(&config.plan_file, "plan_file")?;
    validate_file_name(&config.summary_file, "summary_file")?;
    if config.antenna_tag.trim().is_empty() {
        return Err(anyhow!("antenna_tag must be non-empty"));
    }
    if config.model_runs == 0 {
        return Err(anyhow!("model_runs must be at least 1"));
    }
    let extension = config.visualization_extension.trim();
    if extension.is_empty() || extension.contains(['/', '\\']) {
        return Err(anyhow!(
            "visualization_extension must be a bare extension (got {:?})",
            config.visualization_extension
        ));
    }
    CommandSpec::parse(&config.simulator_command, "simulator_command")?;
    CommandSpec::parse(&config.merge_command, "merge_command")?;
    Ok(())
}

fn validate_file_name(value: &str, field: &str) -> Result<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("{field} must be non-empty"));
    }
    if trimmed == "." || trimmed == ".." || trimmed.contains(['/', '\\']) {
        return Err(anyhow!(
            "{field} must be a file name inside the base dir (got {value:?})"
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
