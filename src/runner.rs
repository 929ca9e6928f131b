//! External simulator and merge-tool invocation.
//!
//! Both tools run synchronously in the caller's working directory with
//! inherited stdio. Their exit status decides whether a case completed.
use crate::config::{CommandSpec, SweepConfig};
use crate::paths::SweepPaths;
use anyhow::{anyhow, Context, Result};
use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, ExitStatus};

#[derive(Debug, Clone)]
pub struct SimulationCommands {
    simulator: CommandSpec,
    merge: CommandSpec,
    model_runs: u32,
}

impl SimulationCommands {
    pub fn from_config(config: &SweepConfig) -> Result<Self> {
        Ok(Self {
            simulator: CommandSpec::parse(&config.simulator_command, "simulator_command")?,
            merge: CommandSpec::parse(&config.merge_command, "merge_command")?,
            model_runs: config.model_runs,
        })
    }

    /// Resolve both programs before any case is touched.
    pub fn preflight(&self) -> Result<()> {
        for (label, spec) in [("simulator", &self.simulator), ("merge tool", &self.merge)] {
            let resolved = which::which(&spec.program)
                .with_context(|| format!("{label} program {:?} not found", spec.program))?;
            tracing::debug!(program = %resolved.display(), "resolved {label}");
        }
        Ok(())
    }

    /// Run `<simulator> <input> -n <model_runs>`.
    pub fn run_simulator(&self, input_path: &Path) -> Result<ExitStatus> {
        let extra = [
            input_path.as_os_str().to_os_string(),
            OsString::from("-n"),
            OsString::from(self.model_runs.to_string()),
        ];
        run_command(&self.simulator, &extra, "simulator")
    }

    /// Run `<merge> <output_stem>` to combine the per-run outputs.
    pub fn run_merge(&self, output_stem: &Path) -> Result<ExitStatus> {
        let extra = [output_stem.as_os_str().to_os_string()];
        run_command(&self.merge, &extra, "merge tool")
    }
}

/// Simulate and merge one case whose input has already been rendered.
///
/// Fails on a spawn error, a non-zero exit from either tool, or a merge that
/// exits cleanly without producing the merged output.
pub fn run_case(commands: &SimulationCommands, paths: &SweepPaths, case_id: &str) -> Result<()> {
    let status = commands.run_simulator(&paths.input_path(case_id))?;
    ensure_success(&status, "simulator")?;

    let status = commands.run_merge(&paths.output_stem(case_id))?;
    ensure_success(&status, "merge tool")?;

    let merged = paths.merged_output_path(case_id);
    if !merged.is_file() {
        return Err(anyhow!("merge tool did not produce {}", merged.display()));
    }
    Ok(())
}

fn run_command(spec: &CommandSpec, extra: &[OsString], label: &str) -> Result<ExitStatus> {
    let display_extra: Vec<String> = extra
        .iter()
        .map(|arg| arg.to_string_lossy().to_string())
        .collect();
    tracing::info!("{}", spec.display_with(&display_extra));

    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args);
    cmd.args(extra);
    let status = cmd
        .status()
        .with_context(|| format!("spawn {label} {:?}", spec.program))?;
    Ok(status)
}

fn ensure_success(status: &ExitStatus, label: &str) -> Result<()> {
    if status.success() {
        return Ok(());
    }
    Err(anyhow!("{label} failed with status {}", exit_status_string(status)))
}

fn exit_status_string(status: &ExitStatus) -> String {
    if let Some(code) = status.code() {
        format!("{code}")
    } else {
        "terminated by signal".to_string()
    }
}
