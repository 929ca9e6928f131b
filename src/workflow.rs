use crate::case::{derive_cases, CaseParameters};
use crate::cleanup::clean_visualization_artifacts;
use crate::cli::{InitArgs, PlanArgs, RunArgs, SummaryArgs};
use crate::config::{self, SweepConfig};
use crate::lock::RunLock;
use crate::marker::{case_state, write_marker, CaseState};
use crate::paths::SweepPaths;
use crate::plan::{load_plan, plan_stub};
use crate::render::{input_digest, render_input, write_input};
use crate::runner::{run_case, SimulationCommands};
use crate::summary::{collect_summary, write_summary};
use crate::util::{display_path, sha256_hex};
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Loaded configuration plus the paths derived from it.
#[derive(Debug)]
pub struct SweepContext {
    pub paths: SweepPaths,
    pub config: SweepConfig,
}

impl SweepContext {
    pub fn load(base_dir: PathBuf) -> Result<Self> {
        let config = config::load_config_or_default(&base_dir)?;
        let paths = SweepPaths::from_config(base_dir, &config);
        Ok(Self { paths, config })
    }

    /// Load the plan and derive every case in plan order.
    pub fn load_cases(&self) -> Result<Vec<CaseParameters>> {
        let rows = load_plan(&self.paths.plan_path())?;
        Ok(derive_cases(&rows, &self.config))
    }

    /// State of `case` judged against the input it would be rendered with now.
    pub fn case_state(&self, case: &CaseParameters) -> Result<CaseState> {
        let digest = input_digest(case, &self.config)?;
        Ok(case_state(&self.paths, &case.case_id, &digest))
    }
}

/// Outcome of one `run` invocation.
#[derive(Debug, Default)]
pub struct SweepReport {
    pub executed: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<String>,
    pub summary_rows: usize,
}

pub fn ensure_base_dir(path: &Path, create: bool) -> Result<PathBuf> {
    if create {
        fs::create_dir_all(path)
            .with_context(|| format!("create base dir {}", path.display()))?;
    }
    path.canonicalize()
        .with_context(|| format!("resolve base dir {}", path.display()))
}

pub fn run_init(args: InitArgs) -> Result<()> {
    let base_dir = ensure_base_dir(&args.base_dir, true)?;
    let paths = SweepPaths::new(base_dir.clone());
    let config_path = paths.config_path();
    if config_path.is_file() && !args.force {
        return Err(anyhow!(
            "config already exists at {} (use --force to overwrite)",
            config_path.display()
        ));
    }
    let config = SweepConfig::default();
    config::write_config(&base_dir, &config)?;
    println!("wrote {}", config_path.display());

    let plan_path = SweepPaths::from_config(base_dir, &config).plan_path();
    if !plan_path.exists() {
        fs::write(&plan_path, plan_stub())
            .with_context(|| format!("write {}", plan_path.display()))?;
        println!("wrote {}", plan_path.display());
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct PlanEntry<'a> {
    #[serde(flatten)]
    case: &'a CaseParameters,
    state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

pub fn run_plan(args: PlanArgs) -> Result<()> {
    let base_dir = ensure_base_dir(&args.base_dir, false)?;
    let ctx = SweepContext::load(base_dir)?;
    let cases = ctx.load_cases()?;

    let mut complete = 0;
    let mut entries: Vec<PlanEntry<'_>> = Vec::with_capacity(cases.len());
    for case in &cases {
        let state = ctx.case_state(case)?;
        if state.is_complete() {
            complete += 1;
        }
        let detail = match &state {
            CaseState::Incomplete { reason } => Some(reason.clone()),
            _ => None,
        };
        entries.push(PlanEntry {
            case,
            state: state.label(),
            detail,
        });
    }

    if args.json {
        let text = serde_json::to_string_pretty(&entries).context("serialize plan")?;
        println!("{text}");
        return Ok(());
    }

    for entry in &entries {
        println!(
            "{:>4}  {:<10}  {}  (z_start {})",
            entry.case.index, entry.state, entry.case.case_id, entry.case.z_start
        );
        if let Some(detail) = &entry.detail {
            println!("      {detail}");
        }
    }
    println!(
        "{} case(s): {} complete, {} to run",
        entries.len(),
        complete,
        entries.len() - complete
    );
    Ok(())
}

pub fn run_sweep(args: RunArgs) -> Result<()> {
    let base_dir = ensure_base_dir(&args.base_dir, false)?;
    let ctx = SweepContext::load(base_dir)?;
    let cases = ctx.load_cases()?;
    let commands = SimulationCommands::from_config(&ctx.config)?;
    commands.preflight()?;
    let lock = RunLock::acquire(&ctx.paths)?;
    tracing::debug!("holding {}", lock.path().display());

    let report = execute_cases(&ctx, &commands, &cases)?;
    println!(
        "wrote {} ({} row(s))",
        ctx.paths.summary_path().display(),
        report.summary_rows
    );
    println!(
        "executed {}, skipped {}, failed {}",
        report.executed.len(),
        report.skipped.len(),
        report.failed.len()
    );
    if !report.failed.is_empty() {
        return Err(anyhow!(
            "{} case(s) failed: {}",
            report.failed.len(),
            report.failed.join(", ")
        ));
    }
    Ok(())
}

pub fn run_summary(args: SummaryArgs) -> Result<()> {
    let base_dir = ensure_base_dir(&args.base_dir, false)?;
    let ctx = SweepContext::load(base_dir)?;
    let cases = ctx.load_cases()?;
    let records = collect_summary(&ctx.paths, &ctx.config, &cases)?;
    let path = ctx.paths.summary_path();
    write_summary(&path, &records)?;
    println!("wrote {} ({} row(s))", path.display(), records.len());
    Ok(())
}

/// Process every case in plan order, then rebuild the summary.
///
/// A failing case is logged and recorded; only summary errors abort.
pub fn execute_cases(
    ctx: &SweepContext,
    commands: &SimulationCommands,
    cases: &[CaseParameters],
) -> Result<SweepReport> {
    let mut report = SweepReport::default();
    let mut attempted = BTreeSet::new();

    for case in cases {
        let case_id = case.case_id.as_str();
        if !attempted.insert(case_id) {
            tracing::warn!("case {case_id} repeats an earlier plan row, skipping");
            report.skipped.push(case_id.to_string());
            continue;
        }
        let state = match ctx.case_state(case) {
            Ok(state) => state,
            Err(err) => {
                tracing::error!("case {case_id} failed: {err:#}");
                report.failed.push(case_id.to_string());
                continue;
            }
        };
        match state {
            CaseState::Complete(_) => {
                tracing::warn!("case {case_id} already complete, skipping");
                report.skipped.push(case_id.to_string());
                continue;
            }
            CaseState::Incomplete { reason } => {
                tracing::warn!("case {case_id} is incomplete ({reason}), running it again");
            }
            CaseState::Pending => {}
        }

        match process_case(ctx, commands, case) {
            Ok(()) => report.executed.push(case_id.to_string()),
            Err(err) => {
                tracing::error!("case {case_id} failed: {err:#}");
                report.failed.push(case_id.to_string());
            }
        }
    }

    let records = collect_summary(&ctx.paths, &ctx.config, cases)?;
    write_summary(&ctx.paths.summary_path(), &records)?;
    report.summary_rows = records.len();
    Ok(report)
}

/// Render, simulate, merge, and clean one case; mark it complete on success.
fn process_case(
    ctx: &SweepContext,
    commands: &SimulationCommands,
    case: &CaseParameters,
) -> Result<()> {
    let case_id = case.case_id.as_str();
    tracing::info!("running simulation for {case_id}");

    let text = render_input(case, &ctx.config)?;
    let input_path = write_input(&ctx.paths, case, &text)?;
    tracing::debug!(
        "rendered {}",
        display_path(&input_path, Some(ctx.paths.root()))
    );

    let merged = ctx.paths.merged_output_path(case_id);
    if merged.is_file() {
        fs::remove_file(&merged)
            .with_context(|| format!("remove stale {}", merged.display()))?;
    }

    let run_result = run_case(commands, &ctx.paths, case_id);
    // geometry views are dropped whether or not the run succeeded
    let clean_result = clean_visualization_artifacts(
        &ctx.paths.case_dir(case_id),
        &ctx.config.visualization_extension,
    );
    run_result?;
    clean_result?;

    write_marker(
        &ctx.paths,
        case,
        &ctx.config.antenna_label,
        &sha256_hex(text.as_bytes()),
    )?;
    Ok(())
}

#[cfg(all(test, unix))]
#[path = "workflow_tests.rs"]
mod tests;
