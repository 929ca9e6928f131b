//! CLI argument parsing for the sweep workflow.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Base directory used when `--base-dir` is omitted.
pub const DEFAULT_BASE_DIR: &str = "GSSI_1500";

#[derive(Parser, Debug)]
#[command(
    name = "gprsweep",
    version,
    about = "Parameter-sweep driver for gprMax root-detection simulations",
    after_help = "Commands:\n  init --base-dir <dir>     Write sweep.json and an empty plan\n  plan --base-dir <dir>     Show every case in the plan and its state\n  run --base-dir <dir>      Render, simulate, merge, and clean each pending case\n  summary --base-dir <dir>  Rebuild the summary CSV from completed cases\n\nExamples:\n  gprsweep init --base-dir GSSI_1500\n  gprsweep plan --base-dir GSSI_1500 --json\n  gprsweep run --base-dir GSSI_1500",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Log debug detail (overridden by RUST_LOG)
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Init(InitArgs),
    Plan(PlanArgs),
    Run(RunArgs),
    Summary(SummaryArgs),
}

#[derive(Parser, Debug)]
#[command(about = "Write a default sweep.json and a header-only plan")]
pub struct InitArgs {
    /// Sweep base directory holding the plan, config, and case directories
    #[arg(long, value_name = "DIR", default_value = DEFAULT_BASE_DIR)]
    pub base_dir: PathBuf,

    /// Overwrite an existing sweep.json
    #[arg(long)]
    pub force: bool,
}

#[derive(Parser, Debug)]
#[command(about = "List the cases in the plan without running anything")]
pub struct PlanArgs {
    /// Sweep base directory holding the plan, config, and case directories
    #[arg(long, value_name = "DIR", default_value = DEFAULT_BASE_DIR)]
    pub base_dir: PathBuf,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Run every case that is not yet complete")]
pub struct RunArgs {
    /// Sweep base directory holding the plan, config, and case directories
    #[arg(long, value_name = "DIR", default_value = DEFAULT_BASE_DIR)]
    pub base_dir: PathBuf,
}

#[derive(Parser, Debug)]
#[command(about = "Rebuild the summary CSV from completion markers")]
pub struct SummaryArgs {
    /// Sweep base directory holding the plan, config, and case directories
    #[arg(long, value_name = "DIR", default_value = DEFAULT_BASE_DIR)]
    pub base_dir: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        RootArgs::command().debug_assert();
    }

    #[test]
    fn base_dir_defaults_and_verbose_is_global() {
        let args = RootArgs::try_parse_from(["gprsweep", "run", "--verbose"]).expect("parse");
        assert!(args.verbose);
        match args.command {
            Command::Run(run) => assert_eq!(run.base_dir, PathBuf::from(DEFAULT_BASE_DIR)),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn plan_accepts_json_flag() {
        let args = RootArgs::try_parse_from(["gprsweep", "plan", "--base-dir", "/tmp/s", "--json"])
            .expect("parse");
        match args.command {
            Command::Plan(plan) => {
                assert!(plan.json);
                assert_eq!(plan.base_dir, PathBuf::from("/tmp/s"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
