use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod case;
mod cleanup;
mod cli;
mod config;
mod lock;
mod marker;
mod paths;
mod plan;
mod render;
mod runner;
mod summary;
mod templates;
mod util;
mod workflow;

use cli::{Command, RootArgs};

fn main() -> Result<()> {
    let args = RootArgs::parse();
    init_tracing(args.verbose);

    match args.command {
        Command::Init(args) => workflow::run_init(args),
        Command::Plan(args) => workflow::run_plan(args),
        Command::Run(args) => workflow::run_sweep(args),
        Command::Summary(args) => workflow::run_summary(args),
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "gprsweep=debug" } else { "gprsweep=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal()),
        )
        .init();
}
