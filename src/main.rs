// main.rs — xcprovision entry point
//
// Parses the CLI, wires the default-profile provider (an explicit closure
// over the environment, not ambient state read inside the pipeline), runs
// the pipeline once, and prints the mutation summary. Any pipeline error
// terminates the process non-zero with a stage-naming diagnostic.

mod anchor;
mod cli;
mod error;
mod filter;
mod hash;
mod mutate;
mod pipeline;
mod profile;
mod project;
mod verify;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use cli::Cli;
use pipeline::{RunOptions, PROFILE_PATH_ENV};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let opts = RunOptions {
        xcodeproj: cli.xcodeproj,
        profile: cli.profile,
        target_filter: cli.target_filter,
        build_configuration: cli.build_configuration,
        certificate: cli.certificate,
        default_profile: Some(Box::new(profile_path_from_env)),
    };

    let report = pipeline::run(&opts).context("project provisioning update aborted")?;
    eprintln!("[xcprovision] {report}");
    Ok(())
}

fn profile_path_from_env() -> Option<PathBuf> {
    std::env::var(PROFILE_PATH_ENV)
        .ok()
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
