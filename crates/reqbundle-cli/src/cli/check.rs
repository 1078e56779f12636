use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use reqbundle_manifest::{Manifest, Platform};

use crate::{ReqbundleError, Result};

#[derive(Args)]
pub struct CheckArgs {
    /// Path to the bundle manifest
    pub file: PathBuf,
}

pub fn execute(args: CheckArgs, quiet: bool) -> Result<()> {
    // Malformed lines and bad markers surface here as syntax errors
    let manifest = Manifest::load_from_path(&args.file)?;

    let targets = [Platform::linux(), Platform::macos(), Platform::windows()];
    let problems = manifest.verify(&targets);

    if problems.is_empty() {
        if !quiet {
            println!(
                "{} {} entries, consistent on all {} targets",
                "ok:".green().bold(),
                manifest.len(),
                targets.len()
            );
        }
        return Ok(());
    }

    for problem in &problems {
        eprintln!("{} {problem}", "problem:".red().bold());
    }
    Err(ReqbundleError::CheckFailed(problems.len()))
}
