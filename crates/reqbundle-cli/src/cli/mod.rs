mod check;
mod fmt;
mod list;
mod resolve;

use clap::{Parser, Subcommand, ValueEnum};

use crate::Result;

#[derive(Parser)]
#[command(name = "reqbundle")]
#[command(about = "Inspect distribution bundle requirement manifests", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress summary output
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List manifest entries
    List(list::ListArgs),

    /// Validate the manifest across all bundle targets
    Check(check::CheckArgs),

    /// Resolve the applicable name-to-version mapping for a platform
    Resolve(resolve::ResolveArgs),

    /// Re-serialize the manifest in canonical form
    Fmt(fmt::FmtArgs),
}

/// Output format shared by `list` and `resolve`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }

    pub fn execute(self) -> Result<()> {
        let quiet = self.quiet;

        match self.command {
            Commands::List(args) => list::execute(args, quiet),
            Commands::Check(args) => check::execute(args, quiet),
            Commands::Resolve(args) => resolve::execute(args, quiet),
            Commands::Fmt(args) => fmt::execute(args, quiet),
        }
    }
}
