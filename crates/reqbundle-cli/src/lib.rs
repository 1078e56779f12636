//! reqbundle: CLI for inspecting the requirement manifests shipped with the
//! application's distribution bundles.

mod cli;
mod error;

pub use error::{ReqbundleError, Result};

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub fn run() -> Result<()> {
    let cli = cli::Cli::parse();
    init_logging(cli.verbosity());
    cli.execute()
}

fn init_logging(verbosity: u8) {
    let default = match verbosity {
        0 => "reqbundle=warn,reqbundle_manifest=warn",
        1 => "reqbundle=debug,reqbundle_manifest=debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().compact())
        .init();
}
