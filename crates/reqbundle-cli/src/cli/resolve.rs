use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use reqbundle_manifest::{Manifest, ManifestError, Platform};
use tracing::debug;

use crate::cli::OutputFormat;
use crate::Result;

#[derive(Args)]
pub struct ResolveArgs {
    /// Path to the bundle manifest
    pub file: PathBuf,

    /// Target platform as a sys_platform value (linux, darwin, win32);
    /// defaults to the host platform
    #[arg(short, long)]
    pub platform: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub fn execute(args: ResolveArgs, quiet: bool) -> Result<()> {
    let platform = match &args.platform {
        Some(name) => Platform::from_sys_platform(name)
            .ok_or_else(|| ManifestError::UnknownPlatform(name.clone()))?,
        None => Platform::current(),
    };

    debug!("Resolving against target {}", platform.label());
    let manifest = Manifest::load_from_path(&args.file)?;
    let resolved = manifest.resolve(&platform)?;

    match args.format {
        OutputFormat::Json => {
            let map: BTreeMap<&str, String> = resolved
                .iter()
                .map(|(name, version)| (name.as_ref(), version.to_string()))
                .collect();
            println!("{}", serde_json::to_string_pretty(&map)?);
        }
        OutputFormat::Text => {
            for (name, version) in &resolved {
                println!("{}=={}", name.as_ref().bold(), version);
            }
            if !quiet {
                println!(
                    "\n{} of {} entries apply on {}",
                    resolved.len(),
                    manifest.len(),
                    platform.label()
                );
            }
        }
    }

    Ok(())
}
