use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use reqbundle_manifest::Manifest;

use crate::cli::OutputFormat;
use crate::Result;

#[derive(Args)]
pub struct ListArgs {
    /// Path to the bundle manifest
    pub file: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub fn execute(args: ListArgs, quiet: bool) -> Result<()> {
    let manifest = Manifest::load_from_path(&args.file)?;

    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&manifest.entries)?);
        }
        OutputFormat::Text => {
            for entry in &manifest.entries {
                let mut line = format!("{}=={}", entry.name.as_ref().bold(), entry.version);
                if let Some(marker) = &entry.marker {
                    line.push_str(&format!("; {}", marker.to_string().yellow()));
                }
                if let Some(comment) = &entry.comment {
                    line.push_str(&format!("  {}", format!("# {comment}").dimmed()));
                }
                println!("{line}");
            }
            if !quiet {
                println!("\n{} entries", manifest.len());
            }
        }
    }

    Ok(())
}
