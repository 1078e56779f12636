use std::path::PathBuf;

use clap::Args;
use reqbundle_manifest::Manifest;

use crate::Result;

#[derive(Args)]
pub struct FmtArgs {
    /// Path to the bundle manifest
    pub file: PathBuf,

    /// Rewrite the file in place instead of printing to stdout
    #[arg(long)]
    pub write: bool,
}

pub fn execute(args: FmtArgs, quiet: bool) -> Result<()> {
    let manifest = Manifest::load_from_path(&args.file)?;

    if args.write {
        manifest.save_to_path(&args.file)?;
        if !quiet {
            println!("rewrote {} ({} entries)", args.file.display(), manifest.len());
        }
    } else {
        print!("{manifest}");
    }

    Ok(())
}
