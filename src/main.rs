//! Main entry point for the paq CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use paq::cli::{Cli, Command};
use paq::ScanOptions;

/// Application entry point.
///
/// Everything runs on a single thread; commands execute one step at a time.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level()))
        .format_timestamp(None)
        .init();

    match &cli.command {
        Command::Pack { paths, output } => pack(&cli, paths, output).await?,
        Command::Unpack {
            package,
            output,
            lenient,
        } => unpack(&cli, package, output, *lenient).await?,
        Command::Scan { packages, lenient } => scan(packages, *lenient).await?,
    }

    if !cli.is_quiet() {
        println!("done.");
    }
    Ok(())
}

/// Pack `paths` into a new container.
async fn pack(cli: &Cli, paths: &[PathBuf], output: &Path) -> Result<()> {
    let target = paq::pack(output, paths)
        .await
        .with_context(|| format!("failed to pack {}", output.display()))?;

    if !cli.is_quiet() {
        println!("  created: {}", target.display());
    }
    Ok(())
}

/// Print the metadata of every package.
async fn scan(packages: &[PathBuf], lenient: bool) -> Result<()> {
    let options = ScanOptions { lenient };
    for package in packages {
        let raw = paq::scan(package, options)
            .await
            .with_context(|| format!("failed to scan {}", package.display()))?;
        print!("{raw}");
    }
    Ok(())
}

/// Extract a package into `dest_dir`.
async fn unpack(cli: &Cli, package: &Path, dest_dir: &Path, lenient: bool) -> Result<()> {
    let written = paq::unpack(package, dest_dir, ScanOptions { lenient })
        .await
        .with_context(|| format!("failed to unpack {}", package.display()))?;

    if !cli.is_quiet() {
        for path in &written {
            println!("  extracting: {}", path.display());
        }
    }
    Ok(())
}
