//! Print the header and footer metadata of a sealed container.

use anyhow::{Context, Result};
use clap::Parser;
use sealed_container::inspect::{inspect_path, ContainerReport, Region};
use sealed_container::ContainerLayout;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ctr-info", version, about = "Show sealed container metadata without decrypting")]
struct Args {
    /// Container to inspect.
    file: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let report = inspect_path(&args.file, &ContainerLayout::STANDARD)
        .with_context(|| format!("reading {}", args.file.display()))?;

    println!("{} ({} bytes)", args.file.display(), report.size);
    print_region(&report, Region::Header);
    print_region(&report, Region::Footer);
    Ok(())
}

fn print_region(report: &ContainerReport, region: Region) {
    let rows: Vec<_> = report.region(region).collect();
    let width = rows.iter().map(|r| r.field.len()).max().unwrap_or(0);

    println!();
    println!("[{region}]");
    for row in rows {
        println!("  {:<width$} | {}", row.field, row.value);
    }
}
