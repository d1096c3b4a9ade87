//! Decode every container listed in a JSON manifest.

use anyhow::{Context, Result};
use clap::Parser;
use sealed_container::{run_all, JobManifest, LogProgress};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ctr-batch", version, about = "Decode a batch of sealed containers")]
struct Args {
    /// Path to the job manifest (JSON).
    manifest: PathBuf,

    /// Maximum number of containers decoded at once (overrides the manifest).
    #[arg(short, long)]
    concurrency: Option<usize>,
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
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

/// Returns whether every job succeeded.
fn run(args: &Args) -> Result<bool> {
    let mut manifest = JobManifest::load(&args.manifest)
        .with_context(|| format!("loading manifest {}", args.manifest.display()))?;
    if let Some(concurrency) = args.concurrency {
        manifest.set_concurrency(concurrency)?;
    }
    let concurrency = manifest.concurrency;
    let jobs = manifest.into_jobs()?;

    for job in &jobs {
        if let Some(parent) = job.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output directory {}", parent.display()))?;
        }
    }

    let summary = run_all(&jobs, concurrency, &mut LogProgress)?;

    println!(
        "total: {}  completed: {}  failed: {}",
        summary.total, summary.completed, summary.failed
    );
    for failure in summary.failures() {
        if let Err(e) = &failure.result {
            println!("{}: {}", failure.id, e);
        }
    }

    Ok(summary.is_success())
}
