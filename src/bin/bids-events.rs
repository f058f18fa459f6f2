use anyhow::{Context, Result};
use bids_events::batch::{BatchDriver, BatchManifest};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bids-events", about = "Convert Presentation marker logs into BIDS events tables")]
struct Args {
    /// Dataset manifest (JSON)
    #[arg(long)]
    manifest: PathBuf,

    /// Worker threads (default: one per core)
    #[arg(long)]
    jobs: Option<usize>,

    /// Write the per-run outcomes as JSON
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let manifest = BatchManifest::load(&args.manifest)
        .with_context(|| format!("loading manifest {}", args.manifest.display()))?;
    let report = BatchDriver::from_manifest(&manifest)?
        .with_jobs(args.jobs)
        .run()?;

    if let Some(path) = &args.report {
        std::fs::write(path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("writing report {}", path.display()))?;
    }

    println!(
        "{} of {} runs succeeded",
        report.succeeded(),
        report.outcomes.len()
    );
    for failure in report.failures() {
        println!(
            "  sub-{} task-{}: {}",
            failure.subject_id,
            failure.task_id,
            failure.error.as_deref().unwrap_or("unknown error")
        );
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
