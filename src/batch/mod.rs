//! Batch driver
//!
//! Runs are independent: each one reads its own log, builds its own
//! [`RunConfig`](crate::RunConfig) and writes its own file. The only shared
//! state is read-only (quirk registry, log format), so runs execute on the
//! rayon pool with no locking.
//!
//! A failing run never stops the batch. Its error is recorded in a
//! [`RunOutcome`] and no output file is produced for it; the
//! [`BatchReport`] aggregates all outcomes and decides the exit status.

mod manifest;
mod naming;

pub use manifest::{BatchManifest, RunPlan, TaskSpec};
pub use naming::{events_path, FileNameTable, NamingException, NamingRule};

use crate::config::LogFormat;
use crate::events::ExtractionSummary;
use crate::pipeline::EventExtractor;
use crate::quirks::QuirkRegistry;
use crate::storage::{write_events_tsv, MarkerLog};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Final status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Events table written.
    Success,
    /// Run aborted; nothing written.
    Failed,
}

/// Result of one subject × task run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Subject identifier.
    pub subject_id: String,
    /// Task identifier.
    pub task_id: String,
    /// Run number.
    pub run_number: String,
    /// Final status.
    pub status: RunStatus,
    /// When processing began.
    pub started_at: DateTime<Utc>,
    /// When processing ended.
    pub ended_at: DateTime<Utc>,
    /// Written events table, on success.
    pub output: Option<PathBuf>,
    /// Extraction counts, on success.
    pub summary: Option<ExtractionSummary>,
    /// Error message, on failure.
    pub error: Option<String>,
}

/// Outcomes of every run of a batch, in plan order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// One entry per run.
    pub outcomes: Vec<RunOutcome>,
}

impl BatchReport {
    /// Number of successful runs.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == RunStatus::Success)
            .count()
    }

    /// Failed runs.
    pub fn failures(&self) -> impl Iterator<Item = &RunOutcome> {
        self.outcomes.iter().filter(|o| o.status == RunStatus::Failed)
    }

    /// True when every run succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Read, extract and write a single run.
///
/// # Errors
///
/// Any error of the reader, the pipeline or the writer. Nothing is written
/// unless extraction succeeded.
pub fn process_run(
    plan: &RunPlan,
    format: &LogFormat,
    quirks: &QuirkRegistry,
) -> Result<ExtractionSummary> {
    let records = MarkerLog::load(&plan.log_path, format)?.records()?;
    let extraction = EventExtractor::new(&plan.config, quirks).extract(&records)?;
    write_events_tsv(&plan.output_path, &extraction.table)?;
    Ok(extraction.summary)
}

/// Executes a set of runs and collects their outcomes.
#[derive(Debug, Clone)]
pub struct BatchDriver {
    plans: Vec<RunPlan>,
    format: LogFormat,
    quirks: QuirkRegistry,
    jobs: Option<usize>,
}

impl BatchDriver {
    /// Create a driver for explicit run plans.
    #[must_use]
    pub fn new(plans: Vec<RunPlan>, format: LogFormat, quirks: QuirkRegistry) -> Self {
        Self {
            plans,
            format,
            quirks,
            jobs: None,
        }
    }

    /// Create a driver for every subject × task pair of a manifest.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfig`] if the quirk registry is
    /// inconsistent.
    pub fn from_manifest(manifest: &BatchManifest) -> Result<Self> {
        let quirks = QuirkRegistry::new(manifest.quirks.iter().cloned())?;
        Ok(Self::new(manifest.runs(), manifest.log_format.clone(), quirks))
    }

    /// Limit the number of worker threads (default: one per core).
    #[must_use]
    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    /// Planned runs.
    #[must_use]
    pub fn plans(&self) -> &[RunPlan] {
        &self.plans
    }

    /// Process every run.
    ///
    /// # Errors
    ///
    /// Only fails if the worker pool cannot be created; run failures are
    /// reported in the [`BatchReport`].
    #[cfg(feature = "parallel")]
    pub fn run(&self) -> Result<BatchReport> {
        use rayon::prelude::*;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs.unwrap_or(0))
            .build()
            .map_err(|e| crate::Error::Other(format!("failed to build worker pool: {e}")))?;

        let outcomes: Vec<RunOutcome> =
            pool.install(|| self.plans.par_iter().map(|plan| self.run_one(plan)).collect());
        Ok(self.report(outcomes))
    }

    /// Process every run.
    ///
    /// # Errors
    ///
    /// Never fails without the `parallel` feature; run failures are reported
    /// in the [`BatchReport`].
    #[cfg(not(feature = "parallel"))]
    pub fn run(&self) -> Result<BatchReport> {
        let outcomes: Vec<RunOutcome> = self.plans.iter().map(|plan| self.run_one(plan)).collect();
        Ok(self.report(outcomes))
    }

    fn report(&self, outcomes: Vec<RunOutcome>) -> BatchReport {
        let report = BatchReport { outcomes };
        tracing::info!(
            runs = self.plans.len(),
            succeeded = report.succeeded(),
            failed = self.plans.len() - report.succeeded(),
            "batch finished"
        );
        report
    }

    fn run_one(&self, plan: &RunPlan) -> RunOutcome {
        let config = &plan.config;
        let span = tracing::info_span!(
            "run",
            subject = %config.subject_id,
            task = %config.task_id,
            run = %config.run_number
        );
        let _guard = span.enter();

        let started_at = Utc::now();
        let result = process_run(plan, &self.format, &self.quirks);
        let ended_at = Utc::now();

        let mut outcome = RunOutcome {
            subject_id: config.subject_id.clone(),
            task_id: config.task_id.clone(),
            run_number: config.run_number.clone(),
            status: RunStatus::Success,
            started_at,
            ended_at,
            output: None,
            summary: None,
            error: None,
        };

        match result {
            Ok(summary) => {
                tracing::info!(
                    output = %plan.output_path.display(),
                    events = summary.events,
                    triggers = summary.triggers,
                    triggers_nonzero_offset = summary.triggers_nonzero_offset,
                    discarded_pulses = summary.discarded_pulses,
                    "events table written"
                );
                outcome.output = Some(plan.output_path.clone());
                outcome.summary = Some(summary);
            }
            Err(e) => {
                tracing::error!(log = %plan.log_path.display(), error = %e, "run failed");
                outcome.status = RunStatus::Failed;
                outcome.error = Some(e.to_string());
            }
        }
        outcome
    }
}
