//! # bids-events: Presentation Marker Logs → BIDS Events Tables
//!
//! Converts the per-session marker log written by a stimulus-presentation
//! program into one `*_events.tsv` table per run (subject × task), with
//! `trial_type`, `onset` and `duration` relative to the first scan volume.
//!
//! ## Pipeline
//!
//! ```text
//! <subject>_<task>.log
//!   │
//!   ├─ storage::MarkerLog         tab-delimited text → Arrow → RawLogRecord[]
//!   ├─ pipeline::EventExtractor   normalize, validate, select, dedup, time
//!   ├─ quirks::QuirkRegistry      dataset-specific corrections
//!   └─ storage::write_events_tsv  EventTable → Arrow → TSV (atomic rename)
//!        │
//!        └─→ sub-<id>/func/sub-<id>_task-<task>_run-<nn>_events.tsv
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use bids_events::batch::{BatchDriver, BatchManifest};
//!
//! let manifest = BatchManifest::load("dataset.json")?;
//! let report = BatchDriver::from_manifest(&manifest)?.run()?;
//!
//! for failure in report.failures() {
//!     eprintln!("{} {}: {:?}", failure.subject_id, failure.task_id, failure.error);
//! }
//! # Ok::<(), bids_events::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod batch;
pub mod config;
pub mod error;
pub mod events;
pub mod pipeline;
pub mod quirks;
pub mod storage;

pub use config::{LogFormat, NegativeOnsetPolicy, RunConfig};
pub use error::{Error, Result};
pub use events::{EventRecord, EventTable, ExtractionSummary, RawLogRecord};
pub use pipeline::{EventExtractor, Extraction};
pub use quirks::{Correction, QuirkEntry, QuirkRegistry};
