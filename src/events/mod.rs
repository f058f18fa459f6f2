//! Event data model
//!
//! ## Overview
//!
//! ```text
//! RawLogRecord (N) ──[pipeline]──> EventRecord (M ≤ N) ──> EventTable
//!                                        │
//!                                        └── ExtractionSummary (counts)
//! ```
//!
//! Raw records are read once per run and never mutated; event records are
//! produced fresh per run and written out.

mod event_record;
mod raw_record;
mod summary;

pub use event_record::{EventRecord, EventTable};
pub use raw_record::RawLogRecord;
pub use summary::ExtractionSummary;
