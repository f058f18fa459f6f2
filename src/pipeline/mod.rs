//! Log-to-events pipeline
//!
//! ```text
//! RawLogRecord[]
//!   │
//!   ├─ normalize_records()       labels → upper case
//!   ├─ validate_markers()        start + end marker present
//!   ├─ filter_events()  ┐        labels of interest + markers
//!   ├─ first_trigger_pulses() ┘  TTime ≤ 1 only
//!   ├─ merge_by_trial()          stable sort by trial index
//!   ├─ assign_timing()           onset / duration in seconds
//!   ├─ strip_sentinels()         drop start / end marker rows
//!   ├─ project()                 → EventTable
//!   └─ QuirkRegistry::apply()    dataset-specific corrections
//! ```
//!
//! Each stage is a pure function and is exported on its own; [`EventExtractor`]
//! chains them for one run. A run is single-threaded and shares nothing
//! mutable with other runs.

mod labels;
mod project;
mod select;
mod timing;

pub use labels::{missing_labels, normalize_label, normalize_records, validate_markers, MarkerLabels};
pub use project::{project, strip_sentinels};
pub use select::{filter_events, first_trigger_pulses, merge_by_trial, TriggerSelection};
pub use timing::{assign_timing, check_timing, resolve_marker, TimeAxis, Timed};

use crate::config::{RunConfig, FIRST_PULSE_MAX_TTIME};
use crate::events::{EventTable, ExtractionSummary, RawLogRecord};
use crate::quirks::QuirkRegistry;
use crate::Result;

/// Output of one run: the events table and its informational counts.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Final events table.
    pub table: EventTable,
    /// Counts for manual plausibility checking.
    pub summary: ExtractionSummary,
}

/// Converts the raw rows of one run into its events table.
///
/// # Example
///
/// ```rust
/// use bids_events::{EventExtractor, QuirkRegistry, RawLogRecord, RunConfig};
///
/// let config = RunConfig::builder("002", "conditioning", "01")
///     .labels_of_interest(["PAIN"])
///     .build();
/// let quirks = QuirkRegistry::default();
///
/// let records = vec![
///     RawLogRecord::new("002", 1, "Start", 1000),
///     RawLogRecord::new("002", 2, "pain", 3000),
///     RawLogRecord::new("002", 3, "End", 6000),
/// ];
///
/// let extraction = EventExtractor::new(&config, &quirks).extract(&records)?;
/// let pain = &extraction.table.events()[0];
/// assert_eq!(pain.trial_type(), "PAIN");
/// assert!((pain.onset_seconds() - 0.2).abs() < 1e-9);
/// assert!((pain.duration_seconds() - 0.3).abs() < 1e-9);
/// # Ok::<(), bids_events::Error>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct EventExtractor<'a> {
    config: &'a RunConfig,
    quirks: &'a QuirkRegistry,
}

impl<'a> EventExtractor<'a> {
    /// Create an extractor for one run.
    #[must_use]
    pub const fn new(config: &'a RunConfig, quirks: &'a QuirkRegistry) -> Self {
        Self { config, quirks }
    }

    /// Run the full pipeline.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::InvalidConfig`] for inconsistent marker labels
    /// - [`crate::Error::MissingMarker`] if the start or end marker is absent
    /// - [`crate::Error::AmbiguousMarker`] if a marker occurs more than once
    /// - [`crate::Error::NegativeOnset`] for events before the start marker
    ///   under the `Reject` policy
    /// - [`crate::Error::MalformedLog`] if timestamps are too far apart to subtract
    pub fn extract(&self, records: &[RawLogRecord]) -> Result<Extraction> {
        let labels = MarkerLabels::from_config(self.config)?;
        let records = normalize_records(records);
        validate_markers(&records, &labels)?;

        let missing = missing_labels(&records, &labels);
        if !missing.is_empty() {
            tracing::warn!(?missing, "labels of interest not present in log");
        }

        let events = filter_events(&records, &labels);
        let triggers = first_trigger_pulses(&records, labels.trigger());
        tracing::debug!(
            events = events.len(),
            triggers = triggers.first_pulses.len(),
            discarded = triggers.discarded,
            "selected rows"
        );

        let triggers_kept = triggers.first_pulses.len();
        let triggers_nonzero_offset = triggers
            .first_pulses
            .iter()
            .filter(|r| r.trigger_time.is_some_and(|t| t != 0 && t <= FIRST_PULSE_MAX_TTIME))
            .count();

        let merged = merge_by_trial(events, triggers.first_pulses);
        let axis = TimeAxis::resolve(&records, labels.start(), labels.end())?;
        let timed = assign_timing(&merged, axis)?;
        check_timing(&timed, self.config.negative_onsets)?;

        let mut table = project(&strip_sentinels(timed, &labels));
        let quirk_rows_removed = self.quirks.apply(self.config, &mut table);

        let summary = ExtractionSummary {
            events: table.len(),
            triggers: triggers_kept,
            triggers_nonzero_offset,
            discarded_pulses: triggers.discarded,
            quirk_rows_removed,
            missing_labels: missing,
        };

        Ok(Extraction { table, summary })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn config() -> RunConfig {
        RunConfig::builder("002", "conditioning", "01")
            .labels_of_interest(["EVENT1"])
            .build()
    }

    fn scenario() -> Vec<RawLogRecord> {
        vec![
            RawLogRecord::new("002", 1, "START", 1000),
            RawLogRecord::new("002", 2, "EVENT1", 1500),
            RawLogRecord::new("002", 3, "TRIGGER", 1500).with_trigger_time(0),
            RawLogRecord::new("002", 4, "TRIGGER", 1510).with_trigger_time(10),
            RawLogRecord::new("002", 5, "END", 2000),
        ]
    }

    #[test]
    fn test_scenario_two_rows() {
        let cfg = config();
        let quirks = QuirkRegistry::default();
        let extraction = EventExtractor::new(&cfg, &quirks).extract(&scenario()).unwrap();

        let events = extraction.table.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].trial_type(), "EVENT1");
        assert_eq!(events[1].trial_type(), "TRIGGER");
        assert!((events[0].onset_seconds() - 0.05).abs() < 1e-12);
        assert!((events[1].onset_seconds() - 0.05).abs() < 1e-12);
        assert!((events[1].duration_seconds() - 0.05).abs() < 1e-12);

        assert_eq!(extraction.summary.triggers, 1);
        assert_eq!(extraction.summary.discarded_pulses, 1);
        assert_eq!(extraction.summary.triggers_nonzero_offset, 0);
    }

    #[test]
    fn test_missing_end_marker() {
        let cfg = config();
        let quirks = QuirkRegistry::default();
        let mut records = scenario();
        records.pop();

        let err = EventExtractor::new(&cfg, &quirks).extract(&records).unwrap_err();
        assert!(matches!(err, Error::MissingMarker { labels } if labels == ["END"]));
    }

    #[test]
    fn test_duplicate_start_marker_is_ambiguous() {
        let cfg = config();
        let quirks = QuirkRegistry::default();
        let mut records = scenario();
        records.push(RawLogRecord::new("002", 6, "start", 2100));

        let err = EventExtractor::new(&cfg, &quirks).extract(&records).unwrap_err();
        assert!(matches!(err, Error::AmbiguousMarker { count: 2, .. }));
    }

    #[test]
    fn test_missing_labels_reported() {
        let cfg = RunConfig::builder("002", "conditioning", "01")
            .labels_of_interest(["EVENT1", "VAS"])
            .build();
        let quirks = QuirkRegistry::default();
        let extraction = EventExtractor::new(&cfg, &quirks).extract(&scenario()).unwrap();
        assert_eq!(extraction.summary.missing_labels, ["VAS"]);
    }
}
