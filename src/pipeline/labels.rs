//! Label normalization and marker validation

use crate::config::RunConfig;
use crate::events::RawLogRecord;
use crate::{Error, Result};
use rustc_hash::FxHashSet;

/// Canonical (upper-case) form of a marker label.
#[must_use]
pub fn normalize_label(label: &str) -> String {
    label.to_uppercase()
}

/// Copy of `records` with every label in canonical form.
#[must_use]
pub fn normalize_records(records: &[RawLogRecord]) -> Vec<RawLogRecord> {
    records
        .iter()
        .map(|r| RawLogRecord {
            label: normalize_label(&r.label),
            ..r.clone()
        })
        .collect()
}

/// Normalized label sets of a run.
///
/// The trigger label is never part of `of_interest`: trigger rows always go
/// through pulse deduplication, so the event and trigger selections stay
/// disjoint.
#[derive(Debug, Clone)]
pub struct MarkerLabels {
    start: String,
    end: String,
    trigger: String,
    of_interest: Vec<String>,
    selected: FxHashSet<String>,
}

impl MarkerLabels {
    /// Normalize and check the labels of a run configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if a marker label is empty, the start
    /// and end markers coincide, or the trigger label equals a marker.
    pub fn from_config(config: &RunConfig) -> Result<Self> {
        let start = normalize_label(&config.start_marker_label);
        let end = normalize_label(&config.end_marker_label);
        let trigger = normalize_label(&config.trigger_label);

        if start.is_empty() || end.is_empty() || trigger.is_empty() {
            return Err(Error::InvalidConfig(
                "start, end and trigger labels must be non-empty".to_string(),
            ));
        }
        if start == end {
            return Err(Error::InvalidConfig(format!(
                "start and end marker are both {start}"
            )));
        }
        if trigger == start || trigger == end {
            return Err(Error::InvalidConfig(format!(
                "trigger label {trigger} doubles as a start/end marker"
            )));
        }

        let mut of_interest = Vec::with_capacity(config.labels_of_interest.len());
        for label in config.labels_of_interest.iter().map(|l| normalize_label(l)) {
            if label == trigger {
                tracing::debug!(%label, "trigger label listed as label of interest, routed to deduplication");
                continue;
            }
            if !of_interest.contains(&label) {
                of_interest.push(label);
            }
        }

        let mut selected: FxHashSet<String> = of_interest.iter().cloned().collect();
        selected.insert(start.clone());
        selected.insert(end.clone());

        Ok(Self {
            start,
            end,
            trigger,
            of_interest,
            selected,
        })
    }

    /// Normalized start marker.
    #[must_use]
    pub fn start(&self) -> &str {
        &self.start
    }

    /// Normalized end marker.
    #[must_use]
    pub fn end(&self) -> &str {
        &self.end
    }

    /// Normalized trigger label.
    #[must_use]
    pub fn trigger(&self) -> &str {
        &self.trigger
    }

    /// Normalized labels of interest, trigger label excluded, in config order.
    #[must_use]
    pub fn of_interest(&self) -> &[String] {
        &self.of_interest
    }

    /// Whether `label` belongs to the labels of interest or the two markers.
    #[must_use]
    pub fn is_selected(&self, label: &str) -> bool {
        self.selected.contains(label)
    }

    /// Whether `label` is the start or end marker.
    #[must_use]
    pub fn is_sentinel(&self, label: &str) -> bool {
        label == self.start || label == self.end
    }
}

/// Check that both markers occur at least once.
///
/// # Errors
///
/// Returns [`Error::MissingMarker`] listing every absent marker.
pub fn validate_markers(records: &[RawLogRecord], labels: &MarkerLabels) -> Result<()> {
    let missing: Vec<String> = [labels.start(), labels.end()]
        .into_iter()
        .filter(|marker| !records.iter().any(|r| r.label == *marker))
        .map(str::to_string)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::MissingMarker { labels: missing })
    }
}

/// Labels of interest that never occur in `records`.
#[must_use]
pub fn missing_labels(records: &[RawLogRecord], labels: &MarkerLabels) -> Vec<String> {
    let present: FxHashSet<&str> = records.iter().map(|r| r.label.as_str()).collect();
    labels
        .of_interest()
        .iter()
        .filter(|l| !present.contains(l.as_str()))
        .cloned()
        .collect()
}
