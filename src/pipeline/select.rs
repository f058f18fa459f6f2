//! Event selection, trigger deduplication and merge
//!
//! Both selections borrow from the same normalized record set; nothing is
//! copied until projection.

use super::labels::MarkerLabels;
use crate::config::FIRST_PULSE_MAX_TTIME;
use crate::events::RawLogRecord;

/// Rows whose label is a label of interest or one of the two markers.
#[must_use]
pub fn filter_events<'a>(records: &'a [RawLogRecord], labels: &MarkerLabels) -> Vec<&'a RawLogRecord> {
    records.iter().filter(|r| labels.is_selected(&r.label)).collect()
}

/// Trigger rows split into first pulses and redundant pulses.
#[derive(Debug, Default)]
pub struct TriggerSelection<'a> {
    /// One row per logical trigger.
    pub first_pulses: Vec<&'a RawLogRecord>,
    /// Later pulses of a burst (and rows with no pulse offset).
    pub discarded: usize,
}

/// Keep the first pulse of each trigger burst.
///
/// The device stamps the first pulse with `TTime` 0 or 1 and later pulses
/// with larger offsets, so a fixed threshold identifies it.
#[must_use]
pub fn first_trigger_pulses<'a>(records: &'a [RawLogRecord], trigger_label: &str) -> TriggerSelection<'a> {
    let mut selection = TriggerSelection::default();
    for record in records.iter().filter(|r| r.label == trigger_label) {
        match record.trigger_time {
            Some(offset) if offset <= FIRST_PULSE_MAX_TTIME => selection.first_pulses.push(record),
            _ => selection.discarded += 1,
        }
    }
    selection
}

/// Union of both selections in trial order.
///
/// The sort is stable, so rows sharing a trial index keep events before
/// triggers.
#[must_use]
pub fn merge_by_trial<'a>(
    events: Vec<&'a RawLogRecord>,
    triggers: Vec<&'a RawLogRecord>,
) -> Vec<&'a RawLogRecord> {
    let mut merged = events;
    merged.extend(triggers);
    merged.sort_by_key(|r| r.trial_index);
    merged
}
