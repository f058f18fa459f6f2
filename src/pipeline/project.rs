//! Sentinel stripping and column projection

use super::labels::MarkerLabels;
use super::timing::Timed;
use crate::events::{EventRecord, EventTable};

/// Drop the start and end marker rows; they only anchor the time axis.
#[must_use]
pub fn strip_sentinels<'a>(timed: Vec<Timed<'a>>, labels: &MarkerLabels) -> Vec<Timed<'a>> {
    timed
        .into_iter()
        .filter(|t| !labels.is_sentinel(&t.record.label))
        .collect()
}

/// Keep subject, trial, type, onset and duration; everything else is dropped.
#[must_use]
pub fn project(timed: &[Timed<'_>]) -> EventTable {
    EventTable::new(
        timed
            .iter()
            .map(|t| {
                EventRecord::new(
                    t.record.subject_id.as_str(),
                    t.record.trial_index,
                    t.record.label.as_str(),
                    t.onset,
                    t.duration,
                )
            })
            .collect(),
    )
}
