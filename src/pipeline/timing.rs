//! Time normalization
//!
//! Onsets are measured from the start marker; each duration runs to the next
//! row of the merged sequence, and the last one runs to the end marker.

use crate::config::{NegativeOnsetPolicy, TIME_UNITS_PER_SECOND};
use crate::events::RawLogRecord;
use crate::{Error, Result};

/// Timestamp of the single row carrying `label`.
///
/// # Errors
///
/// Returns [`Error::MissingMarker`] when no row matches and
/// [`Error::AmbiguousMarker`] when more than one does.
pub fn resolve_marker(records: &[RawLogRecord], label: &str) -> Result<i64> {
    let mut matches = records.iter().filter(|r| r.label == label);
    let first = matches.next().ok_or_else(|| Error::MissingMarker {
        labels: vec![label.to_string()],
    })?;

    let extra = matches.count();
    if extra > 0 {
        return Err(Error::AmbiguousMarker {
            label: label.to_string(),
            count: extra + 1,
        });
    }
    Ok(first.time)
}

/// Start and end reference timestamps of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeAxis {
    /// Timestamp of the start marker.
    pub start: i64,
    /// Timestamp of the end marker.
    pub end: i64,
}

impl TimeAxis {
    /// Resolve both reference timestamps.
    ///
    /// # Errors
    ///
    /// Propagates [`resolve_marker`] errors.
    pub fn resolve(records: &[RawLogRecord], start_label: &str, end_label: &str) -> Result<Self> {
        Ok(Self {
            start: resolve_marker(records, start_label)?,
            end: resolve_marker(records, end_label)?,
        })
    }

    /// Seconds from the start marker to `time`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedLog`] if the tick difference overflows.
    pub fn onset(&self, time: i64) -> Result<f64> {
        tick_span(self.start, time).map(ticks_to_seconds)
    }
}

/// `to - from` in device ticks, rejecting timestamps too far apart to subtract.
fn tick_span(from: i64, to: i64) -> Result<i64> {
    to.checked_sub(from).ok_or_else(|| {
        Error::MalformedLog(format!("timestamps {from} and {to} are too far apart"))
    })
}

#[allow(clippy::cast_precision_loss)]
fn ticks_to_seconds(ticks: i64) -> f64 {
    ticks as f64 / TIME_UNITS_PER_SECOND
}

/// A record of the merged sequence with its onset and duration.
#[derive(Debug, Clone, Copy)]
pub struct Timed<'a> {
    /// Source row.
    pub record: &'a RawLogRecord,
    /// Seconds since the start marker.
    pub onset: f64,
    /// Seconds until the next row (or the end marker for the last row).
    pub duration: f64,
}

/// Assign onset and duration to every row of the merged sequence.
///
/// Durations are taken from integer timestamp differences so they match the
/// onset differences within floating point rounding.
///
/// # Errors
///
/// Returns [`Error::MalformedLog`] if a timestamp difference overflows.
pub fn assign_timing<'a>(
    sequence: &[&'a RawLogRecord],
    axis: TimeAxis,
) -> Result<Vec<Timed<'a>>> {
    sequence
        .iter()
        .enumerate()
        .map(|(i, &record)| {
            let next_time = sequence.get(i + 1).map_or(axis.end, |next| next.time);
            Ok(Timed {
                record,
                onset: axis.onset(record.time)?,
                duration: ticks_to_seconds(tick_span(record.time, next_time)?),
            })
        })
        .collect()
}

/// Flag rows that precede the start marker or have negative durations.
///
/// # Errors
///
/// Returns [`Error::NegativeOnset`] for the first negative onset under
/// [`NegativeOnsetPolicy::Reject`].
pub fn check_timing(timed: &[Timed<'_>], policy: NegativeOnsetPolicy) -> Result<()> {
    for row in timed {
        if row.onset < 0.0 {
            match policy {
                NegativeOnsetPolicy::Reject => {
                    return Err(Error::NegativeOnset {
                        trial: row.record.trial_index,
                        onset: row.onset,
                    });
                }
                NegativeOnsetPolicy::Warn => tracing::warn!(
                    trial = row.record.trial_index,
                    label = %row.record.label,
                    onset = row.onset,
                    "event precedes the start marker"
                ),
            }
        }
        if row.duration < 0.0 {
            tracing::warn!(
                trial = row.record.trial_index,
                label = %row.record.label,
                duration = row.duration,
                "negative duration: trial order disagrees with timestamps"
            );
        }
    }
    Ok(())
}
