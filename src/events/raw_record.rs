//! Raw Log Record - one row of the marker log

use serde::{Deserialize, Serialize};

/// One row of the source marker log.
///
/// `trial_index` is the ordering key for every row of a run. `trigger_time`
/// is the pulse offset within a trigger burst and only meaningful on rows
/// carrying the trigger label; it is `None` when the cell is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLogRecord {
    /// Subject identifier as written in the log (may be wrong, see quirks).
    pub subject_id: String,
    /// Trial index.
    pub trial_index: i64,
    /// Marker / trial-type label.
    pub label: String,
    /// Absolute timestamp in device units (1/10 000 s).
    pub time: i64,
    /// Offset within a repeated-pulse burst.
    pub trigger_time: Option<i64>,
}

impl RawLogRecord {
    /// Create a record with no trigger offset.
    #[must_use]
    pub fn new(
        subject_id: impl Into<String>,
        trial_index: i64,
        label: impl Into<String>,
        time: i64,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            trial_index,
            label: label.into(),
            time,
            trigger_time: None,
        }
    }

    /// Set the trigger pulse offset.
    #[must_use]
    pub fn with_trigger_time(mut self, trigger_time: i64) -> Self {
        self.trigger_time = Some(trigger_time);
        self
    }
}
