//! Extraction Summary - informational counts for manual plausibility checks

use serde::{Deserialize, Serialize};

/// Counts reported after a successful run.
///
/// Never validated against thresholds; a surprising number here is for a
/// human to look at, not a failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionSummary {
    /// Rows in the final events table.
    pub events: usize,
    /// Trigger rows kept after deduplication (one per burst).
    pub triggers: usize,
    /// Kept trigger rows whose pulse offset is not zero.
    pub triggers_nonzero_offset: usize,
    /// Redundant trigger pulses dropped by deduplication.
    pub discarded_pulses: usize,
    /// Rows removed by quirk corrections.
    pub quirk_rows_removed: usize,
    /// Labels of interest that never occur in the log.
    pub missing_labels: Vec<String>,
}
