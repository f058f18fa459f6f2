//! Run configuration.
//!
//! A [`RunConfig`] is built fresh for every subject × task pair and never
//! mutated afterwards; nothing carries over from one run to the next.

use serde::{Deserialize, Serialize};

/// Device timestamps are in tenths of a millisecond.
pub const TIME_UNITS_PER_SECOND: f64 = 10_000.0;

/// Largest `TTime` value that still marks the first pulse of a trigger burst.
pub const FIRST_PULSE_MAX_TTIME: i64 = 1;

/// Default name of the label column in the dataset's logs.
pub const DEFAULT_LABEL_COLUMN: &str = "name(str)";

/// What to do with events that precede the start marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegativeOnsetPolicy {
    /// Fail the run with [`crate::Error::NegativeOnset`].
    #[default]
    Reject,
    /// Keep the event and log a warning.
    Warn,
}

/// Per-run extraction parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Label of the row that defines time zero (e.g. first scan volume).
    pub start_marker_label: String,
    /// Label of the row that closes the recording.
    pub end_marker_label: String,
    /// Trial types to report, in the order the dataset lists them.
    pub labels_of_interest: Vec<String>,
    /// Label shared by all pulses of a scanner trigger burst.
    pub trigger_label: String,
    /// Trusted subject identifier supplied by the driver.
    pub subject_id: String,
    /// Task identifier.
    pub task_id: String,
    /// Zero-padded run number, e.g. `"01"`.
    pub run_number: String,
    /// Handling of events before the start marker.
    #[serde(default)]
    pub negative_onsets: NegativeOnsetPolicy,
}

impl RunConfig {
    /// Create a builder with the required identity fields.
    #[must_use]
    pub fn builder(
        subject_id: impl Into<String>,
        task_id: impl Into<String>,
        run_number: impl Into<String>,
    ) -> RunConfigBuilder {
        RunConfigBuilder::new(subject_id, task_id, run_number)
    }
}

/// Builder for [`RunConfig`].
#[derive(Debug)]
pub struct RunConfigBuilder {
    config: RunConfig,
}

impl RunConfigBuilder {
    /// Create a new builder; markers default to `START`/`END`, trigger to `TRIGGER`.
    #[must_use]
    pub fn new(
        subject_id: impl Into<String>,
        task_id: impl Into<String>,
        run_number: impl Into<String>,
    ) -> Self {
        Self {
            config: RunConfig {
                start_marker_label: "START".to_string(),
                end_marker_label: "END".to_string(),
                labels_of_interest: Vec::new(),
                trigger_label: "TRIGGER".to_string(),
                subject_id: subject_id.into(),
                task_id: task_id.into(),
                run_number: run_number.into(),
                negative_onsets: NegativeOnsetPolicy::default(),
            },
        }
    }

    /// Set the start and end marker labels.
    #[must_use]
    pub fn markers(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.config.start_marker_label = start.into();
        self.config.end_marker_label = end.into();
        self
    }

    /// Set the trial types of interest.
    #[must_use]
    pub fn labels_of_interest<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.labels_of_interest = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Set the trigger label.
    #[must_use]
    pub fn trigger_label(mut self, label: impl Into<String>) -> Self {
        self.config.trigger_label = label.into();
        self
    }

    /// Set the negative onset policy.
    #[must_use]
    pub fn negative_onsets(mut self, policy: NegativeOnsetPolicy) -> Self {
        self.config.negative_onsets = policy;
        self
    }

    /// Build the [`RunConfig`].
    #[must_use]
    pub fn build(self) -> RunConfig {
        self.config
    }
}

/// Layout of the marker log files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFormat {
    /// Column holding the marker / trial-type label.
    #[serde(default = "default_label_column")]
    pub label_column: String,
    /// Number of lines before the header row.
    #[serde(default)]
    pub preamble_lines: usize,
}

fn default_label_column() -> String {
    DEFAULT_LABEL_COLUMN.to_string()
}

impl Default for LogFormat {
    fn default() -> Self {
        Self {
            label_column: default_label_column(),
            preamble_lines: 0,
        }
    }
}
