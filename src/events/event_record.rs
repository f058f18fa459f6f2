//! Event Record - one row of the BIDS events table

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::sync::Arc;

/// One retained event with onset and duration in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    subject_id: String,
    trial_index: i64,
    trial_type: String,
    onset_seconds: f64,
    duration_seconds: f64,
}

impl EventRecord {
    /// Create a new event record.
    #[must_use]
    pub fn new(
        subject_id: impl Into<String>,
        trial_index: i64,
        trial_type: impl Into<String>,
        onset_seconds: f64,
        duration_seconds: f64,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            trial_index,
            trial_type: trial_type.into(),
            onset_seconds,
            duration_seconds,
        }
    }

    /// Get the subject identifier.
    #[must_use]
    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    /// Get the trial index.
    #[must_use]
    pub const fn trial_index(&self) -> i64 {
        self.trial_index
    }

    /// Get the normalized trial type.
    #[must_use]
    pub fn trial_type(&self) -> &str {
        &self.trial_type
    }

    /// Get the onset relative to the start marker, in seconds.
    #[must_use]
    pub const fn onset_seconds(&self) -> f64 {
        self.onset_seconds
    }

    /// Get the duration in seconds.
    #[must_use]
    pub const fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    pub(crate) fn set_subject_id(&mut self, subject_id: &str) {
        subject_id.clone_into(&mut self.subject_id);
    }
}

/// Ordered events of a single run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventTable {
    events: Vec<EventRecord>,
}

impl EventTable {
    /// Create a table from events already in trial order.
    #[must_use]
    pub fn new(events: Vec<EventRecord>) -> Self {
        Self { events }
    }

    /// Number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Get all events.
    #[must_use]
    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    /// Mutable access for in-place corrections.
    pub(crate) fn events_mut(&mut self) -> &mut [EventRecord] {
        &mut self.events
    }

    /// Remove rows by zero-based inclusive index range, clamped to the table.
    ///
    /// Returns the number of rows removed.
    pub fn remove_rows(&mut self, rows: RangeInclusive<usize>) -> usize {
        let (first, last) = rows.into_inner();
        if first >= self.events.len() || first > last {
            return 0;
        }
        let end = last.saturating_add(1).min(self.events.len());
        self.events.drain(first..end).count()
    }

    /// Arrow schema of the events table as written to disk.
    #[must_use]
    pub fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("subject", DataType::Utf8, false),
            Field::new("trial_num", DataType::Int64, false),
            Field::new("trial_type", DataType::Utf8, false),
            Field::new("onset", DataType::Float64, false),
            Field::new("duration", DataType::Float64, false),
        ]))
    }

    /// Convert into a columnar batch with [`EventTable::schema`].
    ///
    /// # Errors
    ///
    /// Returns error if Arrow rejects the column set (should not happen for
    /// columns of equal length).
    pub fn to_record_batch(&self) -> crate::Result<RecordBatch> {
        let subjects = StringArray::from_iter_values(self.events.iter().map(EventRecord::subject_id));
        let trials = Int64Array::from_iter_values(self.events.iter().map(EventRecord::trial_index));
        let types = StringArray::from_iter_values(self.events.iter().map(EventRecord::trial_type));
        let onsets = Float64Array::from_iter_values(self.events.iter().map(EventRecord::onset_seconds));
        let durations =
            Float64Array::from_iter_values(self.events.iter().map(EventRecord::duration_seconds));

        let columns: Vec<ArrayRef> = vec![
            Arc::new(subjects),
            Arc::new(trials),
            Arc::new(types),
            Arc::new(onsets),
            Arc::new(durations),
        ];
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }
}

impl IntoIterator for EventTable {
    type Item = EventRecord;
    type IntoIter = std::vec::IntoIter<EventRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}
