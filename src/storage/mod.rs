//! Storage backend (Arrow over tab-delimited text)
//!
//! **Input**: one marker log per run. The log may start with a free-text
//! preamble; the event table is the header row plus the data rows that
//! follow it. Blank lines between the header and the first data row are
//! skipped; after that, a blank line ends the table (stimulus-presentation
//! logs append further summary tables after a blank line). All cells are read as text into Arrow
//! [`RecordBatch`]es, then the required columns are cast and converted to
//! [`RawLogRecord`]s.
//!
//! **Output**: see [`write_events_tsv`], which never leaves a partially
//! written file behind.

mod writer;

pub use writer::write_events_tsv;

use crate::config::LogFormat;
use crate::events::RawLogRecord;
use crate::{Error, Result};
use arrow::array::{Array, ArrayRef, Int64Array, StringArray};
use arrow::compute::{cast_with_options, CastOptions};
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use std::borrow::Cow;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

/// Subject column name.
pub const SUBJECT_COLUMN: &str = "Subject";
/// Trial index column name.
pub const TRIAL_COLUMN: &str = "Trial";
/// Timestamp column name.
pub const TIME_COLUMN: &str = "Time";
/// Trigger pulse offset column name.
pub const TRIGGER_TIME_COLUMN: &str = "TTime";

/// Rows per Arrow batch when reading a log
const READ_BATCH_ROWS: usize = 8192;

/// A marker log loaded as text columns.
#[derive(Debug)]
pub struct MarkerLog {
    batches: Vec<RecordBatch>,
    format: LogFormat,
}

impl MarkerLog {
    /// Load a marker log from disk.
    ///
    /// # Errors
    /// Returns [`Error::Io`] if the file cannot be read and
    /// [`Error::MalformedLog`] if it is not a tab-delimited table with the
    /// required columns.
    pub fn load<P: AsRef<Path>>(path: P, format: &LogFormat) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let text = String::from_utf8_lossy(&bytes);
        if let Cow::Owned(_) = text {
            tracing::warn!(
                path = %path.display(),
                "log is not valid UTF-8; undecodable bytes replaced, labels may not match"
            );
        }
        Self::parse(&text, format)
    }

    /// Parse a marker log from its text.
    ///
    /// # Errors
    /// Returns [`Error::MalformedLog`] if there is no header row, a required
    /// column is absent, or a row has more cells than the header.
    pub fn parse(text: &str, format: &LogFormat) -> Result<Self> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut lines = text
            .lines()
            .skip(format.preamble_lines)
            .skip_while(|l| l.trim().is_empty());

        let header = lines
            .next()
            .ok_or_else(|| Error::MalformedLog("no header row found".to_string()))?;
        let columns: Vec<&str> = header.split('\t').map(str::trim).collect();

        let missing: Vec<&str> = required_columns(format)
            .into_iter()
            .filter(|c| !columns.contains(c))
            .collect();
        if !missing.is_empty() {
            return Err(Error::MalformedLog(format!(
                "required column(s) missing: {missing:?}"
            )));
        }

        let mut table = String::with_capacity(text.len());
        table.push_str(header);
        table.push('\n');
        let rows = lines
            .skip_while(|l| l.trim().is_empty())
            .take_while(|l| !l.trim().is_empty());
        for line in rows {
            table.push_str(line);
            table.push('\n');
        }

        let schema = Arc::new(Schema::new(
            columns
                .iter()
                .map(|name| Field::new(*name, DataType::Utf8, true))
                .collect::<Vec<_>>(),
        ));

        let reader = ReaderBuilder::new(schema)
            .with_header(true)
            .with_delimiter(b'\t')
            .with_truncated_rows(true)
            .with_batch_size(READ_BATCH_ROWS)
            .build(Cursor::new(table.into_bytes()))
            .map_err(|e| Error::MalformedLog(format!("failed to create reader: {e}")))?;

        let mut batches = Vec::new();
        for batch in reader {
            let batch =
                batch.map_err(|e| Error::MalformedLog(format!("failed to read rows: {e}")))?;
            batches.push(batch);
        }

        tracing::debug!(
            rows = batches.iter().map(RecordBatch::num_rows).sum::<usize>(),
            columns = columns.len(),
            "loaded marker log"
        );

        Ok(Self {
            batches,
            format: format.clone(),
        })
    }

    /// Get all record batches
    #[must_use]
    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    /// Total number of data rows
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }

    /// Convert the required columns to typed records, in file order.
    ///
    /// Empty `Subject` / label cells become empty strings and an empty
    /// `TTime` cell becomes `None`.
    ///
    /// # Errors
    /// Returns [`Error::MalformedLog`] if a `Trial` or `Time` cell is empty
    /// or any integer column holds a non-integer value.
    pub fn records(&self) -> Result<Vec<RawLogRecord>> {
        let mut records = Vec::with_capacity(self.num_rows());
        let mut row_offset = 0;

        for batch in &self.batches {
            let subjects = text_column(batch, SUBJECT_COLUMN)?;
            let labels = text_column(batch, &self.format.label_column)?;
            let trials = integer_column(batch, TRIAL_COLUMN)?;
            let times = integer_column(batch, TIME_COLUMN)?;
            let trigger_times = integer_column(batch, TRIGGER_TIME_COLUMN)?;

            for i in 0..batch.num_rows() {
                let row = row_offset + i + 1;
                records.push(RawLogRecord {
                    subject_id: optional_text(&subjects, i),
                    trial_index: required_integer(&trials, i, TRIAL_COLUMN, row)?,
                    label: optional_text(&labels, i),
                    time: required_integer(&times, i, TIME_COLUMN, row)?,
                    trigger_time: trigger_times.is_valid(i).then(|| trigger_times.value(i)),
                });
            }
            row_offset += batch.num_rows();
        }

        Ok(records)
    }
}

fn required_columns(format: &LogFormat) -> [&str; 5] {
    [
        SUBJECT_COLUMN,
        TRIAL_COLUMN,
        format.label_column.as_str(),
        TIME_COLUMN,
        TRIGGER_TIME_COLUMN,
    ]
}

fn column<'b>(batch: &'b RecordBatch, name: &str) -> Result<&'b ArrayRef> {
    let index = batch
        .schema()
        .index_of(name)
        .map_err(|_| Error::MalformedLog(format!("column {name} not found")))?;
    Ok(batch.column(index))
}

fn text_column(batch: &RecordBatch, name: &str) -> Result<StringArray> {
    column(batch, name)?
        .as_any()
        .downcast_ref::<StringArray>()
        .cloned()
        .ok_or_else(|| Error::Other(format!("Failed to downcast {name} column to StringArray")))
}

fn integer_column(batch: &RecordBatch, name: &str) -> Result<Int64Array> {
    let options = CastOptions {
        safe: false,
        ..CastOptions::default()
    };
    let cast = cast_with_options(column(batch, name)?, &DataType::Int64, &options)
        .map_err(|e| Error::MalformedLog(format!("column {name}: {e}")))?;
    cast.as_any()
        .downcast_ref::<Int64Array>()
        .cloned()
        .ok_or_else(|| Error::Other(format!("Failed to downcast {name} column to Int64Array")))
}

fn optional_text(array: &StringArray, i: usize) -> String {
    if array.is_valid(i) {
        array.value(i).trim().to_string()
    } else {
        String::new()
    }
}

fn required_integer(array: &Int64Array, i: usize, name: &str, row: usize) -> Result<i64> {
    if array.is_valid(i) {
        Ok(array.value(i))
    } else {
        Err(Error::MalformedLog(format!("row {row}: empty {name} cell")))
    }
}
