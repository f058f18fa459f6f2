//! Events table writer
//!
//! The table is written to a temporary file in the destination directory and
//! renamed into place once fully flushed, so a crash mid-write never leaves a
//! truncated TSV.

use crate::events::EventTable;
use crate::{Error, Result};
use arrow::csv::WriterBuilder;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Write `table` as tab-delimited text with a header row.
///
/// Missing parent directories are created.
///
/// # Errors
/// Returns [`Error::Io`] if the directory is not writable or the final rename
/// fails, and [`Error::Arrow`] if the table cannot be encoded.
pub fn write_events_tsv<P: AsRef<Path>>(path: P, table: &EventTable) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let batch = table.to_record_batch()?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = WriterBuilder::new()
            .with_header(true)
            .with_delimiter(b'\t')
            .build(BufWriter::new(tmp.as_file_mut()));
        writer.write(&batch)?;
        writer.into_inner().flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::debug!(path = %path.display(), rows = table.len(), "wrote events table");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventRecord;

    #[test]
    fn test_write_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub-002/func/events.tsv");
        let table = EventTable::new(vec![EventRecord::new("002", 2, "PAIN", 0.05, 0.5)]);

        write_events_tsv(&path, &table).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "subject\ttrial_num\ttrial_type\tonset\tduration"
        );
        let row: Vec<&str> = lines.next().unwrap().split('\t').collect();
        assert_eq!(&row[..3], ["002", "2", "PAIN"]);
        assert!((row[3].parse::<f64>().unwrap() - 0.05).abs() < 1e-12);
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.tsv");
        write_events_tsv(&path, &EventTable::default()).unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
