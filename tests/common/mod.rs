//! Shared helpers for integration tests

#![allow(dead_code)]

use bids_events::RawLogRecord;
use std::fmt::Write;

/// Header of the dataset's marker logs.
pub const HEADER: &str = "Subject\tTrial\tname(str)\tTime\tTTime\tUncertainty";

/// Render records as a marker log with a two-line preamble.
pub fn log_text(records: &[RawLogRecord]) -> String {
    let mut text = String::from("Scenario - test\nLogfile written - 01/01/2024 00:00:00\n\n");
    text.push_str(HEADER);
    text.push('\n');
    for r in records {
        let ttime = r.trigger_time.map(|t| t.to_string()).unwrap_or_default();
        writeln!(
            text,
            "{}\t{}\t{}\t{}\t{}\t1",
            r.subject_id, r.trial_index, r.label, r.time, ttime
        )
        .unwrap();
    }
    text
}

/// Rows of the reference scenario: START, EVENT1, a two-pulse trigger, END.
pub fn scenario(subject: &str) -> Vec<RawLogRecord> {
    vec![
        RawLogRecord::new(subject, 1, "START", 1000),
        RawLogRecord::new(subject, 2, "EVENT1", 1500),
        RawLogRecord::new(subject, 3, "TRIGGER", 1500).with_trigger_time(0),
        RawLogRecord::new(subject, 4, "TRIGGER", 1510).with_trigger_time(10),
        RawLogRecord::new(subject, 5, "END", 2000),
    ]
}

/// A run of `n` PAIN trials, one per second, each preceded by a trigger burst.
pub fn long_run(subject: &str, n: i64) -> Vec<RawLogRecord> {
    let mut records = vec![RawLogRecord::new(subject, 1, "fMRI_T0", 0)];
    let mut trial = 2;
    for i in 0..n {
        let t = (i + 1) * 10_000;
        records.push(RawLogRecord::new(subject, trial, "TRIGGER", t).with_trigger_time(0));
        records.push(RawLogRecord::new(subject, trial + 1, "TRIGGER", t + 20).with_trigger_time(20));
        records.push(RawLogRecord::new(subject, trial + 2, "Pain", t + 50));
        trial += 3;
    }
    records.push(RawLogRecord::new(subject, trial, "END", (n + 1) * 10_000));
    records
}
