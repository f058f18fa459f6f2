//! Extraction benchmarks
//!
//! - Marker log parsing (text → Arrow → records)
//! - Pipeline (records → events table)
//! - Events table encoding

use bids_events::storage::MarkerLog;
use bids_events::{EventExtractor, LogFormat, QuirkRegistry, RawLogRecord, RunConfig};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::fmt::Write;

/// A session of `n` trials, each with a 3-pulse trigger burst and a stimulus
fn create_session(n: i64) -> Vec<RawLogRecord> {
    let mut records = vec![RawLogRecord::new("002", 1, "fMRI_T0", 0)];
    let mut trial = 2;
    for i in 0..n {
        let t = (i + 1) * 20_000;
        for (k, offset) in [0, 15, 30].into_iter().enumerate() {
            let k = i64::try_from(k).unwrap();
            records.push(
                RawLogRecord::new("002", trial + k, "TRIGGER", t + offset).with_trigger_time(offset),
            );
        }
        records.push(RawLogRecord::new("002", trial + 3, "PAIN", t + 500));
        records.push(RawLogRecord::new("002", trial + 4, "Response", t + 9000));
        trial += 5;
    }
    records.push(RawLogRecord::new("002", trial, "END", (n + 1) * 20_000));
    records
}

fn create_log_text(records: &[RawLogRecord]) -> String {
    let mut text = String::from("Subject\tTrial\tname(str)\tTime\tTTime\n");
    for r in records {
        let ttime = r.trigger_time.map(|t| t.to_string()).unwrap_or_default();
        writeln!(text, "{}\t{}\t{}\t{}\t{}", r.subject_id, r.trial_index, r.label, r.time, ttime)
            .unwrap();
    }
    text
}

fn config() -> RunConfig {
    RunConfig::builder("002", "conditioning", "01")
        .markers("fMRI_T0", "END")
        .labels_of_interest(["PAIN", "FIXATION", "VAS"])
        .build()
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_marker_log");
    let format = LogFormat::default();

    for trials in [100, 1_000, 10_000] {
        let text = create_log_text(&create_session(trials));
        group.bench_with_input(BenchmarkId::from_parameter(trials), &text, |b, text| {
            b.iter(|| {
                let log = MarkerLog::parse(black_box(text), &format).unwrap();
                black_box(log.records().unwrap())
            });
        });
    }

    group.finish();
}

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_events");
    let config = config();
    let quirks = QuirkRegistry::default();

    for trials in [100, 1_000, 10_000] {
        let records = create_session(trials);
        group.bench_with_input(BenchmarkId::from_parameter(trials), &records, |b, records| {
            b.iter(|| {
                EventExtractor::new(&config, &quirks)
                    .extract(black_box(records))
                    .unwrap()
            });
        });
    }

    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let config = config();
    let quirks = QuirkRegistry::default();
    let table = EventExtractor::new(&config, &quirks)
        .extract(&create_session(10_000))
        .unwrap()
        .table;

    c.bench_function("events_to_record_batch_10k", |b| {
        b.iter(|| black_box(&table).to_record_batch().unwrap());
    });
}

criterion_group!(benches, bench_parse, bench_extract, bench_encode);
criterion_main!(benches);
