use criterion::{Criterion, black_box, criterion_group, criterion_main};

use dotdash::audio::{ToneSchedule, ToneTiming};
use dotdash::engine::ledger::{AttemptRecord, MasteryLedger, MasteryThresholds};
use dotdash::engine::unlock::PROGRESSION_ORDER;
use dotdash::morse;

fn make_history(count: usize) -> Vec<AttemptRecord> {
    (0..count)
        .map(|i| AttemptRecord {
            character: PROGRESSION_ORDER[i % PROGRESSION_ORDER.len()],
            is_success: i % 5 != 0, // 80% success
            sequence_index: i as u64,
        })
        .collect()
}

fn bench_rebuild(c: &mut Criterion) {
    let history = make_history(10_000);

    c.bench_function("ledger from_history (10k attempts)", |b| {
        b.iter(|| MasteryLedger::from_history(black_box(history.clone())))
    });
}

fn bench_report(c: &mut Criterion) {
    c.bench_function("ledger report_outcome (1k attempts)", |b| {
        b.iter(|| {
            let mut ledger = MasteryLedger::new();
            for i in 0..1000 {
                let ch = PROGRESSION_ORDER[i % PROGRESSION_ORDER.len()];
                ledger.report_outcome(black_box(ch), i % 3 != 0);
            }
            ledger
        })
    });
}

fn bench_queries(c: &mut Criterion) {
    let ledger = MasteryLedger::from_history(make_history(10_000));
    let thresholds = MasteryThresholds::default();

    c.bench_function("ledger mastery_set", |b| {
        b.iter(|| ledger.mastery_set(black_box(&thresholds)))
    });

    c.bench_function("ledger fluency_series (window 5)", |b| {
        b.iter(|| ledger.fluency_series(black_box(5)))
    });
}

fn bench_schedule(c: &mut Criterion) {
    let code = morse::translate("the quick brown fox jumps over the lazy dog");
    let timing = ToneTiming::default();

    c.bench_function("tone schedule (pangram)", |b| {
        b.iter(|| ToneSchedule::build(black_box(&code), &timing))
    });
}

criterion_group!(
    benches,
    bench_rebuild,
    bench_report,
    bench_queries,
    bench_schedule
);
criterion_main!(benches);
