//! Link store benchmarks.
//!
//! Compares last-ID recovery, which reads only the final line, against a
//! point lookup that has to scan the whole record log.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use linkstore_bench::utils::{file_store, generate_records, memory_store, random_record};
use linkstore_core::RecordId;

/// Benchmark saving one record to each backend.
fn bench_save(c: &mut Criterion) {
    let mut group = c.benchmark_group("save");
    group.sample_size(50);

    for links in [0, 8, 64].iter() {
        group.throughput(Throughput::Elements(1));

        group.bench_with_input(BenchmarkId::new("memory", links), links, |b, &links| {
            let store = memory_store(&[]);
            let record = random_record(1, links);
            b.iter(|| store.save(black_box(&record)).unwrap());
        });

        group.bench_with_input(BenchmarkId::new("file", links), links, |b, &links| {
            let (_dir, store) = file_store(&[]);
            let record = random_record(1, links);
            b.iter(|| store.save(black_box(&record)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark last-ID recovery as the log grows. Time should stay flat.
fn bench_recover_last_id(c: &mut Criterion) {
    let mut group = c.benchmark_group("recover_last_id");

    for count in [100, 1_000, 10_000].iter() {
        let (_dir, store) = file_store(&generate_records(*count, 4));

        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter(|| {
                let id = store.recover_last_id();
                assert_eq!(id, count as RecordId);
                black_box(id)
            });
        });
    }

    group.finish();
}

/// Benchmark looking up the last record by ID. Time grows with the log.
fn bench_get_last(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_last");
    group.sample_size(20);

    for count in [100, 1_000, 10_000].iter() {
        let (_dir, store) = file_store(&generate_records(*count, 4));
        group.throughput(Throughput::Elements(*count as u64));

        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter(|| black_box(store.get(black_box(count as RecordId)).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark a full stage, save, clear sequence for a batch.
fn bench_commit_sequence(c: &mut Criterion) {
    let mut group = c.benchmark_group("commit_sequence");
    group.sample_size(20);

    for batch in [1, 10, 100].iter() {
        let records = generate_records(*batch, 4);
        group.throughput(Throughput::Elements(*batch as u64));

        group.bench_with_input(BenchmarkId::from_parameter(batch), &records, |b, records| {
            let (_dir, store) = file_store(&[]);
            b.iter(|| {
                for record in records {
                    store.stage(record).unwrap();
                }
                store.promote(&store.load_staged().unwrap()).unwrap();
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_save,
    bench_recover_last_id,
    bench_get_last,
    bench_commit_sequence,
);

criterion_main!(benches);
