//! Benchmarks for column delegates, reducers and partitioned runs.

use arrow::array::{ArrayRef, BooleanArray, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;
use term_profile::analyzers::{NumberColumnDelegate, StringColumnDelegate};
use term_profile::prelude::*;
use term_profile::sources::MemorySource;
use tokio::runtime::Runtime;

const WORDS: &[&str] = &["alpha", "Beta", "GAMMA", "délta", "e 5", ""];

fn number_rows(n: usize) -> Vec<MemoryRow> {
    let mut rng = rand::rng();
    (0..n)
        .map(|id| MemoryRow::new(id as u64).with("v", rng.random_range(-1_000.0..1_000.0)))
        .collect()
}

fn text_rows(n: usize) -> Vec<MemoryRow> {
    let mut rng = rand::rng();
    (0..n)
        .map(|id| {
            let text = format!(
                "{} {}",
                WORDS[rng.random_range(0..WORDS.len())],
                WORDS[rng.random_range(0..WORDS.len())]
            );
            MemoryRow::new(id as u64).with("s", text)
        })
        .collect()
}

fn bench_number_delegate(c: &mut Criterion) {
    let mut group = c.benchmark_group("number_delegate");
    for &size in &[1_000usize, 10_000] {
        let rows = number_rows(size);
        group.throughput(Throughput::Elements(size as u64));
        for descriptive in [false, true] {
            group.bench_with_input(
                BenchmarkId::new(if descriptive { "descriptive" } else { "summary" }, size),
                &rows,
                |b, rows| {
                    b.iter(|| {
                        let delegate = NumberColumnDelegate::new(
                            Arc::new(InMemoryRowAnnotationFactory::new()),
                            descriptive,
                        );
                        for row in rows {
                            delegate.run(row, row.values()[0].1.as_number(), 1);
                        }
                        black_box(delegate.statistics())
                    });
                },
            );
        }
    }
    group.finish();
}

fn bench_string_delegate(c: &mut Criterion) {
    let mut group = c.benchmark_group("string_delegate");
    let rows = text_rows(10_000);
    group.throughput(Throughput::Elements(rows.len() as u64));
    group.bench_function("run", |b| {
        b.iter(|| {
            let delegate = StringColumnDelegate::new(Arc::new(InMemoryRowAnnotationFactory::new()));
            for row in &rows {
                delegate.run(row, row.values()[0].1.as_text(), 1);
            }
            black_box(delegate.statistics())
        });
    });
    group.finish();
}

fn bench_number_reduction(c: &mut Criterion) {
    let column = InputColumn::number("v");
    let partials: Vec<NumberResult> = number_rows(20_000)
        .chunks(1_000)
        .map(|chunk| {
            let analyzer = NumberAnalyzer::builder()
                .column(column.clone())
                .build()
                .unwrap();
            for row in chunk {
                analyzer.run(row, 1).unwrap();
            }
            analyzer.result().unwrap()
        })
        .collect();

    let reducer = NumberResultReducer::default();
    c.bench_function("number_reduction/20_partials", |b| {
        b.iter(|| black_box(reducer.reduce(black_box(&partials)).unwrap()))
    });
}

fn bench_partitioned_run(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut rng = rand::rng();
    let size = 20_000;
    let schema = Arc::new(Schema::new(vec![
        Field::new("amount", DataType::Float64, true),
        Field::new("label", DataType::Utf8, true),
        Field::new("flag", DataType::Boolean, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Float64Array::from(
            (0..size)
                .map(|_| rng.random_bool(0.9).then(|| rng.random_range(0.0..500.0)))
                .collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from(
            (0..size)
                .map(|_| WORDS[rng.random_range(0..WORDS.len())])
                .collect::<Vec<_>>(),
        )),
        Arc::new(BooleanArray::from(
            (0..size).map(|_| rng.random_bool(0.5)).collect::<Vec<_>>(),
        )),
    ];
    let source = MemorySource::from_batch(RecordBatch::try_new(schema, columns).unwrap());

    let mut group = c.benchmark_group("partitioned_run");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(20);
    for partitions in [1usize, 4, 8] {
        let runner = ProfileRunner::profile(ProfileConfig::default().with_partitions(partitions));
        group.bench_with_input(
            BenchmarkId::from_parameter(partitions),
            &runner,
            |b, runner| b.iter(|| rt.block_on(runner.run(black_box(&source))).unwrap()),
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_number_delegate,
    bench_string_delegate,
    bench_number_reduction,
    bench_partitioned_run
);
criterion_main!(benches);
