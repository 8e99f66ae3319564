//! # Reconstruction Benchmarks
//!
//! Performance benchmarks for tessera-core reconstruction passes.
//!
//! Run with: `cargo bench -p tessera-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use tessera_core::{MemorySource, Navigator, Record};

/// Create a collection of `size` records spread over `size / 10` labels,
/// alternating relation and concept records with a metadata record every 50.
fn create_collection(size: usize) -> Vec<Record> {
    let labels = (size / 10).max(1);
    (0..size)
        .map(|i| {
            let subject = format!("entity-{}", i % labels);
            match i % 50 {
                0 => Record::new().with("record_type", "metadata"),
                n if n % 2 == 0 => Record::new()
                    .with("subject", subject)
                    .with("record_type", "relation")
                    .with("predicate", "links")
                    .with("object", format!("entity-{}", (i + 1) % labels)),
                _ => Record::new()
                    .with("subject", subject)
                    .with("record_type", "concept")
                    .with("object", "Thing")
                    .with("is_from_instance", "false")
                    .with("concept_score", "0.5"),
            }
        })
        .collect()
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_retrieve_storage(c: &mut Criterion) {
    let mut group = c.benchmark_group("retrieve_storage");

    for size in [100, 1000, 10000].iter() {
        let navigator =
            Navigator::new(MemorySource::new().with_collection("bench", create_collection(*size)));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(navigator.retrieve_storage("bench").expect("retrieve")));
        });
    }

    group.finish();
}

fn bench_retrieve_instance(c: &mut Criterion) {
    let mut group = c.benchmark_group("retrieve_instance");

    for size in [100, 1000, 10000].iter() {
        let navigator =
            Navigator::new(MemorySource::new().with_collection("bench", create_collection(*size)));
        let last = format!("entity-{}", (size / 10).max(1) - 1);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(navigator.retrieve_instance(&last, "bench").expect("retrieve")));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_retrieve_storage, bench_retrieve_instance);
criterion_main!(benches);
