/// Performance benchmarks for the normalization stage
///
/// Run with: cargo bench
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use blastnet::blast::AlignmentRecord;
use blastnet::identifiers::IdentifierResolver;
use blastnet::normalize::normalize_records;

/// Generate synthetic BLAST rows for benchmarking
fn generate_synthetic_blast(num_hits: usize) -> Vec<AlignmentRecord> {
    (0..num_hits)
        .map(|i| {
            let start = ((i * 1000) % 50000) as u64 + 1;
            let (subject_start, subject_end) = if i % 2 == 0 {
                (start, start + 999)
            } else {
                (start + 999, start)
            };
            AlignmentRecord {
                query_id: format!("GENE{i}(species{})", i % 7),
                subject_id: format!("scaffold_{}", i % 100),
                percent_identity: 85.0 + (i % 15) as f64,
                alignment_length: 1000,
                mismatch_count: 10,
                gap_open_count: 1,
                query_start: 1,
                query_end: 1000,
                subject_start,
                subject_end,
                e_value: 1e-50,
                bit_score: 1800.0,
            }
        })
        .collect()
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    let resolver = IdentifierResolver::standard().unwrap();

    for size in [100, 1000, 10000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let records = generate_synthetic_blast(size);
            b.iter_with_setup(
                || records.clone(),
                |records| black_box(normalize_records(records, 90.0, &resolver)),
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_normalize);
criterion_main!(benches);
