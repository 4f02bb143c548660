//! Keysweep Criterion Benchmark
//!
//! Candidate rate of the building blocks and of whole searches.

#![allow(clippy::pedantic, clippy::nursery)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use keysweep::kernels::portable::{run_group, LaneInputs, ResultSlot};
use keysweep::oracle::{random_block, random_key};
use keysweep::{
    BackendPreference, BlockCipherOracle, Des, Keyspace, SearchConfig, SearchRequest, Searcher,
};
use rand::prelude::*;
use rand::rngs::StdRng;
use std::hint::black_box;

// =============================================================================
// BENCHMARK 1: ORACLE
// =============================================================================

/// One DES evaluation: key schedule plus one block.
fn bench_oracle(c: &mut Criterion) {
    let mut group = c.benchmark_group("1-Oracle");
    let mut rng = StdRng::seed_from_u64(1);
    let key = random_key(&mut rng);
    let plaintext = random_block(&mut rng);
    let schedule = Des.schedule(&key);

    group.throughput(Throughput::Elements(1));
    group.bench_function("schedule+encrypt", |b| {
        b.iter(|| Des.encrypt(black_box(&key), black_box(&plaintext)));
    });
    group.bench_function("encrypt (scheduled)", |b| {
        b.iter(|| Des.encrypt_block(black_box(&plaintext), black_box(&schedule)));
    });
    group.bench_function("normalize", |b| {
        b.iter(|| Des.normalize_key(black_box(&key)));
    });
    group.finish();
}

// =============================================================================
// BENCHMARK 2: LANE KERNEL
// =============================================================================

/// One work group of 256 lanes on the calling thread.
fn bench_lane_kernel(c: &mut Criterion) {
    let mut group = c.benchmark_group("2-Lane-Kernel");
    let mut rng = StdRng::seed_from_u64(2);
    let keyspace = Keyspace::new(16).unwrap();
    let key = random_key(&mut rng);
    let plaintext = random_block(&mut rng);
    let inputs = LaneInputs {
        known_prefix: keyspace.clear(&key),
        plaintext,
        target: Des.encrypt(&key, &plaintext),
    };

    group.throughput(Throughput::Elements(256));
    group.bench_function("candidate derivation", |b| {
        b.iter(|| {
            for lane in 0..256 {
                black_box(keyspace.candidate(black_box(&inputs.known_prefix), lane));
            }
        });
    });
    group.bench_function("run_group", |b| {
        let slot = ResultSlot::new(&[0u8; 8]);
        b.iter(|| run_group(&Des, &keyspace, black_box(&inputs), 0..256, &slot));
    });
    group.finish();
}

// =============================================================================
// BENCHMARK 3: FULL SEARCH
// =============================================================================

/// Complete searches on the portable backend per keyspace width.
fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("3-Search");
    group.sample_size(10);

    let searcher = Searcher::new(SearchConfig {
        backend: BackendPreference::Portable,
        ..SearchConfig::default()
    });
    let mut rng = StdRng::seed_from_u64(3);

    for bits in [8, 12, 16, 20] {
        let keyspace = Keyspace::new(bits).unwrap();
        let key = random_key(&mut rng);
        let plaintext = random_block(&mut rng);
        let request = SearchRequest::new(
            keyspace.clear(&key),
            plaintext,
            Des.encrypt(&key, &plaintext),
            bits,
        );

        group.throughput(Throughput::Elements(keyspace.lanes()));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{bits} bits")),
            &request,
            |b, req| b.iter(|| searcher.search(black_box(req)).unwrap()),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_oracle, bench_lane_kernel, bench_search);
criterion_main!(benches);
