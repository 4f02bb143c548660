//! Backend Comparison Benchmark
//!
//! Same 2^18-lane search on one thread, all cores and (when compiled in and
//! present) an OpenCL device. Quantifies the parallel speedup.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]
use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use keysweep::{
    Backend, BackendPreference, BlockCipherOracle, Des, Keyspace, SearchConfig, SearchRequest,
    Searcher,
};
use std::hint::black_box;

const BITS: u32 = 18;

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_backends(c: &mut Criterion) {
    let mut group = c.benchmark_group("Keysweep Backends");
    group.sample_size(10);

    let key = [0x13, 0x34, 0x57, 0x79, 0x9B, 0xBC, 0xDF, 0xF1];
    let plaintext = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
    let keyspace = Keyspace::new(BITS).unwrap();
    let request = SearchRequest::new(
        keyspace.clear(&key),
        plaintext,
        Des.encrypt(&key, &plaintext),
        BITS,
    );
    group.throughput(Throughput::Elements(keyspace.lanes()));

    let portable = |threads| {
        Searcher::new(SearchConfig {
            backend: BackendPreference::Portable,
            threads,
            ..SearchConfig::default()
        })
    };

    // 1. Portable, single worker
    // Baseline to quantify the speedup from parallel dispatch
    let single = portable(1);
    group.bench_function("Portable (1 thread)", |b| {
        b.iter(|| single.search(black_box(&request)).unwrap());
    });

    // 2. Portable, one worker per core
    let cores = num_cpus::get();
    let all = portable(cores);
    group.bench_function(format!("Portable ({cores} threads)"), |b| {
        b.iter(|| all.search(black_box(&request)).unwrap());
    });

    // 3. OpenCL device (includes per-call context and kernel build)
    let device = Searcher::new(SearchConfig {
        backend: BackendPreference::OpenCl,
        ..SearchConfig::default()
    });
    if device.backend().ok() == Some(Backend::OpenCl) {
        group.bench_function("OpenCL", |b| {
            b.iter(|| device.search(black_box(&request)).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_backends);
criterion_main!(benches);
