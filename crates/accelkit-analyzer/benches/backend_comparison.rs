//! Benchmarks comparing the analysis on each backend
//!
//! Run with: cargo bench

use accelkit_analyzer::{AnalyzerConfig, Calibration, Digi, Input, Output};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Random hits in short runs of adjacent channels
fn make_input(hits: usize) -> Input {
    let mut rng = SmallRng::seed_from_u64(1234);
    let modules = 64u32;
    let mut digis = Vec::with_capacity(hits);
    while digis.len() < hits {
        let module = rng.gen_range(0..modules);
        let first = rng.gen_range(0..4096u32);
        for channel in first..first + rng.gen_range(1..5u32) {
            digis.push(Digi::new(module, channel, rng.gen_range(0..1024u16)));
        }
    }
    digis.truncate(hits);
    let gains = (0..modules).map(|_| rng.gen_range(0.8f32..1.2)).collect();
    Input::new(digis, Calibration::new(gains, 30.0))
}

fn benchmark_backends(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze");
    let config = AnalyzerConfig::default();

    for &hits in &[1_000usize, 100_000, 1_000_000] {
        let input = make_input(hits);

        #[cfg(feature = "serial")]
        group.bench_with_input(BenchmarkId::new("serial_sync", hits), &input, |b, input| {
            let mut output = Output::default();
            let mut elapsed = 0.0;
            b.iter(|| {
                accelkit_analyzer::serial_sync::analyze_with(
                    black_box(input),
                    &mut output,
                    &mut elapsed,
                    &config,
                )
            });
        });

        #[cfg(feature = "threads")]
        group.bench_with_input(BenchmarkId::new("threads_async", hits), &input, |b, input| {
            let mut output = Output::default();
            let mut elapsed = 0.0;
            b.iter(|| {
                accelkit_analyzer::threads_async::analyze_with(
                    black_box(input),
                    &mut output,
                    &mut elapsed,
                    &config,
                )
            });
        });

        #[cfg(feature = "cuda")]
        group.bench_with_input(BenchmarkId::new("cuda_async", hits), &input, |b, input| {
            let mut output = Output::default();
            let mut elapsed = 0.0;
            b.iter(|| {
                accelkit_analyzer::cuda_async::analyze_with(
                    black_box(input),
                    &mut output,
                    &mut elapsed,
                    &config,
                )
            });
        });
    }

    group.finish();
}

fn benchmark_thread_elems(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_thread_elems");
    let input = make_input(200_000);

    for &elems in &[256usize, 4096, 65_536] {
        let config = AnalyzerConfig::builder()
            .cpu_thread_elems(elems)
            .build()
            .expect("valid configuration");

        #[cfg(feature = "threads")]
        group.bench_with_input(BenchmarkId::new("threads_async", elems), &elems, |b, _| {
            let mut output = Output::default();
            let mut elapsed = 0.0;
            b.iter(|| {
                accelkit_analyzer::threads_async::analyze_with(
                    black_box(&input),
                    &mut output,
                    &mut elapsed,
                    &config,
                )
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_backends, benchmark_thread_elems);
criterion_main!(benches);
