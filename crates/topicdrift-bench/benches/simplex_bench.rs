//! Probability simplex hot paths: categorical draws and drift ramps.

use std::num::NonZeroUsize;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use topicdrift_core::{ProbabilitySimplex, TopicId};

fn simplex(n: usize, rng: &mut StdRng) -> ProbabilitySimplex {
    ProbabilitySimplex::dirichlet((0..n).map(TopicId).collect(), rng)
}

fn bench_sample(c: &mut Criterion) {
    let sizes: &[usize] = &[5, 20, 100];
    let mut group = c.benchmark_group("simplex_sample");

    for &n in sizes {
        let mut rng = StdRng::seed_from_u64(1);
        let mut s = simplex(n, &mut rng);
        group.bench_with_input(BenchmarkId::new("weighted", n), &n, |b, _| {
            b.iter(|| black_box(s.sample(&mut rng)));
        });
        group.bench_with_input(BenchmarkId::new("uniform", n), &n, |b, _| {
            b.iter(|| black_box(s.sample_uniform(&mut rng)));
        });
    }
    group.finish();
}

fn bench_ramp(c: &mut Criterion) {
    let sizes: &[usize] = &[5, 20, 100];
    let mut group = c.benchmark_group("simplex_ramp");
    let windows = NonZeroUsize::MIN.saturating_add(14);

    for &n in sizes {
        let mut rng = StdRng::seed_from_u64(2);
        let base = simplex(n, &mut rng);
        let target = base.mean();
        group.bench_with_input(BenchmarkId::new("toward_mean", n), &n, |b, _| {
            b.iter_batched(
                || base.clone(),
                |mut s| {
                    s.ramp_toward(TopicId(0), target, windows)
                        .expect("topic 0 is active");
                    black_box(s)
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_sample, bench_ramp);
criterion_main!(benches);
