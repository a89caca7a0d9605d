//! Window generation throughput.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use topicdrift_core::{
    DriftParams, EngineState, RegimeParams, ShiftParams, SimulationConfig, TopicDocuments,
};

fn corpus(topics: usize, docs: usize) -> Vec<TopicDocuments<u32>> {
    (0..topics)
        .map(|t| {
            let base = (t * docs) as u32;
            TopicDocuments::new(format!("topic-{t}"), (base..base + docs as u32).collect())
        })
        .collect()
}

fn config(window_size: usize, regime: RegimeParams) -> SimulationConfig {
    SimulationConfig {
        k: 5,
        window_size,
        min_topics: 3,
        regime,
        seed: Some(0x5eed),
        max_windows: Some(20),
    }
}

fn bench_run(c: &mut Criterion) {
    let window_sizes: &[usize] = &[100, 1_000];
    let regimes = [
        ("shift", RegimeParams::Shift(ShiftParams { shift_prob: 0.2 })),
        (
            "drift",
            RegimeParams::Drift(DriftParams {
                drift_prob: 0.2,
                decrease_windows: 3,
                increase_windows: 6,
            }),
        ),
    ];
    let mut group = c.benchmark_group("engine_run");

    for (label, regime) in regimes {
        for &size in window_sizes {
            let cfg = config(size, regime);
            // Enough documents that no topic runs dry within 20 windows.
            let docs = size * 20;
            group.throughput(Throughput::Elements((size * 20) as u64));
            group.bench_with_input(BenchmarkId::new(label, size), &cfg, |b, cfg| {
                b.iter_batched(
                    || EngineState::initialize(corpus(20, docs), cfg).expect("valid bench config"),
                    |mut engine| black_box(engine.run()),
                    criterion::BatchSize::LargeInput,
                );
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_run);
criterion_main!(benches);
