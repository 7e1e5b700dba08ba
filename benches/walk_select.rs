//! Benchmarks for the weighted neighbor draw.
//!
//! Run:
//! - cargo bench --bench walk_select

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use light_roulette::core::grid::GridTopology;
use light_roulette::core::recency::RecencyTracker;
use light_roulette::core::walk::{WalkParams, select_next};
use rand::SeedableRng;
use rand::rngs::SmallRng;

const GRID_SIZES: [usize; 4] = [3, 16, 100, 1000];

fn bench_select_next(c: &mut Criterion) {
    let mut group = c.benchmark_group("select_next");
    let params = WalkParams::default();
    for &count in &GRID_SIZES {
        let topo = GridTopology::build(count).expect("non-empty grid");
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut rng = SmallRng::seed_from_u64(7);
            let mut recency = RecencyTracker::new(count);
            let mut current = count / 2;
            let mut now = 0;
            b.iter(|| {
                now += 50;
                current = select_next(
                    black_box(&topo),
                    &mut recency,
                    current,
                    now,
                    &params,
                    &mut rng,
                );
                recency.record_visit(current, now);
                black_box(current)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_select_next);
criterion_main!(benches);
