//! Benchmarks for AnimationSystem::update.
//!
//! Run:
//! - cargo bench

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use glyphrain::config::StreakConfig;
use glyphrain::rain::animation::AnimationSystem;
use glyphrain::rain::density::DensityController;
use glyphrain::rain::glyphs::GlyphSet;
use glyphrain::rain::viewport::Viewport;

const DT: f32 = 1.0 / 60.0;
const DENSITIES: [f32; 3] = [10.0, 50.0, 100.0];
const WARMUP_FRAMES: usize = 240;

fn warmed_system(percentage: f32) -> AnimationSystem {
    let mut sys = AnimationSystem::seeded(
        Arc::new(GlyphSet::default()),
        StreakConfig::default(),
        Some(42),
    );
    sys.initialize(
        Viewport::new(1920.0, 1080.0),
        DensityController::new(32.0, percentage),
    );
    sys.set_zoom_velocity(5.0);
    for _ in 0..WARMUP_FRAMES {
        sys.update(DT);
    }
    sys
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("animation_update");
    group.sample_size(50);

    for &density in &DENSITIES {
        let mut sys = warmed_system(density);
        let id = BenchmarkId::new("density", format!("{density}"));
        group.bench_function(id, |b| {
            b.iter(|| {
                sys.update(black_box(DT));
                black_box(sys.active_head_count());
            })
        });
    }
    group.finish();
}

fn bench_draw_order(c: &mut Criterion) {
    let sys = warmed_system(100.0);
    let mut order = Vec::with_capacity(sys.active_streak_count());
    c.bench_function("draw_order_full_density", |b| {
        b.iter(|| {
            sys.draw_order(&mut order);
            black_box(order.len());
        })
    });
}

criterion_group!(benches, bench_update, bench_draw_order);
criterion_main!(benches);
