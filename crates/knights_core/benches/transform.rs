//! Projection benchmarks for knights_core.
//!
//! Run with: `cargo bench -p knights_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use knights_core::prelude::*;

fn grid(width: u32, height: u32) -> Vec<Vector> {
    (0..width)
        .flat_map(|x| (0..height).map(move |y| Vector::new(f64::from(x), f64::from(y))))
        .collect()
}

/// Projects and unprojects every cell of a 32x32 grid.
pub fn transform_benchmark(c: &mut Criterion) {
    let transform =
        IsoTransform::from_tile_sprite(16.0, 16.0, 6.0).with_origin(Vector::new(48.0, 816.0));
    let cells = grid(32, 32);
    let worlds: Vec<Vector> = cells.iter().map(|c| transform.local_to_world(*c)).collect();

    c.bench_function("local_to_world_32x32", |b| {
        b.iter(|| {
            for cell in &cells {
                black_box(transform.local_to_world(black_box(*cell)));
            }
        });
    });

    c.bench_function("world_to_local_32x32", |b| {
        b.iter(|| {
            for world in &worlds {
                black_box(transform.world_to_local(black_box(*world)));
            }
        });
    });
}

/// Occupancy lookups on a crowded stage.
pub fn occupancy_benchmark(c: &mut Criterion) {
    let Ok(mut stage) = Stage::new(16, 16) else {
        return;
    };
    for (i, cell) in grid(16, 16).into_iter().enumerate() {
        let class = if i % 2 == 0 { "sword_unit" } else { "spear_unit" };
        let _ = stage.place_entity(class, u8::from(i % 3 == 0), cell);
    }
    let probe = Vector::new(15.0, 15.0);

    c.bench_function("get_entity_by_position_256", |b| {
        b.iter(|| black_box(stage.get_entity_by_position(black_box(&probe))));
    });
}

criterion_group!(benches, transform_benchmark, occupancy_benchmark);
criterion_main!(benches);
