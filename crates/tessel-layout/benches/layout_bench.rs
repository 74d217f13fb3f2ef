//! Benchmarks for placement scans and compaction.
//!
//! Run with: cargo bench -p tessel-layout

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use tessel_core::geometry::{GridPosition, GridSize};
use tessel_core::item::GridItem;
use tessel_layout::{
    all_occupied_cells, compact_layout, find_first_available_position, find_valid_position,
};

/// A scattered layout of `n` items with mixed sizes on a 12-column grid.
fn make_layout(n: usize) -> Vec<GridItem> {
    (0..n)
        .map(|i| {
            let w = (i % 4 + 1) as u16;
            let h = (i % 3 + 1) as u16;
            let x = ((i * 5) % (12 - w as usize + 1)) as u16;
            let y = (i * 2) as u16;
            GridItem::new(format!("w{i}"), GridPosition::new(x, y, w, h))
        })
        .collect()
}

fn bench_find_valid_position(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/find_valid_position");

    for n in [4, 16, 64] {
        let others = compact_layout(&make_layout(n), 12);
        let probe = GridItem::new("probe", GridPosition::new(0, 0, 3, 2));
        group.bench_with_input(BenchmarkId::new("packed", n), &others, |b, others| {
            b.iter(|| black_box(find_valid_position(&probe, others, 12, 100)))
        });
    }

    group.finish();
}

fn bench_first_available(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/first_available");

    for n in [4, 16, 64] {
        let occupied = all_occupied_cells(&compact_layout(&make_layout(n), 12));
        group.bench_with_input(BenchmarkId::new("4x3", n), &occupied, |b, occupied| {
            b.iter(|| {
                black_box(find_first_available_position(
                    GridSize::new(4, 3),
                    occupied,
                    12,
                    100,
                ))
            })
        });
    }

    group.finish();
}

fn bench_compact(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/compact");

    for n in [8, 32, 128] {
        let items = make_layout(n);
        group.bench_with_input(BenchmarkId::new("scattered", n), &items, |b, items| {
            b.iter(|| black_box(compact_layout(items, 12)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_find_valid_position,
    bench_first_available,
    bench_compact
);
criterion_main!(benches);
