use blocktree_engine::{CellAddress, Path, TableGrid};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
mod common;

fn bench_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_selection");
    group.sample_size(20);

    let table = common::generate_merged_table(40);
    let grid = TableGrid::new(&table, Path::from([0])).unwrap();

    group.bench_function("single_placeholder", |b| {
        b.iter(|| {
            let selection = grid.selected_cells(
                black_box(CellAddress::new(1, 39)),
                black_box(CellAddress::new(1, 39)),
            );
            black_box(selection.len());
        });
    });

    group.bench_function("diagonal_drag", |b| {
        b.iter(|| {
            let selection = grid.selected_cells(
                black_box(CellAddress::new(2, 2)),
                black_box(CellAddress::new(30, 30)),
            );
            black_box(selection.len());
        });
    });

    group.bench_function("find_anchor_far_right", |b| {
        b.iter(|| black_box(grid.find_anchor(black_box(CellAddress::new(39, 39)))));
    });

    group.finish();
}

criterion_group!(benches, bench_selection);
criterion_main!(benches);
