use criterion::{Criterion, criterion_group, criterion_main};
use dendro::model::{Dendrogram, DendrogramBuilder};
use dendro::newick::NewickStyle;
use ndarray::Array2;
use std::hint::black_box;

const GRID_SIZE: usize = 256;
const PIXELS_PER_LEAF: usize = 64;

/// Balanced binary dendrogram over a `GRID_SIZE` x `GRID_SIZE` grid,
/// with leaves owning rows of pixels.
fn balanced_dendrogram() -> Dendrogram<(usize, usize)> {
    let mut builder = DendrogramBuilder::new();
    let mut next_id = 0;
    let mut layer = Vec::new();

    let num_leaves = GRID_SIZE * GRID_SIZE / PIXELS_PER_LEAF;
    for leaf in 0..num_leaves {
        let pixels = (0..PIXELS_PER_LEAF).map(|p| {
            let flat = leaf * PIXELS_PER_LEAF + p;
            ((flat / GRID_SIZE, flat % GRID_SIZE), 100.0 + (flat % 97) as f64)
        });
        layer.push(builder.create_leaf_from(pixels, next_id).unwrap());
        next_id += 1;
    }

    let mut merge_level = 100.0;
    while layer.len() > 1 {
        merge_level -= 1.0;
        let mut next_layer = Vec::with_capacity(layer.len() / 2 + 1);
        for pair in layer.chunks(2) {
            next_layer.push(builder.create_branch(pair, merge_level, next_id).unwrap());
            next_id += 1;
        }
        layer = next_layer;
    }

    builder.finish()
}

fn construction(c: &mut Criterion) {
    c.bench_function("build balanced", |b| {
        b.iter(|| black_box(balanced_dendrogram()));
    });
}

fn queries(c: &mut Criterion) {
    c.bench_function("levels cold", |b| {
        b.iter_batched(
            balanced_dendrogram,
            |dendrogram| {
                for leaf in dendrogram.leaves() {
                    black_box(dendrogram.level(leaf));
                }
            },
            criterion::BatchSize::LargeInput,
        );
    });

    let dendrogram = balanced_dendrogram();
    let root = dendrogram.roots()[0];
    c.bench_function("subtree indices", |b| {
        b.iter(|| black_box(dendrogram.indices(root).len()));
    });
    c.bench_function("footprint", |b| {
        let mut footprint = Array2::<i32>::zeros((GRID_SIZE, GRID_SIZE));
        b.iter(|| dendrogram.fill_footprint_all(&mut footprint));
    });
    c.bench_function("newick", |b| {
        b.iter(|| black_box(dendrogram.to_newick(root, &NewickStyle::new())));
    });
}

criterion_group!(regression, construction, queries);
criterion_main!(regression);
