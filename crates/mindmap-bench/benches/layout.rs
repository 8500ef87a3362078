use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use mindmap_bench::{balanced_tree, balanced_tree_json};
use mindmap_core::{LayoutDirection, load_tree};
use mindmap_graph::{ConnectorRouter, Layouter, MindMapLayouter};

fn bench_layout_by_direction(c: &mut Criterion) {
    // 5 + 25 + 125 + 625 + 3125 nodes under the root.
    let tree = balanced_tree(5, 5);
    let layouter = MindMapLayouter::default();

    let mut group = c.benchmark_group("layout_3906_nodes");
    for direction in LayoutDirection::ALL {
        group.bench_with_input(
            BenchmarkId::from_parameter(direction),
            &direction,
            |b, &direction| {
                b.iter(|| {
                    let layout = layouter.execute(black_box(tree.root()), direction);
                    black_box(layout);
                })
            },
        );
    }
    group.finish();
}

fn bench_connectors(c: &mut Criterion) {
    let tree = balanced_tree(5, 5);
    let layout = MindMapLayouter::default().layout_tree(&tree);
    let router = ConnectorRouter::default();

    c.bench_function("route_3905_connectors", |b| {
        b.iter(|| black_box(layout.connectors(&router)))
    });
}

fn bench_load(c: &mut Criterion) {
    let Ok(json) = balanced_tree_json(5, 5) else {
        return;
    };

    c.bench_function("load_3906_nodes", |b| {
        b.iter(|| black_box(load_tree(black_box(&json)).map(|loaded| loaded.tree)))
    });
}

criterion_group!(benches, bench_layout_by_direction, bench_connectors, bench_load);
criterion_main!(benches);
