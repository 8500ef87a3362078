use criterion::{Criterion, black_box, criterion_group, criterion_main};
use mindmap_bench::{balanced_tree, deep_chain};
use mindmap_core::ItemId;
use mindmap_session::{Key, MindMapSession};

fn bench_edits(c: &mut Criterion) {
    let wide = balanced_tree(5, 5);
    let leaf = ItemId::from("n.4.4.4.4.4");

    c.bench_function("add_child_deep_leaf", |b| {
        b.iter(|| black_box(wide.add_child(black_box(&leaf), "new node")))
    });

    let (chain, tip) = deep_chain(500);
    c.bench_function("rename_tip_of_500_chain", |b| {
        b.iter(|| black_box(chain.rename(black_box(&tip), "renamed")))
    });
}

fn bench_keyboard(c: &mut Criterion) {
    let tree = balanced_tree(5, 4);
    let script = [
        Key::ArrowRight,
        Key::ArrowRight,
        Key::ArrowDown,
        Key::Tab,
        Key::Enter,
        Key::ArrowLeft,
        Key::Delete,
    ];

    c.bench_function("session_key_script", |b| {
        b.iter(|| {
            let mut session = MindMapSession::new(tree.clone());
            session.activate(tree.root_id());
            for key in script {
                black_box(session.handle_key(key));
            }
            black_box(session.events().drain())
        })
    });
}

criterion_group!(benches, bench_edits, bench_keyboard);
criterion_main!(benches);
