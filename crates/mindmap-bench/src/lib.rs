use mindmap_core::{Item, ItemId, MindMapTree};

/// Builds a tree with `fanout` children per node, `depth` levels below the root.
pub fn balanced_tree(fanout: usize, depth: usize) -> MindMapTree {
    fn grow(prefix: &str, fanout: usize, depth: usize) -> Item {
        let mut item = Item::new(prefix, format!("Topic {prefix}"));
        if depth > 0 {
            for i in 0..fanout {
                item = item.with_child(grow(&format!("{prefix}.{i}"), fanout, depth - 1));
            }
        }
        item
    }
    MindMapTree::from_root(grow("n", fanout, depth))
}

/// A single chain of `length` nodes, the worst case for path copying.
pub fn deep_chain(length: usize) -> (MindMapTree, ItemId) {
    let mut tree = MindMapTree::new("chain");
    let mut tip = tree.root_id().clone();
    for i in 0..length {
        let (next, id) = tree.add_child(&tip, format!("link {i}"));
        tree = next;
        if let Some(id) = id {
            tip = id;
        }
    }
    (tree, tip)
}

/// Serialized form of [`balanced_tree`], for load benchmarks.
pub fn balanced_tree_json(fanout: usize, depth: usize) -> anyhow::Result<String> {
    Ok(mindmap_core::save_tree(&balanced_tree(fanout, depth))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generators_have_expected_sizes() {
        assert_eq!(balanced_tree(3, 2).node_count(), 1 + 3 + 9);
        let (chain, tip) = deep_chain(10);
        assert_eq!(chain.node_count(), 11);
        assert_eq!(chain.depth_of(&tip), Some(10));
        assert!(balanced_tree_json(2, 2).unwrap().contains("Topic n.1.1"));
    }
}
