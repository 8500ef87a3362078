use mindmap_core::{ItemId, LayoutDirection, LoadIssue, load_tree, save_tree};

#[test]
fn flat_document_with_defects_is_repaired() {
    let json = r#"{
        "items": [
            { "id": "r", "label": "Root", "children": ["a", "ghost", "a"], "layoutDirection": "TopToBottom" },
            { "id": "a", "label": "Alpha" },
            { "id": "z", "label": "Orphan", "children": ["z"] }
        ]
    }"#;

    let loaded = load_tree(json).unwrap();
    let tree = &loaded.tree;
    assert_eq!(tree.root_id(), &ItemId::from("r"));
    assert_eq!(tree.layout_direction(), LayoutDirection::TopToBottom);
    assert_eq!(tree.node_count(), 2);
    assert!(!tree.contains(&ItemId::from("z")));

    assert_eq!(
        loaded.issues,
        vec![
            LoadIssue::DanglingChild {
                parent: ItemId::from("r"),
                child: ItemId::from("ghost"),
            },
            LoadIssue::RepeatedChild {
                parent: ItemId::from("r"),
                child: ItemId::from("a"),
            },
            LoadIssue::UnreachableItems {
                root: ItemId::from("r"),
                count: 1,
            },
        ]
    );
}

#[test]
fn repaired_tree_saves_cleanly() {
    let json = r#"[
        { "id": "r", "label": "Root", "children": [
            { "id": "x", "label": "One" },
            { "id": "x", "label": "Two" },
            { "label": "Anonymous" }
        ] },
        { "id": "second", "label": "Dropped" }
    ]"#;

    let loaded = load_tree(json).unwrap();
    assert_eq!(loaded.issues.len(), 3);
    assert!(loaded.tree.contains(&ItemId::from("x~2")));

    let saved = save_tree(&loaded.tree).unwrap();
    let reloaded = load_tree(&saved).unwrap();
    assert!(reloaded.issues.is_empty());
    assert_eq!(reloaded.tree, loaded.tree);
}
