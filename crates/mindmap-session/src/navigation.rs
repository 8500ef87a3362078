use crate::keys::{Arrow, Key};
use mindmap_core::{Found, ItemId, LayoutDirection, MindMapTree, NEW_NODE_LABEL};
use mindmap_graph::BranchSide;

/// Result of a structural key press.
#[derive(Debug, Clone, PartialEq)]
pub enum NavOutcome {
    /// No active node, an unrelated key, or nothing to move to.
    Ignored,
    Moved {
        from: ItemId,
        to: ItemId,
    },
    /// A new node was inserted and is now active; the caller opens its editor.
    Inserted {
        tree: MindMapTree,
        id: ItemId,
        parent_id: ItemId,
    },
    /// `id` and its subtree are gone; its parent is now active.
    Deleted {
        tree: MindMapTree,
        id: ItemId,
        parent_id: ItemId,
    },
}

/// Keyboard cursor over the tree.
///
/// Holds only the active id. Every operation takes the current tree, so
/// the controller never observes a tree it was not handed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NavigationController {
    active: Option<ItemId>,
}

impl NavigationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&ItemId> {
        self.active.as_ref()
    }

    pub fn set_active(&mut self, id: Option<ItemId>) {
        self.active = id;
    }

    /// Points the cursor back at a live node after the tree changed under it.
    ///
    /// A stale active id falls back to the root. Returns true if the active
    /// id changed.
    pub fn revalidate(&mut self, tree: &MindMapTree) -> bool {
        match &self.active {
            Some(id) if !tree.contains(id) => {
                tracing::debug!(stale = %id, "active item vanished, moving to root");
                self.active = Some(tree.root_id().clone());
                true
            }
            _ => false,
        }
    }

    pub fn handle_key(&mut self, tree: &MindMapTree, key: Key) -> NavOutcome {
        let Some(active) = self.active.clone().filter(|id| tree.contains(id)) else {
            return NavOutcome::Ignored;
        };

        match key {
            Key::Tab => {
                let (next, new_id) = tree.add_child(&active, NEW_NODE_LABEL);
                match new_id {
                    Some(id) => self.inserted(next, id, active),
                    None => NavOutcome::Ignored,
                }
            }
            Key::Enter => {
                let (next, new_id) = tree.add_sibling(&active, NEW_NODE_LABEL);
                let Some(id) = new_id else {
                    return NavOutcome::Ignored;
                };
                let Some(parent_id) = next.parent_of(&id).map(|parent| parent.id.clone()) else {
                    return NavOutcome::Ignored;
                };
                self.inserted(next, id, parent_id)
            }
            Key::Backspace | Key::Delete => {
                let Some(parent_id) = tree.parent_of(&active).map(|parent| parent.id.clone())
                else {
                    tracing::debug!("root cannot be deleted");
                    return NavOutcome::Ignored;
                };
                let next = tree.delete_node(&active);
                self.active = Some(parent_id.clone());
                NavOutcome::Deleted {
                    tree: next,
                    id: active,
                    parent_id,
                }
            }
            Key::Escape => NavOutcome::Ignored,
            Key::ArrowUp | Key::ArrowDown | Key::ArrowLeft | Key::ArrowRight => {
                let Some(arrow) = key.arrow() else {
                    return NavOutcome::Ignored;
                };
                match adjacent(tree, &active, tree.layout_direction(), arrow) {
                    Some(to) => {
                        self.active = Some(to.clone());
                        NavOutcome::Moved { from: active, to }
                    }
                    None => NavOutcome::Ignored,
                }
            }
        }
    }

    fn inserted(&mut self, tree: MindMapTree, id: ItemId, parent_id: ItemId) -> NavOutcome {
        self.active = Some(id.clone());
        NavOutcome::Inserted {
            tree,
            id,
            parent_id,
        }
    }
}

/// The node an arrow key moves to from `id`, or `None` at the edges.
///
/// Adjacency follows the layout: the arrow pointing where children grow
/// descends to the first child, the opposite arrow ascends to the parent,
/// and the cross arrows step between siblings. Moves never wrap.
pub fn adjacent(
    tree: &MindMapTree,
    id: &ItemId,
    direction: LayoutDirection,
    arrow: Arrow,
) -> Option<ItemId> {
    let found = tree.find(id)?;
    match direction {
        LayoutDirection::TopToBottom => match arrow {
            Arrow::Down => first_child(&found),
            Arrow::Up => parent(&found),
            Arrow::Right => sibling(&found, 1),
            Arrow::Left => sibling(&found, -1),
        },
        LayoutDirection::LeftToRight => along_row(&found, arrow, Arrow::Right, 1),
        LayoutDirection::RightToLeft => along_row(&found, arrow, Arrow::Left, 1),
        LayoutDirection::HorizontalSplit => {
            if found.parent.is_none() {
                // Even root children sit right, odd ones left.
                return match arrow {
                    Arrow::Right => found.item.child(0).map(|child| child.id.clone()),
                    Arrow::Left => found.item.child(1).map(|child| child.id.clone()),
                    Arrow::Up | Arrow::Down => None,
                };
            }
            let outward = match split_side(tree, id)? {
                BranchSide::Left => Arrow::Left,
                _ => Arrow::Right,
            };
            // Root children on one side are every other child.
            let step = if found.depth == 1 { 2 } else { 1 };
            along_row(&found, arrow, outward, step)
        }
    }
}

/// Side of the root a node hangs on in a horizontal split.
///
/// Decided by the parity of the root child its branch starts from; `None`
/// for unknown ids.
pub fn split_side(tree: &MindMapTree, id: &ItemId) -> Option<BranchSide> {
    let path = tree.path_to(id)?;
    Some(match path.first() {
        None => BranchSide::Root,
        Some(index) if index % 2 == 0 => BranchSide::Right,
        Some(_) => BranchSide::Left,
    })
}

fn along_row(found: &Found<'_>, arrow: Arrow, outward: Arrow, step: isize) -> Option<ItemId> {
    match arrow {
        Arrow::Down => sibling(found, step),
        Arrow::Up => sibling(found, -step),
        _ if arrow == outward => first_child(found),
        _ => parent(found),
    }
}

fn first_child(found: &Found<'_>) -> Option<ItemId> {
    found.item.child(0).map(|child| child.id.clone())
}

fn parent(found: &Found<'_>) -> Option<ItemId> {
    found.parent.map(|parent| parent.id.clone())
}

fn sibling(found: &Found<'_>, step: isize) -> Option<ItemId> {
    let parent = found.parent?;
    let index = found.index.checked_add_signed(step)?;
    parent.child(index).map(|child| child.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindmap_core::Item;

    fn tree(direction: LayoutDirection) -> MindMapTree {
        let root = Item::new("r", "Root")
            .with_child(
                Item::new("a", "A")
                    .with_child(Item::new("a1", "A1"))
                    .with_child(Item::new("a2", "A2")),
            )
            .with_child(Item::new("b", "B").with_child(Item::new("b1", "B1")))
            .with_child(Item::new("c", "C"))
            .with_child(Item::new("d", "D"));
        MindMapTree::from_root(root).set_layout_direction(direction)
    }

    fn step(direction: LayoutDirection, from: &str, arrow: Arrow) -> Option<String> {
        adjacent(&tree(direction), &ItemId::from(from), direction, arrow).map(|id| id.0)
    }

    fn at(id: &str) -> Option<String> {
        Some(id.to_string())
    }

    #[test]
    fn test_left_to_right_adjacency() {
        let lr = LayoutDirection::LeftToRight;
        assert_eq!(step(lr, "r", Arrow::Right), at("a"));
        assert_eq!(step(lr, "a", Arrow::Right), at("a1"));
        assert_eq!(step(lr, "a1", Arrow::Left), at("a"));
        assert_eq!(step(lr, "a", Arrow::Down), at("b"));
        assert_eq!(step(lr, "b", Arrow::Up), at("a"));
        assert_eq!(step(lr, "r", Arrow::Left), None);
        assert_eq!(step(lr, "c", Arrow::Right), None);
    }

    #[test]
    fn test_right_to_left_mirrors_horizontal_arrows() {
        let rl = LayoutDirection::RightToLeft;
        assert_eq!(step(rl, "r", Arrow::Left), at("a"));
        assert_eq!(step(rl, "a1", Arrow::Right), at("a"));
        assert_eq!(step(rl, "a1", Arrow::Down), at("a2"));
        assert_eq!(step(rl, "r", Arrow::Right), None);
    }

    #[test]
    fn test_top_to_bottom_adjacency() {
        let tb = LayoutDirection::TopToBottom;
        assert_eq!(step(tb, "r", Arrow::Down), at("a"));
        assert_eq!(step(tb, "a", Arrow::Right), at("b"));
        assert_eq!(step(tb, "b", Arrow::Left), at("a"));
        assert_eq!(step(tb, "b1", Arrow::Up), at("b"));
        assert_eq!(step(tb, "r", Arrow::Up), None);
    }

    #[test]
    fn test_moves_do_not_wrap() {
        let lr = LayoutDirection::LeftToRight;
        assert_eq!(step(lr, "a", Arrow::Up), None);
        assert_eq!(step(lr, "d", Arrow::Down), None);
        assert_eq!(step(lr, "a2", Arrow::Down), None);
    }

    #[test]
    fn test_horizontal_split_sides() {
        let hs = LayoutDirection::HorizontalSplit;
        assert_eq!(step(hs, "r", Arrow::Right), at("a"));
        assert_eq!(step(hs, "r", Arrow::Left), at("b"));
        assert_eq!(step(hs, "r", Arrow::Down), None);

        // Right side: a, c. Left side: b, d.
        assert_eq!(step(hs, "a", Arrow::Down), at("c"));
        assert_eq!(step(hs, "c", Arrow::Up), at("a"));
        assert_eq!(step(hs, "b", Arrow::Down), at("d"));
        assert_eq!(step(hs, "a", Arrow::Right), at("a1"));
        assert_eq!(step(hs, "a", Arrow::Left), at("r"));
        assert_eq!(step(hs, "b", Arrow::Left), at("b1"));
        assert_eq!(step(hs, "b1", Arrow::Right), at("b"));
        assert_eq!(step(hs, "a1", Arrow::Down), at("a2"));
    }

    #[test]
    fn test_split_side_follows_root_child_parity() {
        let t = tree(LayoutDirection::HorizontalSplit);
        assert_eq!(split_side(&t, &ItemId::from("r")), Some(BranchSide::Root));
        assert_eq!(split_side(&t, &ItemId::from("a2")), Some(BranchSide::Right));
        assert_eq!(split_side(&t, &ItemId::from("b1")), Some(BranchSide::Left));
        assert_eq!(split_side(&t, &ItemId::from("zz")), None);
    }

    #[test]
    fn test_tab_adds_child_and_activates_it() {
        let t = tree(LayoutDirection::LeftToRight);
        let mut nav = NavigationController::new();
        nav.set_active(Some(ItemId::from("c")));

        let NavOutcome::Inserted { tree: next, id, parent_id } = nav.handle_key(&t, Key::Tab)
        else {
            panic!("expected insertion");
        };
        assert_eq!(parent_id, ItemId::from("c"));
        assert_eq!(nav.active(), Some(&id));
        assert_eq!(next.item(&id).unwrap().label, NEW_NODE_LABEL);
        assert_eq!(next.parent_of(&id).unwrap().id, ItemId::from("c"));
    }

    #[test]
    fn test_enter_on_root_adds_child() {
        let t = tree(LayoutDirection::LeftToRight);
        let mut nav = NavigationController::new();
        nav.set_active(Some(ItemId::from("r")));

        let NavOutcome::Inserted { tree: next, parent_id, .. } = nav.handle_key(&t, Key::Enter)
        else {
            panic!("expected insertion");
        };
        assert_eq!(parent_id, ItemId::from("r"));
        assert_eq!(next.root().children.len(), 5);
    }

    #[test]
    fn test_enter_inserts_sibling_after_active() {
        let t = tree(LayoutDirection::LeftToRight);
        let mut nav = NavigationController::new();
        nav.set_active(Some(ItemId::from("a")));

        let NavOutcome::Inserted { tree: next, id, parent_id } = nav.handle_key(&t, Key::Enter)
        else {
            panic!("expected insertion");
        };
        assert_eq!(parent_id, ItemId::from("r"));
        assert_eq!(next.root().children[1].id, id);
    }

    #[test]
    fn test_delete_moves_to_parent_and_root_is_kept() {
        let t = tree(LayoutDirection::LeftToRight);
        let mut nav = NavigationController::new();
        nav.set_active(Some(ItemId::from("a1")));

        let NavOutcome::Deleted { tree: next, id, parent_id } = nav.handle_key(&t, Key::Delete)
        else {
            panic!("expected deletion");
        };
        assert_eq!(id, ItemId::from("a1"));
        assert_eq!(parent_id, ItemId::from("a"));
        assert!(!next.contains(&id));
        assert_eq!(nav.active(), Some(&ItemId::from("a")));

        nav.set_active(Some(ItemId::from("r")));
        assert_eq!(nav.handle_key(&next, Key::Backspace), NavOutcome::Ignored);
    }

    #[test]
    fn test_without_active_keys_are_ignored() {
        let t = tree(LayoutDirection::LeftToRight);
        let mut nav = NavigationController::new();
        assert_eq!(nav.handle_key(&t, Key::ArrowRight), NavOutcome::Ignored);
        assert_eq!(nav.handle_key(&t, Key::Tab), NavOutcome::Ignored);
    }

    #[test]
    fn test_revalidate_falls_back_to_root() {
        let t = tree(LayoutDirection::LeftToRight);
        let mut nav = NavigationController::new();
        nav.set_active(Some(ItemId::from("a1")));
        assert!(!nav.revalidate(&t));

        let pruned = t.delete_node(&ItemId::from("a"));
        assert!(nav.revalidate(&pruned));
        assert_eq!(nav.active(), Some(&ItemId::from("r")));
    }
}
