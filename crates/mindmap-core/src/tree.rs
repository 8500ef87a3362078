use crate::{Item, ItemId, ItemStyle, LayoutDirection};
use serde::Serialize;
use std::sync::Arc;

/// Label given to items created from the keyboard.
pub const NEW_NODE_LABEL: &str = "new node";

/// An immutable mind-map tree.
///
/// Every mutating operation returns a new tree and leaves `self` untouched.
/// Only the items on the path from the root to the edited item are copied;
/// the rest of the tree is shared with the previous revision.
///
/// Operations addressed by id treat an unknown id as a normal outcome and
/// return an unchanged tree: UI events may still reference items that an
/// earlier edit already removed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MindMapTree {
    root: Arc<Item>,
}

/// Result of [`MindMapTree::find`].
#[derive(Debug, Clone, Copy)]
pub struct Found<'a> {
    pub item: &'a Item,
    /// `None` when `item` is the root.
    pub parent: Option<&'a Item>,
    /// Position inside `parent.children`; `0` for the root.
    pub index: usize,
    pub depth: usize,
}

/// Pre-order traversal over a tree's items.
pub struct Preorder<'a> {
    stack: Vec<&'a Item>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a crate::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.stack.pop()?;
        self.stack
            .extend(item.children.iter().rev().map(|child| child.as_ref()));
        Some(item)
    }
}

impl MindMapTree {
    /// Tree consisting of a single root with a generated id.
    pub fn new(label: impl Into<String>) -> Self {
        Self::from_root(Item::leaf(label))
    }

    /// Single-root tree with a caller-chosen root id.
    pub fn with_root_id(id: impl Into<ItemId>, label: impl Into<String>) -> Self {
        Self::from_root(Item::new(id, label))
    }

    /// Wraps an already built item hierarchy.
    ///
    /// Ids are not checked for uniqueness here; persisted data goes through
    /// [`crate::load_tree`], which repairs duplicates.
    pub fn from_root(root: Item) -> Self {
        Self {
            root: Arc::new(root),
        }
    }

    pub fn root(&self) -> &Item {
        &self.root
    }

    pub fn root_id(&self) -> &ItemId {
        &self.root.id
    }

    /// Direction stored on the root, `LeftToRight` when unset.
    pub fn layout_direction(&self) -> LayoutDirection {
        self.root.layout_direction.unwrap_or_default()
    }

    pub fn iter(&self) -> Preorder<'_> {
        Preorder {
            stack: vec![self.root.as_ref()],
        }
    }

    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.iter().any(|item| &item.id == id)
    }

    pub fn item(&self, id: &ItemId) -> Option<&Item> {
        self.find(id).map(|found| found.item)
    }

    pub fn parent_of(&self, id: &ItemId) -> Option<&Item> {
        self.find(id).and_then(|found| found.parent)
    }

    /// Position among the parent's children; `None` for the root.
    pub fn index_in_parent(&self, id: &ItemId) -> Option<usize> {
        self.find(id)
            .filter(|found| found.parent.is_some())
            .map(|found| found.index)
    }

    pub fn depth_of(&self, id: &ItemId) -> Option<usize> {
        self.find(id).map(|found| found.depth)
    }

    /// Locates an item together with its parent.
    pub fn find(&self, id: &ItemId) -> Option<Found<'_>> {
        let path = self.path_to(id)?;
        let mut parent = None;
        let mut item: &Item = &self.root;
        for &index in &path {
            parent = Some(item);
            item = item.child(index)?;
        }
        Some(Found {
            item,
            parent,
            index: path.last().copied().unwrap_or(0),
            depth: path.len(),
        })
    }

    /// Child indices leading from the root to `id`; empty for the root itself.
    pub fn path_to(&self, id: &ItemId) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        locate(&self.root, id, &mut path).then_some(path)
    }

    /// Appends a new leaf to `parent_id`'s children.
    pub fn add_child(&self, parent_id: &ItemId, label: impl Into<String>) -> (Self, Option<ItemId>) {
        let Some(path) = self.path_to(parent_id) else {
            tracing::debug!(parent = %parent_id, "add_child ignored for unknown parent");
            return (self.clone(), None);
        };

        let child = Item::new(self.fresh_id(), label);
        let new_id = child.id.clone();
        let root = rebuild(&self.root, &path, |parent| {
            parent.children.push(Arc::new(child))
        });
        tracing::debug!(parent = %parent_id, id = %new_id, "added child");
        (Self { root }, Some(new_id))
    }

    /// Inserts a new leaf right after `sibling_id`.
    ///
    /// The root has no siblings, so for the root this appends a child instead.
    pub fn add_sibling(
        &self,
        sibling_id: &ItemId,
        label: impl Into<String>,
    ) -> (Self, Option<ItemId>) {
        let Some(path) = self.path_to(sibling_id) else {
            tracing::debug!(sibling = %sibling_id, "add_sibling ignored for unknown item");
            return (self.clone(), None);
        };
        let Some((&index, parent_path)) = path.split_last() else {
            return self.add_child(self.root_id(), label);
        };

        let sibling = Item::new(self.fresh_id(), label);
        let new_id = sibling.id.clone();
        let root = rebuild(&self.root, parent_path, |parent| {
            parent.children.insert(index + 1, Arc::new(sibling))
        });
        tracing::debug!(sibling = %sibling_id, id = %new_id, "added sibling");
        (Self { root }, Some(new_id))
    }

    /// Removes `id` and its whole subtree. Deleting the root is a no-op.
    pub fn delete_node(&self, id: &ItemId) -> Self {
        let Some(path) = self.path_to(id) else {
            tracing::debug!(id = %id, "delete ignored for unknown item");
            return self.clone();
        };
        let Some((&index, parent_path)) = path.split_last() else {
            tracing::debug!(id = %id, "root cannot be deleted");
            return self.clone();
        };

        let root = rebuild(&self.root, parent_path, |parent| {
            parent.children.remove(index);
        });
        tracing::debug!(id = %id, "deleted subtree");
        Self { root }
    }

    /// Replaces the label verbatim; an empty label is allowed.
    pub fn rename(&self, id: &ItemId, label: impl Into<String>) -> Self {
        let label = label.into();
        self.edit(id, "rename", |item| item.label = label)
    }

    /// Shallow-merges `patch` into the item's style.
    pub fn set_style(&self, id: &ItemId, patch: &ItemStyle) -> Self {
        self.edit(id, "set_style", |item| {
            let merged = item
                .style
                .take()
                .unwrap_or_default()
                .merged_with(patch);
            item.style = (!merged.is_empty()).then_some(merged);
        })
    }

    pub fn set_layout_direction(&self, direction: LayoutDirection) -> Self {
        let root = rebuild(&self.root, &[], |root| {
            root.layout_direction = Some(direction)
        });
        Self { root }
    }

    fn edit<F>(&self, id: &ItemId, operation: &str, edit: F) -> Self
    where
        F: FnOnce(&mut Item),
    {
        match self.path_to(id) {
            Some(path) => Self {
                root: rebuild(&self.root, &path, edit),
            },
            None => {
                tracing::debug!(id = %id, operation, "edit ignored for unknown item");
                self.clone()
            }
        }
    }

    fn fresh_id(&self) -> ItemId {
        loop {
            let id = ItemId::generate();
            if !self.contains(&id) {
                return id;
            }
        }
    }
}

fn locate(node: &Item, id: &ItemId, path: &mut Vec<usize>) -> bool {
    if &node.id == id {
        return true;
    }
    for (index, child) in node.children.iter().enumerate() {
        path.push(index);
        if locate(child, id, path) {
            return true;
        }
        path.pop();
    }
    false
}

/// Copies the items along `path`, applies `edit` to the last one and returns
/// the new root. Siblings off the path keep their shared `Arc`s.
fn rebuild<F>(node: &Arc<Item>, path: &[usize], edit: F) -> Arc<Item>
where
    F: FnOnce(&mut Item),
{
    let mut copy = Item::clone(node);
    match path.split_first() {
        None => edit(&mut copy),
        Some((&index, rest)) => {
            if let Some(child) = node.children.get(index) {
                copy.children[index] = rebuild(child, rest, edit);
            }
        }
    }
    Arc::new(copy)
}
