use mindmap_core::{ItemId, MindMapTree};

/// A finished label edit.
#[derive(Debug, Clone, PartialEq)]
pub struct Committed {
    pub tree: MindMapTree,
    pub id: ItemId,
    pub label: String,
    /// False when the draft matched the stored label.
    pub changed: bool,
}

/// In-place label editing for at most one node at a time.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EditSession {
    editing: Option<ItemId>,
    draft: String,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn editing_id(&self) -> Option<&ItemId> {
        self.editing.as_ref()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Opens the editor on `id` with the current label as draft.
    ///
    /// Returns false for unknown ids. An edit already open on another node is
    /// replaced; callers commit it first.
    pub fn begin(&mut self, tree: &MindMapTree, id: &ItemId) -> bool {
        let Some(item) = tree.item(id) else {
            tracing::debug!(id = %id, "edit requested for unknown item");
            return false;
        };
        self.editing = Some(id.clone());
        self.draft = item.label.clone();
        true
    }

    /// Replaces the draft. The tree is untouched until commit.
    pub fn update_draft(&mut self, text: impl Into<String>) {
        if self.editing.is_some() {
            self.draft = text.into();
        }
    }

    /// Writes the draft into the tree and closes the editor.
    ///
    /// Returns `None` if no edit was open. The draft is stored verbatim, so
    /// an empty label is kept as empty.
    pub fn commit(&mut self, tree: &MindMapTree) -> Option<Committed> {
        let id = self.editing.take()?;
        let label = std::mem::take(&mut self.draft);
        let changed = tree.item(&id).is_some_and(|item| item.label != label);
        let tree = if changed {
            tree.rename(&id, label.clone())
        } else {
            tree.clone()
        };
        Some(Committed {
            tree,
            id,
            label,
            changed,
        })
    }

    /// Drops an open edit whose node no longer exists. Returns true if it did.
    pub fn revalidate(&mut self, tree: &MindMapTree) -> bool {
        match &self.editing {
            Some(id) if !tree.contains(id) => {
                tracing::debug!(stale = %id, "edited item vanished, discarding draft");
                self.editing = None;
                self.draft.clear();
                true
            }
            _ => false,
        }
    }
}
