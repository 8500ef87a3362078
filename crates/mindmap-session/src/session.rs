use crate::edit::EditSession;
use crate::keys::Key;
use crate::navigation::{NavOutcome, NavigationController};
use mindmap_core::{ItemId, ItemStyle, LayoutDirection, MindMapTree};
use mindmap_events::{Event, EventBus};
use mindmap_graph::{Layout, MindMapLayouter};

/// What a key press did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Ignored,
    CursorMoved,
    TreeChanged,
    EditCommitted,
}

/// One mind-map instance: its current tree, keyboard cursor and label editor.
///
/// The session owns the only mutable reference to the tree revision in use.
/// Hosts observe changes through the [`EventBus`] and may swap in older
/// revisions through [`MindMapSession::replace_tree`].
#[derive(Debug)]
pub struct MindMapSession {
    tree: MindMapTree,
    navigation: NavigationController,
    edit: EditSession,
    bus: EventBus,
}

impl MindMapSession {
    pub fn new(tree: MindMapTree) -> Self {
        Self::with_event_bus(tree, EventBus::new())
    }

    pub fn with_event_bus(tree: MindMapTree, bus: EventBus) -> Self {
        Self {
            tree,
            navigation: NavigationController::new(),
            edit: EditSession::new(),
            bus,
        }
    }

    pub fn tree(&self) -> &MindMapTree {
        &self.tree
    }

    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    pub fn active_id(&self) -> Option<&ItemId> {
        self.navigation.active()
    }

    pub fn editing_id(&self) -> Option<&ItemId> {
        self.edit.editing_id()
    }

    pub fn draft(&self) -> &str {
        self.edit.draft()
    }

    /// Makes `id` the active node, as a pointer click does.
    pub fn activate(&mut self, id: &ItemId) -> bool {
        if !self.tree.contains(id) {
            return false;
        }
        if self.navigation.active() != Some(id) {
            self.navigation.set_active(Some(id.clone()));
            self.bus.publish(Event::ActiveChanged {
                id: Some(id.clone()),
            });
        }
        true
    }

    pub fn handle_key(&mut self, key: Key) -> KeyOutcome {
        if self.edit.is_editing() {
            return match key {
                // Both keys keep the draft.
                Key::Enter | Key::Escape => {
                    self.commit_edit();
                    KeyOutcome::EditCommitted
                }
                _ => KeyOutcome::Ignored,
            };
        }

        match self.navigation.handle_key(&self.tree, key) {
            NavOutcome::Ignored => KeyOutcome::Ignored,
            NavOutcome::Moved { from, to } => {
                tracing::trace!(from = %from, to = %to, "cursor moved");
                self.bus.publish(Event::ActiveChanged { id: Some(to) });
                KeyOutcome::CursorMoved
            }
            NavOutcome::Inserted {
                tree,
                id,
                parent_id,
            } => {
                self.tree = tree;
                self.bus.publish(Event::ItemAdded {
                    id: id.clone(),
                    parent_id,
                });
                self.bus.publish(Event::ActiveChanged {
                    id: Some(id.clone()),
                });
                self.begin_edit(&id);
                KeyOutcome::TreeChanged
            }
            NavOutcome::Deleted {
                tree,
                id,
                parent_id,
            } => {
                self.tree = tree;
                self.bus.publish(Event::ItemDeleted {
                    id,
                    parent_id: parent_id.clone(),
                });
                self.bus.publish(Event::ActiveChanged {
                    id: Some(parent_id),
                });
                KeyOutcome::TreeChanged
            }
        }
    }

    /// Opens the label editor on `id`, committing any edit already open.
    pub fn begin_edit(&mut self, id: &ItemId) -> bool {
        if !self.tree.contains(id) {
            return false;
        }
        self.commit_edit();
        if !self.edit.begin(&self.tree, id) {
            return false;
        }
        self.bus.publish(Event::EditStarted {
            id: id.clone(),
            select_all: true,
        });
        true
    }

    pub fn update_draft(&mut self, text: impl Into<String>) {
        self.edit.update_draft(text);
    }

    /// The editor lost focus; the draft is kept.
    pub fn blur(&mut self) -> bool {
        self.commit_edit()
    }

    /// Commits the open edit, if any. Returns true if one was open.
    pub fn commit_edit(&mut self) -> bool {
        let Some(committed) = self.edit.commit(&self.tree) else {
            return false;
        };
        self.tree = committed.tree;
        if committed.changed {
            self.bus.publish(Event::ItemRenamed {
                id: committed.id.clone(),
                label: committed.label.clone(),
            });
        }
        self.bus.publish(Event::EditCommitted {
            id: committed.id,
            label: committed.label,
        });
        true
    }

    pub fn rename(&mut self, id: &ItemId, label: impl Into<String>) {
        if !self.tree.contains(id) {
            return;
        }
        let label = label.into();
        self.tree = self.tree.rename(id, label.clone());
        self.bus.publish(Event::ItemRenamed {
            id: id.clone(),
            label,
        });
    }

    pub fn set_style(&mut self, id: &ItemId, patch: &ItemStyle) {
        if !self.tree.contains(id) {
            return;
        }
        self.tree = self.tree.set_style(id, patch);
        self.bus.publish(Event::ItemRestyled { id: id.clone() });
    }

    pub fn set_layout_direction(&mut self, direction: LayoutDirection) {
        if self.tree.layout_direction() == direction {
            return;
        }
        self.tree = self.tree.set_layout_direction(direction);
        self.bus.publish(Event::LayoutDirectionChanged { direction });
    }

    /// Swaps in a different revision, e.g. from the host's undo stack.
    ///
    /// The cursor falls back to the root if its node is gone, and an edit
    /// on a vanished node is discarded.
    pub fn replace_tree(&mut self, tree: MindMapTree) {
        self.tree = tree;
        self.edit.revalidate(&self.tree);
        if self.navigation.revalidate(&self.tree) {
            self.bus.publish(Event::ActiveChanged {
                id: self.navigation.active().cloned(),
            });
        }
        self.bus.publish(Event::TreeReplaced);
    }

    pub fn layout(&self, layouter: &MindMapLayouter) -> Layout {
        layouter.layout_tree(&self.tree)
    }
}
