use crossbeam_channel::{Receiver, Sender, unbounded};
use mindmap_core::{ItemId, LayoutDirection};
use serde::{Deserialize, Serialize};

/// Notifications from the editing engine to the host.
///
/// The host drains these on its own loop and reacts (re-layout, focus a text
/// field, persist the document).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // Cursor
    ActiveChanged {
        id: Option<ItemId>,
    },

    // Structure
    ItemAdded {
        id: ItemId,
        parent_id: ItemId,
    },
    ItemDeleted {
        id: ItemId,
        parent_id: ItemId,
    },
    ItemRenamed {
        id: ItemId,
        label: String,
    },
    ItemRestyled {
        id: ItemId,
    },
    LayoutDirectionChanged {
        direction: LayoutDirection,
    },
    /// The whole tree was swapped, e.g. by the host's undo stack.
    TreeReplaced,

    // Editing
    /// Focus the label editor for `id`; select the whole label when `select_all`.
    EditStarted {
        id: ItemId,
        select_all: bool,
    },
    EditCommitted {
        id: ItemId,
        label: String,
    },
}

impl Event {
    /// Whether the host needs to recompute the layout after this event.
    pub fn requires_layout(&self) -> bool {
        !matches!(
            self,
            Event::ActiveChanged { .. } | Event::EditStarted { .. }
        )
    }
}

#[derive(Clone)]
pub struct EventBus {
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("pending", &self.rx.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn publish(&self, event: Event) {
        let _ = self.tx.send(event);
    }

    /// Takes every pending event.
    pub fn drain(&self) -> Vec<Event> {
        self.rx.try_iter().collect()
    }

    /// Hands every pending event to `listener`, oldest first.
    pub fn dispatch_to<L: EventListener>(&self, listener: &mut L) {
        while let Ok(event) = self.rx.try_recv() {
            listener.handle_event(&event);
        }
    }
}

/// Host-side consumer of [`EventBus::dispatch_to`].
pub trait EventListener {
    fn handle_event(&mut self, event: &Event);
}
