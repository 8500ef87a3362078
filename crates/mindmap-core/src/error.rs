use crate::ItemId;
use thiserror::Error;

/// Failure to turn persisted JSON into a tree at all.
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("Invalid mind-map JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Persisted mind-map contains no items")]
    Empty,
    #[error("Expected a mind-map object or array, found {0}")]
    UnexpectedShape(&'static str),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown layout direction: {0}")]
pub struct ParseDirectionError(pub String);

/// A defect found and repaired while loading a persisted tree.
///
/// None of these abort the load; they are reported so the host can log them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadIssue {
    #[error("Item without id was assigned {assigned}")]
    MissingId { assigned: ItemId },
    #[error("Duplicate id {original} renamed to {renamed}")]
    DuplicateIdRenamed { original: ItemId, renamed: ItemId },
    #[error("Duplicate record {id} dropped")]
    DuplicateRecordDropped { id: ItemId },
    #[error("Additional root {id} dropped")]
    ExtraRootDropped { id: ItemId },
    #[error("No item without a parent, using {root} as root")]
    NoClearRoot { root: ItemId },
    #[error("Item {parent} references missing child {child}")]
    DanglingChild { parent: ItemId, child: ItemId },
    #[error("Item {child} is reachable twice (cycle or shared child), second reference under {parent} dropped")]
    RepeatedChild { parent: ItemId, child: ItemId },
    #[error("{count} items unreachable from root {root} dropped")]
    UnreachableItems { root: ItemId, count: usize },
    #[error("Item {id} has unknown layout direction {value}")]
    UnknownDirection { id: ItemId, value: String },
    #[error("Item {id} has a malformed style, ignored")]
    MalformedStyle { id: ItemId },
    #[error("Malformed entry dropped: {found}")]
    MalformedEntryDropped { found: String },
}
