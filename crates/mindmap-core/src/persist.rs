//! Persisted JSON form of a mind-map tree.
//!
//! Saving always writes the nested `{id, label, children, style?, layoutDirection?}`
//! shape. Loading is deliberately forgiving: one broken mind map must not take
//! the whole host document down, so structural defects are repaired and
//! reported as [`LoadIssue`]s instead of failing.
//!
//! Accepted inputs:
//! * a single nested item (the normal case),
//! * an array of nested items, where the first becomes the root,
//! * a flat record list `{"items": [{"id", "label", "children": [ids]}]}`,
//!   where the root is the first record no other record lists as a child.
//!
//! The shape is decided from the top-level value alone, and items are
//! converted with explicit stacks, so tree depth is bounded by memory only.

use crate::error::{LoadIssue, PersistError};
use crate::{Item, ItemId, ItemStyle, LayoutDirection, MindMapTree};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A repaired tree and everything that had to be repaired.
#[derive(Debug, Clone)]
pub struct LoadedTree {
    pub tree: MindMapTree,
    pub issues: Vec<LoadIssue>,
}

enum RawDocument {
    Nested(Map<String, Value>),
    Forest(Vec<Value>),
    Flat(Vec<Value>),
}

impl RawDocument {
    fn classify(value: Value) -> Result<Self, PersistError> {
        match value {
            Value::Array(items) => Ok(RawDocument::Forest(items)),
            Value::Object(mut map) => match map.remove("items") {
                Some(Value::Array(records)) => Ok(RawDocument::Flat(records)),
                _ => Ok(RawDocument::Nested(map)),
            },
            other => Err(PersistError::UnexpectedShape(kind(&other))),
        }
    }
}

/// Scalar fields of one item or flat record, still unvalidated.
struct RawFields {
    id: Option<String>,
    label: String,
    style: Option<Value>,
    layout_direction: Option<Value>,
}

impl RawFields {
    /// Splits an entry into its fields and its raw `children` array.
    /// Entries that are not objects are dropped.
    fn take(entry: Value, issues: &mut Vec<LoadIssue>) -> Option<(Self, Vec<Value>)> {
        match entry {
            Value::Object(map) => Some(Self::from_map(map, issues)),
            other => {
                issues.push(LoadIssue::MalformedEntryDropped {
                    found: kind(&other).to_string(),
                });
                None
            }
        }
    }

    fn from_map(mut map: Map<String, Value>, issues: &mut Vec<LoadIssue>) -> (Self, Vec<Value>) {
        let children = match map.remove("children") {
            Some(Value::Array(children)) => children,
            None | Some(Value::Null) => Vec::new(),
            Some(other) => {
                issues.push(LoadIssue::MalformedEntryDropped {
                    found: format!("children of type {}", kind(&other)),
                });
                Vec::new()
            }
        };
        let fields = Self {
            id: map
                .remove("id")
                .and_then(scalar_text)
                .filter(|id| !id.is_empty()),
            label: map.remove("label").and_then(scalar_text).unwrap_or_default(),
            style: map.remove("style"),
            layout_direction: map.remove("layoutDirection"),
        };
        (fields, children)
    }
}

/// An item whose children are still being converted.
struct Frame<T> {
    item: Item,
    pending: std::vec::IntoIter<T>,
}

impl<T> Frame<T> {
    fn open(
        fields: RawFields,
        pending: Vec<T>,
        ids: &mut IdAllocator,
        issues: &mut Vec<LoadIssue>,
    ) -> Self {
        let id = ids.claim(fields.id, issues);
        let layout_direction = parse_direction(&id, fields.layout_direction, issues);
        let style = parse_style(&id, fields.style, issues);
        Self {
            item: Item {
                id,
                label: fields.label,
                children: Vec::with_capacity(pending.len()),
                style,
                layout_direction,
            },
            pending: pending.into_iter(),
        }
    }
}

/// Parses persisted JSON, repairing structural defects.
pub fn load_tree(json: &str) -> Result<LoadedTree, PersistError> {
    let mut deserializer = serde_json::Deserializer::from_str(json);
    // Each nested item costs two levels: the object and its children array.
    deserializer.disable_recursion_limit();
    let value = Value::deserialize(&mut deserializer)?;
    deserializer.end()?;
    build(value)
}

/// Serializes to the nested persisted form.
pub fn save_tree(tree: &MindMapTree) -> Result<String, PersistError> {
    Ok(serde_json::to_string(tree)?)
}

/// Embedded trees go through the same repairs as [`load_tree`]. Nesting depth
/// is limited by the outer deserializer's settings.
impl<'de> Deserialize<'de> for MindMapTree {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        build(value)
            .map(|loaded| loaded.tree)
            .map_err(D::Error::custom)
    }
}

fn build(value: Value) -> Result<LoadedTree, PersistError> {
    let mut ids = IdAllocator::default();
    let mut issues = Vec::new();

    let root = match RawDocument::classify(value)? {
        RawDocument::Nested(map) => {
            let (fields, children) = RawFields::from_map(map, &mut issues);
            convert_nested(fields, children, &mut ids, &mut issues)
        }
        RawDocument::Forest(entries) => {
            let mut root = None;
            for entry in entries {
                let Some((fields, children)) = RawFields::take(entry, &mut issues) else {
                    continue;
                };
                if root.is_none() {
                    root = Some(convert_nested(fields, children, &mut ids, &mut issues));
                } else {
                    issues.push(LoadIssue::ExtraRootDropped {
                        id: ItemId::new(fields.id.unwrap_or_default()),
                    });
                }
            }
            root.ok_or(PersistError::Empty)?
        }
        RawDocument::Flat(entries) => convert_flat(entries, &mut ids, &mut issues)?,
    };

    for issue in &issues {
        tracing::warn!(%issue, "repaired persisted mind map");
    }

    Ok(LoadedTree {
        tree: MindMapTree::from_root(root),
        issues,
    })
}

#[derive(Default)]
struct IdAllocator {
    taken: HashSet<ItemId>,
}

impl IdAllocator {
    /// Claims `wanted`, renaming on collision and generating when absent.
    fn claim(&mut self, wanted: Option<String>, issues: &mut Vec<LoadIssue>) -> ItemId {
        let Some(wanted) = wanted.filter(|id| !id.is_empty()) else {
            let assigned = self.fresh();
            issues.push(LoadIssue::MissingId {
                assigned: assigned.clone(),
            });
            return assigned;
        };

        let original = ItemId::new(wanted);
        if self.taken.insert(original.clone()) {
            return original;
        }

        let mut suffix = 2;
        let renamed = loop {
            let candidate = ItemId::new(format!("{}~{}", original, suffix));
            if !self.taken.contains(&candidate) {
                break candidate;
            }
            suffix += 1;
        };
        self.taken.insert(renamed.clone());
        issues.push(LoadIssue::DuplicateIdRenamed {
            original,
            renamed: renamed.clone(),
        });
        renamed
    }

    fn fresh(&mut self) -> ItemId {
        loop {
            let id = ItemId::generate();
            if self.taken.insert(id.clone()) {
                return id;
            }
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Ids and labels written as numbers or booleans are kept as text.
fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn parse_direction(
    id: &ItemId,
    value: Option<Value>,
    issues: &mut Vec<LoadIssue>,
) -> Option<LayoutDirection> {
    let value = value?;
    if value.is_null() {
        return None;
    }
    let parsed = value
        .as_str()
        .and_then(|text| text.parse::<LayoutDirection>().ok());
    if parsed.is_none() {
        issues.push(LoadIssue::UnknownDirection {
            id: id.clone(),
            value: value.to_string(),
        });
    }
    parsed
}

fn parse_style(id: &ItemId, value: Option<Value>, issues: &mut Vec<LoadIssue>) -> Option<ItemStyle> {
    let value = value.filter(|value| !value.is_null())?;
    match serde_json::from_value(value) {
        Ok(style) => Some(style),
        Err(_) => {
            issues.push(LoadIssue::MalformedStyle { id: id.clone() });
            None
        }
    }
}

fn convert_nested(
    fields: RawFields,
    children: Vec<Value>,
    ids: &mut IdAllocator,
    issues: &mut Vec<LoadIssue>,
) -> Item {
    let mut root = Frame::open(fields, children, ids, issues);
    let mut open: Vec<Frame<Value>> = Vec::new();

    loop {
        let next = open.last_mut().unwrap_or(&mut root).pending.next();
        match next {
            Some(entry) => {
                if let Some((fields, children)) = RawFields::take(entry, issues) {
                    open.push(Frame::open(fields, children, ids, issues));
                }
            }
            None => match open.pop() {
                Some(done) => open
                    .last_mut()
                    .unwrap_or(&mut root)
                    .item
                    .children
                    .push(Arc::new(done.item)),
                None => return root.item,
            },
        }
    }
}

struct FlatRecord {
    fields: RawFields,
    child_refs: Vec<String>,
}

impl FlatRecord {
    fn take(entry: Value, issues: &mut Vec<LoadIssue>) -> Option<Self> {
        let (fields, children) = RawFields::take(entry, issues)?;
        let mut child_refs = Vec::with_capacity(children.len());
        for child in children {
            match scalar_text(child) {
                Some(reference) => child_refs.push(reference),
                None => issues.push(LoadIssue::MalformedEntryDropped {
                    found: "child reference that is not an id".to_string(),
                }),
            }
        }
        Some(Self { fields, child_refs })
    }
}

fn convert_flat(
    entries: Vec<Value>,
    ids: &mut IdAllocator,
    issues: &mut Vec<LoadIssue>,
) -> Result<Item, PersistError> {
    let records: Vec<FlatRecord> = entries
        .into_iter()
        .filter_map(|entry| FlatRecord::take(entry, issues))
        .collect();
    if records.is_empty() {
        return Err(PersistError::Empty);
    }

    // First record wins for each id; later copies cannot be referenced unambiguously.
    let mut by_id: HashMap<String, usize> = HashMap::with_capacity(records.len());
    let mut anonymous = 0;
    for (index, record) in records.iter().enumerate() {
        let Some(id) = &record.fields.id else {
            anonymous += 1;
            continue;
        };
        if by_id.contains_key(id) {
            issues.push(LoadIssue::DuplicateRecordDropped {
                id: ItemId::new(id.clone()),
            });
        } else {
            by_id.insert(id.clone(), index);
        }
    }
    let live = by_id.len() + anonymous;

    let referenced: HashSet<&str> = records
        .iter()
        .flat_map(|record| {
            record
                .child_refs
                .iter()
                .filter(move |child| Some(*child) != record.fields.id.as_ref())
                .map(String::as_str)
        })
        .collect();

    // A record without an id cannot be anyone's child.
    let clear_root = records.iter().enumerate().position(|(index, record)| {
        match &record.fields.id {
            Some(id) => by_id.get(id) == Some(&index) && !referenced.contains(id.as_str()),
            None => true,
        }
    });
    let root_index = clear_root.unwrap_or(0);

    let mut slots: Vec<Option<FlatRecord>> = records.into_iter().map(Some).collect();
    let Some(root_record) = slots.get_mut(root_index).and_then(Option::take) else {
        return Err(PersistError::Empty);
    };
    let mut root = Frame::open(root_record.fields, root_record.child_refs, ids, issues);
    if clear_root.is_none() {
        issues.push(LoadIssue::NoClearRoot {
            root: root.item.id.clone(),
        });
    }

    let mut visited = HashSet::from([root_index]);
    let mut open: Vec<Frame<String>> = Vec::new();
    loop {
        let (next, parent) = {
            let top = open.last_mut().unwrap_or(&mut root);
            (top.pending.next(), top.item.id.clone())
        };
        let Some(child) = next else {
            match open.pop() {
                Some(done) => {
                    open.last_mut()
                        .unwrap_or(&mut root)
                        .item
                        .children
                        .push(Arc::new(done.item));
                    continue;
                }
                None => break,
            }
        };

        let Some(&child_index) = by_id.get(&child) else {
            issues.push(LoadIssue::DanglingChild {
                parent,
                child: ItemId::new(child),
            });
            continue;
        };
        if !visited.insert(child_index) {
            issues.push(LoadIssue::RepeatedChild {
                parent,
                child: ItemId::new(child),
            });
            continue;
        }
        if let Some(record) = slots.get_mut(child_index).and_then(Option::take) {
            open.push(Frame::open(record.fields, record.child_refs, ids, issues));
        }
    }

    let unreachable = live.saturating_sub(visited.len());
    if unreachable > 0 {
        issues.push(LoadIssue::UnreachableItems {
            root: root.item.id.clone(),
            count: unreachable,
        });
    }
    Ok(root.item)
}
