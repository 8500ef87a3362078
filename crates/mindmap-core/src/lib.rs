use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

pub mod error;
pub mod persist;
pub mod tree;

pub use error::{LoadIssue, ParseDirectionError, PersistError};
pub use persist::{LoadedTree, load_tree, save_tree};
pub use tree::{Found, MindMapTree, NEW_NODE_LABEL, Preorder};

/// Identifier of an [`Item`], unique within one tree.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random id for a newly inserted item.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Growth direction of the whole tree. Only read from the root item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LayoutDirection {
    #[default]
    LeftToRight,
    RightToLeft,
    TopToBottom,
    HorizontalSplit,
}

impl LayoutDirection {
    pub const ALL: [LayoutDirection; 4] = [
        LayoutDirection::LeftToRight,
        LayoutDirection::RightToLeft,
        LayoutDirection::TopToBottom,
        LayoutDirection::HorizontalSplit,
    ];

    /// Whether depth levels grow along the x axis.
    pub fn is_horizontal(self) -> bool {
        !matches!(self, LayoutDirection::TopToBottom)
    }
}

impl fmt::Display for LayoutDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LeftToRight => write!(f, "left-to-right"),
            Self::RightToLeft => write!(f, "right-to-left"),
            Self::TopToBottom => write!(f, "top-to-bottom"),
            Self::HorizontalSplit => write!(f, "horizontal-split"),
        }
    }
}

impl FromStr for LayoutDirection {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "lefttoright" | "lr" | "ltr" => Ok(Self::LeftToRight),
            "righttoleft" | "rl" | "rtl" => Ok(Self::RightToLeft),
            "toptobottom" | "tb" | "ttb" => Ok(Self::TopToBottom),
            "horizontalsplit" | "split" | "hs" => Ok(Self::HorizontalSplit),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}

/// Optional per-item visual overrides. Colors are kept as CSS strings for the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
}

impl ItemStyle {
    /// Shallow merge: every field set in `patch` wins, the rest is kept.
    pub fn merged_with(&self, patch: &ItemStyle) -> ItemStyle {
        ItemStyle {
            background_color: patch
                .background_color
                .clone()
                .or_else(|| self.background_color.clone()),
            text_color: patch.text_color.clone().or_else(|| self.text_color.clone()),
            font_size: patch.font_size.or(self.font_size),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.background_color.is_none() && self.text_color.is_none() && self.font_size.is_none()
    }
}

/// One node of a mind-map tree.
///
/// Children are reference counted so that an edit only copies the path from the
/// root to the edited node; untouched subtrees are shared between revisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub label: String,
    #[serde(default)]
    pub children: Vec<Arc<Item>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ItemStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_direction: Option<LayoutDirection>,
}

impl Item {
    pub fn new(id: impl Into<ItemId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            children: Vec::new(),
            style: None,
            layout_direction: None,
        }
    }

    /// Leaf with a freshly generated id.
    pub fn leaf(label: impl Into<String>) -> Self {
        Self::new(ItemId::generate(), label)
    }

    pub fn with_child(mut self, child: Item) -> Self {
        self.children.push(Arc::new(child));
        self
    }

    pub fn with_style(mut self, style: ItemStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn font_size(&self) -> Option<f32> {
        self.style.as_ref().and_then(|style| style.font_size)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn child(&self, index: usize) -> Option<&Item> {
        self.children.get(index).map(|child| child.as_ref())
    }
}
