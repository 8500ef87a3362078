use crate::config::LayoutConfig;
use crate::connector::{Connector, ConnectorRouter};
use crate::geometry::{Rect, Vec2};
use crate::style::{Color, ROOT_COLOR, branch_color};
use mindmap_core::{Item, ItemId, LayoutDirection, MindMapTree};
use serde::Serialize;
use std::collections::HashMap;

pub trait Layouter {
    fn execute(&self, root: &Item, direction: LayoutDirection) -> Layout;
}

/// Which side of the root a node's branch grows towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BranchSide {
    Root,
    Right,
    Left,
    Below,
}

/// Computed geometry of one item. Recomputed on every layout pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode {
    pub id: ItemId,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Branch color shared with the node's connector.
    pub color: Color,
    pub depth: usize,
    pub side: BranchSide,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ItemId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_anchor_x: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_anchor_y: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_height: Option<f32>,
}

impl LayoutNode {
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(Vec2::new(self.x, self.y), Vec2::new(self.width, self.height))
    }

    pub fn center(&self) -> Vec2 {
        self.rect().center()
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Rectangle of the parent as recorded at layout time.
    pub fn parent_rect(&self) -> Option<Rect> {
        Some(Rect::from_pos_size(
            Vec2::new(self.parent_anchor_x?, self.parent_anchor_y?),
            Vec2::new(self.parent_width?, self.parent_height?),
        ))
    }

    fn translate(&mut self, offset: Vec2) {
        self.x += offset.x;
        self.y += offset.y;
        if let Some(x) = self.parent_anchor_x.as_mut() {
            *x += offset.x;
        }
        if let Some(y) = self.parent_anchor_y.as_mut() {
            *y += offset.y;
        }
    }
}

/// Result of a layout pass: nodes in pre-order plus their union bounds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub direction: LayoutDirection,
    pub nodes: Vec<LayoutNode>,
    pub bounds: Rect,
}

impl Layout {
    pub fn node(&self, id: &ItemId) -> Option<&LayoutNode> {
        self.nodes.iter().find(|node| &node.id == id)
    }

    pub fn root(&self) -> Option<&LayoutNode> {
        self.nodes.first()
    }

    pub fn translated(&self, offset: Vec2) -> Layout {
        let mut nodes = self.nodes.clone();
        for node in &mut nodes {
            node.translate(offset);
        }
        Layout {
            direction: self.direction,
            nodes,
            bounds: self.bounds.translate(offset),
        }
    }

    /// Shifts everything so the bounds start at (`margin`, `margin`).
    pub fn normalized(&self, margin: f32) -> Layout {
        self.translated(Vec2::new(
            margin - self.bounds.min.x,
            margin - self.bounds.min.y,
        ))
    }

    /// Size of a canvas holding the layout with `margin` on every side.
    pub fn canvas_size(&self, margin: f32) -> Vec2 {
        Vec2::new(
            self.bounds.width() + margin * 2.0,
            self.bounds.height() + margin * 2.0,
        )
    }

    /// One connector per non-root node, in node order.
    pub fn connectors(&self, router: &ConnectorRouter) -> Vec<Connector> {
        let by_id: HashMap<&ItemId, &LayoutNode> =
            self.nodes.iter().map(|node| (&node.id, node)).collect();
        self.nodes
            .iter()
            .filter_map(|child| {
                let parent = by_id.get(child.parent_id.as_ref()?)?;
                Some(router.route(parent, child, self.direction))
            })
            .collect()
    }
}

/// Lays out a tree with the default configuration.
pub fn compute_layout(root: &Item, direction: LayoutDirection) -> Layout {
    MindMapLayouter::default().execute(root, direction)
}

/// Two-pass tidy-tree layouter.
///
/// Pass one measures every node and the cross-axis extent of its subtree
/// (height when growing sideways, width when growing down). Pass two walks
/// the tree top-down, giving every subtree a band of exactly its extent and
/// centering the node inside that band.
///
/// `HorizontalSplit` sends even-indexed root children to the right and
/// odd-indexed ones to the left. The split is a plain alternation, not a
/// balance of subtree sizes, so heavy branches can end up on one side.
#[derive(Debug, Clone, Default)]
pub struct MindMapLayouter {
    pub config: LayoutConfig,
}

struct Measured<'a> {
    item: &'a Item,
    width: f32,
    height: f32,
    extent: f32,
    children: Vec<Measured<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Growth {
    Right,
    Left,
    Down,
}

impl Growth {
    fn side(self) -> BranchSide {
        match self {
            Growth::Right => BranchSide::Right,
            Growth::Left => BranchSide::Left,
            Growth::Down => BranchSide::Below,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Branch {
    color: Color,
    side: BranchSide,
}

#[derive(Clone, Copy)]
struct Frame<'a> {
    id: &'a ItemId,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

struct Placement {
    level_gap: f32,
    sibling_gap: f32,
    nodes: Vec<LayoutNode>,
}

fn stacked(extents: impl Iterator<Item = f32>, gap: f32) -> f32 {
    let (sum, count) = extents.fold((0.0, 0usize), |(sum, count), extent| {
        (sum + extent, count + 1)
    });
    if count == 0 {
        0.0
    } else {
        sum + gap * (count - 1) as f32
    }
}

impl MindMapLayouter {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Lays out `tree` in the direction stored on its root.
    pub fn layout_tree(&self, tree: &MindMapTree) -> Layout {
        self.execute(tree.root(), tree.layout_direction())
    }

    fn measure<'a>(&self, item: &'a Item, depth: usize, direction: LayoutDirection) -> Measured<'a> {
        let config = &self.config;
        let font_size = item
            .font_size()
            .filter(|size| size.is_finite() && *size > 0.0)
            .unwrap_or_else(|| config.default_font_size(depth));
        let label_len = item.label.chars().count() as f32;
        let width = (label_len * font_size * config.char_width_factor + config.padding(direction))
            .max(config.min_node_width)
            .min(config.max_node_width);
        let height = font_size * config.line_height_factor;

        let children: Vec<Measured<'a>> = item
            .children
            .iter()
            .map(|child| self.measure(child, depth + 1, direction))
            .collect();
        let own_extent = if direction.is_horizontal() { height } else { width };
        let children_extent = stacked(
            children.iter().map(|child| child.extent),
            config.sibling_gap(direction),
        );

        Measured {
            item,
            width,
            height,
            extent: own_extent.max(children_extent),
            children,
        }
    }
}

impl Layouter for MindMapLayouter {
    fn execute(&self, root: &Item, direction: LayoutDirection) -> Layout {
        let measured = self.measure(root, 0, direction);
        let mut placement = Placement {
            level_gap: self.config.level_gap(direction),
            sibling_gap: self.config.sibling_gap(direction),
            nodes: Vec::new(),
        };
        let root_branch = Branch {
            color: ROOT_COLOR,
            side: BranchSide::Root,
        };

        // The root always sits at the origin.
        let sideways_band = -(measured.extent - measured.height) / 2.0;
        match direction {
            LayoutDirection::LeftToRight => placement.place(
                &measured,
                Growth::Right,
                0.0,
                sideways_band,
                root_branch,
                None,
                0,
            ),
            LayoutDirection::RightToLeft => placement.place(
                &measured,
                Growth::Left,
                0.0,
                sideways_band,
                root_branch,
                None,
                0,
            ),
            LayoutDirection::TopToBottom => placement.place(
                &measured,
                Growth::Down,
                0.0,
                -(measured.extent - measured.width) / 2.0,
                root_branch,
                None,
                0,
            ),
            LayoutDirection::HorizontalSplit => placement.place_split_root(&measured, root_branch),
        }

        let nodes = placement.nodes;
        let bounds = nodes
            .iter()
            .map(LayoutNode::rect)
            .reduce(|acc, rect| acc.union(&rect))
            .unwrap_or(Rect::NOTHING);

        tracing::debug!(
            %direction,
            node_count = nodes.len(),
            width = bounds.width(),
            height = bounds.height(),
            "computed mind-map layout"
        );

        Layout {
            direction,
            nodes,
            bounds,
        }
    }
}

impl Placement {
    fn push(
        &mut self,
        node: &Measured<'_>,
        x: f32,
        y: f32,
        branch: Branch,
        parent: Option<Frame<'_>>,
        depth: usize,
    ) {
        self.nodes.push(LayoutNode {
            id: node.item.id.clone(),
            x,
            y,
            width: node.width,
            height: node.height,
            color: branch.color,
            depth,
            side: branch.side,
            parent_id: parent.map(|frame| frame.id.clone()),
            parent_anchor_x: parent.map(|frame| frame.x),
            parent_anchor_y: parent.map(|frame| frame.y),
            parent_width: parent.map(|frame| frame.width),
            parent_height: parent.map(|frame| frame.height),
        });
    }

    /// Places `node` and its subtree.
    ///
    /// `main` is the node's leading coordinate along the growth axis and
    /// `band_start` the start of the cross-axis band reserved for the subtree.
    #[allow(clippy::too_many_arguments)]
    fn place(
        &mut self,
        node: &Measured<'_>,
        growth: Growth,
        main: f32,
        band_start: f32,
        branch: Branch,
        parent: Option<Frame<'_>>,
        depth: usize,
    ) {
        let (x, y) = match growth {
            Growth::Down => (band_start + (node.extent - node.width) / 2.0, main),
            Growth::Right | Growth::Left => (main, band_start + (node.extent - node.height) / 2.0),
        };
        self.push(node, x, y, branch, parent, depth);

        let frame = Frame {
            id: &node.item.id,
            x,
            y,
            width: node.width,
            height: node.height,
        };
        let children_extent = stacked(
            node.children.iter().map(|child| child.extent),
            self.sibling_gap,
        );
        let mut cursor = band_start + (node.extent - children_extent) / 2.0;

        for (index, child) in node.children.iter().enumerate() {
            let child_branch = if depth == 0 {
                Branch {
                    color: branch_color(index),
                    side: growth.side(),
                }
            } else {
                branch
            };
            let child_main = match growth {
                Growth::Right => x + node.width + self.level_gap,
                Growth::Left => x - self.level_gap - child.width,
                Growth::Down => y + node.height + self.level_gap,
            };
            self.place(
                child,
                growth,
                child_main,
                cursor,
                child_branch,
                Some(frame),
                depth + 1,
            );
            cursor += child.extent + self.sibling_gap;
        }
    }

    /// Root of a `HorizontalSplit` layout: even children grow right, odd
    /// children grow left, and each group is centered on the root on its own.
    fn place_split_root(&mut self, root: &Measured<'_>, branch: Branch) {
        self.push(root, 0.0, 0.0, branch, None, 0);
        let frame = Frame {
            id: &root.item.id,
            x: 0.0,
            y: 0.0,
            width: root.width,
            height: root.height,
        };

        let right_extent = stacked(
            root.children.iter().step_by(2).map(|child| child.extent),
            self.sibling_gap,
        );
        let left_extent = stacked(
            root.children.iter().skip(1).step_by(2).map(|child| child.extent),
            self.sibling_gap,
        );
        let center_y = root.height / 2.0;
        let mut right_cursor = center_y - right_extent / 2.0;
        let mut left_cursor = center_y - left_extent / 2.0;

        for (index, child) in root.children.iter().enumerate() {
            let color = branch_color(index);
            if index % 2 == 0 {
                self.place(
                    child,
                    Growth::Right,
                    root.width + self.level_gap,
                    right_cursor,
                    Branch {
                        color,
                        side: BranchSide::Right,
                    },
                    Some(frame),
                    1,
                );
                right_cursor += child.extent + self.sibling_gap;
            } else {
                self.place(
                    child,
                    Growth::Left,
                    -self.level_gap - child.width,
                    left_cursor,
                    Branch {
                        color,
                        side: BranchSide::Left,
                    },
                    Some(frame),
                    1,
                );
                left_cursor += child.extent + self.sibling_gap;
            }
        }
    }
}
