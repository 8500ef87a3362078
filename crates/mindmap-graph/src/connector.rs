use crate::geometry::Vec2;
use crate::layout::LayoutNode;
use crate::style::Color;
use mindmap_core::{ItemId, LayoutDirection};
use serde::Serialize;

/// A cubic bezier curve segment defined by four control points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CubicBezier {
    pub start: Vec2,
    pub control1: Vec2,
    pub control2: Vec2,
    pub end: Vec2,
}

impl CubicBezier {
    /// Sample the curve at parameter t [0, 1]
    pub fn sample(&self, t: f32) -> Vec2 {
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        let x = self.start.x * mt3
            + 3.0 * self.control1.x * mt2 * t
            + 3.0 * self.control2.x * mt * t2
            + self.end.x * t3;
        let y = self.start.y * mt3
            + 3.0 * self.control1.y * mt2 * t
            + 3.0 * self.control2.y * mt * t2
            + self.end.y * t3;

        Vec2::new(x, y)
    }

    /// Approximate distance from `point` to the curve, using `num_samples`
    /// uniform samples. Hosts use this to hit-test connectors.
    pub fn point_distance(&self, point: Vec2, num_samples: usize) -> f32 {
        let samples = num_samples.max(2);
        (0..=samples)
            .map(|i| self.sample(i as f32 / samples as f32).distance(point))
            .fold(f32::INFINITY, f32::min)
    }
}

/// Curve plus stroke for the edge between a node and its parent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connector {
    pub parent_id: ItemId,
    pub child_id: ItemId,
    pub curve: CubicBezier,
    pub color: Color,
    pub width: f32,
}

/// Routes S-shaped connectors between a parent and a child node.
#[derive(Debug, Clone, Copy)]
pub struct ConnectorRouter {
    pub stroke_width: f32,
    /// Stroke for edges leaving the root.
    pub root_stroke_width: f32,
}

impl Default for ConnectorRouter {
    fn default() -> Self {
        Self {
            stroke_width: 2.0,
            root_stroke_width: 3.5,
        }
    }
}

/// Routes with the default strokes.
pub fn route(parent: &LayoutNode, child: &LayoutNode, direction: LayoutDirection) -> Connector {
    ConnectorRouter::default().route(parent, child, direction)
}

impl ConnectorRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the connector from `parent` to `child`.
    ///
    /// Vertical layouts leave the parent's bottom edge and enter the child's
    /// top edge. Horizontal layouts leave the parent on the side facing the
    /// child, so children placed left of their parent (RightToLeft, and the
    /// left half of HorizontalSplit) get the mirrored anchors.
    pub fn route(
        &self,
        parent: &LayoutNode,
        child: &LayoutNode,
        direction: LayoutDirection,
    ) -> Connector {
        let curve = match direction {
            LayoutDirection::TopToBottom => {
                let start = Vec2::new(parent.x + parent.width / 2.0, parent.y + parent.height);
                let end = Vec2::new(child.x + child.width / 2.0, child.y);
                let mid_y = (start.y + end.y) / 2.0;
                CubicBezier {
                    start,
                    control1: Vec2::new(start.x, mid_y),
                    control2: Vec2::new(end.x, mid_y),
                    end,
                }
            }
            LayoutDirection::LeftToRight
            | LayoutDirection::RightToLeft
            | LayoutDirection::HorizontalSplit => {
                let parent_mid = parent.y + parent.height / 2.0;
                let child_mid = child.y + child.height / 2.0;
                let (start, end) = if child.x < parent.x {
                    (
                        Vec2::new(parent.x, parent_mid),
                        Vec2::new(child.x + child.width, child_mid),
                    )
                } else {
                    (
                        Vec2::new(parent.x + parent.width, parent_mid),
                        Vec2::new(child.x, child_mid),
                    )
                };
                let mid_x = (start.x + end.x) / 2.0;
                CubicBezier {
                    start,
                    control1: Vec2::new(mid_x, start.y),
                    control2: Vec2::new(mid_x, end.y),
                    end,
                }
            }
        };

        let width = if parent.is_root() {
            self.root_stroke_width
        } else {
            self.stroke_width
        };

        Connector {
            parent_id: parent.id.clone(),
            child_id: child.id.clone(),
            curve,
            color: child.color,
            width,
        }
    }
}
