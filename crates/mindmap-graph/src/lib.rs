pub mod config;
pub mod connector;
pub mod geometry;
pub mod layout;
pub mod style;

pub use config::LayoutConfig;
pub use connector::{Connector, ConnectorRouter, CubicBezier, route};
pub use geometry::{Rect, Vec2};
pub use layout::{BranchSide, Layout, LayoutNode, Layouter, MindMapLayouter, compute_layout};
pub use style::{BRANCH_PALETTE, Color, ROOT_COLOR, branch_color};
