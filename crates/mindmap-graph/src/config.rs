use mindmap_core::LayoutDirection;
use serde::{Deserialize, Serialize};

/// Sizing and spacing constants for [`crate::MindMapLayouter`].
///
/// Missing fields fall back to the defaults, so a JSON override only needs
/// to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub min_node_width: f32,
    pub max_node_width: f32,
    /// Estimated glyph width as a fraction of the font size.
    pub char_width_factor: f32,
    /// Node height as a multiple of the font size.
    pub line_height_factor: f32,
    /// Horizontal label padding in LeftToRight / RightToLeft.
    pub narrow_padding: f32,
    /// Horizontal label padding in TopToBottom / HorizontalSplit.
    pub wide_padding: f32,
    pub root_font_size: f32,
    pub font_size: f32,
    /// Distance between depth levels in the horizontal modes.
    pub level_gap: f32,
    /// Distance between sibling subtrees in the horizontal modes.
    pub sibling_gap: f32,
    pub vertical_level_gap: f32,
    pub vertical_sibling_gap: f32,
    /// Space kept between the canvas origin and the laid-out nodes.
    pub margin: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_node_width: 80.0,
            max_node_width: 300.0,
            char_width_factor: 0.8,
            line_height_factor: 2.5,
            narrow_padding: 24.0,
            wide_padding: 30.0,
            root_font_size: 16.0,
            font_size: 14.0,
            level_gap: 60.0,
            sibling_gap: 12.0,
            vertical_level_gap: 60.0,
            vertical_sibling_gap: 40.0,
            margin: 50.0,
        }
    }
}

impl LayoutConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn padding(&self, direction: LayoutDirection) -> f32 {
        match direction {
            LayoutDirection::LeftToRight | LayoutDirection::RightToLeft => self.narrow_padding,
            LayoutDirection::TopToBottom | LayoutDirection::HorizontalSplit => self.wide_padding,
        }
    }

    /// Gap between consecutive depth levels.
    pub fn level_gap(&self, direction: LayoutDirection) -> f32 {
        if direction.is_horizontal() {
            self.level_gap
        } else {
            self.vertical_level_gap
        }
    }

    /// Gap between neighbouring sibling subtrees.
    pub fn sibling_gap(&self, direction: LayoutDirection) -> f32 {
        if direction.is_horizontal() {
            self.sibling_gap
        } else {
            self.vertical_sibling_gap
        }
    }

    pub fn default_font_size(&self, depth: usize) -> f32 {
        if depth == 0 {
            self.root_font_size
        } else {
            self.font_size
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = LayoutConfig::from_json(r#"{"levelGap": 80.0, "margin": 10}"#).unwrap();
        assert_eq!(config.level_gap, 80.0);
        assert_eq!(config.margin, 10.0);
        assert_eq!(config.sibling_gap, 12.0);
        assert_eq!(config.max_node_width, 300.0);
    }

    #[test]
    fn test_gaps_follow_direction() {
        let config = LayoutConfig::default();
        assert_eq!(config.level_gap(LayoutDirection::LeftToRight), 60.0);
        assert_eq!(config.sibling_gap(LayoutDirection::HorizontalSplit), 12.0);
        assert_eq!(config.level_gap(LayoutDirection::TopToBottom), 60.0);
        assert_eq!(config.sibling_gap(LayoutDirection::TopToBottom), 40.0);
        assert_eq!(config.padding(LayoutDirection::RightToLeft), 24.0);
        assert_eq!(config.padding(LayoutDirection::TopToBottom), 30.0);
    }
}
