//! Branch colors for mind-map nodes and connectors.
//!
//! Every direct child of the root opens a branch; the branch and all of its
//! descendants share one hue, cycling through [`BRANCH_PALETTE`].

use serde::{Serialize, Serializer};

/// Opaque RGB color. Serializes as a `#rrggbb` string, the same notation
/// item styles use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

pub const ROOT_COLOR: Color = Color::rgb(52, 73, 94);

pub const BRANCH_PALETTE: [Color; 8] = [
    Color::rgb(231, 76, 60),
    Color::rgb(52, 152, 219),
    Color::rgb(46, 204, 113),
    Color::rgb(155, 89, 182),
    Color::rgb(241, 196, 15),
    Color::rgb(26, 188, 156),
    Color::rgb(230, 126, 34),
    Color::rgb(233, 30, 99),
];

/// Color of the branch opened by the root's child at `index`.
pub fn branch_color(index: usize) -> Color {
    BRANCH_PALETTE[index % BRANCH_PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_colors_cycle() {
        assert_eq!(branch_color(0), BRANCH_PALETTE[0]);
        assert_eq!(branch_color(BRANCH_PALETTE.len()), BRANCH_PALETTE[0]);
        assert_ne!(branch_color(0), branch_color(1));
    }

    #[test]
    fn test_serializes_as_hex() {
        assert_eq!(Color::rgb(255, 0, 16).to_hex(), "#ff0010");
        assert_eq!(
            serde_json::to_value(ROOT_COLOR).unwrap(),
            serde_json::json!("#34495e")
        );
    }
}
