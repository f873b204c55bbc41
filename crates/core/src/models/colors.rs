//! Color mapping for scene entities

use super::graph::NodeCategory;
use super::task::TaskStatus;

/// RGB color representation (0-255 per channel)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert to hex string (#RRGGBB)
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Robot body fill.
pub const ROBOT_BODY: RgbColor = RgbColor::new(255, 255, 0);

/// Direction marker fill, also the robot body border.
pub const ROBOT_MARKER: RgbColor = RgbColor::new(0x71, 0x0D, 0x76);

/// Edge stroke.
pub const EDGE: RgbColor = RgbColor::new(0xCC, 0xCC, 0xCC);

/// Map a node category to its fill color. Unknown categories render red.
#[must_use]
pub const fn category_color(category: NodeCategory) -> RgbColor {
    match category {
        NodeCategory::Waiting => RgbColor::new(255, 255, 0),
        NodeCategory::Charging => RgbColor::new(0, 128, 0),
        NodeCategory::Pickdrop => RgbColor::new(0, 0, 255),
        NodeCategory::Other => RgbColor::new(255, 0, 0),
    }
}

/// Map a task status to its row tint.
#[must_use]
pub const fn status_color(status: TaskStatus) -> RgbColor {
    match status {
        TaskStatus::Pending => RgbColor::new(230, 126, 34),
        TaskStatus::InProgress => RgbColor::new(52, 152, 219),
        TaskStatus::Done => RgbColor::new(46, 204, 113),
    }
}
