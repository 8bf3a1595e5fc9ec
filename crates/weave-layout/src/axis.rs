//! Axis definitions for anchors and expansion.

use crate::constraints::Anchor;
use crate::flags::Expansion;

/// One of the two directions content can be pinned along.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn is_horizontal(self) -> bool {
        matches!(self, Axis::Horizontal)
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Axis::Vertical)
    }

    /// Leading/top edge, trailing/bottom edge and center anchor of this axis.
    pub fn anchors(self) -> (Anchor, Anchor, Anchor) {
        match self {
            Axis::Horizontal => (Anchor::Leading, Anchor::Trailing, Anchor::CenterX),
            Axis::Vertical => (Anchor::Top, Anchor::Bottom, Anchor::CenterY),
        }
    }

    pub fn expansion(self) -> Expansion {
        match self {
            Axis::Horizontal => Expansion::HORIZONTAL,
            Axis::Vertical => Expansion::VERTICAL,
        }
    }
}
