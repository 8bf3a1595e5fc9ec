//! Plain value types shared by Weave attributes and layout.
//!
//! Nothing in this crate draws. Colors, fonts and insets are data carried by
//! inherited attributes and handed to native widgets, which decide how to
//! present them.

mod color;
mod geometry;
mod typography;

pub use color::*;
pub use geometry::*;
pub use typography::*;

pub mod prelude {
    pub use crate::color::Color;
    pub use crate::geometry::{EdgeInsets, LayoutDirection, Size};
    pub use crate::typography::{Font, FontWeight};
}
