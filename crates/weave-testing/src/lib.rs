//! Testing utilities and harness for Weave

pub mod leaf;
pub mod testing;

pub use leaf::{LeafRenderable, LeafWidget, LogEntry, RenderLog};
pub use testing::*;

pub mod prelude {
    pub use crate::leaf::*;
    pub use crate::testing::*;
}
