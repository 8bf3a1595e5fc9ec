//! Constraint generation for Weave layouts.
//!
//! Weave does not measure or place anything itself. The [`LayoutSolver`]
//! turns an alignment/expansion intent into edge relations, and a
//! [`ConstraintRegistry`] holds whatever is active so an external solver can
//! consume it.

mod alignment;
mod axis;
mod constraints;
mod flags;
mod registry;
mod solver;

pub use alignment::*;
pub use axis::*;
pub use constraints::*;
pub use flags::*;
pub use registry::*;
pub use solver::*;

pub mod prelude {
    pub use crate::alignment::{Alignment, HorizontalAlignment, VerticalAlignment};
    pub use crate::constraints::{Anchor, ConstraintSet, ConstraintTarget, LayoutConstraint};
    pub use crate::flags::{EdgeSet, Expansion};
    pub use crate::registry::ConstraintRegistry;
    pub use crate::solver::{LayoutSolver, SolveRequest};
}
