//! Alignment and expansion intents turned into edge relations.
//!
//! In expand mode every edge of the content is pinned to the matching edge of
//! the parent. In align mode the content is pinned along each axis according
//! to the alignment (or both edges, when the axis is expanded) and is
//! additionally bounded on all four edges so oversized content cannot
//! overflow. Those bounds drop to [`Priority::DEFAULT_HIGH`] when a required
//! bound on the same edge already exists against another container.

use weave_core::WidgetId;
use weave_graphics::EdgeInsets;

use crate::alignment::{Alignment, HorizontalAlignment, VerticalAlignment};
use crate::axis::Axis;
use crate::constraints::{
    Anchor, ConstraintSet, ConstraintTarget, Guide, LayoutConstraint, Priority, Relation,
};
use crate::flags::{EdgeSet, Expansion};
use crate::registry::ConstraintRegistry;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutMode {
    Expand,
    Align,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SolveRequest {
    pub parent: WidgetId,
    pub content: WidgetId,
    pub mode: LayoutMode,
    pub alignment: Alignment,
    pub expansion: Expansion,
    /// Edges measured against the parent's bounds instead of its safe area.
    pub ignores_safe_area: EdgeSet,
    pub insets: EdgeInsets,
    /// A second container that must also bound the content, emitted first.
    pub also_bound_by: Option<ConstraintTarget>,
}

impl SolveRequest {
    pub fn align(parent: WidgetId, content: WidgetId, alignment: Alignment) -> Self {
        Self {
            parent,
            content,
            mode: LayoutMode::Align,
            alignment,
            expansion: Expansion::empty(),
            ignores_safe_area: EdgeSet::empty(),
            insets: EdgeInsets::ZERO,
            also_bound_by: None,
        }
    }

    pub fn expand(parent: WidgetId, content: WidgetId) -> Self {
        Self {
            mode: LayoutMode::Expand,
            expansion: Expansion::ALL,
            ..Self::align(parent, content, Alignment::CENTER)
        }
    }

    pub fn expansion(mut self, expansion: Expansion) -> Self {
        self.expansion = expansion;
        self
    }

    pub fn ignoring_safe_area(mut self, edges: EdgeSet) -> Self {
        self.ignores_safe_area = edges;
        self
    }

    pub fn insets(mut self, insets: EdgeInsets) -> Self {
        self.insets = insets;
        self
    }

    pub fn also_bound_by(mut self, target: ConstraintTarget) -> Self {
        self.also_bound_by = Some(target);
        self
    }

    fn target_for(&self, anchor: Anchor) -> ConstraintTarget {
        let ignores = match anchor.edge() {
            Some(edge) => self.ignores_safe_area.contains(edge),
            // Centers follow the axis: only ignored if both edges are.
            None => {
                let axis = match anchor {
                    Anchor::CenterX => EdgeSet::HORIZONTAL,
                    _ => EdgeSet::VERTICAL,
                };
                self.ignores_safe_area.contains(axis)
            }
        };
        ConstraintTarget::Widget {
            id: self.parent,
            guide: if ignores {
                Guide::Bounds
            } else {
                Guide::SafeArea
            },
        }
    }

    /// Offset of `anchor` from the parent's matching anchor.
    fn inset_for(&self, anchor: Anchor) -> f32 {
        let insets = &self.insets;
        match anchor {
            Anchor::Top => insets.top,
            Anchor::Leading => insets.leading,
            Anchor::Bottom => -insets.bottom,
            Anchor::Trailing => -insets.trailing,
            Anchor::CenterX => (insets.leading - insets.trailing) / 2.0,
            Anchor::CenterY => (insets.top - insets.bottom) / 2.0,
        }
    }
}

const EDGES: [(Anchor, Relation); 4] = [
    (Anchor::Top, Relation::GreaterOrEqual),
    (Anchor::Leading, Relation::GreaterOrEqual),
    (Anchor::Bottom, Relation::LessOrEqual),
    (Anchor::Trailing, Relation::LessOrEqual),
];

#[derive(Clone, Copy, Debug, Default)]
pub struct LayoutSolver;

impl LayoutSolver {
    pub fn new() -> Self {
        Self
    }

    /// Produces the constraints placing `request.content` in its parent.
    /// `active` is consulted for existing hard bounds; nothing is activated.
    pub fn solve(&self, request: &SolveRequest, active: &ConstraintRegistry) -> ConstraintSet {
        let mut set = ConstraintSet::new();

        if let Some(outer) = request.also_bound_by {
            for (anchor, relation) in EDGES {
                set.push(LayoutConstraint::new(
                    request.content,
                    anchor,
                    relation,
                    outer,
                    0.0,
                ));
            }
        }

        match request.mode {
            LayoutMode::Expand => {
                for (anchor, _) in EDGES {
                    self.pin(request, anchor, &mut set);
                }
            }
            LayoutMode::Align => {
                for axis in [Axis::Horizontal, Axis::Vertical] {
                    self.align_axis(request, axis, &mut set);
                }
                self.bound_edges(request, active, &mut set);
            }
        }

        log::trace!(
            "solved {} constraints for widget {} in {}",
            set.len(),
            request.content,
            request.parent
        );
        set
    }

    fn pin(&self, request: &SolveRequest, anchor: Anchor, set: &mut ConstraintSet) {
        set.push(LayoutConstraint::new(
            request.content,
            anchor,
            Relation::Equal,
            request.target_for(anchor),
            request.inset_for(anchor),
        ));
    }

    fn align_axis(&self, request: &SolveRequest, axis: Axis, set: &mut ConstraintSet) {
        let (leading, trailing, center) = axis.anchors();
        if request.expansion.contains(axis.expansion()) {
            self.pin(request, leading, set);
            self.pin(request, trailing, set);
            return;
        }
        let anchor = match axis {
            Axis::Horizontal => match request.alignment.horizontal {
                HorizontalAlignment::Leading => leading,
                HorizontalAlignment::Center => center,
                HorizontalAlignment::Trailing => trailing,
            },
            Axis::Vertical => match request.alignment.vertical {
                VerticalAlignment::Top => leading,
                VerticalAlignment::Center => center,
                VerticalAlignment::Bottom => trailing,
            },
        };
        self.pin(request, anchor, set);
    }

    fn bound_edges(
        &self,
        request: &SolveRequest,
        active: &ConstraintRegistry,
        set: &mut ConstraintSet,
    ) {
        for (anchor, relation) in EDGES {
            let target = request.target_for(anchor);
            let bounded_elsewhere = set.has_hard_bound(request.content, anchor, relation, target)
                || active.has_hard_bound(request.content, anchor, relation, target);
            let priority = if bounded_elsewhere {
                Priority::DEFAULT_HIGH
            } else {
                Priority::REQUIRED
            };
            set.push(
                LayoutConstraint::new(
                    request.content,
                    anchor,
                    relation,
                    target,
                    request.inset_for(anchor),
                )
                .with_priority(priority),
            );
        }
    }
}

#[cfg(test)]
#[path = "tests/solver_tests.rs"]
mod tests;
