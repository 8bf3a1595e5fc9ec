//! Edge relations between widgets.

use std::fmt;

use weave_core::WidgetId;

use crate::flags::EdgeSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Anchor {
    Top,
    Bottom,
    Leading,
    Trailing,
    CenterX,
    CenterY,
}

impl Anchor {
    /// The single edge this anchor refers to, if it is an edge.
    pub fn edge(self) -> Option<EdgeSet> {
        match self {
            Anchor::Top => Some(EdgeSet::TOP),
            Anchor::Bottom => Some(EdgeSet::BOTTOM),
            Anchor::Leading => Some(EdgeSet::LEADING),
            Anchor::Trailing => Some(EdgeSet::TRAILING),
            Anchor::CenterX | Anchor::CenterY => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Relation {
    Equal,
    GreaterOrEqual,
    LessOrEqual,
}

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Priority(pub f32);

impl Priority {
    pub const REQUIRED: Priority = Priority(1000.0);
    pub const DEFAULT_HIGH: Priority = Priority(750.0);
    pub const DEFAULT_LOW: Priority = Priority(250.0);

    pub fn is_required(self) -> bool {
        self.0 >= Priority::REQUIRED.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::REQUIRED
    }
}

/// Which rectangle of a target widget an anchor is measured against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Guide {
    Bounds,
    SafeArea,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstraintTarget {
    Widget { id: WidgetId, guide: Guide },
    Window,
}

impl ConstraintTarget {
    pub fn bounds(id: WidgetId) -> Self {
        ConstraintTarget::Widget {
            id,
            guide: Guide::Bounds,
        }
    }

    pub fn safe_area(id: WidgetId) -> Self {
        ConstraintTarget::Widget {
            id,
            guide: Guide::SafeArea,
        }
    }

    pub fn widget(self) -> Option<WidgetId> {
        match self {
            ConstraintTarget::Widget { id, .. } => Some(id),
            ConstraintTarget::Window => None,
        }
    }

    /// True when both targets name the same container, whichever guide.
    pub fn same_container(self, other: ConstraintTarget) -> bool {
        match (self, other) {
            (ConstraintTarget::Window, ConstraintTarget::Window) => true,
            (ConstraintTarget::Widget { id: a, .. }, ConstraintTarget::Widget { id: b, .. }) => {
                a == b
            }
            _ => false,
        }
    }
}

/// `item.anchor <relation> target.target_anchor + constant`, at `priority`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConstraint {
    pub item: WidgetId,
    pub anchor: Anchor,
    pub relation: Relation,
    pub target: ConstraintTarget,
    pub target_anchor: Anchor,
    pub constant: f32,
    pub priority: Priority,
}

impl LayoutConstraint {
    pub fn new(
        item: WidgetId,
        anchor: Anchor,
        relation: Relation,
        target: ConstraintTarget,
        constant: f32,
    ) -> Self {
        Self {
            item,
            anchor,
            relation,
            target,
            target_anchor: anchor,
            constant,
            priority: Priority::REQUIRED,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn involves(&self, widget: WidgetId) -> bool {
        self.item == widget || self.target.widget() == Some(widget)
    }

    /// A required constraint on the same item, anchor and relation as
    /// `self`, against a different container.
    pub fn is_hard_bound_for(&self, item: WidgetId, anchor: Anchor, relation: Relation) -> bool {
        self.item == item
            && self.anchor == anchor
            && self.relation == relation
            && self.priority.is_required()
    }
}

impl fmt::Display for LayoutConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let relation = match self.relation {
            Relation::Equal => "==",
            Relation::GreaterOrEqual => ">=",
            Relation::LessOrEqual => "<=",
        };
        let target = match self.target {
            ConstraintTarget::Widget { id, guide } => format!("#{id}.{guide:?}"),
            ConstraintTarget::Window => "window".to_string(),
        };
        write!(
            f,
            "#{}.{:?} {} {}.{:?} + {} @{}",
            self.item,
            self.anchor,
            relation,
            target,
            self.target_anchor,
            self.constant,
            self.priority.0
        )
    }
}

/// Constraints produced by one solve, not yet active.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConstraintSet {
    constraints: Vec<LayoutConstraint>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, constraint: LayoutConstraint) {
        self.constraints.push(constraint);
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LayoutConstraint> {
        self.constraints.iter()
    }

    pub fn involves(&self, widget: WidgetId) -> bool {
        self.constraints.iter().any(|c| c.involves(widget))
    }

    /// First constraint on `item.anchor` with the given relation.
    pub fn find(
        &self,
        item: WidgetId,
        anchor: Anchor,
        relation: Relation,
    ) -> Option<&LayoutConstraint> {
        self.constraints
            .iter()
            .find(|c| c.item == item && c.anchor == anchor && c.relation == relation)
    }

    pub fn has_hard_bound(
        &self,
        item: WidgetId,
        anchor: Anchor,
        relation: Relation,
        excluding: ConstraintTarget,
    ) -> bool {
        self.constraints.iter().any(|c| {
            c.is_hard_bound_for(item, anchor, relation) && !c.target.same_container(excluding)
        })
    }
}

impl IntoIterator for ConstraintSet {
    type Item = LayoutConstraint;
    type IntoIter = std::vec::IntoIter<LayoutConstraint>;

    fn into_iter(self) -> Self::IntoIter {
        self.constraints.into_iter()
    }
}

impl<'a> IntoIterator for &'a ConstraintSet {
    type Item = &'a LayoutConstraint;
    type IntoIter = std::slice::Iter<'a, LayoutConstraint>;

    fn into_iter(self) -> Self::IntoIter {
        self.constraints.iter()
    }
}
