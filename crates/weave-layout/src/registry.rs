use ahash::RandomState;
use indexmap::IndexMap;

use weave_core::WidgetId;

use crate::constraints::{Anchor, ConstraintSet, ConstraintTarget, LayoutConstraint, Relation};

pub type ConstraintId = usize;

/// The set of active constraints, in activation order.
///
/// This is the hand-off point to whatever solver the host platform uses.
/// A constraint stays active until either widget it mentions is released.
#[derive(Default)]
pub struct ConstraintRegistry {
    active: IndexMap<ConstraintId, LayoutConstraint, RandomState>,
    next_id: ConstraintId,
}

impl ConstraintRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activate(&mut self, set: ConstraintSet) -> Vec<ConstraintId> {
        set.into_iter()
            .map(|constraint| {
                let id = self.next_id;
                self.next_id += 1;
                log::trace!("activate {id}: {constraint}");
                self.active.insert(id, constraint);
                id
            })
            .collect()
    }

    /// Deactivates every constraint where `widget` is the item or the target.
    pub fn release(&mut self, widget: WidgetId) -> usize {
        let before = self.active.len();
        self.active.retain(|_, c| !c.involves(widget));
        let released = before - self.active.len();
        if released > 0 {
            log::trace!("released {released} constraints of widget {widget}");
        }
        released
    }

    /// Deactivates the constraints positioning `widget`, keeping the ones
    /// its own children hold against it.
    pub fn release_item(&mut self, widget: WidgetId) -> usize {
        let before = self.active.len();
        self.active.retain(|_, c| c.item != widget);
        before - self.active.len()
    }

    pub fn constraints_for(&self, widget: WidgetId) -> Vec<LayoutConstraint> {
        self.active
            .values()
            .filter(|c| c.item == widget)
            .copied()
            .collect()
    }

    pub fn get(&self, id: ConstraintId) -> Option<&LayoutConstraint> {
        self.active.get(&id)
    }

    pub fn has_hard_bound(
        &self,
        item: WidgetId,
        anchor: Anchor,
        relation: Relation,
        excluding: ConstraintTarget,
    ) -> bool {
        self.active.values().any(|c| {
            c.is_hard_bound_for(item, anchor, relation) && !c.target.same_container(excluding)
        })
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ConstraintId, &LayoutConstraint)> {
        self.active.iter().map(|(id, c)| (*id, c))
    }
}
