//! Sequence diffing between two generations of child descriptions.
//!
//! Operations are meant to be applied in order to a live sequence that is
//! index-aligned with the old descriptions. Removals always come first and
//! run back to front; the remaining operations walk the new sequence front
//! to back so each index is final once visited.

use std::fmt;

use ahash::RandomState;
use hashbrown::{HashMap, HashSet};

use crate::view::{ViewDescription, ViewKey};

#[derive(Clone)]
pub enum DiffOperation {
    Insert {
        index: usize,
        description: ViewDescription,
    },
    Update {
        index: usize,
        previous: ViewDescription,
        next: ViewDescription,
    },
    Move {
        from: usize,
        to: usize,
    },
    Remove {
        index: usize,
    },
}

/// Position-only view of a [`DiffOperation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiffStep {
    Insert(usize),
    Update(usize),
    Move(usize, usize),
    Remove(usize),
}

impl DiffOperation {
    pub fn step(&self) -> DiffStep {
        match self {
            DiffOperation::Insert { index, .. } => DiffStep::Insert(*index),
            DiffOperation::Update { index, .. } => DiffStep::Update(*index),
            DiffOperation::Move { from, to } => DiffStep::Move(*from, *to),
            DiffOperation::Remove { index } => DiffStep::Remove(*index),
        }
    }

    /// True for operations that create, destroy or reposition widgets.
    pub fn is_structural(&self) -> bool {
        !matches!(self, DiffOperation::Update { .. })
    }
}

impl fmt::Debug for DiffOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffOperation::Insert { index, description } => {
                write!(f, "insert({index}, {description:?})")
            }
            DiffOperation::Update { index, .. } => write!(f, "update({index})"),
            DiffOperation::Move { from, to } => write!(f, "move({from} -> {to})"),
            DiffOperation::Remove { index } => write!(f, "remove({index})"),
        }
    }
}

pub fn steps(operations: &[DiffOperation]) -> Vec<DiffStep> {
    operations.iter().map(DiffOperation::step).collect()
}

/// Index-by-index diff. A slot whose kind changed is replaced.
pub fn diff_positional(old: &[ViewDescription], new: &[ViewDescription]) -> Vec<DiffOperation> {
    let mut ops = Vec::new();
    let shared = old.len().min(new.len());
    for index in 0..shared {
        if old[index].kind() == new[index].kind() {
            ops.push(DiffOperation::Update {
                index,
                previous: old[index].clone(),
                next: new[index].clone(),
            });
        } else {
            ops.push(DiffOperation::Remove { index });
            ops.push(DiffOperation::Insert {
                index,
                description: new[index].clone(),
            });
        }
    }
    for index in (shared..old.len()).rev() {
        ops.push(DiffOperation::Remove { index });
    }
    for (index, description) in new.iter().enumerate().skip(shared) {
        ops.push(DiffOperation::Insert {
            index,
            description: description.clone(),
        });
    }
    ops
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum Identity {
    Key(ViewKey),
    Position(usize),
}

/// Identity of each item. Unkeyed items and repeated keys after their first
/// occurrence are identified by their position.
fn identities(items: &[ViewDescription]) -> Vec<Identity> {
    let mut seen: HashSet<&ViewKey, RandomState> = HashSet::default();
    items
        .iter()
        .enumerate()
        .map(|(index, item)| match item.key() {
            Some(key) if seen.insert(key) => Identity::Key(key.clone()),
            Some(key) => {
                log::debug!("duplicate key {key:?} at {index}; using its position");
                Identity::Position(index)
            }
            None => Identity::Position(index),
        })
        .collect()
}

/// Identity-based diff. Items matched by identity and kind are updated in
/// place and moved when their position changed; everything else is removed
/// or inserted.
pub fn diff_keyed(old: &[ViewDescription], new: &[ViewDescription]) -> Vec<DiffOperation> {
    let old_ids = identities(old);
    let new_ids = identities(new);
    let old_index: HashMap<&Identity, usize, RandomState> = old_ids
        .iter()
        .enumerate()
        .map(|(index, id)| (id, index))
        .collect();

    let mut claimed = vec![false; old.len()];
    let matches: Vec<Option<usize>> = new_ids
        .iter()
        .zip(new)
        .map(|(id, item)| {
            let found = old_index.get(id).copied()?;
            if claimed[found] || old[found].kind() != item.kind() {
                return None;
            }
            claimed[found] = true;
            Some(found)
        })
        .collect();

    let mut ops = Vec::new();
    for index in (0..old.len()).rev() {
        if !claimed[index] {
            ops.push(DiffOperation::Remove { index });
        }
    }

    // Before step `index`, slots `0..index` are final and the slots after
    // them hold the claimed old items not yet visited, in their old order.
    let mut pending = PendingIndices::new(&claimed);

    for (index, item) in new.iter().enumerate() {
        match matches[index] {
            Some(previous) => {
                let from = index + pending.rank(previous);
                pending.visit(previous);
                if from != index {
                    ops.push(DiffOperation::Move { from, to: index });
                }
                ops.push(DiffOperation::Update {
                    index,
                    previous: old[previous].clone(),
                    next: item.clone(),
                });
            }
            None => {
                ops.push(DiffOperation::Insert {
                    index,
                    description: item.clone(),
                });
            }
        }
    }
    ops
}

/// Fenwick tree over old indices that counts the ones still waiting to be
/// visited.
struct PendingIndices {
    tree: Vec<usize>,
}

impl PendingIndices {
    fn new(claimed: &[bool]) -> Self {
        let mut pending = Self {
            tree: vec![0; claimed.len() + 1],
        };
        for (index, _) in claimed.iter().enumerate().filter(|(_, claimed)| **claimed) {
            pending.add(index, 1);
        }
        pending
    }

    fn add(&mut self, index: usize, delta: isize) {
        let mut node = index + 1;
        while node < self.tree.len() {
            self.tree[node] = self.tree[node].wrapping_add_signed(delta);
            node += node & node.wrapping_neg();
        }
    }

    /// Pending indices strictly below `index`.
    fn rank(&self, index: usize) -> usize {
        let mut node = index;
        let mut count = 0;
        while node > 0 {
            count += self.tree[node];
            node -= node & node.wrapping_neg();
        }
        count
    }

    fn visit(&mut self, index: usize) {
        debug_assert_eq!(self.rank(index + 1) - self.rank(index), 1);
        self.add(index, -1);
    }
}

#[cfg(test)]
#[path = "tests/diff_tests.rs"]
mod tests;
