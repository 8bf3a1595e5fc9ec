use super::*;
use crate::view::{ContainerKind, LeafKind};
use proptest::prelude::*;

fn row(key: i64) -> ViewDescription {
    ViewDescription::text(format!("row {key}")).with_key(key)
}

fn rows(keys: &[i64]) -> Vec<ViewDescription> {
    keys.iter().copied().map(row).collect()
}

#[test]
fn rotation_is_moves_only() {
    let old = rows(&[1, 2, 3]);
    let new = vec![old[2].clone(), old[0].clone(), old[1].clone()];
    let ops = diff_keyed(&old, &new);

    let structural: Vec<_> = ops
        .iter()
        .filter(|op| op.is_structural())
        .map(DiffOperation::step)
        .collect();
    assert_eq!(structural, vec![DiffStep::Move(2, 0)]);
    assert_eq!(
        steps(&ops),
        vec![
            DiffStep::Move(2, 0),
            DiffStep::Update(0),
            DiffStep::Update(1),
            DiffStep::Update(2),
        ]
    );
}

#[test]
fn reversing_a_long_list_moves_from_the_tail() {
    let keys: Vec<i64> = (0..2_000).collect();
    let old = rows(&keys);
    let new: Vec<_> = old.iter().rev().cloned().collect();
    let ops = diff_keyed(&old, &new);

    let moves: Vec<_> = ops
        .iter()
        .filter(|op| op.is_structural())
        .map(DiffOperation::step)
        .collect();
    assert_eq!(moves.len(), keys.len() - 1);
    assert_eq!(moves[0], DiffStep::Move(1_999, 0));
    assert_eq!(moves[1_998], DiffStep::Move(1_999, 1_998));
    check_application(&old, &new, &ops, true);
}

#[test]
fn pending_indices_rank_the_unvisited() {
    let mut pending = PendingIndices::new(&[true, false, true, true, false, true]);
    assert_eq!(pending.rank(0), 0);
    assert_eq!(pending.rank(3), 2);
    assert_eq!(pending.rank(6), 4);
    pending.visit(2);
    assert_eq!(pending.rank(3), 1);
    assert_eq!(pending.rank(6), 3);
}

#[test]
fn replacing_one_key_is_one_remove_and_one_insert() {
    let ops = diff_keyed(&rows(&[1, 2]), &rows(&[1, 3]));
    assert_eq!(
        steps(&ops),
        vec![DiffStep::Remove(1), DiffStep::Update(0), DiffStep::Insert(1)]
    );
}

#[test]
fn appending_keeps_the_existing_row() {
    let old = vec![ViewDescription::text("Tonkotsu").with_key(0)];
    let new = vec![
        ViewDescription::text("Tonkotsu").with_key(0),
        ViewDescription::text("Shio").with_key(1),
    ];
    let ops = diff_keyed(&old, &new);
    assert_eq!(steps(&ops), vec![DiffStep::Update(0), DiffStep::Insert(1)]);
    match &ops[1] {
        DiffOperation::Insert { description, .. } => {
            assert_eq!(
                description.prop_value("text").and_then(|v| v.as_str()),
                Some("Shio")
            );
        }
        other => panic!("expected an insert, got {other:?}"),
    }
}

#[test]
fn removing_the_middle_row_updates_the_neighbours_in_place() {
    let ops = diff_keyed(&rows(&[1, 2, 3]), &rows(&[1, 3]));
    assert_eq!(
        steps(&ops),
        vec![DiffStep::Remove(1), DiffStep::Update(0), DiffStep::Update(1)]
    );
}

#[test]
fn empty_sequences() {
    assert_eq!(
        steps(&diff_keyed(&[], &rows(&[1, 2]))),
        vec![DiffStep::Insert(0), DiffStep::Insert(1)]
    );
    assert_eq!(
        steps(&diff_keyed(&rows(&[1, 2, 3]), &[])),
        vec![DiffStep::Remove(2), DiffStep::Remove(1), DiffStep::Remove(0)]
    );
    assert_eq!(
        steps(&diff_positional(&rows(&[1, 2, 3]), &[])),
        vec![DiffStep::Remove(2), DiffStep::Remove(1), DiffStep::Remove(0)]
    );
}

#[test]
fn disjoint_keys_remove_everything_then_insert_everything() {
    let ops = diff_keyed(&rows(&[1, 2]), &rows(&[3, 4, 5]));
    assert_eq!(
        steps(&ops),
        vec![
            DiffStep::Remove(1),
            DiffStep::Remove(0),
            DiffStep::Insert(0),
            DiffStep::Insert(1),
            DiffStep::Insert(2),
        ]
    );
}

#[test]
fn same_key_with_a_new_kind_is_recreated() {
    let old = vec![row(1)];
    let new = vec![ViewDescription::leaf(LeafKind::Image).with_key(1)];
    assert_eq!(
        steps(&diff_keyed(&old, &new)),
        vec![DiffStep::Remove(0), DiffStep::Insert(0)]
    );
}

#[test]
fn duplicate_keys_fall_back_to_positions() {
    let old = rows(&[7, 7, 8]);
    let new = rows(&[8, 7, 7]);
    let ops = diff_keyed(&old, &new);
    // First 7 is matched by key; the second 7 lives at index 1 in old and
    // index 2 in new, so it is recreated.
    assert_eq!(
        steps(&ops),
        vec![
            DiffStep::Remove(1),
            DiffStep::Move(1, 0),
            DiffStep::Update(0),
            DiffStep::Update(1),
            DiffStep::Insert(2),
        ]
    );
}

#[test]
fn positional_diff_replaces_slots_whose_kind_changed() {
    let old = vec![
        ViewDescription::text("a"),
        ViewDescription::leaf(LeafKind::Toggle),
    ];
    let new = vec![
        ViewDescription::text("b"),
        ViewDescription::container(ContainerKind::HStack, vec![]),
        ViewDescription::text("c"),
    ];
    assert_eq!(
        steps(&diff_positional(&old, &new)),
        vec![
            DiffStep::Update(0),
            DiffStep::Remove(1),
            DiffStep::Insert(1),
            DiffStep::Insert(2),
        ]
    );
}

#[test]
fn positional_diff_ignores_keys() {
    let ops = diff_positional(&rows(&[1, 2]), &rows(&[2, 1]));
    assert_eq!(steps(&ops), vec![DiffStep::Update(0), DiffStep::Update(1)]);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Old(usize),
    New(usize),
}

/// Applies `ops` to the old sequence and checks every element is accounted
/// for exactly once.
fn check_application(
    old: &[ViewDescription],
    new: &[ViewDescription],
    ops: &[DiffOperation],
    removals_first: bool,
) {
    let mut live: Vec<Slot> = (0..old.len()).map(Slot::Old).collect();
    let mut old_seen = vec![0usize; old.len()];
    let mut new_seen = vec![0usize; new.len()];
    let mut removing = true;

    for op in ops {
        match op {
            DiffOperation::Remove { index } => {
                assert!(
                    removing || !removals_first,
                    "remove after a forward operation: {ops:?}"
                );
                match live.remove(*index) {
                    Slot::Old(j) => old_seen[j] += 1,
                    Slot::New(_) => panic!("removed an inserted slot"),
                }
            }
            DiffOperation::Insert { index, description } => {
                removing = false;
                assert!(description.ptr_eq(&new[*index]));
                live.insert(*index, Slot::New(*index));
                new_seen[*index] += 1;
            }
            DiffOperation::Move { from, to } => {
                removing = false;
                let slot = live.remove(*from);
                live.insert(*to, slot);
            }
            DiffOperation::Update {
                index,
                previous,
                next,
            } => {
                removing = false;
                let Slot::Old(j) = live[*index] else {
                    panic!("update of an inserted slot");
                };
                assert!(previous.ptr_eq(&old[j]));
                assert!(next.ptr_eq(&new[*index]));
                assert_eq!(old[j].kind(), new[*index].kind());
                old_seen[j] += 1;
                new_seen[*index] += 1;
            }
        }
    }

    assert_eq!(live.len(), new.len());
    assert!(old_seen.iter().all(|count| *count == 1), "{ops:?}");
    assert!(new_seen.iter().all(|count| *count == 1), "{ops:?}");
}

fn item((key, image): (Option<i64>, bool)) -> ViewDescription {
    let base = if image {
        ViewDescription::leaf(LeafKind::Image)
    } else {
        ViewDescription::text("item")
    };
    match key {
        Some(key) => base.with_key(key),
        None => base,
    }
}

fn any_items() -> impl Strategy<Value = Vec<(Option<i64>, bool)>> {
    proptest::collection::vec(
        (proptest::option::weighted(0.9, 0i64..6), proptest::bool::weighted(0.2)),
        0..10,
    )
}

proptest! {
    #[test]
    fn keyed_diff_always_applies_cleanly(old in any_items(), new in any_items()) {
        let old: Vec<_> = old.into_iter().map(item).collect();
        let new: Vec<_> = new.into_iter().map(item).collect();
        check_application(&old, &new, &diff_keyed(&old, &new), true);
    }

    #[test]
    fn positional_diff_always_applies_cleanly(old in any_items(), new in any_items()) {
        let old: Vec<_> = old.into_iter().map(item).collect();
        let new: Vec<_> = new.into_iter().map(item).collect();
        check_application(&old, &new, &diff_positional(&old, &new), false);
    }

    #[test]
    fn permutations_of_unique_keys_never_recreate(keys in Just((0i64..8).collect::<Vec<_>>()).prop_shuffle()) {
        let old = rows(&(0i64..8).collect::<Vec<_>>());
        let new: Vec<_> = keys.iter().map(|k| old[*k as usize].clone()).collect();
        let ops = diff_keyed(&old, &new);
        prop_assert!(ops.iter().all(|op| matches!(op, DiffOperation::Move { .. } | DiffOperation::Update { .. })), "permutation produced a non-Move/Update op: {:?}", ops);
    }
}
