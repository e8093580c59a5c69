// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property tests for the order algebra: moves, reconciliation and patch plans.

use proptest::prelude::*;
use understory_reorder::codec::{self, is_permutation_of};
use understory_reorder::reconcile::{Patch, plan};
use understory_reorder::{ItemId, Side, move_item};

/// Distinct ids `0..n` in a shuffled order.
fn shuffled(max: u32) -> impl Strategy<Value = Vec<u32>> {
    (0..=max).prop_flat_map(|n| Just((0..n).collect::<Vec<_>>()).prop_shuffle())
}

fn side() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Left), Just(Side::Right)]
}

fn replay<K: Clone + Eq>(current: &[K], patches: &[Patch<K>]) -> Vec<K> {
    let mut out = current.to_vec();
    for patch in patches {
        let (item, before) = match patch {
            Patch::InsertBefore { item, before } => (item, Some(before)),
            Patch::Append { item } => (item, None),
        };
        let from = out.iter().position(|k| k == item).unwrap();
        let moved = out.remove(from);
        match before {
            Some(b) => {
                let at = out.iter().position(|k| k == b).unwrap();
                out.insert(at, moved);
            }
            None => out.push(moved),
        }
    }
    out
}

proptest! {
    #[test]
    fn move_is_a_permutation(
        order in shuffled(12).prop_filter("need items", |o| !o.is_empty()),
        picks in (any::<prop::sample::Index>(), any::<prop::sample::Index>()),
        side in side(),
    ) {
        let dragged = order[picks.0.index(order.len())];
        let target = order[picks.1.index(order.len())];
        let moved = move_item(&order, &dragged, &target, side).unwrap();
        prop_assert!(is_permutation_of(&moved, &order));
        if dragged == target {
            prop_assert_eq!(moved, order);
        } else {
            let d = moved.iter().position(|&k| k == dragged).unwrap();
            let t = moved.iter().position(|&k| k == target).unwrap();
            match side {
                Side::Left => prop_assert_eq!(d + 1, t),
                Side::Right => prop_assert_eq!(t + 1, d),
            }
        }
    }

    #[test]
    fn reconcile_yields_permutation_of_current(
        stored in prop::collection::vec(0_u32..20, 0..16),
        current in shuffled(12),
    ) {
        let order = codec::reconcile(&stored, &current);
        prop_assert!(is_permutation_of(&order, &current));
    }

    #[test]
    fn reconcile_keeps_stored_prefix(current in shuffled(12)) {
        let reversed: Vec<u32> = current.iter().rev().copied().collect();
        prop_assert_eq!(codec::reconcile(&reversed, &current), reversed);
    }

    #[test]
    fn plan_replays_to_reconciled_order(
        current in shuffled(12),
        desired in prop::collection::vec(0_u32..16, 0..16),
    ) {
        let patches = plan(&current, &desired);
        prop_assert_eq!(replay(&current, &patches), codec::reconcile(&desired, &current));
        prop_assert!(patches.len() <= current.len());
    }

    #[test]
    fn plan_for_identical_order_is_empty(current in shuffled(12)) {
        prop_assert!(plan(&current, &current).is_empty());
    }

    #[test]
    fn single_move_plans_single_patch(
        order in shuffled(10).prop_filter("need two items", |o| o.len() > 1),
        picks in (any::<prop::sample::Index>(), any::<prop::sample::Index>()),
        side in side(),
    ) {
        let dragged = order[picks.0.index(order.len())];
        let target = order[picks.1.index(order.len())];
        let moved = move_item(&order, &dragged, &target, side).unwrap();
        prop_assert!(plan(&order, &moved).len() <= 1);
    }

    #[test]
    fn ids_survive_the_codec(raw in prop::collection::vec("[a-z0-9 \"\\\\-]{0,8}", 0..8)) {
        let order: Vec<ItemId> = raw.iter().map(ItemId::new).collect();
        let encoded = codec::encode(&order).unwrap();
        prop_assert_eq!(codec::decode(&encoded).unwrap(), order);
    }
}

#[test]
fn rotation_and_back() {
    let ids = |raw: &[&str]| raw.iter().copied().map(ItemId::from).collect::<Vec<_>>();
    let start = ids(&["A", "B", "C"]);

    let rotated = move_item(&start, &ItemId::from("A"), &ItemId::from("C"), Side::Right).unwrap();
    assert_eq!(rotated, ids(&["B", "C", "A"]));

    let back = move_item(&rotated, &ItemId::from("A"), &ItemId::from("B"), Side::Left).unwrap();
    assert_eq!(back, start);
}
