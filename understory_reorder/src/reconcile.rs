// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Optimistic application of an order to the host's container.
//!
//! Applying is split in two steps:
//!
//! - [`plan`] is pure: it diffs the current child order against the desired
//!   order and emits the [`Patch`] operations that turn one into the other.
//!   Items that already sit in a longest increasing run stay put, so the plan
//!   moves as few nodes as possible, and an already-matching order yields no
//!   patches at all.
//! - [`Reconciler::apply`] maps the patches onto host nodes.
//!
//! Every mutation here is optimistic. The host may overwrite it on its next
//! render; the canonical order lives in the store and is re-applied afterwards.
//!
//! ```
//! use understory_reorder::reconcile::{Patch, plan};
//!
//! let patches = plan(&["a", "b", "c"], &["b", "c", "a"]);
//! assert_eq!(patches.as_slice(), &[Patch::Append { item: "a" }]);
//! assert!(plan(&["a", "b"], &["a", "b"]).is_empty());
//! ```
//!
//! Patches apply in order. Each `InsertBefore` anchor is already in its final
//! position when the patch runs.

use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::HashMap;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::codec;
use crate::dom::{Dom, item_nodes};
use crate::types::ItemId;

/// A single child move within the container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Patch<K> {
    /// Move `item` directly before `before`.
    InsertBefore {
        /// Item to move.
        item: K,
        /// Anchor it is placed before.
        before: K,
    },
    /// Move `item` to the end of the container.
    Append {
        /// Item to move.
        item: K,
    },
}

/// Patch list for a reorder; single-card drags need one move.
pub type Plan<K> = SmallVec<[Patch<K>; 4]>;

/// Compute the moves that turn `current` into `desired`.
///
/// `desired` is first resolved with [`codec::reconcile`]: unknown ids are
/// skipped and ids it omits keep their relative order at the end.
pub fn plan<K: Clone + Eq + Hash>(current: &[K], desired: &[K]) -> Plan<K> {
    let target = codec::reconcile(desired, current);
    let mut patches = Plan::new();
    if target.as_slice() == current {
        return patches;
    }

    let position: HashMap<&K, usize> = current.iter().enumerate().map(|(i, k)| (k, i)).collect();
    // Current index of each target item, in target order.
    let sources: Vec<usize> = target.iter().map(|k| position[k]).collect();
    let keep = longest_increasing_run(&sources);

    // Walk backwards so every anchor is already in place when used.
    let mut stays = keep.iter().rev().peekable();
    for i in (0..target.len()).rev() {
        if stays.peek().is_some_and(|&&k| k == i) {
            stays.next();
            continue;
        }
        let item = target[i].clone();
        patches.push(match target.get(i + 1) {
            Some(next) => Patch::InsertBefore {
                item,
                before: next.clone(),
            },
            None => Patch::Append { item },
        });
    }
    patches
}

/// Indices (into `seq`, ascending) of one longest strictly increasing subsequence.
fn longest_increasing_run(seq: &[usize]) -> Vec<usize> {
    // tails[l] = index in seq of the smallest tail of a run of length l + 1.
    let mut tails: Vec<usize> = Vec::new();
    let mut prev: Vec<Option<usize>> = Vec::with_capacity(seq.len());
    for (i, &v) in seq.iter().enumerate() {
        let l = tails.partition_point(|&t| seq[t] < v);
        prev.push(if l > 0 { Some(tails[l - 1]) } else { None });
        if l == tails.len() {
            tails.push(i);
        } else {
            tails[l] = i;
        }
    }
    let mut run = Vec::with_capacity(tails.len());
    let mut cursor = tails.last().copied();
    while let Some(i) = cursor {
        run.push(i);
        cursor = prev[i];
    }
    run.reverse();
    run
}

/// Summary of one [`Reconciler::apply`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Applied {
    /// Number of node moves performed.
    pub moves: usize,
    /// Child order after applying.
    pub order: Vec<ItemId>,
}

/// Applies orders to a container and remembers its own mutations.
///
/// After a non-empty apply, the next structural-change notification the host
/// delivers is usually the echo of that apply. [`Reconciler::take_echo`]
/// recognizes it so it is not mistaken for a host re-render.
#[derive(Clone, Debug, Default)]
pub struct Reconciler {
    pending_echo: Option<Vec<ItemId>>,
}

impl Reconciler {
    /// Create a reconciler with no pending echo.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reorder the item children of `container` to follow `desired`.
    ///
    /// Reads the current order from the host, plans, and applies the plan.
    /// Applying an order the container already has performs no mutation.
    pub fn apply<D: Dom>(
        &mut self,
        dom: &mut D,
        container: D::Node,
        id_attribute: &str,
        desired: &[ItemId],
    ) -> Applied {
        let items = item_nodes(&*dom, container, id_attribute);
        let current: Vec<ItemId> = items.iter().map(|(_, id)| id.clone()).collect();
        let patches = plan(&current, desired);
        if patches.is_empty() {
            trace!("container already in desired order");
            return Applied {
                moves: 0,
                order: current,
            };
        }

        let nodes: HashMap<&ItemId, D::Node> = items.iter().map(|(n, id)| (id, *n)).collect();
        for patch in &patches {
            let (item, before) = match patch {
                Patch::InsertBefore { item, before } => (item, Some(nodes[before])),
                Patch::Append { item } => (item, None),
            };
            dom.insert_before(container, nodes[item], before);
        }

        let order = codec::reconcile(desired, &current);
        debug!(moves = patches.len(), "applied order to container");
        self.pending_echo = Some(order.clone());
        Applied {
            moves: patches.len(),
            order,
        }
    }

    /// Consume the pending echo if `observed` is the order this reconciler last applied.
    ///
    /// Returns `true` when the observation is the engine's own mutation and
    /// should be ignored. Any other observation clears the pending echo.
    pub fn take_echo(&mut self, observed: &[ItemId]) -> bool {
        match self.pending_echo.take() {
            Some(applied) => applied.as_slice() == observed,
            None => false,
        }
    }

    /// Forget any pending echo, for example after the container was replaced.
    pub fn clear_echo(&mut self) {
        self.pending_echo = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn replay<K: Clone + Eq>(current: &[K], patches: &[Patch<K>]) -> Vec<K> {
        let mut out = current.to_vec();
        for p in patches {
            let (item, before) = match p {
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

    #[test]
    fn identical_order_has_no_patches() {
        assert!(plan(&[1, 2, 3], &[1, 2, 3]).is_empty());
        assert!(plan::<u32>(&[], &[]).is_empty());
    }

    #[test]
    fn single_move_is_single_patch() {
        let patches = plan(&["a", "b", "c"], &["b", "a", "c"]);
        assert_eq!(patches.len(), 1);
        assert_eq!(replay(&["a", "b", "c"], &patches), vec!["b", "a", "c"]);
    }

    #[test]
    fn move_to_front_inserts_before_old_head() {
        let patches = plan(&["a", "b", "c"], &["c", "a", "b"]);
        assert_eq!(
            patches.as_slice(),
            &[Patch::InsertBefore {
                item: "c",
                before: "a"
            }]
        );
    }

    #[test]
    fn reversal_moves_all_but_one() {
        let current = [1, 2, 3, 4, 5];
        let desired = [5, 4, 3, 2, 1];
        let patches = plan(&current, &desired);
        assert_eq!(patches.len(), 4);
        assert_eq!(replay(&current, &patches), desired);
    }

    #[test]
    fn unknown_ids_skipped_and_missing_appended() {
        let current = ["y", "z", "w"];
        let patches = plan(&current, &["x", "z", "y"]);
        assert_eq!(replay(&current, &patches), vec!["z", "y", "w"]);
    }

    #[test]
    fn lis_picks_longest_run() {
        assert_eq!(longest_increasing_run(&[3, 0, 1, 4, 2]), vec![1, 2, 4]);
        assert_eq!(longest_increasing_run(&[]), Vec::<usize>::new());
        assert_eq!(longest_increasing_run(&[2, 1, 0]).len(), 1);
    }

    #[test]
    fn echo_is_consumed_once() {
        let mut r = Reconciler::new();
        let order = vec![ItemId::from("b"), ItemId::from("a")];
        r.pending_echo = Some(order.clone());
        assert!(r.take_echo(&order));
        assert!(!r.take_echo(&order));
    }

    #[test]
    fn mismatched_observation_clears_echo() {
        let mut r = Reconciler::new();
        let order = vec![ItemId::from("b"), ItemId::from("a")];
        r.pending_echo = Some(order.clone());
        assert!(!r.take_echo(&[ItemId::from("a"), ItemId::from("b")]));
        assert!(!r.take_echo(&order));
    }
}
