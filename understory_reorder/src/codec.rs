// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Serialized order format and validation against the live item set.
//!
//! The persisted value is a JSON array of id strings, in display order:
//!
//! ```
//! use understory_reorder::{ItemId, codec};
//!
//! let order = vec![ItemId::from("b"), ItemId::from("a")];
//! let raw = codec::encode(&order).unwrap();
//! assert_eq!(raw, r#"["b","a"]"#);
//! assert_eq!(codec::decode(&raw).unwrap(), order);
//! ```
//!
//! Orders read back from storage may predate the current item set. [`reconcile`]
//! turns any such order into a permutation of the ids that exist now.

use alloc::string::String;
use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::HashSet;

use crate::error::Result;
use crate::types::ItemId;

/// Serialize an order as a JSON array of id strings.
pub fn encode(order: &[ItemId]) -> Result<String> {
    Ok(serde_json::to_string(order)?)
}

/// Parse a JSON array of id strings.
///
/// Anything else (objects, numbers, nested arrays, invalid JSON) is a
/// [`ReorderError::Codec`](crate::ReorderError::Codec). Duplicates and
/// unknown ids are accepted here and resolved by [`reconcile`].
pub fn decode(raw: &str) -> Result<Vec<ItemId>> {
    Ok(serde_json::from_str(raw)?)
}

/// Resolve a possibly stale order against the ids currently present.
///
/// - Ids not in `current` are dropped.
/// - Repeated ids keep their first position.
/// - Ids in `current` missing from `order` are appended in their `current` order.
///
/// The result is always a permutation of `current`.
///
/// ```
/// use understory_reorder::codec::reconcile;
///
/// let persisted = ["x", "y", "z"];
/// let current = ["w", "y", "z"];
/// assert_eq!(reconcile(&persisted, &current), vec!["y", "z", "w"]);
/// ```
pub fn reconcile<K: Clone + Eq + Hash>(order: &[K], current: &[K]) -> Vec<K> {
    let present: HashSet<&K> = current.iter().collect();
    let mut placed: HashSet<&K> = HashSet::with_capacity(current.len());
    let mut out = Vec::with_capacity(current.len());
    for id in order {
        if present.contains(id) && placed.insert(id) {
            out.push(id.clone());
        }
    }
    for id in current {
        if placed.insert(id) {
            out.push(id.clone());
        }
    }
    out
}

/// Returns `true` when `order` holds exactly the ids in `current`, each once.
pub fn is_permutation_of<K: Eq + Hash>(order: &[K], current: &[K]) -> bool {
    if order.len() != current.len() {
        return false;
    }
    let present: HashSet<&K> = current.iter().collect();
    if present.len() != current.len() {
        return false;
    }
    let mut seen: HashSet<&K> = HashSet::with_capacity(order.len());
    order.iter().all(|id| present.contains(id) && seen.insert(id))
}
