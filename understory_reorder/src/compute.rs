// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Order computation for a completed drop.

use alloc::vec::Vec;

use crate::error::MoveError;
use crate::types::Side;

/// Move `dragged` next to `target` on the given `side`.
///
/// `dragged` is removed first, then reinserted immediately before `target`
/// ([`Side::Left`]) or immediately after it ([`Side::Right`]). The result is a
/// permutation of `order` and depends only on the inputs.
///
/// Dropping an item on itself returns `order` unchanged. Fails with
/// [`MoveError::UnknownTarget`] or [`MoveError::UnknownDragged`] when either id
/// is missing, which callers treat as a cancelled gesture.
///
/// ```
/// use understory_reorder::{Side, move_item};
///
/// let order = ["a", "b", "c"];
/// let moved = move_item(&order, &"a", &"c", Side::Right).unwrap();
/// assert_eq!(moved, ["b", "c", "a"]);
/// let back = move_item(&moved, &"a", &"b", Side::Left).unwrap();
/// assert_eq!(back, order);
/// ```
pub fn move_item<K: Clone + PartialEq>(
    order: &[K],
    dragged: &K,
    target: &K,
    side: Side,
) -> Result<Vec<K>, MoveError> {
    let from = order
        .iter()
        .position(|id| id == dragged)
        .ok_or(MoveError::UnknownDragged)?;
    if dragged == target {
        return Ok(order.to_vec());
    }
    let mut out = order.to_vec();
    let item = out.remove(from);
    let at = out
        .iter()
        .position(|id| id == target)
        .ok_or(MoveError::UnknownTarget)?;
    let at = match side {
        Side::Left => at,
        Side::Right => at + 1,
    };
    out.insert(at, item);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn left_of_later_target() {
        let out = move_item(&["a", "b", "c"], &"a", &"c", Side::Left).unwrap();
        assert_eq!(out, vec!["b", "a", "c"]);
    }

    #[test]
    fn right_of_earlier_target() {
        let out = move_item(&["a", "b", "c"], &"c", &"a", Side::Right).unwrap();
        assert_eq!(out, vec!["a", "c", "b"]);
    }

    #[test]
    fn left_of_first() {
        let out = move_item(&["a", "b", "c"], &"c", &"a", Side::Left).unwrap();
        assert_eq!(out, vec!["c", "a", "b"]);
    }

    #[test]
    fn right_of_last() {
        let out = move_item(&["a", "b", "c"], &"a", &"c", Side::Right).unwrap();
        assert_eq!(out, vec!["b", "c", "a"]);
    }

    #[test]
    fn adjacent_positions_that_do_not_move() {
        // b is already left of c and right of a.
        let order = ["a", "b", "c"];
        assert_eq!(move_item(&order, &"b", &"c", Side::Left).unwrap(), order);
        assert_eq!(move_item(&order, &"b", &"a", Side::Right).unwrap(), order);
    }

    #[test]
    fn self_drop_is_identity() {
        let order = ["a", "b"];
        assert_eq!(move_item(&order, &"a", &"a", Side::Right).unwrap(), order);
    }

    #[test]
    fn unknown_target() {
        assert_eq!(
            move_item(&["a", "b"], &"a", &"z", Side::Left),
            Err(MoveError::UnknownTarget)
        );
    }

    #[test]
    fn unknown_dragged() {
        assert_eq!(
            move_item(&["a", "b"], &"z", &"a", Side::Left),
            Err(MoveError::UnknownDragged)
        );
    }
}
