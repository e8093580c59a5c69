// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types: item identifiers and drop sides.

use alloc::string::String;
use core::borrow::Borrow;
use core::fmt;

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Stable identifier of an orderable item, as carried by the host's id attribute.
///
/// Identity belongs to the host application; the engine only orders ids it finds.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Create an identifier from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ItemId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.into())
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Which half of the hovered item the pointer is over.
///
/// The side decides whether the dragged item lands before or after the target.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// Pointer is left of the target's horizontal midpoint; insert before it.
    Left,
    /// Pointer is on or right of the midpoint; insert after it.
    Right,
}

impl Side {
    /// Classify a pointer position against the target's bounds.
    ///
    /// Only the horizontal axis matters. A pointer exactly on the midpoint counts as [`Side::Right`].
    ///
    /// ```
    /// use kurbo::{Point, Rect};
    /// use understory_reorder::Side;
    ///
    /// let card = Rect::new(100.0, 0.0, 200.0, 80.0);
    /// assert_eq!(Side::from_pointer(Point::new(120.0, 40.0), card), Side::Left);
    /// assert_eq!(Side::from_pointer(Point::new(150.0, 40.0), card), Side::Right);
    /// ```
    pub fn from_pointer(pointer: Point, target_bounds: Rect) -> Self {
        if pointer.x < target_bounds.center().x {
            Self::Left
        } else {
            Self::Right
        }
    }
}
