// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag gesture state machine.
//!
//! A [`DragSession`] tracks one in-progress gesture: which item is being
//! dragged, which item the pointer is hovering, and on which side of it.
//! It has two states, idle and dragging, and never touches the DOM or the
//! store; the engine acts on the [`DropOutcome`] it returns.
//!
//! ## Transitions
//!
//! 1. **Start**: [`DragSession::on_drag_start`] enters the dragging state and clears hover.
//! 2. **Hover**: [`DragSession::on_drag_over`] records the target and side. Hovering the
//!    dragged item itself is ignored. Hover events may be sparse; nothing assumes one per frame.
//! 3. **Drop**: [`DragSession::on_drop`] yields a [`DropIntent`] when the target differs from
//!    the dragged item. The session stays active until drag-end.
//! 4. **End**: [`DragSession::on_drag_end`] always returns to idle and reports whether the
//!    gesture completed with a drop or was cancelled.
//!
//! ```
//! use kurbo::{Point, Rect};
//! use understory_reorder::{DragEnd, DragSession, DropOutcome, Side};
//!
//! let mut session: DragSession<&str> = DragSession::new();
//! let card_c = Rect::new(200.0, 0.0, 300.0, 100.0);
//!
//! session.on_drag_start("a");
//! session.on_drag_over("c", Point::new(210.0, 50.0), card_c);
//! assert_eq!(session.hover().map(|h| h.side), Some(Side::Left));
//!
//! let DropOutcome::Move(intent) = session.on_drop("c", Point::new(210.0, 50.0), card_c) else {
//!     panic!("expected a move");
//! };
//! assert_eq!((intent.dragged, intent.target, intent.side), ("a", "c", Side::Left));
//! assert_eq!(session.on_drag_end(), Some(DragEnd::Dropped("a")));
//! assert!(!session.is_dragging());
//! ```

use kurbo::{Point, Rect};
use tracing::trace;

use crate::types::Side;

/// Current hover target of an active drag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hover<K> {
    /// Item under the pointer.
    pub target: K,
    /// Half of the target the pointer is over.
    pub side: Side,
}

/// A completed drop: move `dragged` to `side` of `target`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropIntent<K> {
    /// Item being moved.
    pub dragged: K,
    /// Item it was dropped on.
    pub target: K,
    /// Side of `target` it lands on.
    pub side: Side,
}

/// Result of a drop event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropOutcome<K> {
    /// No gesture is active; the drop is ignored.
    NotDragging,
    /// Dropped onto the dragged item itself; the order is unchanged.
    SelfDrop,
    /// The order should change.
    Move(DropIntent<K>),
}

/// How a gesture ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DragEnd<K> {
    /// A drop produced a move before the gesture ended.
    Dropped(K),
    /// The gesture ended without a move; DOM and store stay as they were.
    Cancelled(K),
}

#[derive(Clone, Debug)]
enum State<K> {
    Idle,
    Dragging {
        dragged: K,
        hover: Option<Hover<K>>,
        dropped: bool,
    },
}

/// Drag gesture state machine for one container.
///
/// Each engine owns its own session, so several containers can be reordered
/// independently.
///
/// Hover state is advisory: hosts use it for drop indicators. The order a
/// drop produces depends only on the drop event, since hover events may be
/// sparse and the last one can be stale by the time the pointer is released.
#[derive(Clone, Debug)]
pub struct DragSession<K> {
    state: State<K>,
}

impl<K> Default for DragSession<K> {
    fn default() -> Self {
        Self { state: State::Idle }
    }
}

impl<K: Clone + PartialEq + core::fmt::Debug> DragSession<K> {
    /// Create an idle session.
    pub fn new() -> Self {
        Self { state: State::Idle }
    }

    /// Begin dragging `item`.
    ///
    /// A start while already dragging replaces the previous gesture; browsers do
    /// not deliver overlapping drags, so this only happens after a lost drag-end.
    pub fn on_drag_start(&mut self, item: K) {
        if let State::Dragging { dragged, .. } = &self.state {
            trace!(previous = ?dragged, "drag start replaced an unfinished gesture");
        }
        self.state = State::Dragging {
            dragged: item,
            hover: None,
            dropped: false,
        };
    }

    /// Record that the pointer is over `target`.
    ///
    /// Returns the updated hover, or `None` when idle or when `target` is the
    /// dragged item (self-hover leaves the previous hover untouched).
    pub fn on_drag_over(
        &mut self,
        target: K,
        pointer: Point,
        target_bounds: Rect,
    ) -> Option<&Hover<K>> {
        let State::Dragging { dragged, hover, .. } = &mut self.state else {
            return None;
        };
        if *dragged == target {
            return None;
        }
        let side = Side::from_pointer(pointer, target_bounds);
        Some(&*hover.insert(Hover { target, side }))
    }

    /// Process a drop on `target`.
    ///
    /// The side is taken from the drop position, not from the recorded hover,
    /// so a drop without any preceding hover still resolves.
    pub fn on_drop(&mut self, target: K, pointer: Point, target_bounds: Rect) -> DropOutcome<K> {
        let State::Dragging {
            dragged, dropped, ..
        } = &mut self.state
        else {
            return DropOutcome::NotDragging;
        };
        if *dragged == target {
            return DropOutcome::SelfDrop;
        }
        *dropped = true;
        DropOutcome::Move(DropIntent {
            dragged: dragged.clone(),
            target,
            side: Side::from_pointer(pointer, target_bounds),
        })
    }

    /// End the gesture unconditionally.
    ///
    /// Returns `None` if no gesture was active.
    pub fn on_drag_end(&mut self) -> Option<DragEnd<K>> {
        match core::mem::replace(&mut self.state, State::Idle) {
            State::Idle => None,
            State::Dragging {
                dragged,
                dropped: true,
                ..
            } => Some(DragEnd::Dropped(dragged)),
            State::Dragging { dragged, .. } => Some(DragEnd::Cancelled(dragged)),
        }
    }

    /// Mark the current drop as failed so drag-end reports a cancellation.
    pub fn reject_drop(&mut self) {
        if let State::Dragging { dropped, .. } = &mut self.state {
            *dropped = false;
        }
    }

    /// Abort the gesture without waiting for drag-end.
    ///
    /// Returns the dragged item if a gesture was active.
    pub fn cancel(&mut self) -> Option<K> {
        match core::mem::replace(&mut self.state, State::Idle) {
            State::Idle => None,
            State::Dragging { dragged, .. } => Some(dragged),
        }
    }

    /// Forget the hover target, for example when its node was removed.
    pub fn clear_hover(&mut self) {
        if let State::Dragging { hover, .. } = &mut self.state {
            *hover = None;
        }
    }

    /// Check if a gesture is active.
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, State::Dragging { .. })
    }

    /// Item being dragged, if any.
    pub fn dragged(&self) -> Option<&K> {
        match &self.state {
            State::Dragging { dragged, .. } => Some(dragged),
            State::Idle => None,
        }
    }

    /// Current hover target, if any.
    pub fn hover(&self) -> Option<&Hover<K>> {
        match &self.state {
            State::Dragging { hover, .. } => hover.as_ref(),
            State::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARD: Rect = Rect::new(0.0, 0.0, 100.0, 50.0);
    const LEFT: Point = Point::new(10.0, 25.0);
    const RIGHT: Point = Point::new(90.0, 25.0);

    #[test]
    fn start_enters_dragging_without_hover() {
        let mut s: DragSession<u32> = DragSession::new();
        assert!(!s.is_dragging());

        s.on_drag_start(1);
        assert!(s.is_dragging());
        assert_eq!(s.dragged(), Some(&1));
        assert!(s.hover().is_none());
    }

    #[test]
    fn hover_tracks_side() {
        let mut s: DragSession<u32> = DragSession::new();
        s.on_drag_start(1);

        let hover = s.on_drag_over(2, LEFT, CARD).cloned();
        assert_eq!(
            hover,
            Some(Hover {
                target: 2,
                side: Side::Left
            })
        );

        s.on_drag_over(3, RIGHT, CARD);
        assert_eq!(
            s.hover(),
            Some(&Hover {
                target: 3,
                side: Side::Right
            })
        );
    }

    #[test]
    fn self_hover_is_ignored() {
        let mut s: DragSession<u32> = DragSession::new();
        s.on_drag_start(1);
        s.on_drag_over(2, LEFT, CARD);

        assert!(s.on_drag_over(1, RIGHT, CARD).is_none());
        assert_eq!(s.hover().map(|h| h.target), Some(2));
    }

    #[test]
    fn hover_while_idle_is_ignored() {
        let mut s: DragSession<u32> = DragSession::new();
        assert!(s.on_drag_over(2, LEFT, CARD).is_none());
        assert!(!s.is_dragging());
    }

    #[test]
    fn self_drop_is_noop() {
        let mut s: DragSession<u32> = DragSession::new();
        s.on_drag_start(1);
        assert_eq!(s.on_drop(1, LEFT, CARD), DropOutcome::SelfDrop);
        assert_eq!(s.on_drag_end(), Some(DragEnd::Cancelled(1)));
    }

    #[test]
    fn drop_while_idle_is_ignored() {
        let mut s: DragSession<u32> = DragSession::new();
        assert_eq!(s.on_drop(2, LEFT, CARD), DropOutcome::NotDragging);
    }

    #[test]
    fn drop_side_comes_from_drop_position() {
        let mut s: DragSession<u32> = DragSession::new();
        s.on_drag_start(1);
        s.on_drag_over(2, LEFT, CARD);

        let outcome = s.on_drop(2, RIGHT, CARD);
        assert_eq!(
            outcome,
            DropOutcome::Move(DropIntent {
                dragged: 1,
                target: 2,
                side: Side::Right
            })
        );
        assert_eq!(s.on_drag_end(), Some(DragEnd::Dropped(1)));
    }

    #[test]
    fn end_without_drop_is_cancel() {
        let mut s: DragSession<u32> = DragSession::new();
        s.on_drag_start(1);
        s.on_drag_over(2, LEFT, CARD);

        assert_eq!(s.on_drag_end(), Some(DragEnd::Cancelled(1)));
        assert!(!s.is_dragging());
        assert!(s.hover().is_none());
        assert_eq!(s.on_drag_end(), None);
    }

    #[test]
    fn rejected_drop_reports_cancel() {
        let mut s: DragSession<u32> = DragSession::new();
        s.on_drag_start(1);
        assert!(matches!(s.on_drop(2, LEFT, CARD), DropOutcome::Move(_)));
        s.reject_drop();
        assert_eq!(s.on_drag_end(), Some(DragEnd::Cancelled(1)));
    }

    #[test]
    fn cancel_returns_dragged_item() {
        let mut s: DragSession<u32> = DragSession::new();
        assert_eq!(s.cancel(), None);
        s.on_drag_start(7);
        assert_eq!(s.cancel(), Some(7));
        assert!(!s.is_dragging());
    }

    #[test]
    fn restart_replaces_gesture() {
        let mut s: DragSession<u32> = DragSession::new();
        s.on_drag_start(1);
        s.on_drag_over(2, LEFT, CARD);
        s.on_drag_start(3);
        assert_eq!(s.dragged(), Some(&3));
        assert!(s.hover().is_none());
    }
}
