// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The reorder engine: wiring of binding, session, computation, reconciliation and persistence.
//!
//! ## Event flow
//!
//! 1) [`ReorderEngine::try_mount`] locates the container, attaches the single
//!    delegated listener and applies the canonical order.
//! 2) The host forwards every drag event the listener receives to
//!    [`ReorderEngine::handle`]. Start, hover and end only move the
//!    [`DragSession`]; a drop on another item computes the new order, applies it
//!    to the container optimistically, commits it, and fires the trigger node
//!    when one is configured.
//! 3) The host forwards structural-change notifications on the container to
//!    [`ReorderEngine::on_mutation`]. The engine's own reorders are recognized and
//!    skipped; host re-renders get the canonical order re-applied, since the
//!    store, not the DOM, holds the authoritative order.
//! 4) Commits made by another engine instance on the same store (another tab)
//!    arrive through [`ReorderEngine::on_storage_event`].
//!
//! The persisted key is owned by this engine while mounted. Two engines writing
//! the same key resolve last-write-wins.

use alloc::vec::Vec;

use kurbo::Point;
use tracing::{debug, trace, warn};

use crate::binding::BindingManager;
use crate::codec;
use crate::compute::move_item;
use crate::config::ReorderConfig;
use crate::dom::{Dom, ListenerId, item_ids};
use crate::error::Result;
use crate::persist::{OrderChange, OrderObserver, OrderStore, PersistenceBridge};
use crate::reconcile::Reconciler;
use crate::session::{DragEnd, DragSession, DropOutcome, Hover};
use crate::types::ItemId;

/// Kind of a drag event forwarded by the host.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DragEventKind {
    /// A drag started on an item.
    Start,
    /// The pointer moved over an item during a drag.
    Over,
    /// The dragged item was released over an item.
    Drop,
    /// The drag finished, with or without a drop.
    End,
}

/// A drag event delivered through the delegated listener.
#[derive(Copy, Clone, Debug)]
pub struct DragEvent<N> {
    /// Event kind.
    pub kind: DragEventKind,
    /// Listener that received the event.
    pub listener: ListenerId,
    /// Node the event originated from; may be nested inside an item.
    pub origin: N,
    /// Pointer position, in the same space as [`Dom::bounds`].
    pub pointer: Point,
}

impl<N> DragEvent<N> {
    /// Build an event.
    pub fn new(kind: DragEventKind, listener: ListenerId, origin: N, pointer: Point) -> Self {
        Self {
            kind,
            listener,
            origin,
            pointer,
        }
    }
}

/// What the engine did with a drag event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DragResponse {
    /// The event was not for this engine or had no item to act on.
    Ignored,
    /// A gesture started on this item.
    Started(ItemId),
    /// Hover target updated.
    Hovering(Hover<ItemId>),
    /// Dropped on the dragged item itself; nothing changed.
    Unchanged,
    /// The order changed and was committed.
    Committed(OrderChange),
    /// The gesture was cancelled; DOM and store are untouched.
    Cancelled,
    /// The gesture ended after a committed drop.
    Ended,
}

/// Result of [`ReorderEngine::try_mount`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MountStatus {
    /// The container is bound and ordered.
    Mounted,
    /// The container has not rendered yet; poll again.
    Pending {
        /// Attempts made so far, including this one.
        attempt: u32,
    },
    /// The attempt budget is spent. A later mutation notification may still mount.
    GaveUp,
}

/// Result of [`ReorderEngine::on_mutation`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MutationResponse {
    /// The change was the engine's own reorder.
    Echo,
    /// The canonical order was checked against the container; `moves` nodes were moved.
    Reapplied {
        /// Number of node moves.
        moves: usize,
    },
    /// The container was (re)located and bound.
    Mounted,
    /// No container is present.
    Unmounted,
}

/// Reorder engine for one container.
///
/// Owns its drag session, so independent containers use independent engines.
pub struct ReorderEngine<D: Dom, S> {
    config: ReorderConfig,
    bindings: BindingManager<D::Node>,
    session: DragSession<ItemId>,
    reconciler: Reconciler,
    bridge: PersistenceBridge<S>,
    mount_attempts: u32,
}

impl<D: Dom, S: core::fmt::Debug> core::fmt::Debug for ReorderEngine<D, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ReorderEngine")
            .field("config", &self.config)
            .field("bindings", &self.bindings)
            .field("session", &self.session)
            .field("bridge", &self.bridge)
            .field("mount_attempts", &self.mount_attempts)
            .finish_non_exhaustive()
    }
}

impl<D: Dom, S: OrderStore> ReorderEngine<D, S> {
    /// Create an unmounted engine persisting into `store`.
    pub fn new(config: ReorderConfig, store: S) -> Self {
        let bridge = PersistenceBridge::new(store, config.storage_key.clone());
        Self {
            config,
            bindings: BindingManager::new(),
            session: DragSession::new(),
            reconciler: Reconciler::new(),
            bridge,
            mount_attempts: 0,
        }
    }

    /// Engine configuration.
    pub fn config(&self) -> &ReorderConfig {
        &self.config
    }

    /// Current drag session.
    pub fn session(&self) -> &DragSession<ItemId> {
        &self.session
    }

    /// Persistence bridge, for direct store access.
    pub fn bridge(&self) -> &PersistenceBridge<S> {
        &self.bridge
    }

    /// Bound container, if mounted.
    pub fn container(&self) -> Option<D::Node> {
        self.bindings.container()
    }

    /// Register an observer notified after every commit.
    pub fn subscribe(&mut self, observer: impl OrderObserver + 'static) {
        self.bridge.subscribe(observer);
    }

    /// Canonical order for the items currently in the container.
    ///
    /// Returns `None` when not mounted.
    pub fn canonical_order(&self, dom: &D) -> Option<Vec<ItemId>> {
        let container = self.live_container(dom)?;
        let current = item_ids(dom, container, &self.config.id_attribute);
        Some(self.bridge.load(&current))
    }

    fn live_container(&self, dom: &D) -> Option<D::Node> {
        self.bindings
            .container()
            .filter(|&c| dom.is_connected(c))
    }

    /// Locate, bind and order the container.
    ///
    /// Safe to call repeatedly: an already-mounted, still-connected container is
    /// left alone. While the container is missing, each call counts one attempt
    /// until `max_mount_attempts` is reached.
    pub fn try_mount(&mut self, dom: &mut D) -> MountStatus {
        if self.bindings.is_live(&*dom)
            && dom.query(&self.config.container_selector) == self.bindings.container()
        {
            return MountStatus::Mounted;
        }
        let Some(container) = dom.query(&self.config.container_selector) else {
            if self.mount_attempts >= self.config.max_mount_attempts {
                return MountStatus::GaveUp;
            }
            self.mount_attempts += 1;
            if self.mount_attempts == self.config.max_mount_attempts {
                warn!(
                    selector = %self.config.container_selector,
                    attempts = self.mount_attempts,
                    "container never rendered; giving up polling"
                );
                return MountStatus::GaveUp;
            }
            trace!(attempt = self.mount_attempts, "container not rendered yet");
            return MountStatus::Pending {
                attempt: self.mount_attempts,
            };
        };
        self.mount_on(dom, container);
        MountStatus::Mounted
    }

    fn mount_on(&mut self, dom: &mut D, container: D::Node) {
        let outcome = self.bindings.bind(dom, container);
        self.mount_attempts = 0;
        self.reconciler.clear_echo();
        if self.session.cancel().is_some() {
            debug!("container replaced mid-drag; gesture cancelled");
        }
        let applied = self.apply_canonical(dom, container);
        debug!(?container, ?outcome, moves = applied, "mounted");
    }

    fn apply_canonical(&mut self, dom: &mut D, container: D::Node) -> usize {
        let current = item_ids(&*dom, container, &self.config.id_attribute);
        let canonical = self.bridge.load(&current);
        self.reconciler
            .apply(dom, container, &self.config.id_attribute, &canonical)
            .moves
    }

    /// Detach from the container.
    pub fn unmount(&mut self, dom: &mut D) {
        self.bindings.unbind(dom);
        self.session.cancel();
        self.reconciler.clear_echo();
    }

    /// Handle a structural change of the container or its surroundings.
    pub fn on_mutation(&mut self, dom: &mut D) -> MutationResponse {
        let located = dom.query(&self.config.container_selector);
        let container = match (located, self.live_container(dom)) {
            (Some(found), Some(bound)) if found == bound => bound,
            (Some(_), _) => {
                return match self.try_mount(dom) {
                    MountStatus::Mounted => MutationResponse::Mounted,
                    MountStatus::Pending { .. } | MountStatus::GaveUp => {
                        MutationResponse::Unmounted
                    }
                };
            }
            (None, _) => {
                if self.bindings.unbind(dom) {
                    debug!("container removed; listener detached");
                }
                self.session.cancel();
                self.reconciler.clear_echo();
                return MutationResponse::Unmounted;
            }
        };

        let current = item_ids(&*dom, container, &self.config.id_attribute);
        if self.reconciler.take_echo(&current) {
            trace!("ignoring echo of own reorder");
            return MutationResponse::Echo;
        }

        if let Some(dragged) = self.session.dragged() {
            if !current.contains(dragged) {
                debug!(%dragged, "dragged item removed; gesture cancelled");
                self.session.cancel();
            } else if self
                .session
                .hover()
                .is_some_and(|h| !current.contains(&h.target))
            {
                self.session.clear_hover();
            }
        }

        let canonical = self.bridge.load(&current);
        let moves = self
            .reconciler
            .apply(dom, container, &self.config.id_attribute, &canonical)
            .moves;
        MutationResponse::Reapplied { moves }
    }

    /// Apply an order committed elsewhere (another tab) without re-committing.
    ///
    /// Changes for other keys, malformed values, and calls while unmounted are
    /// ignored. Returns the number of node moves.
    pub fn on_storage_event(&mut self, dom: &mut D, change: &OrderChange) -> usize {
        if change.key != self.bridge.key() {
            return 0;
        }
        let Some(container) = self.live_container(dom) else {
            return 0;
        };
        let order = match codec::decode(&change.new_value) {
            Ok(order) => order,
            Err(err) => {
                warn!(key = %change.key, %err, "ignoring malformed order from storage event");
                return 0;
            }
        };
        self.reconciler
            .apply(dom, container, &self.config.id_attribute, &order)
            .moves
    }

    /// Handle a drag event from the delegated listener.
    ///
    /// Only store failures surface as errors. The optimistic reorder is rolled
    /// back to the stored order before the error is returned, and the gesture
    /// ends as cancelled.
    pub fn handle(&mut self, dom: &mut D, event: DragEvent<D::Node>) -> Result<DragResponse> {
        if !self.bindings.accepts(event.listener) {
            trace!(listener = ?event.listener, "event from stale listener ignored");
            return Ok(DragResponse::Ignored);
        }
        if event.kind == DragEventKind::End {
            return Ok(match self.session.on_drag_end() {
                Some(DragEnd::Dropped(item)) => {
                    debug!(%item, "drag finished");
                    DragResponse::Ended
                }
                Some(DragEnd::Cancelled(item)) => {
                    debug!(%item, "drag cancelled");
                    DragResponse::Cancelled
                }
                None => DragResponse::Ignored,
            });
        }

        let Some((node, item)) =
            self.bindings
                .resolve_item(&*dom, event.origin, &self.config.id_attribute)
        else {
            trace!(kind = ?event.kind, "event outside any item");
            return Ok(DragResponse::Ignored);
        };

        match event.kind {
            DragEventKind::Start => {
                debug!(%item, "drag started");
                self.session.on_drag_start(item.clone());
                Ok(DragResponse::Started(item))
            }
            DragEventKind::Over => Ok(self
                .session
                .on_drag_over(item, event.pointer, dom.bounds(node))
                .cloned()
                .map_or(DragResponse::Ignored, DragResponse::Hovering)),
            DragEventKind::Drop => {
                match self.session.on_drop(item, event.pointer, dom.bounds(node)) {
                    DropOutcome::NotDragging => Ok(DragResponse::Ignored),
                    DropOutcome::SelfDrop => Ok(DragResponse::Unchanged),
                    DropOutcome::Move(intent) => {
                        let container = self
                            .bindings
                            .container()
                            .filter(|&c| dom.is_connected(c));
                        let Some(container) = container else {
                            self.session.reject_drop();
                            return Ok(DragResponse::Cancelled);
                        };
                        let current = item_ids(&*dom, container, &self.config.id_attribute);
                        // The target was just resolved from the live container, but the
                        // dragged item may have been removed by a render not yet reported
                        // through `on_mutation`.
                        let order =
                            match move_item(&current, &intent.dragged, &intent.target, intent.side)
                            {
                                Ok(order) => order,
                                Err(err) => {
                                    debug!(%err, "drop no longer applies; gesture cancelled");
                                    self.session.reject_drop();
                                    return Ok(DragResponse::Cancelled);
                                }
                            };
                        self.reconciler
                            .apply(dom, container, &self.config.id_attribute, &order);
                        let change = match self.bridge.commit(&order) {
                            Ok(change) => change,
                            Err(err) => {
                                warn!(%err, "commit failed; restoring stored order");
                                self.session.reject_drop();
                                self.reconciler.clear_echo();
                                let canonical = self.bridge.load(&current);
                                self.reconciler.apply(
                                    dom,
                                    container,
                                    &self.config.id_attribute,
                                    &canonical,
                                );
                                return Err(err);
                            }
                        };
                        self.fire_trigger(dom, &change);
                        Ok(DragResponse::Committed(change))
                    }
                }
            }
            DragEventKind::End => Ok(DragResponse::Ignored),
        }
    }

    fn fire_trigger(&self, dom: &mut D, change: &OrderChange) {
        let Some(trigger) = &self.config.trigger else {
            return;
        };
        match dom.query(&trigger.selector) {
            Some(node) => {
                dom.set_attribute(node, &trigger.attribute, &change.new_value);
                dom.click(node);
                trace!(selector = %trigger.selector, "trigger activated");
            }
            None => warn!(selector = %trigger.selector, "trigger node missing; push skipped"),
        }
    }
}
