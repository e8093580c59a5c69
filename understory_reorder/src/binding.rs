// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Delegated listener binding.
//!
//! One listener is attached to the container instead of one per card. Item
//! nodes come and go with every host render without any re-binding; the
//! concrete item is resolved from the event origin at dispatch time by
//! walking parents up to the container.
//!
//! The registry holds at most one binding. [`BindingManager::bind`] is
//! idempotent for a live container and replaces the binding when the host
//! swapped the container node, so no listener outlives its node and no node is
//! bound twice, however often it is called.
//!
//! ```
//! use understory_reorder::{BindOutcome, BindingManager, MemoryDom};
//!
//! let mut dom = MemoryDom::new();
//! let container = dom.create_root("platform-cards");
//! let mut bindings = BindingManager::new();
//!
//! assert_eq!(bindings.bind(&mut dom, container), BindOutcome::Bound);
//! for _ in 0..5 {
//!     assert_eq!(bindings.bind(&mut dom, container), BindOutcome::AlreadyBound);
//! }
//! assert_eq!(dom.listener_count(container), 1);
//! ```

use core::fmt::Debug;

use tracing::debug;

use crate::dom::{Dom, ListenerId};
use crate::types::ItemId;

/// Result of [`BindingManager::bind`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BindOutcome {
    /// A listener was attached for the first time.
    Bound,
    /// The container is already bound; nothing changed.
    AlreadyBound,
    /// The previous container was replaced; its listener was removed and the new one bound.
    Rebound,
}

#[derive(Copy, Clone, Debug)]
struct Binding<N> {
    container: N,
    listener: ListenerId,
}

/// Owner of the single delegated listener for one container.
#[derive(Clone, Debug)]
pub struct BindingManager<N> {
    bound: Option<Binding<N>>,
}

impl<N> Default for BindingManager<N> {
    fn default() -> Self {
        Self { bound: None }
    }
}

impl<N: Copy + Eq + Debug> BindingManager<N> {
    /// Create a manager with nothing bound.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure exactly one listener is attached, to `container`.
    pub fn bind<D: Dom<Node = N> + ?Sized>(&mut self, dom: &mut D, container: N) -> BindOutcome {
        match self.bound {
            Some(b) if b.container == container && dom.is_connected(container) => {
                BindOutcome::AlreadyBound
            }
            Some(b) => {
                dom.remove_listener(b.listener);
                let listener = dom.add_listener(container);
                debug!(old = ?b.container, new = ?container, "container replaced, listener rebound");
                self.bound = Some(Binding {
                    container,
                    listener,
                });
                BindOutcome::Rebound
            }
            None => {
                let listener = dom.add_listener(container);
                debug!(?container, "listener bound");
                self.bound = Some(Binding {
                    container,
                    listener,
                });
                BindOutcome::Bound
            }
        }
    }

    /// Detach the listener, if any.
    ///
    /// Returns `true` if a binding was removed.
    pub fn unbind<D: Dom<Node = N> + ?Sized>(&mut self, dom: &mut D) -> bool {
        match self.bound.take() {
            Some(b) => {
                dom.remove_listener(b.listener);
                true
            }
            None => false,
        }
    }

    /// Whether events delivered through `listener` belong to the live binding.
    pub fn accepts(&self, listener: ListenerId) -> bool {
        self.bound.is_some_and(|b| b.listener == listener)
    }

    /// Bound container, if any.
    pub fn container(&self) -> Option<N> {
        self.bound.map(|b| b.container)
    }

    /// Check if the bound container is still attached to the document.
    pub fn is_live<D: Dom<Node = N> + ?Sized>(&self, dom: &D) -> bool {
        self.bound.is_some_and(|b| dom.is_connected(b.container))
    }

    /// Resolve the item an event originated from.
    ///
    /// Walks from `origin` up to the direct child of the bound container and
    /// reads its id attribute. Returns `None` for events outside any item, on
    /// the container itself, or when nothing is bound.
    pub fn resolve_item<D: Dom<Node = N> + ?Sized>(
        &self,
        dom: &D,
        origin: N,
        id_attribute: &str,
    ) -> Option<(N, ItemId)> {
        let container = self.bound?.container;
        let mut node = origin;
        loop {
            let parent = dom.parent(node)?;
            if parent == container {
                let id = dom.attribute(node, id_attribute)?;
                return Some((node, ItemId::from(id)));
            }
            node = parent;
        }
    }
}
