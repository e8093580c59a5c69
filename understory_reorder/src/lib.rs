// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_reorder --heading-base-level=0

//! Understory Reorder: drag-to-reorder synchronization for host-rendered containers.
//!
//! ## Overview
//!
//! A host framework renders a container holding one wrapper node per item, each
//! tagged with a stable id attribute. This crate lets the user drag those items
//! into a new order, shows the new order immediately, and persists it so that it
//! survives the host's next render and page reloads.
//!
//! Two sources of truth are reconciled:
//! - the host's node tree, which the framework may replace wholesale at any time, and
//! - a persisted order value, which this crate owns exclusively.
//!
//! The persisted order is authoritative. Every DOM mutation made here is
//! optimistic and safe for the host to overwrite.
//!
//! ## Components
//!
//! - [`codec`]: the persisted format (a JSON array of id strings) and
//!   [`codec::reconcile`], which turns a stale order into a permutation of the current items.
//! - [`DragSession`]: idle/dragging state machine for one gesture.
//! - [`move_item`]: the pure permutation step for a drop.
//! - [`reconcile`]: diffing and applying an order to the container with as few moves as possible.
//! - [`PersistenceBridge`]: commits the order to an [`OrderStore`] and notifies [`OrderObserver`]s.
//! - [`BindingManager`]: a single delegated listener on the container, resolving
//!   the item from the event origin at dispatch time.
//! - [`ReorderEngine`]: wires all of the above behind a host-facing event API.
//!
//! The host is abstracted by [`Dom`]. [`MemoryDom`] and [`MemoryStore`] provide a
//! headless host for tests and non-browser embeddings.
//!
//! ## Example
//!
//! ```
//! use kurbo::Point;
//! use understory_reorder::{
//!     DragEvent, DragEventKind, DragResponse, MemoryDom, MemoryStore, ReorderConfig,
//!     ReorderEngine,
//! };
//!
//! let mut dom = MemoryDom::new();
//! let container = dom.create_root("platform-cards");
//! let cards = dom.render_items(container, "data-card-id", &["A", "B", "C"]);
//!
//! let mut engine = ReorderEngine::new(ReorderConfig::default(), MemoryStore::new());
//! engine.try_mount(&mut dom);
//! let listener = dom.listeners_for(container)[0];
//!
//! // Drag A over the left half of C and drop it there.
//! let over_c = Point::new(210.0, 50.0);
//! for (kind, origin) in [
//!     (DragEventKind::Start, cards[0]),
//!     (DragEventKind::Over, cards[2]),
//!     (DragEventKind::Drop, cards[2]),
//!     (DragEventKind::End, cards[0]),
//! ] {
//!     let response = engine
//!         .handle(&mut dom, DragEvent::new(kind, listener, origin, over_c))
//!         .unwrap();
//!     if let DragResponse::Committed(change) = response {
//!         assert_eq!(change.new_value, r#"["B","A","C"]"#);
//!     }
//! }
//! ```
//!
//! ## Ordering guarantees
//!
//! - Every order read by an observer is a permutation of the items present.
//! - A gesture ending without a successful drop leaves DOM and store untouched.
//! - Applying an order the container already has performs no mutation.
//! - Repeated mounting never attaches a second listener.

extern crate alloc;

mod binding;
pub mod codec;
mod compute;
mod config;
mod dom;
mod engine;
mod error;
mod memory;
mod persist;
pub mod reconcile;
mod session;
mod types;

pub use binding::{BindOutcome, BindingManager};
pub use compute::move_item;
pub use config::{ReorderConfig, TriggerConfig};
pub use dom::{Dom, ListenerId, item_ids, item_nodes};
pub use engine::{
    DragEvent, DragEventKind, DragResponse, MountStatus, MutationResponse, ReorderEngine,
};
pub use error::{MoveError, ReorderError, Result};
pub use memory::{MemoryDom, MemoryStore, NodeHandle};
pub use persist::{OrderChange, OrderObserver, OrderStore, PersistenceBridge};
pub use reconcile::Reconciler;
pub use session::{DragEnd, DragSession, DropIntent, DropOutcome, Hover};
pub use types::{ItemId, Side};
