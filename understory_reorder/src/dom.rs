// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host document interface.
//!
//! The engine reads and mutates the host's node tree only through [`Dom`].
//! A browser host implements it over its element handles; [`MemoryDom`](crate::MemoryDom)
//! implements it headlessly for tests and non-browser hosts.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Debug;

use kurbo::Rect;

use crate::types::ItemId;

/// Handle to a registered delegated listener.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// Node tree owned by the host framework.
///
/// The host may replace any part of the tree between calls, including the
/// container itself. Implementations must tolerate handles to nodes that are
/// no longer connected.
pub trait Dom {
    /// Node handle.
    type Node: Copy + Eq + Debug;

    /// Find the first connected node matching `selector`.
    fn query(&self, selector: &str) -> Option<Self::Node>;

    /// Whether `node` is still attached to the document.
    fn is_connected(&self, node: Self::Node) -> bool;

    /// Parent of `node`, if any.
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// Direct children of `node` in document order.
    fn children(&self, node: Self::Node) -> Vec<Self::Node>;

    /// Value of attribute `name` on `node`.
    fn attribute(&self, node: Self::Node, name: &str) -> Option<String>;

    /// Set attribute `name` on `node`.
    fn set_attribute(&mut self, node: Self::Node, name: &str, value: &str);

    /// Layout bounds of `node`.
    fn bounds(&self, node: Self::Node) -> Rect;

    /// Move `node` under `parent`, directly before `before`, or last when `before` is `None`.
    fn insert_before(&mut self, parent: Self::Node, node: Self::Node, before: Option<Self::Node>);

    /// Attach the engine's drag listener to `node`.
    ///
    /// Drag events originating anywhere in the subtree of `node` are delivered
    /// with the returned id.
    fn add_listener(&mut self, node: Self::Node) -> ListenerId;

    /// Detach a listener. Unknown ids are ignored.
    fn remove_listener(&mut self, listener: ListenerId);

    /// Activate `node` as if clicked.
    fn click(&mut self, node: Self::Node);
}

/// Item wrapper nodes of `container`: its direct children carrying `id_attribute`.
///
/// Children without the attribute are not orderable and are skipped.
pub fn item_nodes<D: Dom + ?Sized>(
    dom: &D,
    container: D::Node,
    id_attribute: &str,
) -> Vec<(D::Node, ItemId)> {
    dom.children(container)
        .into_iter()
        .filter_map(|node| {
            dom.attribute(node, id_attribute)
                .map(|id| (node, ItemId::from(id)))
        })
        .collect()
}

/// Item ids of `container` in document order.
pub fn item_ids<D: Dom + ?Sized>(dom: &D, container: D::Node, id_attribute: &str) -> Vec<ItemId> {
    item_nodes(dom, container, id_attribute)
        .into_iter()
        .map(|(_, id)| id)
        .collect()
}
