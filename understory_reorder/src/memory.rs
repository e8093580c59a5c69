// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless host: an in-memory node tree and key-value store.
//!
//! [`MemoryDom`] implements [`Dom`] over a slot arena, with just enough of a
//! document model for the engine: attributes, parent/child links, layout
//! rectangles, delegated listeners and clicks. It lets hosts without a browser,
//! and tests, drive the engine end to end. Host re-renders are simulated with
//! [`MemoryDom::render_items`], which throws away the item nodes and creates
//! fresh ones, as a reactive framework would.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use hashbrown::HashMap;
use kurbo::Rect;

use crate::dom::{Dom, ListenerId};
use crate::error::Result;
use crate::persist::OrderStore;

/// Node handle in a [`MemoryDom`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(u32);

impl NodeHandle {
    fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug, Default)]
struct Node {
    parent: Option<NodeHandle>,
    children: Vec<NodeHandle>,
    attributes: BTreeMap<String, String>,
    bounds: Rect,
    connected: bool,
    clicks: u32,
}

/// In-memory document.
///
/// Nodes are never freed, so handles stay valid (and report disconnected)
/// after removal. Item nodes created by [`MemoryDom::create_item`] get a
/// default layout of 100x100 cells in a single row, in creation order.
#[derive(Clone, Debug, Default)]
pub struct MemoryDom {
    nodes: Vec<Node>,
    listeners: HashMap<ListenerId, NodeHandle>,
    next_listener: u64,
}

impl MemoryDom {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&self, handle: NodeHandle) -> &Node {
        &self.nodes[handle.idx()]
    }

    fn node_mut(&mut self, handle: NodeHandle) -> &mut Node {
        &mut self.nodes[handle.idx()]
    }

    fn alloc(&mut self, node: Node) -> NodeHandle {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "A headless document never approaches 2^32 nodes."
        )]
        let handle = NodeHandle(self.nodes.len() as u32);
        self.nodes.push(node);
        handle
    }

    /// Create a connected top-level node with the given `id` attribute.
    ///
    /// It can be found with `query("#<id>")`.
    pub fn create_root(&mut self, id: &str) -> NodeHandle {
        let mut node = Node {
            connected: true,
            ..Node::default()
        };
        node.attributes.insert("id".into(), id.into());
        self.alloc(node)
    }

    /// Append a plain child carrying `class` to `parent`.
    pub fn create_child(&mut self, parent: NodeHandle, class: &str) -> NodeHandle {
        let mut node = Node {
            parent: Some(parent),
            connected: self.node(parent).connected,
            ..Node::default()
        };
        node.attributes.insert("class".into(), class.into());
        let handle = self.alloc(node);
        self.node_mut(parent).children.push(handle);
        handle
    }

    /// Append an item wrapper with `attribute = id` to `parent`.
    pub fn create_item(&mut self, parent: NodeHandle, attribute: &str, id: &str) -> NodeHandle {
        let slot = self.node(parent).children.len();
        let handle = self.create_child(parent, "card");
        let node = self.node_mut(handle);
        node.attributes.insert(attribute.into(), id.into());
        let x = 100.0 * slot as f64;
        node.bounds = Rect::new(x, 0.0, x + 100.0, 100.0);
        handle
    }

    /// Replace every child of `container` with fresh item nodes, as a host re-render does.
    ///
    /// The old children are disconnected. Returns the new nodes in order.
    pub fn render_items(
        &mut self,
        container: NodeHandle,
        attribute: &str,
        ids: &[&str],
    ) -> Vec<NodeHandle> {
        for child in core::mem::take(&mut self.node_mut(container).children) {
            self.node_mut(child).parent = None;
            self.disconnect(child);
        }
        ids.iter()
            .map(|id| self.create_item(container, attribute, id))
            .collect()
    }

    /// Detach `node` from its parent and disconnect its subtree.
    ///
    /// Listeners on disconnected nodes stay registered, as in a browser;
    /// it is the engine's job to drop them.
    pub fn remove(&mut self, node: NodeHandle) {
        if let Some(parent) = self.node_mut(node).parent.take() {
            self.node_mut(parent).children.retain(|&c| c != node);
        }
        self.disconnect(node);
    }

    fn disconnect(&mut self, node: NodeHandle) {
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            let node = self.node_mut(n);
            node.connected = false;
            stack.extend(node.children.iter().copied());
        }
    }

    /// Override the layout bounds of `node`.
    pub fn set_bounds(&mut self, node: NodeHandle, bounds: Rect) {
        self.node_mut(node).bounds = bounds;
    }

    /// Number of listeners attached directly to `node`.
    pub fn listener_count(&self, node: NodeHandle) -> usize {
        self.listeners.values().filter(|&&n| n == node).count()
    }

    /// Listeners attached directly to `node`, in registration order.
    pub fn listeners_for(&self, node: NodeHandle) -> Vec<ListenerId> {
        let mut ids: Vec<ListenerId> = self
            .listeners
            .iter()
            .filter(|&(_, &n)| n == node)
            .map(|(&id, _)| id)
            .collect();
        ids.sort();
        ids
    }

    /// Listeners an event dispatched at `origin` reaches: those on `origin`
    /// and its ancestors, innermost first.
    pub fn listeners_along(&self, origin: NodeHandle) -> Vec<ListenerId> {
        let mut out = Vec::new();
        let mut cursor = Some(origin);
        while let Some(node) = cursor {
            out.extend(self.listeners_for(node));
            cursor = self.node(node).parent;
        }
        out
    }

    /// How often `node` was clicked.
    pub fn clicks(&self, node: NodeHandle) -> u32 {
        self.node(node).clicks
    }
}

impl Dom for MemoryDom {
    type Node = NodeHandle;

    fn query(&self, selector: &str) -> Option<NodeHandle> {
        let id = selector.strip_prefix('#')?;
        self.nodes
            .iter()
            .enumerate()
            .rev()
            .find(|(_, n)| n.connected && n.attributes.get("id").is_some_and(|v| v == id))
            .and_then(|(i, _)| u32::try_from(i).ok())
            .map(NodeHandle)
    }

    fn is_connected(&self, node: NodeHandle) -> bool {
        self.node(node).connected
    }

    fn parent(&self, node: NodeHandle) -> Option<NodeHandle> {
        self.node(node).parent
    }

    fn children(&self, node: NodeHandle) -> Vec<NodeHandle> {
        self.node(node).children.clone()
    }

    fn attribute(&self, node: NodeHandle, name: &str) -> Option<String> {
        self.node(node).attributes.get(name).cloned()
    }

    fn set_attribute(&mut self, node: NodeHandle, name: &str, value: &str) {
        self.node_mut(node)
            .attributes
            .insert(name.into(), value.into());
    }

    fn bounds(&self, node: NodeHandle) -> Rect {
        self.node(node).bounds
    }

    fn insert_before(&mut self, parent: NodeHandle, node: NodeHandle, before: Option<NodeHandle>) {
        if let Some(old) = self.node_mut(node).parent.take() {
            self.node_mut(old).children.retain(|&c| c != node);
        }
        let siblings = &mut self.node_mut(parent).children;
        let at = before
            .and_then(|b| siblings.iter().position(|&c| c == b))
            .unwrap_or(siblings.len());
        siblings.insert(at, node);
        let connected = self.node(parent).connected;
        let moved = self.node_mut(node);
        moved.parent = Some(parent);
        moved.connected = connected;
    }

    fn add_listener(&mut self, node: NodeHandle) -> ListenerId {
        self.next_listener += 1;
        let id = ListenerId(self.next_listener);
        self.listeners.insert(id, node);
        id
    }

    fn remove_listener(&mut self, listener: ListenerId) {
        self.listeners.remove(&listener);
    }

    fn click(&mut self, node: NodeHandle) {
        self.node_mut(node).clicks += 1;
    }
}

/// In-memory [`OrderStore`].
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    writes: usize,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of successful writes.
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Remove `key`, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }
}

impl OrderStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.into(), value.into());
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::item_ids;
    use crate::types::ItemId;

    #[test]
    fn insert_before_moves_within_parent() {
        let mut dom = MemoryDom::new();
        let root = dom.create_root("list");
        let a = dom.create_item(root, "data-card-id", "a");
        let _b = dom.create_item(root, "data-card-id", "b");
        let c = dom.create_item(root, "data-card-id", "c");

        dom.insert_before(root, c, Some(a));
        assert_eq!(item_ids(&dom, root, "data-card-id"), ["c", "a", "b"].map(ItemId::from));

        dom.insert_before(root, c, None);
        assert_eq!(item_ids(&dom, root, "data-card-id"), ["a", "b", "c"].map(ItemId::from));
    }

    #[test]
    fn render_disconnects_old_items() {
        let mut dom = MemoryDom::new();
        let root = dom.create_root("list");
        let old = dom.create_item(root, "data-card-id", "a");
        let fresh = dom.render_items(root, "data-card-id", &["a", "b"]);

        assert!(!dom.is_connected(old));
        assert!(dom.is_connected(fresh[0]));
        assert_eq!(dom.children(root), fresh);
    }

    #[test]
    fn query_finds_connected_ids_only() {
        let mut dom = MemoryDom::new();
        let first = dom.create_root("cards");
        assert_eq!(dom.query("#cards"), Some(first));
        dom.remove(first);
        assert_eq!(dom.query("#cards"), None);
        let second = dom.create_root("cards");
        assert_eq!(dom.query("#cards"), Some(second));
        assert_eq!(dom.query("cards"), None);
    }

    #[test]
    fn listeners_along_walks_ancestors() {
        let mut dom = MemoryDom::new();
        let root = dom.create_root("list");
        let item = dom.create_item(root, "data-card-id", "a");
        let inner = dom.create_child(item, "title");
        let l = dom.add_listener(root);
        assert_eq!(dom.listeners_along(inner), vec![l]);
        dom.remove_listener(l);
        assert!(dom.listeners_along(inner).is_empty());
    }

    #[test]
    fn store_counts_writes() {
        let mut store = MemoryStore::new();
        store.set("k", "1").unwrap();
        store.set("k", "2").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("2"));
        assert_eq!(store.writes(), 2);
        assert_eq!(store.remove("k").as_deref(), Some("2"));
        assert_eq!(store.get("k"), None);
    }
}
