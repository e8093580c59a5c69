// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canonical order persistence and change notification.
//!
//! The [`PersistenceBridge`] is the only writer of its key. A commit encodes
//! the order, writes it last-write-wins, and then tells every subscribed
//! [`OrderObserver`] about the new value. Observers stand in for whatever
//! the host listens to (storage events in other tabs, the framework's own
//! state store). A failed write notifies nobody.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use understory_reorder::{ItemId, MemoryStore, OrderChange, PersistenceBridge};
//!
//! let seen: Rc<RefCell<Vec<OrderChange>>> = Rc::default();
//! let mut bridge = PersistenceBridge::new(MemoryStore::new(), "card-order");
//! let sink = Rc::clone(&seen);
//! bridge.subscribe(move |change: &OrderChange| sink.borrow_mut().push(change.clone()));
//!
//! let order = [ItemId::from("b"), ItemId::from("a")];
//! bridge.commit(&order).unwrap();
//!
//! assert_eq!(seen.borrow().len(), 1);
//! assert_eq!(seen.borrow()[0].new_value, r#"["b","a"]"#);
//! assert_eq!(bridge.load(&[ItemId::from("a"), ItemId::from("b")]), order);
//! ```

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use tracing::{debug, warn};

use crate::codec;
use crate::error::Result;
use crate::types::ItemId;

/// Key-value store holding the persisted order.
///
/// Shaped after browser web storage: string keys, string values.
pub trait OrderStore {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Write `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Notification emitted after every successful commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderChange {
    /// Store key that changed.
    pub key: String,
    /// New serialized order.
    pub new_value: String,
}

impl OrderChange {
    /// Decode the new order carried by this change.
    pub fn order(&self) -> Result<Vec<ItemId>> {
        codec::decode(&self.new_value)
    }
}

/// Receiver of [`OrderChange`] notifications.
pub trait OrderObserver {
    /// Called once per successful commit.
    fn order_changed(&mut self, change: &OrderChange);
}

impl<F: FnMut(&OrderChange)> OrderObserver for F {
    fn order_changed(&mut self, change: &OrderChange) {
        self(change);
    }
}

/// Writes the canonical order and notifies observers.
pub struct PersistenceBridge<S> {
    store: S,
    key: String,
    observers: Vec<Box<dyn OrderObserver>>,
}

impl<S: fmt::Debug> fmt::Debug for PersistenceBridge<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistenceBridge")
            .field("store", &self.store)
            .field("key", &self.key)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl<S: OrderStore> PersistenceBridge<S> {
    /// Create a bridge writing under `key`.
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            observers: Vec::new(),
        }
    }

    /// Store key this bridge owns.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Register an observer for subsequent commits.
    pub fn subscribe(&mut self, observer: impl OrderObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Persist `order` and notify every observer exactly once.
    ///
    /// Returns the emitted change.
    pub fn commit(&mut self, order: &[ItemId]) -> Result<OrderChange> {
        let new_value = codec::encode(order)?;
        self.store.set(&self.key, &new_value)?;
        let change = OrderChange {
            key: self.key.clone(),
            new_value,
        };
        debug!(key = %change.key, value = %change.new_value, "order committed");
        for observer in &mut self.observers {
            observer.order_changed(&change);
        }
        Ok(change)
    }

    /// Decode the persisted order as stored, without reconciling.
    ///
    /// `Ok(None)` means no preference has been stored.
    pub fn persisted(&self) -> Result<Option<Vec<ItemId>>> {
        self.store
            .get(&self.key)
            .map(|raw| codec::decode(&raw))
            .transpose()
    }

    /// Canonical order for the items currently present.
    ///
    /// An absent key yields `current`. A malformed value is logged and also
    /// yields `current`; it is overwritten by the next commit.
    pub fn load(&self, current: &[ItemId]) -> Vec<ItemId> {
        match self.persisted() {
            Ok(Some(order)) => codec::reconcile(&order, current),
            Ok(None) => current.to_vec(),
            Err(err) => {
                warn!(key = %self.key, %err, "ignoring malformed persisted order");
                current.to_vec()
            }
        }
    }

    /// Borrow the store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutably borrow the store.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReorderError;
    use crate::memory::MemoryStore;
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::Cell;

    fn ids(raw: &[&str]) -> Vec<ItemId> {
        raw.iter().copied().map(ItemId::from).collect()
    }

    #[derive(Debug, Default)]
    struct ReadOnly;

    impl OrderStore for ReadOnly {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&mut self, key: &str, _value: &str) -> Result<()> {
            Err(ReorderError::Store {
                key: key.into(),
                reason: "quota exceeded".into(),
            })
        }
    }

    #[test]
    fn commit_writes_json_array() {
        let mut bridge = PersistenceBridge::new(MemoryStore::new(), "order");
        let change = bridge.commit(&ids(&["B", "A", "C"])).unwrap();
        assert_eq!(change.key, "order");
        assert_eq!(change.new_value, r#"["B","A","C"]"#);
        assert_eq!(
            bridge.store().get("order").as_deref(),
            Some(r#"["B","A","C"]"#)
        );
        assert_eq!(change.order().unwrap(), ids(&["B", "A", "C"]));
    }

    #[test]
    fn each_observer_notified_once_per_commit() {
        let mut bridge = PersistenceBridge::new(MemoryStore::new(), "order");
        let first = Rc::new(Cell::new(0_u32));
        let second = Rc::new(Cell::new(0_u32));
        let (f, s) = (Rc::clone(&first), Rc::clone(&second));
        bridge.subscribe(move |_: &OrderChange| f.set(f.get() + 1));
        bridge.subscribe(move |_: &OrderChange| s.set(s.get() + 1));

        bridge.commit(&ids(&["a"])).unwrap();
        bridge.commit(&ids(&["a"])).unwrap();
        assert_eq!(first.get(), 2);
        assert_eq!(second.get(), 2);
    }

    #[test]
    fn failed_write_notifies_nobody() {
        let mut bridge = PersistenceBridge::new(ReadOnly, "order");
        let calls = Rc::new(Cell::new(0_u32));
        let c = Rc::clone(&calls);
        bridge.subscribe(move |_: &OrderChange| c.set(c.get() + 1));

        let err = bridge.commit(&ids(&["a"])).unwrap_err();
        assert!(matches!(err, ReorderError::Store { .. }));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn load_without_key_uses_current_order() {
        let bridge = PersistenceBridge::new(MemoryStore::new(), "order");
        assert_eq!(bridge.persisted().unwrap(), None);
        assert_eq!(bridge.load(&ids(&["a", "b"])), ids(&["a", "b"]));
    }

    #[test]
    fn load_reconciles_stale_order() {
        let mut store = MemoryStore::new();
        store.set("order", r#"["x","y","z"]"#).unwrap();
        let bridge = PersistenceBridge::new(store, "order");
        assert_eq!(bridge.load(&ids(&["y", "z", "w"])), ids(&["y", "z", "w"]));
    }

    #[test]
    fn load_ignores_malformed_value() {
        let mut store = MemoryStore::new();
        store.set("order", r#"{"a":1}"#).unwrap();
        let bridge = PersistenceBridge::new(store, "order");
        assert!(bridge.persisted().is_err());
        assert_eq!(bridge.load(&ids(&["a", "b"])), vec![
            ItemId::from("a"),
            ItemId::from("b")
        ]);
    }

    #[test]
    fn last_write_wins() {
        let mut bridge = PersistenceBridge::new(MemoryStore::new(), "order");
        bridge.commit(&ids(&["a", "b"])).unwrap();
        bridge.commit(&ids(&["b", "a"])).unwrap();
        assert_eq!(bridge.persisted().unwrap(), Some(ids(&["b", "a"])));
    }
}
