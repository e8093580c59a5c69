// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine configuration.

use alloc::string::{String, ToString};

use serde::{Deserialize, Serialize};

use crate::error::{ReorderError, Result};

/// Where and how the engine finds its container and persists the order.
///
/// Every field has a default, so hosts only spell out what differs:
///
/// ```
/// use understory_reorder::ReorderConfig;
///
/// let config = ReorderConfig::from_json(r#"{ "storage_key": "ops-card-order" }"#).unwrap();
/// assert_eq!(config.storage_key, "ops-card-order");
/// assert_eq!(config.container_selector, "#platform-cards");
/// assert!(config.trigger.is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReorderConfig {
    /// Selector of the container holding one wrapper node per item.
    pub container_selector: String,
    /// Attribute carrying the item id on each wrapper node.
    pub id_attribute: String,
    /// Store key of the persisted order.
    pub storage_key: String,
    /// Polls of [`ReorderEngine::try_mount`](crate::ReorderEngine::try_mount) before giving up
    /// on a container that never renders.
    pub max_mount_attempts: u32,
    /// Optional push path for hosts that only react to UI events.
    pub trigger: Option<TriggerConfig>,
}

impl Default for ReorderConfig {
    fn default() -> Self {
        Self {
            container_selector: "#platform-cards".into(),
            id_attribute: "data-card-id".into(),
            storage_key: "platform-card-order".into(),
            max_mount_attempts: 50,
            trigger: None,
        }
    }
}

impl ReorderConfig {
    /// Parse a configuration from JSON, filling omitted fields with defaults.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|err| ReorderError::Config(err.to_string()))
    }

    /// Use `trigger` as the push-notification node.
    pub fn with_trigger(mut self, trigger: TriggerConfig) -> Self {
        self.trigger = Some(trigger);
        self
    }
}

/// Hidden node the engine activates after each commit.
///
/// Before clicking, the serialized order is written to `attribute`, so the host's
/// click handler can read it without observing the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Selector of the trigger node.
    pub selector: String,
    /// Data attribute receiving the serialized order.
    #[serde(default = "default_trigger_attribute")]
    pub attribute: String,
}

impl TriggerConfig {
    /// Trigger at `selector` using the default `data-order` attribute.
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            attribute: default_trigger_attribute(),
        }
    }
}

fn default_trigger_attribute() -> String {
    "data-order".into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        assert_eq!(ReorderConfig::from_json("{}").unwrap(), ReorderConfig::default());
    }

    #[test]
    fn trigger_attribute_defaults() {
        let config =
            ReorderConfig::from_json(r##"{ "trigger": { "selector": "#order-sync" } }"##).unwrap();
        assert_eq!(config.trigger, Some(TriggerConfig::new("#order-sync")));
    }

    #[test]
    fn bad_json_is_config_error() {
        let err = ReorderConfig::from_json(r#"{ "max_mount_attempts": "many" }"#).unwrap_err();
        assert!(matches!(err, ReorderError::Config(_)));
    }
}
