// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Conditions the engine recovers from on its own (container not rendered yet,
//! self drops, a target that vanished mid-gesture, stale persisted orders) are
//! reported as outcomes, not errors. What remains here is what a host may need
//! to act on.

use alloc::string::String;

use thiserror::Error;

/// Result type for engine operations.
pub type Result<T, E = ReorderError> = core::result::Result<T, E>;

/// Failure of the pure order computation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum MoveError {
    /// The drop target is not part of the current order (removed mid-drag).
    #[error("drop target is not part of the current order")]
    UnknownTarget,
    /// The dragged item is not part of the current order (removed mid-drag).
    #[error("dragged item is not part of the current order")]
    UnknownDragged,
}

/// Errors surfaced by the reorder engine.
#[derive(Debug, Error)]
pub enum ReorderError {
    /// The new order could not be computed; the gesture is treated as cancelled.
    #[error(transparent)]
    Move(#[from] MoveError),

    /// A persisted or incoming value is not a JSON array of id strings.
    #[error("order value is not a JSON array of item ids: {0}")]
    Codec(#[from] serde_json::Error),

    /// The order store refused a write.
    #[error("order store rejected write to `{key}`: {reason}")]
    Store {
        /// Key that was being written.
        key: String,
        /// Store-specific reason.
        reason: String,
    },

    /// Configuration could not be parsed.
    #[error("invalid reorder configuration: {0}")]
    Config(String),
}
