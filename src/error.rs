//! Error types surfaced by the motion core.
//!
//! Non-finite numeric input is not an error: body mutators drop it and log.
//! Errors only arise when a collaborator hook fails, and they carry enough
//! context to diagnose the failing block and body without a debugger.

use serde::Serialize;
use thiserror::Error;

use crate::body::BodySnapshot;
use crate::geometry::BlockPos;

/// Failure reported by a collaborator hook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HookError {
    message: String,
}

impl HookError {
    /// Creates a hook failure with a human-readable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Which callback failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CollisionTarget {
    /// The block collision callback.
    Block,
    /// The fluid collision callback.
    Fluid,
}

/// A hook failure wrapped with the position, block and body involved.
#[derive(Debug, Clone, Error)]
#[error(
    "{target:?} collision with {block} at ({}, {}, {}) failed for entity {}: {source}",
    .pos.x, .pos.y, .pos.z, .entity.id
)]
pub struct CollisionError {
    /// Which callback failed.
    pub target: CollisionTarget,
    /// Block position being touched.
    pub pos: BlockPos,
    /// Name of the block being touched.
    pub block: &'static str,
    /// State of the body at the time of the failure.
    pub entity: BodySnapshot,
    /// The hook's own error.
    #[source]
    pub source: HookError,
}

/// Error ending a body's tick.
#[derive(Debug, Error)]
pub enum MotionError {
    /// A collision hook failed.
    #[error(transparent)]
    Collision(#[from] Box<CollisionError>),
}

impl From<CollisionError> for MotionError {
    fn from(err: CollisionError) -> Self {
        Self::Collision(Box::new(err))
    }
}
