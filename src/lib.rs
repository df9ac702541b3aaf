#![cfg_attr(docsrs, feature(doc_cfg))]
//! Per-tick movement and collision resolution for bodies in a voxel world.
//!
//! A [`Body`] is advanced one tick at a time by [`tick_body`]: its velocity
//! is integrated by the [`travel`] dispatcher, the resulting displacement is
//! resolved against the world's obstacle shapes one axis at a time, and the
//! path it took is swept through the block grid so every touched block and
//! fluid is reported exactly once. Falls, landings and step events are
//! reported through [`MotionHooks`].
//!
//! The world is never global. Callers pass a [`CollisionWorld`] and a hook
//! sink explicitly through a [`MotionContext`]; [`VoxelTerrain`] is a ready
//! made in-memory world and [`MotionPlugin`] runs the whole thing inside a
//! Bevy app.
//!
//! ```
//! use glam::DVec3;
//! use tumble::prelude::*;
//!
//! let terrain = VoxelTerrain::flat(4, BlockState::solid("stone"));
//! let config = MotionConfig::default();
//! let mut hooks = EventLog::new();
//! let mut body = Body::new(EntityId(1), DVec3::new(0.5, 2.0, 0.5));
//! for _ in 0..40 {
//!     let mut ctx = MotionContext::new(&terrain, &mut hooks, &config);
//!     tick_body(&mut ctx, &mut body, &MoveInput::default())?;
//! }
//! assert!(body.on_ground());
//! assert_eq!(body.position().y, 0.0);
//! # Ok::<(), tumble::error::MotionError>(())
//! ```
pub mod body;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod fall;
pub mod fluid;
pub mod geometry;
pub mod knockback;
pub mod logging;
pub mod mover;
pub mod numeric;
pub mod plugin;
pub mod segments;
pub mod step_up;
pub mod sweep;
pub mod terrain;
pub mod tick;
pub mod touch;
pub mod travel;
pub mod vector_math;
pub mod world;

// Re-export commonly used items
pub use body::{Body, EntityId};
pub use config::MotionConfig;
pub use error::{CollisionError, HookError, MotionError};
pub use events::EventLog;
pub use logging::init as init_logging;
pub use mover::{move_body, MoveKind};
pub use plugin::{MotionOutbox, MotionPlugin, MotionTickError, Mover, Terrain};
pub use terrain::VoxelTerrain;
pub use tick::{tick_body, MoveInput, TickReport};
pub use travel::{travel, TravelMode};
pub use vector_math::vec_normalize;
pub use world::{BlockState, CollisionWorld, MotionContext, MotionHooks};

pub mod prelude {
    //! Prelude exports used in documentation examples.
    //!
    //! ```rust,no_run
    //! use tumble::prelude::*;
    //! ```

    pub use crate::body::{Body, Capabilities, EntityId};
    pub use crate::config::MotionConfig;
    pub use crate::events::EventLog;
    pub use crate::geometry::{Aabb, BlockPos};
    pub use crate::terrain::VoxelTerrain;
    pub use crate::tick::{tick_body, MoveInput};
    pub use crate::world::{BlockState, CollisionWorld, MotionContext, MotionHooks, NoHooks};
    pub use crate::MotionPlugin;
}
