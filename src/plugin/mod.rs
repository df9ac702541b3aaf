//! Bevy ECS integration.
//!
//! [`MotionPlugin`] ticks every entity carrying a [`Mover`] against the
//! [`Terrain`] resource once per `Update`. Hook output is buffered in the
//! [`MotionOutbox`] and failing ticks surface as [`MotionTickError`]
//! events.

mod outbox;
mod systems;

use bevy::ecs::prelude::On;
use bevy::prelude::*;
use log::error;
use thiserror::Error;

use crate::body::{Body, EntityId};
use crate::config::MotionConfig;
use crate::error::MotionError;
use crate::terrain::VoxelTerrain;
use crate::tick::MoveInput;

pub use outbox::MotionOutbox;
pub use systems::{advance_terrain_clock_system, motion_tick_system, sync_transforms_system};

/// A simulated body and the input it acts on each tick.
#[derive(Component, Debug, Clone)]
pub struct Mover {
    /// The body.
    pub body: Body,
    /// Input applied every tick until replaced.
    pub input: MoveInput,
}

impl Mover {
    /// Wraps `body` with idle input.
    #[must_use]
    pub fn new(body: Body) -> Self {
        Self {
            body,
            input: MoveInput::default(),
        }
    }
}

/// The world bodies collide with.
#[derive(Resource, Debug, Clone, Default)]
pub struct Terrain(pub VoxelTerrain);

/// Tunables shared by every body.
#[derive(Resource, Debug, Clone, Default)]
pub struct MotionSettings(pub MotionConfig);

/// Event raised when a body's tick fails.
#[derive(Event, Debug, Clone, Error)]
#[error("motion tick failed for {body} ({entity:?}): {detail}")]
pub struct MotionTickError {
    /// The ECS entity whose tick failed.
    pub entity: Entity,
    /// The body's own identifier.
    pub body: EntityId,
    /// Description of the failure.
    pub detail: String,
}

impl MotionTickError {
    /// Builds the event for `entity` from a tick failure.
    #[must_use]
    pub fn new(entity: Entity, error: &MotionError) -> Self {
        let MotionError::Collision(collision) = error;
        Self {
            entity,
            body: collision.entity.id,
            detail: error.to_string(),
        }
    }
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "Observer systems must accept On<T> by value."
)]
fn log_tick_error(event: On<MotionTickError>) {
    error!("{}", event.event());
}

/// Bevy plugin installing the motion systems.
#[derive(Default)]
pub struct MotionPlugin;

impl Plugin for MotionPlugin {
    fn build(&self, app: &mut App) {
        app.add_observer(log_tick_error);
        app.init_resource::<Terrain>();
        app.init_resource::<MotionSettings>();
        app.init_resource::<MotionOutbox>();
        app.add_systems(
            Update,
            (
                motion_tick_system,
                sync_transforms_system,
                advance_terrain_clock_system,
            )
                .chain(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;
    use rstest::rstest;

    #[rstest]
    fn plugin_initialises_resources() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(MotionPlugin);
        assert!(app.world().contains_resource::<Terrain>());
        assert!(app.world().contains_resource::<MotionSettings>());
        assert!(app.world().contains_resource::<MotionOutbox>());
    }

    #[rstest]
    fn falling_mover_reports_each_update() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(MotionPlugin);
        let entity = app
            .world_mut()
            .spawn(Mover::new(Body::new(EntityId(1), DVec3::new(0.5, 10.0, 0.5))))
            .id();
        app.update();
        app.update();
        let outbox = app.world().resource::<MotionOutbox>();
        assert_eq!(outbox.reports().len(), 2);
        let y = app
            .world()
            .get::<Mover>(entity)
            .map_or(f64::NAN, |mover| mover.body.position().y);
        assert!(y < 10.0);
    }
}
