//! Systems driving bodies from the ECS schedule.

use bevy::prelude::*;
use bevy_transform::components::Transform;

use crate::tick::tick_body;
use crate::world::MotionContext;

use super::{MotionOutbox, MotionSettings, MotionTickError, Mover, Terrain};

/// Ticks every [`Mover`] against the [`Terrain`].
///
/// Hook output lands in the [`MotionOutbox`]. A body whose tick fails
/// triggers [`MotionTickError`]; the remaining bodies still tick.
pub fn motion_tick_system(
    mut commands: Commands,
    terrain: Res<Terrain>,
    settings: Res<MotionSettings>,
    mut outbox: ResMut<MotionOutbox>,
    mut movers: Query<(Entity, &mut Mover)>,
) {
    let outbox = &mut *outbox;
    for (entity, mut mover) in &mut movers {
        let mover = &mut *mover;
        let mut ctx = MotionContext::new(&terrain.0, &mut outbox.log, &settings.0);
        match tick_body(&mut ctx, &mut mover.body, &mover.input) {
            Ok(report) => outbox.reports.push(report),
            Err(error) => commands.trigger(MotionTickError::new(entity, &error)),
        }
    }
}

/// Advances the terrain clock once per pass so per-tick piston limits reset.
pub fn advance_terrain_clock_system(mut terrain: ResMut<Terrain>) {
    terrain.0.advance_time();
}

/// Mirrors body positions into [`Transform`]s.
pub fn sync_transforms_system(mut movers: Query<(&Mover, &mut Transform), Changed<Mover>>) {
    for (mover, mut transform) in &mut movers {
        transform.translation = mover.body.position().as_vec3();
    }
}
