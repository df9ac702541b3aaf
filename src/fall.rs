//! Fall distance accumulation, landing and fall damage.

use crate::body::Body;
use crate::constants::FALL_EPSILON;
use crate::events::{Damage, DamageCause, GameEvent, GameEventKind, Landing};
use crate::fluid::check_water_state;
use crate::geometry::BlockPos;
use crate::world::{BlockState, MotionContext};

/// Whole points of damage for landing after `fall_distance` on a block
/// with `block_factor`.
///
/// Returns zero for immune bodies and for falls within the safe distance.
///
/// # Examples
/// ```
/// use glam::DVec3;
/// use tumble::body::{Body, EntityId};
/// use tumble::fall::compute_fall_damage;
///
/// let mut body = Body::new(EntityId(1), DVec3::ZERO);
/// body.attributes.safe_fall_distance = 3.0;
/// assert_eq!(compute_fall_damage(&body, 10.0, 1.0), 7.0);
/// assert_eq!(compute_fall_damage(&body, 2.0, 1.0), 0.0);
/// ```
#[must_use]
pub fn compute_fall_damage(body: &Body, fall_distance: f64, block_factor: f32) -> f32 {
    if body.capabilities.fall_damage_immune {
        return 0.0;
    }
    let unsafe_distance = fall_distance + FALL_EPSILON - body.attributes.safe_fall_distance;
    let raw = (unsafe_distance
        * f64::from(block_factor)
        * body.attributes.fall_damage_multiplier)
        .floor();
    if raw > 0.0 {
        crate::numeric::narrow(raw)
    } else {
        0.0
    }
}

/// Updates fall state after a move that changed height by `height_change`.
///
/// Living bodies first re-check water contact. Descent outside water adds to
/// the fall distance. Landing with a positive fall notifies the block,
/// deals fall damage and emits [`GameEventKind::HitGround`] before the fall
/// resets.
pub fn fall(
    ctx: &mut MotionContext<'_>,
    body: &mut Body,
    height_change: f64,
    on_ground: bool,
    state: &BlockState,
    landed_on: BlockPos,
) {
    if body.capabilities.living && !body.touching_water {
        check_water_state(ctx, body);
    }
    if !body.touching_water && height_change < 0.0 {
        let added = f64::from(crate::numeric::narrow(-height_change));
        body.set_fall_distance(body.fall_distance + added);
    }
    if !on_ground {
        return;
    }
    if body.fall_distance > 0.0 {
        let landing = Landing {
            entity: body.id(),
            pos: landed_on,
            state,
            velocity: body.velocity(),
        };
        ctx.hooks.on_landed_upon(&landing, body.fall_distance);
        if body.capabilities.living {
            let amount = compute_fall_damage(body, body.fall_distance, state.fall_damage_factor);
            if amount > 0.0 {
                log::debug!(
                    "entity {} fell {:.2} blocks onto {} for {amount} damage",
                    body.id(),
                    body.fall_distance,
                    state.name
                );
                ctx.hooks.apply_damage(&Damage {
                    entity: body.id(),
                    cause: DamageCause::Fall,
                    amount,
                });
            }
        }
        let block = body
            .supporting_block
            .map_or(state.name, |pos| ctx.world.block_state(pos).name);
        ctx.hooks.emit_game_event(&GameEvent {
            kind: GameEventKind::HitGround,
            position: body.position(),
            entity: body.id(),
            block: Some(block),
        });
    }
    body.on_landing();
}
