//! The single move call.
//!
//! [`move_body`] turns an intended displacement into an actual one and
//! applies every per-move consequence: collision flags, the queued touch
//! segment, fall tracking, landing hooks, step events and the block speed
//! multiplier.

use glam::DVec3;
use log::trace;

use crate::body::Body;
use crate::constants::{MOVE_EPSILON, STEP_DISTANCE_FACTOR};
use crate::events::{GameEvent, GameEventKind, Landing};
use crate::fall::fall;
use crate::geometry::BlockPos;
use crate::numeric::{approximately_equals, narrow};
use crate::segments::Segment;
use crate::sweep::resolve_movement;
use crate::vector_math::{horizontal_length, vec_normalize};
use crate::world::{BlockState, MotionContext};

/// Longest stretch of a fast move checked for fall-resetting blocks.
const FALL_RESET_REACH: f64 = 8.0;

/// What caused a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveKind {
    /// The body's own velocity.
    #[default]
    SelfMove,
    /// A piston or similar block pushing the body.
    Piston,
}

/// Result of one [`move_body`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveOutcome {
    /// Displacement asked for, after piston clamping and multipliers.
    pub requested: DVec3,
    /// Displacement actually applied.
    pub resolved: DVec3,
}

impl MoveOutcome {
    const fn new(requested: DVec3, resolved: DVec3) -> Self {
        Self {
            requested,
            resolved,
        }
    }

    /// Whether any component was cut short.
    #[must_use]
    pub fn was_blocked(&self) -> bool {
        self.requested != self.resolved
    }
}

/// Moves `body` by `movement`, resolving collisions against `ctx.world`.
///
/// Bodies with `no_clip` translate directly. Piston moves are clamped per
/// tick and dropped when nothing remains. A removed body stops right after
/// its fall update.
pub fn move_body(
    ctx: &mut MotionContext<'_>,
    body: &mut Body,
    kind: MoveKind,
    movement: DVec3,
) -> MoveOutcome {
    if body.flags.no_clip {
        body.set_position(body.position() + movement);
        body.horizontal_collision = false;
        body.vertical_collision = false;
        body.ground_collision = false;
        return MoveOutcome::new(movement, movement);
    }
    let mut movement = movement;
    if kind == MoveKind::Piston {
        movement = body
            .piston
            .clamp(movement, ctx.world.time(), ctx.config.piston_clamp);
        if movement == DVec3::ZERO {
            return MoveOutcome::new(DVec3::ZERO, DVec3::ZERO);
        }
    }
    if body.movement_multiplier.length_squared() > MOVE_EPSILON {
        if kind != MoveKind::Piston {
            movement *= body.movement_multiplier;
        }
        body.movement_multiplier = DVec3::ZERO;
        body.set_velocity(DVec3::ZERO);
    }

    let resolved = resolve_movement(ctx.world, body, movement);
    let distance = resolved.length_squared();
    if distance > MOVE_EPSILON || movement.length_squared() - distance < MOVE_EPSILON {
        if body.fall_distance != 0.0 && distance >= 1.0 {
            let reach = resolved.length().min(FALL_RESET_REACH);
            let end = body.position() + vec_normalize(resolved) * reach;
            if ctx.world.raycast_resets_fall(body.position(), end) {
                body.on_landing();
            }
        }
        let from = body.position();
        let to = from + resolved;
        body.segments.push(Segment::resolved(from, to, movement));
        body.set_position(to);
    }

    let blocked_x = !approximately_equals(movement.x, resolved.x);
    let blocked_z = !approximately_equals(movement.z, resolved.z);
    body.horizontal_collision = blocked_x || blocked_z;
    body.vertical_collision = movement.y != resolved.y;
    body.ground_collision = body.vertical_collision && movement.y < 0.0;
    let grounded = body.ground_collision;
    body.write_on_ground(grounded);
    body.update_supporting_block(ctx.world, grounded, Some(resolved));

    let world = ctx.world;
    let landing_pos = body.landing_pos();
    let landing_state = world.block_state(landing_pos);
    let grounded = body.on_ground;
    fall(ctx, body, resolved.y, grounded, landing_state, landing_pos);
    if body.is_removed() {
        return MoveOutcome::new(movement, resolved);
    }

    if body.horizontal_collision {
        let v = body.velocity();
        body.set_velocity(DVec3::new(
            if blocked_x { 0.0 } else { v.x },
            v.y,
            if blocked_z { 0.0 } else { v.z },
        ));
    }
    if movement.y != resolved.y {
        let v = body.velocity();
        let vy = ctx
            .hooks
            .on_entity_land(&Landing {
                entity: body.id(),
                pos: landing_pos,
                state: landing_state,
                velocity: v,
            })
            .unwrap_or(0.0);
        body.set_velocity(DVec3::new(v.x, vy, v.z));
    }
    if body.capabilities.emits_move_events {
        apply_move_effects(ctx, body, resolved, landing_pos, landing_state);
    }

    let multiplier = f64::from(velocity_multiplier(ctx, body));
    let v = body.velocity();
    body.set_velocity(DVec3::new(v.x * multiplier, v.y, v.z * multiplier));
    trace!(
        "entity {} moved {resolved:?} of {movement:?}, on_ground={}",
        body.id(),
        body.on_ground
    );
    MoveOutcome::new(movement, resolved)
}

/// Horizontal speed scale from the block at the feet, falling back to the
/// block below when the feet block is neutral and not water.
#[must_use]
pub fn velocity_multiplier(ctx: &MotionContext<'_>, body: &Body) -> f32 {
    let here = ctx.world.block_state(body.block_pos());
    if here.is_water() || here.velocity_multiplier != 1.0 {
        here.velocity_multiplier
    } else {
        ctx.world
            .block_state(body.velocity_affecting_pos())
            .velocity_multiplier
    }
}

fn apply_move_effects(
    ctx: &mut MotionContext<'_>,
    body: &mut Body,
    resolved: DVec3,
    landing_pos: BlockPos,
    landing_state: &BlockState,
) {
    let travelled = narrow(resolved.length() * STEP_DISTANCE_FACTOR);
    let travelled_flat = narrow(horizontal_length(resolved) * STEP_DISTANCE_FACTOR);
    let world = ctx.world;
    let stepping_pos = body.stepping_pos();
    let stepping_state = world.block_state(stepping_pos);
    body.distance_traveled += if stepping_state.climbable {
        travelled
    } else {
        travelled_flat
    };
    if body.distance_traveled > body.next_step_distance && !stepping_state.air {
        let mut stepped = can_step_on(body, landing_state);
        if stepping_pos == landing_pos {
            if stepped {
                emit(ctx, body, GameEventKind::Step, Some(landing_state.name));
            }
        } else if can_step_on(body, stepping_state) {
            emit(ctx, body, GameEventKind::Step, Some(stepping_state.name));
            stepped = true;
        }
        let next = next_step_distance(body.distance_traveled);
        if stepped {
            body.next_step_distance = next;
        } else if body.touching_water {
            body.next_step_distance = next;
            emit(ctx, body, GameEventKind::Swim, None);
        }
    } else if stepping_state.air && body.capabilities.flaps && !body.on_ground {
        emit(ctx, body, GameEventKind::Flap, None);
    }
}

fn can_step_on(body: &Body, state: &BlockState) -> bool {
    !state.air && (body.on_ground || state.climbable) && !body.flags.swimming
}

fn next_step_distance(travelled: f32) -> f32 {
    travelled.trunc() + 1.0
}

fn emit(ctx: &mut MotionContext<'_>, body: &Body, kind: GameEventKind, block: Option<&'static str>) {
    ctx.hooks.emit_game_event(&GameEvent {
        kind,
        position: body.position(),
        entity: body.id(),
        block,
    });
}
