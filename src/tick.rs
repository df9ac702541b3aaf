//! Per-body tick driver.
//!
//! [`tick_body`] runs one full movement tick: fluid state refresh, velocity
//! settling, jumping, travel and the touch pipeline. It returns the fields
//! written during the tick so callers can replicate them without diffing
//! the body.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::body::{Body, BodySnapshot, ChangedField, EntityId};
use crate::constants::{
    JUMP_BOOST_PER_LEVEL, JUMP_COOLDOWN_TICKS, PLAYER_SETTLE_SPEED_SQUARED, SETTLE_VELOCITY,
    SPRINT_JUMP_BOOST, SWIM_UP_VELOCITY,
};
use crate::error::MotionError;
use crate::fluid::update_water_state;
use crate::numeric::narrow;
use crate::touch::touch_blocks;
use crate::travel::{stop_gliding, travel, TravelMode};
use crate::vector_math::horizontal_length_squared;
use crate::world::{FluidKind, MotionContext};

/// Jump velocities at or below this are ignored.
const MIN_JUMP_VELOCITY: f32 = 1.0e-5;

/// Intent supplied for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveInput {
    /// Sideways, upward and forward input, each in `-1..=1`.
    pub movement: DVec3,
    /// Holding jump.
    pub jumping: bool,
    /// Sprinting.
    pub sprinting: bool,
}

impl MoveInput {
    /// Input walking forward at full strength.
    #[must_use]
    pub const fn forward() -> Self {
        Self {
            movement: DVec3::new(0.0, 0.0, 1.0),
            jumping: false,
            sprinting: false,
        }
    }
}

/// Outcome of one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReport {
    /// Body that ticked.
    pub entity: EntityId,
    /// Travel mode used, `None` when the body was skipped.
    pub mode: Option<TravelMode>,
    /// Field writes in the order they happened.
    pub changes: Vec<ChangedField>,
    /// State at the end of the tick.
    pub snapshot: BodySnapshot,
}

/// Runs one movement tick for `body`.
///
/// Removed bodies are skipped and report no mode.
///
/// # Errors
/// Returns [`MotionError::Collision`] when a block or fluid hook fails
/// during the touch pass. The movement itself has already been applied and
/// the field writes stay queued for the next report.
pub fn tick_body(
    ctx: &mut MotionContext<'_>,
    body: &mut Body,
    input: &MoveInput,
) -> Result<TickReport, MotionError> {
    if body.is_removed() {
        return Ok(report(body, None));
    }
    body.begin_tick();
    body.flags.jumping = input.jumping;
    body.flags.sprinting = input.sprinting;
    base_tick(ctx, body);
    settle_velocity(body);
    if body.capabilities.living {
        handle_jump(ctx, body);
    }
    if body.is_gliding() && body.on_ground() {
        stop_gliding(body);
    }
    if body.effects.slow_falling || body.effects.levitation.is_some() {
        body.on_landing();
    }
    let mode = travel(ctx, body, input.movement);
    touch_blocks(ctx, body)?;
    Ok(report(body, Some(mode)))
}

fn report(body: &mut Body, mode: Option<TravelMode>) -> TickReport {
    TickReport {
        entity: body.id(),
        mode,
        changes: body.take_changes(),
        snapshot: body.snapshot(),
    }
}

/// Refreshes fluid contact; lava halves the fall.
fn base_tick(ctx: &mut MotionContext<'_>, body: &mut Body) {
    update_water_state(ctx, body);
    if body.is_in_lava() {
        body.set_fall_distance(body.fall_distance() * 0.5);
    }
    body.first_update = false;
}

/// Drops velocity components too small to matter.
fn settle_velocity(body: &mut Body) {
    let v = body.velocity();
    let mut settled = v;
    if body.capabilities.player {
        if horizontal_length_squared(v) < PLAYER_SETTLE_SPEED_SQUARED {
            settled.x = 0.0;
            settled.z = 0.0;
        }
    } else {
        if v.x.abs() < SETTLE_VELOCITY {
            settled.x = 0.0;
        }
        if v.z.abs() < SETTLE_VELOCITY {
            settled.z = 0.0;
        }
    }
    if v.y.abs() < SETTLE_VELOCITY {
        settled.y = 0.0;
    }
    body.set_velocity(settled);
}

fn handle_jump(ctx: &MotionContext<'_>, body: &mut Body) {
    body.jump_cooldown = body.jump_cooldown.saturating_sub(1);
    if !(body.flags.jumping && body.capabilities.swims_in_fluids) {
        body.jump_cooldown = 0;
        return;
    }
    let in_lava = body.is_in_lava();
    let height = body.fluid_height(if in_lava {
        FluidKind::Lava
    } else {
        FluidKind::Water
    });
    let in_water = body.is_touching_water() && height > 0.0;
    let swim_height = body.swim_height();
    let wading = body.on_ground() && height <= swim_height;
    if (in_water || in_lava) && !wading {
        body.add_velocity(DVec3::new(0.0, f64::from(SWIM_UP_VELOCITY), 0.0));
    } else if (body.on_ground() || (in_water && height <= swim_height)) && body.jump_cooldown == 0 {
        jump(ctx, body);
        body.jump_cooldown = JUMP_COOLDOWN_TICKS;
    }
}

/// Jump velocity from the strength attribute, the block underfoot and
/// jump boost.
#[must_use]
pub fn jump_velocity(ctx: &MotionContext<'_>, body: &Body) -> f32 {
    let boost = body
        .effects
        .jump_boost
        .map_or(0.0, |level| JUMP_BOOST_PER_LEVEL * (f32::from(level) + 1.0));
    narrow(body.attributes.jump_strength) * jump_velocity_multiplier(ctx, body) + boost
}

fn jump_velocity_multiplier(ctx: &MotionContext<'_>, body: &Body) -> f32 {
    let here = ctx.world.block_state(body.block_pos()).jump_velocity_multiplier;
    if here == 1.0 {
        ctx.world
            .block_state(body.velocity_affecting_pos())
            .jump_velocity_multiplier
    } else {
        here
    }
}

fn jump(ctx: &MotionContext<'_>, body: &mut Body) {
    let strength = jump_velocity(ctx, body);
    if strength <= MIN_JUMP_VELOCITY {
        return;
    }
    let v = body.velocity();
    let mut next = DVec3::new(v.x, f64::from(strength).max(v.y), v.z);
    if body.flags.sprinting {
        let yaw = f64::from(body.yaw().to_radians());
        next += DVec3::new(-yaw.sin() * SPRINT_JUMP_BOOST, 0.0, yaw.cos() * SPRINT_JUMP_BOOST);
    }
    body.set_velocity(next);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MotionConfig;
    use crate::events::EventLog;
    use crate::geometry::BlockPos;
    use crate::terrain::VoxelTerrain;
    use crate::world::BlockState;
    use approx::assert_relative_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn stone() -> VoxelTerrain {
        VoxelTerrain::flat(8, BlockState::solid("stone"))
    }

    fn grounded(terrain: &VoxelTerrain) -> Body {
        let mut body = Body::new(EntityId(3), DVec3::new(0.5, 0.0, 0.5));
        body.set_on_ground(terrain, true);
        body
    }

    #[rstest]
    fn removed_bodies_are_skipped(stone: VoxelTerrain) {
        let config = MotionConfig::default();
        let mut log = EventLog::new();
        let mut body = grounded(&stone);
        body.take_changes();
        body.remove();
        let mut ctx = MotionContext::new(&stone, &mut log, &config);
        let report = tick_body(&mut ctx, &mut body, &MoveInput::default())
            .unwrap_or_else(|err| panic!("tick failed: {err}"));
        assert_eq!(report.mode, None);
        assert!(report.changes.is_empty());
        assert!(log.entries.is_empty());
    }

    #[rstest]
    fn tiny_velocities_settle_to_zero(stone: VoxelTerrain) {
        let mut body = grounded(&stone);
        body.set_velocity(DVec3::new(0.002, -0.001, 0.5));
        settle_velocity(&mut body);
        assert_eq!(body.velocity(), DVec3::new(0.0, 0.0, 0.5));
    }

    #[rstest]
    fn grounded_jump_rises_by_jump_strength(stone: VoxelTerrain) {
        let config = MotionConfig::default();
        let mut log = EventLog::new();
        let mut body = grounded(&stone);
        let input = MoveInput {
            jumping: true,
            ..MoveInput::default()
        };
        let mut ctx = MotionContext::new(&stone, &mut log, &config);
        let report = tick_body(&mut ctx, &mut body, &input)
            .unwrap_or_else(|err| panic!("tick failed: {err}"));
        assert_eq!(report.mode, Some(TravelMode::MidAir));
        assert_relative_eq!(body.position().y, 0.42, epsilon = 1e-6);
        assert!(!body.on_ground());
        assert_eq!(body.jump_cooldown, JUMP_COOLDOWN_TICKS);
    }

    #[rstest]
    fn honey_halves_the_jump() {
        let mut terrain = VoxelTerrain::flat(8, BlockState::solid("stone"));
        terrain.set(BlockPos::new(0, -1, 0), BlockState::honey());
        let config = MotionConfig::default();
        let mut log = EventLog::new();
        let body = grounded(&terrain);
        let ctx = MotionContext::new(&terrain, &mut log, &config);
        assert_relative_eq!(jump_velocity(&ctx, &body), 0.21, epsilon = 1e-6);
    }

    #[rstest]
    fn jump_boost_adds_per_level(stone: VoxelTerrain) {
        let config = MotionConfig::default();
        let mut log = EventLog::new();
        let mut body = grounded(&stone);
        body.effects.jump_boost = Some(1);
        let ctx = MotionContext::new(&stone, &mut log, &config);
        assert_relative_eq!(jump_velocity(&ctx, &body), 0.62, epsilon = 1e-6);
    }

    #[rstest]
    fn landing_on_the_ground_stops_gliding(stone: VoxelTerrain) {
        let config = MotionConfig::default();
        let mut log = EventLog::new();
        let mut body = grounded(&stone);
        body.set_gliding(true);
        body.take_changes();
        let mut ctx = MotionContext::new(&stone, &mut log, &config);
        let report = tick_body(&mut ctx, &mut body, &MoveInput::default())
            .unwrap_or_else(|err| panic!("tick failed: {err}"));
        assert!(!body.is_gliding());
        let glides: Vec<_> = report
            .changes
            .iter()
            .filter(|c| matches!(c, ChangedField::Gliding(_)))
            .collect();
        assert_eq!(glides, vec![&ChangedField::Gliding(true), &ChangedField::Gliding(false)]);
    }

    #[rstest]
    fn failing_hook_ends_the_tick_with_context() {
        let mut terrain = VoxelTerrain::flat(8, BlockState::solid("stone"));
        terrain.set(BlockPos::new(0, 0, 0), BlockState::cobweb());
        let config = MotionConfig::default();
        let mut log = EventLog::new();
        log.failing_blocks.push(BlockPos::new(0, 0, 0));
        let mut body = grounded(&terrain);
        let mut ctx = MotionContext::new(&terrain, &mut log, &config);
        let result = tick_body(&mut ctx, &mut body, &MoveInput::default());
        let Err(MotionError::Collision(err)) = result else {
            panic!("expected a collision error");
        };
        assert_eq!(err.pos, BlockPos::new(0, 0, 0));
        assert_eq!(err.block, "cobweb");
    }
}
