//! Movement dispatcher.
//!
//! Each tick a body integrates its velocity in exactly one [`TravelMode`],
//! chosen in priority order: submerged swimmers travel in fluid, gliding
//! bodies glide, everything else travels mid-air. Every mode ends with a
//! single [`move_body`] call.

use glam::DVec3;
use serde::Serialize;

use crate::body::Body;
use crate::constants::{
    AIR_ACCELERATION, CLIMB_SPEED_LIMIT, CLIMB_VELOCITY, DOLPHINS_GRACE_SPEED,
    FLUID_ESCAPE_PROBE, FLUID_ESCAPE_VELOCITY, FLUID_VERTICAL_DAMPING, GLIDE_HORIZONTAL_DRAG,
    GLIDE_VERTICAL_DRAG, GROUND_ACCELERATION, LAVA_DAMPING, SLOW_FALLING_GRAVITY,
    SWIM_ACCELERATION, WATER_BASE_SPEED, WATER_BOOSTED_SPEED, WATER_SPRINT_SPEED,
};
use crate::events::{Damage, DamageCause};
use crate::mover::{move_body, MoveKind};
use crate::numeric::narrow;
use crate::vector_math::{horizontal_length, input_to_velocity, rotation_vector};
use crate::world::{FluidKind, MotionContext};

/// Velocity integration mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TravelMode {
    /// Walking, falling or flying.
    MidAir,
    /// Swimming in water or wading through lava.
    InFluid,
    /// Gliding on wings.
    Gliding,
}

/// Mode the body travels in this tick.
#[must_use]
pub fn select_mode(ctx: &MotionContext<'_>, body: &Body) -> TravelMode {
    let fluid = ctx.world.fluid_state(body.block_pos());
    let walks_on_fluid = (fluid.is_of(FluidKind::Water) && body.capabilities.walks_on_water)
        || (fluid.is_of(FluidKind::Lava) && body.capabilities.walks_on_lava);
    if (body.is_touching_water() || body.is_in_lava())
        && body.capabilities.swims_in_fluids
        && !walks_on_fluid
    {
        TravelMode::InFluid
    } else if body.is_gliding() {
        TravelMode::Gliding
    } else {
        TravelMode::MidAir
    }
}

/// Integrates `input` (sideways, upward, forward) for one tick and moves
/// the body. Returns the mode used.
pub fn travel(ctx: &mut MotionContext<'_>, body: &mut Body, input: DVec3) -> TravelMode {
    let mode = select_mode(ctx, body);
    match mode {
        TravelMode::InFluid => travel_in_fluid(ctx, body, input),
        TravelMode::Gliding => travel_gliding(ctx, body, input),
        TravelMode::MidAir => travel_mid_air(ctx, body, input),
    }
    mode
}

/// Gravity after effects and flags.
///
/// Slow falling caps gravity while descending; `no_gravity` zeroes it.
#[must_use]
pub fn effective_gravity(body: &Body) -> f64 {
    let gravity = body.attributes.gravity;
    if body.flags.no_gravity {
        0.0
    } else if body.velocity().y <= 0.0 && body.effects.slow_falling {
        gravity.min(SLOW_FALLING_GRAVITY)
    } else {
        gravity
    }
}

/// Horizontal damping and input acceleration for a swimmer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwimFactors {
    /// Horizontal velocity kept per tick.
    pub damping: f32,
    /// Input acceleration.
    pub acceleration: f32,
}

/// Swim factors blended by the water movement efficiency attribute.
///
/// Efficiency is halved off the ground. Dolphin's grace overrides the
/// damping.
///
/// # Examples
/// ```
/// use glam::DVec3;
/// use tumble::body::{Body, EntityId};
/// use tumble::travel::swim_factors;
///
/// let mut body = Body::new(EntityId(1), DVec3::ZERO);
/// assert!((swim_factors(&body).damping - 0.8).abs() < 1e-6);
/// body.attributes.water_movement_efficiency = 1.0;
/// assert!(swim_factors(&body).damping < 0.8);
/// ```
#[must_use]
pub fn swim_factors(body: &Body) -> SwimFactors {
    let mut damping = if body.flags.sprinting {
        WATER_SPRINT_SPEED
    } else {
        WATER_BASE_SPEED
    };
    let mut acceleration = SWIM_ACCELERATION;
    let mut efficiency = body.attributes.water_movement_efficiency;
    if !body.on_ground() {
        efficiency *= 0.5;
    }
    if efficiency > 0.0 {
        damping += (WATER_BOOSTED_SPEED - damping) * efficiency;
        acceleration += (body.attributes.movement_speed - acceleration) * efficiency;
    }
    if body.effects.dolphins_grace {
        damping = DOLPHINS_GRACE_SPEED;
    }
    SwimFactors {
        damping,
        acceleration,
    }
}

/// Vertical correction applied to bodies sinking through fluid.
///
/// Sprinting swimmers and weightless bodies are left alone. A falling body
/// whose velocity already sits near `-gravity / 16` snaps to `-0.003`.
#[must_use]
pub fn fluid_moving_speed(body: &Body, gravity: f64, falling: bool, motion: DVec3) -> DVec3 {
    if gravity == 0.0 || body.flags.sprinting {
        return motion;
    }
    let sink = gravity / 16.0;
    let y = if falling && (motion.y - 0.005).abs() >= 0.003 && (motion.y - sink).abs() < 0.003 {
        -0.003
    } else {
        motion.y - sink
    };
    DVec3::new(motion.x, y, motion.z)
}

/// Ends gliding with two recorded writes so observers see the transition.
pub fn stop_gliding(body: &mut Body) {
    body.set_gliding(true);
    body.set_gliding(false);
}

fn travel_mid_air(ctx: &mut MotionContext<'_>, body: &mut Body, input: DVec3) {
    let world = ctx.world;
    let below = body.velocity_affecting_pos();
    let slipperiness = if body.on_ground() {
        world
            .block_state(below)
            .slipperiness
            .unwrap_or(ctx.config.default_slipperiness)
    } else {
        1.0
    };
    let friction = slipperiness * narrow(ctx.config.friction_factor);
    let v = apply_movement_input(ctx, body, input, slipperiness);
    let mut y = v.y;
    if let Some(amplifier) = body.effects.levitation {
        y += (0.05 * f64::from(u16::from(amplifier) + 1) - v.y) * 0.2;
    } else if world.is_chunk_loaded(below) {
        y -= effective_gravity(body);
    } else if body.position().y > f64::from(world.bottom_y()) {
        y = -0.1;
    } else {
        y = 0.0;
    }
    if body.flags.no_drag {
        body.set_velocity(DVec3::new(v.x, y, v.z));
    } else {
        let horizontal = f64::from(friction);
        let vertical = if body.capabilities.flutterer {
            horizontal
        } else {
            f64::from(narrow(ctx.config.air_drag))
        };
        body.set_velocity(DVec3::new(v.x * horizontal, y * vertical, v.z * horizontal));
    }
}

fn input_speed(body: &Body, slipperiness: f32) -> f32 {
    if body.on_ground() {
        body.attributes.movement_speed
            * (GROUND_ACCELERATION / (slipperiness * slipperiness * slipperiness))
    } else {
        AIR_ACCELERATION
    }
}

fn apply_movement_input(
    ctx: &mut MotionContext<'_>,
    body: &mut Body,
    input: DVec3,
    slipperiness: f32,
) -> DVec3 {
    let speed = input_speed(body, slipperiness);
    body.add_velocity(input_to_velocity(input, speed, body.yaw()));
    if body.is_climbing(ctx.world) {
        body.on_landing();
        let limit = f64::from(CLIMB_SPEED_LIMIT);
        let v = body.velocity();
        body.set_velocity(DVec3::new(
            v.x.clamp(-limit, limit),
            v.y.max(-limit),
            v.z.clamp(-limit, limit),
        ));
    }
    let velocity = body.velocity();
    move_body(ctx, body, MoveKind::SelfMove, velocity);
    let v = body.velocity();
    if (body.horizontal_collision() || body.flags.jumping) && body.is_climbing(ctx.world) {
        DVec3::new(v.x, CLIMB_VELOCITY, v.z)
    } else {
        v
    }
}

fn travel_in_fluid(ctx: &mut MotionContext<'_>, body: &mut Body, input: DVec3) {
    let falling = body.velocity().y <= 0.0;
    let start_y = body.position().y;
    let gravity = effective_gravity(body);
    if body.is_touching_water() {
        travel_in_water(ctx, body, input, gravity, falling);
    } else {
        travel_in_lava(ctx, body, input, gravity, falling);
    }
    reset_vertical_in_fluid(ctx, body, start_y);
}

fn travel_in_water(
    ctx: &mut MotionContext<'_>,
    body: &mut Body,
    input: DVec3,
    gravity: f64,
    falling: bool,
) {
    let factors = swim_factors(body);
    body.add_velocity(input_to_velocity(input, factors.acceleration, body.yaw()));
    let velocity = body.velocity();
    move_body(ctx, body, MoveKind::SelfMove, velocity);
    let mut v = body.velocity();
    if body.horizontal_collision() && body.is_climbing(ctx.world) {
        v.y = CLIMB_VELOCITY;
    }
    let damping = f64::from(factors.damping);
    v *= DVec3::new(damping, f64::from(FLUID_VERTICAL_DAMPING), damping);
    body.set_velocity(fluid_moving_speed(body, gravity, falling, v));
}

fn travel_in_lava(
    ctx: &mut MotionContext<'_>,
    body: &mut Body,
    input: DVec3,
    gravity: f64,
    falling: bool,
) {
    body.add_velocity(input_to_velocity(input, SWIM_ACCELERATION, body.yaw()));
    let velocity = body.velocity();
    move_body(ctx, body, MoveKind::SelfMove, velocity);
    let v = body.velocity();
    if body.fluid_height(FluidKind::Lava) <= body.swim_height() {
        let damped = v * DVec3::new(LAVA_DAMPING, f64::from(FLUID_VERTICAL_DAMPING), LAVA_DAMPING);
        body.set_velocity(fluid_moving_speed(body, gravity, falling, damped));
    } else {
        body.set_velocity(v * LAVA_DAMPING);
    }
    if gravity != 0.0 {
        body.add_velocity(DVec3::new(0.0, -gravity / 4.0, 0.0));
    }
}

/// Lets a swimmer pressed against a wall climb out when the space above is
/// free of blocks and fluid.
fn reset_vertical_in_fluid(ctx: &MotionContext<'_>, body: &mut Body, start_y: f64) {
    if !body.horizontal_collision() {
        return;
    }
    let v = body.velocity();
    let lift = v.y + f64::from(FLUID_ESCAPE_PROBE) - body.position().y + start_y;
    let probe = body.bounding_box().offset(DVec3::new(v.x, lift, v.z));
    if ctx.world.is_space_empty(&probe) && !ctx.world.contains_fluid(&probe) {
        body.set_velocity(DVec3::new(v.x, f64::from(FLUID_ESCAPE_VELOCITY), v.z));
    }
}

fn travel_gliding(ctx: &mut MotionContext<'_>, body: &mut Body, input: DVec3) {
    if body.is_climbing(ctx.world) {
        travel_mid_air(ctx, body, input);
        stop_gliding(body);
        return;
    }
    let before = horizontal_length(body.velocity());
    body.set_velocity(gliding_velocity(body, body.velocity()));
    let velocity = body.velocity();
    move_body(ctx, body, MoveKind::SelfMove, velocity);
    if body.horizontal_collision() {
        let after = horizontal_length(body.velocity());
        let amount = narrow((before - after) * 10.0 - 3.0);
        if amount > 0.0 {
            log::debug!("entity {} glided into a wall for {amount} damage", body.id());
            ctx.hooks.apply_damage(&Damage {
                entity: body.id(),
                cause: DamageCause::FlyIntoWall,
                amount,
            });
        }
    }
}

/// Next gliding velocity from the look direction and `old`.
///
/// Lift scales with `cos²(pitch)`; diving converts height into speed and
/// climbing converts speed into height. Horizontal velocity is steered a
/// tenth of the way towards the look direction each tick.
#[must_use]
pub fn gliding_velocity(body: &Body, old: DVec3) -> DVec3 {
    let look = rotation_vector(body.pitch(), body.yaw());
    let pitch = body.pitch().to_radians();
    let look_flat = look.x.hypot(look.z);
    let speed = horizontal_length(old);
    let gravity = effective_gravity(body);
    let lift = f64::from(pitch).cos().powi(2);
    let mut v = old + DVec3::new(0.0, gravity * (-1.0 + lift * 0.75), 0.0);
    if v.y < 0.0 && look_flat > 0.0 {
        let i = v.y * -0.1 * lift;
        v += DVec3::new(look.x * i / look_flat, i, look.z * i / look_flat);
    }
    if pitch < 0.0 && look_flat > 0.0 {
        let i = speed * -f64::from(pitch.sin()) * 0.04;
        v += DVec3::new(-look.x * i / look_flat, i * 3.2, -look.z * i / look_flat);
    }
    if look_flat > 0.0 {
        v += DVec3::new(
            (look.x / look_flat * speed - v.x) * 0.1,
            0.0,
            (look.z / look_flat * speed - v.z) * 0.1,
        );
    }
    let horizontal = f64::from(GLIDE_HORIZONTAL_DRAG);
    v * DVec3::new(horizontal, f64::from(GLIDE_VERTICAL_DRAG), horizontal)
}
