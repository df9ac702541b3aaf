//! Movement and collision constants shared across the motion core.
//!
//! These are the defaults behind [`crate::config::MotionConfig`]; a loaded
//! configuration may override the tunable subset.

/// Downward acceleration applied to living bodies each tick.
pub const GRAVITY: f64 = 0.08;
/// Gravity cap while slow falling and descending.
pub const SLOW_FALLING_GRAVITY: f64 = 0.01;
/// Vertical drag applied to airborne bodies.
pub const AIR_DRAG: f64 = 0.98;
/// Multiplier applied on top of block slipperiness for horizontal drag.
pub const FRICTION_FACTOR: f64 = 0.91;
/// Slipperiness of ordinary blocks.
pub const DEFAULT_SLIPPERINESS: f32 = 0.6;
/// Numerator of the grounded input speed formula (`0.6³`).
pub const GROUND_ACCELERATION: f32 = 0.216_000_02;
/// Input speed used while airborne.
pub const AIR_ACCELERATION: f32 = 0.02;
/// Default movement speed attribute.
pub const DEFAULT_MOVEMENT_SPEED: f32 = 0.1;
/// Default step height for walking bodies.
pub const DEFAULT_STEP_HEIGHT: f32 = 0.6;

/// Horizontal water damping for ordinary swimmers.
pub const WATER_BASE_SPEED: f32 = 0.8;
/// Horizontal water damping while sprinting.
pub const WATER_SPRINT_SPEED: f32 = 0.9;
/// Horizontal water damping reached at full fluid movement efficiency.
pub const WATER_BOOSTED_SPEED: f32 = 0.546_000_06;
/// Horizontal water damping under dolphin's grace.
pub const DOLPHINS_GRACE_SPEED: f32 = 0.96;
/// Input speed while swimming.
pub const SWIM_ACCELERATION: f32 = 0.02;
/// Vertical damping applied in water and shallow lava.
pub const FLUID_VERTICAL_DAMPING: f32 = 0.8;
/// Horizontal damping applied in lava.
pub const LAVA_DAMPING: f64 = 0.5;
/// Vertical velocity used to climb out of a fluid against a wall.
pub const FLUID_ESCAPE_VELOCITY: f32 = 0.3;
/// Height probe used when checking whether a fluid escape is possible.
pub const FLUID_ESCAPE_PROBE: f32 = 0.6;
/// Push speed of flowing water.
pub const WATER_PUSH_SPEED: f64 = 0.014;
/// Push speed of flowing lava.
pub const LAVA_PUSH_SPEED: f64 = 0.002_333_333_333_333_333_5;
/// Push speed of flowing lava in worlds with fast lava.
pub const FAST_LAVA_PUSH_SPEED: f64 = 0.007;
/// Minimum push magnitude for nearly still bodies.
pub const MIN_FLUID_PUSH: f64 = 0.004_500_000_000_000_000_5;
/// Submersion depth above which fluid flow applies at full strength.
pub const FULL_PUSH_DEPTH: f64 = 0.4;

/// Horizontal damping while gliding.
pub const GLIDE_HORIZONTAL_DRAG: f32 = 0.99;
/// Vertical damping while gliding.
pub const GLIDE_VERTICAL_DRAG: f32 = 0.98;

/// Upward velocity applied when climbing against a wall.
pub const CLIMB_VELOCITY: f64 = 0.2;
/// Speed clamp while on a climbable block.
pub const CLIMB_SPEED_LIMIT: f32 = 0.15;

/// Fall distance tolerance added before subtracting the safe distance.
pub const FALL_EPSILON: f64 = 1.0e-6;
/// Safe fall distance attribute of living bodies.
pub const DEFAULT_SAFE_FALL_DISTANCE: f64 = 3.0;

/// Maximum vertical velocity a grounded body gains from knockback.
pub const KNOCKBACK_VERTICAL_CAP: f64 = 0.4;
/// Per-axis per-tick displacement cap for piston pushes.
pub const PISTON_CLAMP: f64 = 0.51;
/// Strength of the push between two overlapping bodies.
pub const PUSH_STRENGTH: f64 = 0.05;

/// Number of queued traversal segments retained per body.
pub const SEGMENT_CAPACITY: usize = 100;
/// Sub-step budget of the touch pipeline per segment.
pub const TOUCH_SUBSTEP_CAP: i32 = 16;

/// Squared-length threshold below which moves count as negligible.
pub const MOVE_EPSILON: f64 = 1.0e-7;
/// Overlap tolerance used by the per-axis resolver.
pub const COLLISION_EPSILON: f64 = 1.0e-7;
/// Contraction applied to the touch pipeline's box.
pub const TOUCH_CONTRACTION: f64 = 1.0e-5;
/// Distance below the feet used to find the landing block.
pub const LANDING_OFFSET: f32 = 0.2;
/// Distance below the feet used to find the velocity-affecting block.
pub const VELOCITY_AFFECTING_OFFSET: f32 = 0.500_001;
/// Distance below the feet used to find the stepped-on block.
pub const STEPPING_OFFSET: f32 = 1.0e-5;
/// Share of travelled distance counted towards step events.
pub const STEP_DISTANCE_FACTOR: f64 = 0.6;

/// Vertical velocity gained per tick while swimming upward.
pub const SWIM_UP_VELOCITY: f32 = 0.04;
/// Ticks a living body waits between jumps.
pub const JUMP_COOLDOWN_TICKS: u8 = 10;
/// Extra jump velocity per jump boost level.
pub const JUMP_BOOST_PER_LEVEL: f32 = 0.1;
/// Horizontal boost of a sprinting jump.
pub const SPRINT_JUMP_BOOST: f64 = 0.2;
/// Velocity components under this magnitude are dropped at tick start.
pub const SETTLE_VELOCITY: f64 = 0.003;
/// Squared horizontal speed under which a player's horizontal velocity is
/// dropped at tick start.
pub const PLAYER_SETTLE_SPEED_SQUARED: f64 = 9.0e-6;
