//! The spatial model of a moving body.
//!
//! [`Body`] owns everything the motion core mutates during a tick:
//! position, box, velocity, contact flags, the fluid height map, fall
//! distance and the queued traversal segments. Position, velocity and
//! rotation go through mutators that reject non-finite values, so a bad
//! input from a collaborator never reaches the resolver.

use std::fmt;

use glam::DVec3;
use hashbrown::HashMap;
use log::warn;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::config::MotionConfig;
use crate::constants::{DEFAULT_MOVEMENT_SPEED, STEPPING_OFFSET};
use crate::geometry::{Aabb, BlockPos};
use crate::knockback::PistonAccumulator;
use crate::numeric::{all_finite, floor_to_i32};
use crate::segments::{Segment, SegmentQueue};
use crate::world::{CollisionWorld, FluidKind};

/// Stable identifier of a body.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct EntityId(pub u64);

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl EntityId {
    /// The raw identifier.
    #[must_use]
    pub const fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Footprint of a body in one pose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Edge length of the square footprint.
    pub width: f32,
    /// Height of the box.
    pub height: f32,
    /// Height of the eyes above the feet.
    pub eye_height: f32,
}

impl Dimensions {
    /// Dimensions with the eye at 85% of the height.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            eye_height: height * 0.85,
        }
    }

    /// Dimensions scaled uniformly.
    #[must_use]
    pub fn scaled(self, scale: f32) -> Self {
        Self {
            width: self.width * scale,
            height: self.height * scale,
            eye_height: self.eye_height * scale,
        }
    }

    /// Box of these dimensions standing at `feet`.
    #[must_use]
    pub fn box_at(&self, feet: DVec3) -> Aabb {
        Aabb::from_bottom_center(feet, f64::from(self.width), f64::from(self.height))
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            width: 0.6,
            height: 1.8,
            eye_height: 1.62,
        }
    }
}

/// Body posture; each pose may have its own dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Pose {
    /// Upright.
    #[default]
    Standing,
    /// Sneaking.
    Crouching,
    /// Swimming horizontally.
    Swimming,
    /// Gliding.
    Gliding,
    /// Lying down.
    Sleeping,
}

/// Per-pose dimension overrides with a standing fallback.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoseTable {
    standing: Dimensions,
    overrides: HashMap<Pose, Dimensions>,
}

impl PoseTable {
    /// A table where every pose uses `standing`.
    #[must_use]
    pub fn uniform(standing: Dimensions) -> Self {
        Self {
            standing,
            overrides: HashMap::new(),
        }
    }

    /// Adds an override for `pose`.
    #[must_use]
    pub fn with_pose(mut self, pose: Pose, dimensions: Dimensions) -> Self {
        self.overrides.insert(pose, dimensions);
        self
    }

    /// Dimensions for `pose`.
    #[must_use]
    pub fn get(&self, pose: Pose) -> Dimensions {
        self.overrides.get(&pose).copied().unwrap_or(self.standing)
    }
}

/// Fixed traits of a body kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[expect(
    clippy::struct_excessive_bools,
    reason = "Each flag is an independent capability of a body kind."
)]
pub struct Capabilities {
    /// Runs living-body logic: water checks on fall, fall damage.
    pub living: bool,
    /// Player bodies keep raw fluid flow instead of normalising it.
    pub player: bool,
    /// Moving fluids push the body.
    pub pushed_by_fluids: bool,
    /// The body swims rather than walking along fluid floors.
    pub swims_in_fluids: bool,
    /// The body walks on water surfaces.
    pub walks_on_water: bool,
    /// The body walks on lava surfaces.
    pub walks_on_lava: bool,
    /// Flying body whose vertical drag follows ground friction.
    pub flutterer: bool,
    /// Airborne body that emits flap events.
    pub flaps: bool,
    /// Never takes fall damage.
    pub fall_damage_immune: bool,
    /// Can be pushed by other bodies.
    pub pushable: bool,
    /// Emits step, swim and flap events while moving.
    pub emits_move_events: bool,
}

impl Capabilities {
    /// A walking, swimming, pushable living body.
    pub const LIVING: Self = Self {
        living: true,
        player: false,
        pushed_by_fluids: true,
        swims_in_fluids: true,
        walks_on_water: false,
        walks_on_lava: false,
        flutterer: false,
        flaps: false,
        fall_damage_immune: false,
        pushable: true,
        emits_move_events: true,
    };

    /// A non-living object such as an item or a block.
    pub const OBJECT: Self = Self {
        living: false,
        swims_in_fluids: false,
        pushable: false,
        emits_move_events: false,
        ..Self::LIVING
    };
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::LIVING
    }
}

/// Movement attributes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    /// Base ground speed.
    pub movement_speed: f32,
    /// Maximum ledge height climbed without jumping.
    pub step_height: f32,
    /// Fall distance absorbed without damage.
    pub safe_fall_distance: f64,
    /// Scale applied to fall damage.
    pub fall_damage_multiplier: f64,
    /// Fraction of knockback ignored, `0..=1`.
    pub knockback_resistance: f64,
    /// Per-tick downward acceleration.
    pub gravity: f64,
    /// Blend towards ground speed while in water, `0..=1`.
    pub water_movement_efficiency: f32,
    /// Vertical velocity of a jump.
    pub jump_strength: f64,
}

impl Attributes {
    /// Attributes seeded from the configured defaults.
    #[must_use]
    pub fn from_config(config: &MotionConfig) -> Self {
        Self {
            step_height: config.step_height,
            safe_fall_distance: config.safe_fall_distance,
            fall_damage_multiplier: config.fall_damage_multiplier,
            gravity: config.gravity,
            ..Self::default()
        }
    }
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            movement_speed: DEFAULT_MOVEMENT_SPEED,
            step_height: crate::constants::DEFAULT_STEP_HEIGHT,
            safe_fall_distance: crate::constants::DEFAULT_SAFE_FALL_DISTANCE,
            fall_damage_multiplier: 1.0,
            knockback_resistance: 0.0,
            gravity: crate::constants::GRAVITY,
            water_movement_efficiency: 0.0,
            jump_strength: 0.42,
        }
    }
}

/// Status effects the motion core reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Effects {
    /// Caps gravity while descending.
    pub slow_falling: bool,
    /// Lifts the body; the value is the amplifier.
    pub levitation: Option<u8>,
    /// Boosts swimming speed.
    pub dolphins_grace: bool,
    /// Raises jumps; the value is the amplifier.
    pub jump_boost: Option<u8>,
}

/// Per-tick behaviour toggles set by collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[expect(
    clippy::struct_excessive_bools,
    reason = "Each flag is toggled independently by collaborators."
)]
pub struct MotionFlags {
    /// Passes through obstacles.
    pub no_clip: bool,
    /// Ignores gravity.
    pub no_gravity: bool,
    /// Skips air drag.
    pub no_drag: bool,
    /// Sprinting.
    pub sprinting: bool,
    /// Swimming.
    pub swimming: bool,
    /// Holding jump.
    pub jumping: bool,
}

/// A field write recorded for replication.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ChangedField {
    /// Position changed.
    Position(DVec3),
    /// Velocity changed.
    Velocity(DVec3),
    /// Grounded flag changed.
    OnGround(bool),
    /// Gliding flag written.
    Gliding(bool),
    /// Fall distance changed.
    FallDistance(f64),
}

/// Copy of the state used when reporting failures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodySnapshot {
    /// Body identifier.
    pub id: EntityId,
    /// Feet position.
    pub position: DVec3,
    /// Velocity.
    pub velocity: DVec3,
    /// Grounded flag.
    pub on_ground: bool,
    /// Accumulated fall distance.
    pub fall_distance: f64,
}

/// A moving body.
#[derive(Debug, Clone)]
pub struct Body {
    id: EntityId,
    position: DVec3,
    last_position: DVec3,
    velocity: DVec3,
    bbox: Aabb,
    yaw: f32,
    pitch: f32,
    pose: Pose,
    scale: f32,
    poses: PoseTable,
    gliding: bool,
    removed: bool,
    changes: Vec<ChangedField>,
    /// Fixed traits.
    pub capabilities: Capabilities,
    /// Movement attributes.
    pub attributes: Attributes,
    /// Active effects.
    pub effects: Effects,
    /// Behaviour toggles.
    pub flags: MotionFlags,
    pub(crate) on_ground: bool,
    pub(crate) horizontal_collision: bool,
    pub(crate) vertical_collision: bool,
    pub(crate) ground_collision: bool,
    pub(crate) supporting_block: Option<BlockPos>,
    pub(crate) force_supporting_update: bool,
    pub(crate) fluid_heights: HashMap<FluidKind, f64>,
    pub(crate) touching_water: bool,
    pub(crate) first_update: bool,
    pub(crate) fall_distance: f64,
    pub(crate) movement_multiplier: DVec3,
    pub(crate) distance_traveled: f32,
    pub(crate) next_step_distance: f32,
    pub(crate) jump_cooldown: u8,
    pub(crate) segments: SegmentQueue,
    pub(crate) piston: PistonAccumulator,
    pub(crate) rng: SmallRng,
}

impl Body {
    /// Creates a standing body at `position` with the default footprint.
    ///
    /// The body's random source is seeded from `id`, so identical bodies
    /// behave identically.
    #[must_use]
    pub fn new(id: EntityId, position: DVec3) -> Self {
        let poses = PoseTable::default();
        let safe_position = if position.is_finite() {
            position
        } else {
            warn!("entity {id}: rejected non-finite spawn position {position:?}");
            DVec3::ZERO
        };
        Self {
            id,
            position: safe_position,
            last_position: safe_position,
            velocity: DVec3::ZERO,
            bbox: poses.get(Pose::Standing).box_at(safe_position),
            yaw: 0.0,
            pitch: 0.0,
            pose: Pose::Standing,
            scale: 1.0,
            poses,
            gliding: false,
            removed: false,
            changes: Vec::new(),
            capabilities: Capabilities::default(),
            attributes: Attributes::default(),
            effects: Effects::default(),
            flags: MotionFlags::default(),
            on_ground: false,
            horizontal_collision: false,
            vertical_collision: false,
            ground_collision: false,
            supporting_block: None,
            force_supporting_update: false,
            fluid_heights: HashMap::new(),
            touching_water: false,
            first_update: true,
            fall_distance: 0.0,
            movement_multiplier: DVec3::ZERO,
            distance_traveled: 0.0,
            next_step_distance: 1.0,
            jump_cooldown: 0,
            segments: SegmentQueue::default(),
            piston: PistonAccumulator::default(),
            rng: SmallRng::seed_from_u64(id.into_inner()),
        }
    }

    /// Creates a body whose attributes and segment queue follow `config`.
    #[must_use]
    pub fn configured(id: EntityId, position: DVec3, config: &MotionConfig) -> Self {
        Self::new(id, position)
            .with_attributes(Attributes::from_config(config))
            .with_segment_capacity(config.segment_capacity)
    }

    /// Replaces the pose dimension table and refreshes the box.
    #[must_use]
    pub fn with_poses(mut self, poses: PoseTable) -> Self {
        self.poses = poses;
        self.refresh_box();
        self
    }

    /// Uses `dimensions` for every pose.
    #[must_use]
    pub fn with_dimensions(self, dimensions: Dimensions) -> Self {
        self.with_poses(PoseTable::uniform(dimensions))
    }

    /// Sets the capabilities.
    #[must_use]
    pub const fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Sets the attributes.
    #[must_use]
    pub const fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Resizes the segment queue, dropping queued segments.
    #[must_use]
    pub fn with_segment_capacity(mut self, capacity: usize) -> Self {
        self.segments = SegmentQueue::with_capacity(capacity);
        self
    }

    /// Identifier.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Feet position.
    #[must_use]
    pub const fn position(&self) -> DVec3 {
        self.position
    }

    /// Position at the start of the current tick.
    #[must_use]
    pub const fn last_position(&self) -> DVec3 {
        self.last_position
    }

    /// Velocity in blocks per tick.
    #[must_use]
    pub const fn velocity(&self) -> DVec3 {
        self.velocity
    }

    /// Current bounding box.
    #[must_use]
    pub const fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    /// Yaw in degrees.
    #[must_use]
    pub const fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Pitch in degrees.
    #[must_use]
    pub const fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Current pose.
    #[must_use]
    pub const fn pose(&self) -> Pose {
        self.pose
    }

    /// Uniform scale.
    #[must_use]
    pub const fn scale(&self) -> f32 {
        self.scale
    }

    /// Dimensions of the current pose at the current scale.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        self.poses.get(self.pose).scaled(self.scale)
    }

    /// Whether the body stood on something after its last move.
    #[must_use]
    pub const fn on_ground(&self) -> bool {
        self.on_ground
    }

    /// Whether the last move was blocked horizontally.
    #[must_use]
    pub const fn horizontal_collision(&self) -> bool {
        self.horizontal_collision
    }

    /// Whether the last move was blocked vertically.
    #[must_use]
    pub const fn vertical_collision(&self) -> bool {
        self.vertical_collision
    }

    /// Whether the last move was blocked while descending.
    #[must_use]
    pub const fn ground_collision(&self) -> bool {
        self.ground_collision
    }

    /// Block supporting the body, when grounded.
    #[must_use]
    pub const fn supporting_block(&self) -> Option<BlockPos> {
        self.supporting_block
    }

    /// Accumulated fall distance.
    #[must_use]
    pub const fn fall_distance(&self) -> f64 {
        self.fall_distance
    }

    /// Whether the body is gliding.
    #[must_use]
    pub const fn is_gliding(&self) -> bool {
        self.gliding
    }

    /// Whether the body touches water this tick.
    #[must_use]
    pub const fn is_touching_water(&self) -> bool {
        self.touching_water
    }

    /// Whether the body is in lava this tick.
    #[must_use]
    pub fn is_in_lava(&self) -> bool {
        !self.first_update && self.fluid_height(FluidKind::Lava) > 0.0
    }

    /// Submersion depth in `kind` this tick.
    #[must_use]
    pub fn fluid_height(&self, kind: FluidKind) -> f64 {
        self.fluid_heights.get(&kind).copied().unwrap_or(0.0)
    }

    /// Depth at which the body starts swimming.
    #[must_use]
    pub fn swim_height(&self) -> f64 {
        if self.dimensions().eye_height < 0.4 {
            0.0
        } else {
            0.4
        }
    }

    /// Queued traversal segments.
    #[must_use]
    pub const fn segments(&self) -> &SegmentQueue {
        &self.segments
    }

    /// Whether the body was removed from the simulation.
    #[must_use]
    pub const fn is_removed(&self) -> bool {
        self.removed
    }

    /// Marks the body removed; later ticks are skipped.
    pub fn remove(&mut self) {
        self.removed = true;
    }

    /// Moves the body to `position`, refreshing its box.
    ///
    /// Returns `false` and keeps the old state for non-finite input.
    pub fn set_position(&mut self, position: DVec3) -> bool {
        if !position.is_finite() {
            warn!("entity {}: rejected non-finite position {position:?}", self.id);
            return false;
        }
        if position != self.position {
            self.changes.push(ChangedField::Position(position));
        }
        self.position = position;
        self.refresh_box();
        true
    }

    /// Replaces the velocity.
    ///
    /// Returns `false` and keeps the old velocity for non-finite input.
    pub fn set_velocity(&mut self, velocity: DVec3) -> bool {
        if !velocity.is_finite() {
            warn!("entity {}: rejected non-finite velocity {velocity:?}", self.id);
            return false;
        }
        if velocity != self.velocity {
            self.changes.push(ChangedField::Velocity(velocity));
        }
        self.velocity = velocity;
        true
    }

    /// Adds `delta` to the velocity, ignoring non-finite input.
    pub fn add_velocity(&mut self, delta: DVec3) -> bool {
        if !delta.is_finite() {
            warn!("entity {}: rejected non-finite impulse {delta:?}", self.id);
            return false;
        }
        self.set_velocity(self.velocity + delta)
    }

    /// Sets yaw and pitch in degrees; pitch is clamped to `±90`.
    pub fn set_rotation(&mut self, yaw: f32, pitch: f32) -> bool {
        if !yaw.is_finite() || !pitch.is_finite() {
            warn!(
                "entity {}: rejected non-finite rotation ({yaw}, {pitch})",
                self.id
            );
            return false;
        }
        self.yaw = yaw % 360.0;
        self.pitch = pitch.clamp(-90.0, 90.0);
        true
    }

    /// Changes pose and refreshes the box.
    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
        self.refresh_box();
    }

    /// Changes scale and refreshes the box. Non-positive or non-finite
    /// scales are rejected.
    pub fn set_scale(&mut self, scale: f32) -> bool {
        if !scale.is_finite() || scale <= 0.0 {
            warn!("entity {}: rejected scale {scale}", self.id);
            return false;
        }
        self.scale = scale;
        self.refresh_box();
        true
    }

    /// Sets the grounded flag directly, refreshing the supporting block.
    pub fn set_on_ground(&mut self, world: &dyn CollisionWorld, on_ground: bool) {
        self.write_on_ground(on_ground);
        self.update_supporting_block(world, on_ground, None);
    }

    /// Overrides the fall distance, ignoring non-finite input.
    pub fn set_fall_distance(&mut self, distance: f64) {
        if !distance.is_finite() {
            warn!("entity {}: rejected fall distance {distance}", self.id);
            return;
        }
        if distance != self.fall_distance {
            self.changes.push(ChangedField::FallDistance(distance));
        }
        self.fall_distance = distance;
    }

    /// Resets the fall distance after landing or entering a fall-breaking
    /// medium.
    pub fn on_landing(&mut self) {
        self.set_fall_distance(0.0);
    }

    /// Writes the gliding flag; every write is recorded.
    pub fn set_gliding(&mut self, gliding: bool) {
        self.gliding = gliding;
        self.changes.push(ChangedField::Gliding(gliding));
    }

    /// Imposes a one-shot movement multiplier on the next move and resets
    /// the fall.
    pub fn slow_movement(&mut self, multiplier: DVec3) {
        if !all_finite(&multiplier.to_array()) {
            warn!("entity {}: rejected movement multiplier {multiplier:?}", self.id);
            return;
        }
        self.on_landing();
        self.movement_multiplier = multiplier;
    }

    /// Drops the newest queued segment.
    pub fn pop_last_segment(&mut self) -> Option<Segment> {
        self.segments.pop_last()
    }

    /// Drops every queued segment.
    pub fn clear_segments(&mut self) {
        self.segments.clear();
    }

    /// Moves the body without touching anything, clearing queued segments.
    pub fn teleport(&mut self, position: DVec3) -> bool {
        if !self.set_position(position) {
            return false;
        }
        self.last_position = position;
        self.clear_segments();
        true
    }

    /// Takes the recorded field writes.
    pub fn take_changes(&mut self) -> Vec<ChangedField> {
        std::mem::take(&mut self.changes)
    }

    /// State copy for diagnostics.
    #[must_use]
    pub fn snapshot(&self) -> BodySnapshot {
        BodySnapshot {
            id: self.id,
            position: self.position,
            velocity: self.velocity,
            on_ground: self.on_ground,
            fall_distance: self.fall_distance,
        }
    }

    /// Block containing the feet.
    #[must_use]
    pub fn block_pos(&self) -> BlockPos {
        BlockPos::containing(self.position)
    }

    /// Box the body would have at `feet`.
    #[must_use]
    pub fn default_box_at(&self, feet: DVec3) -> Aabb {
        self.dimensions().box_at(feet)
    }

    /// Block `offset` below the feet, preferring the supporting block.
    ///
    /// Blocks taller than a full cube, such as fences and walls, are not
    /// looked through; the block directly beneath is returned as is.
    #[must_use]
    pub fn pos_with_y_offset(&self, offset: f32) -> BlockPos {
        let y = floor_to_i32(self.position.y - f64::from(offset));
        match self.supporting_block {
            Some(support) if offset <= STEPPING_OFFSET => support,
            Some(support) => support.with_y(y),
            None => BlockPos::containing(self.position).with_y(y),
        }
    }

    /// Block whose landing effects apply.
    #[must_use]
    pub fn landing_pos(&self) -> BlockPos {
        self.pos_with_y_offset(crate::constants::LANDING_OFFSET)
    }

    /// Block whose friction and speed apply.
    #[must_use]
    pub fn velocity_affecting_pos(&self) -> BlockPos {
        self.pos_with_y_offset(crate::constants::VELOCITY_AFFECTING_OFFSET)
    }

    /// Block being stepped on.
    #[must_use]
    pub fn stepping_pos(&self) -> BlockPos {
        self.pos_with_y_offset(STEPPING_OFFSET)
    }

    /// Whether the block at the feet is climbable.
    #[must_use]
    pub fn is_climbing(&self, world: &dyn CollisionWorld) -> bool {
        world.block_state(self.block_pos()).climbable
    }

    pub(crate) fn write_on_ground(&mut self, on_ground: bool) {
        if on_ground != self.on_ground {
            self.changes.push(ChangedField::OnGround(on_ground));
        }
        self.on_ground = on_ground;
    }

    pub(crate) fn update_supporting_block(
        &mut self,
        world: &dyn CollisionWorld,
        on_ground: bool,
        movement: Option<DVec3>,
    ) {
        if !on_ground {
            self.force_supporting_update = false;
            self.supporting_block = None;
            return;
        }
        let feet = self.bbox.with_max_y(self.bbox.min.y).with_min_y(self.bbox.min.y - 1.0e-6);
        let mut found = world.find_supporting_block(&feet, self.position);
        if found.is_some() || self.force_supporting_update {
            self.supporting_block = found;
        } else if let Some(m) = movement {
            found = world.find_supporting_block(&feet.offset(DVec3::new(-m.x, 0.0, -m.z)), self.position);
            self.supporting_block = found;
        }
        self.force_supporting_update = found.is_none();
    }

    pub(crate) fn begin_tick(&mut self) {
        self.last_position = self.position;
    }

    fn refresh_box(&mut self) {
        self.bbox = self.dimensions().box_at(self.position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn body() -> Body {
        Body::new(EntityId(1), DVec3::new(0.5, 1.0, 0.5))
    }

    #[rstest]
    fn configured_bodies_follow_the_config() {
        let config = MotionConfig {
            segment_capacity: 8,
            safe_fall_distance: 5.0,
            ..MotionConfig::default()
        };
        let body = Body::configured(EntityId(2), DVec3::ZERO, &config);
        assert_eq!(body.segments().capacity(), 8);
        assert_eq!(body.attributes.safe_fall_distance, 5.0);
    }

    #[rstest]
    fn non_finite_position_is_dropped(mut body: Body) {
        assert!(!body.set_position(DVec3::new(f64::NAN, 0.0, 0.0)));
        assert_eq!(body.position(), DVec3::new(0.5, 1.0, 0.5));
        assert!(body.take_changes().is_empty());
    }

    #[rstest]
    fn non_finite_velocity_is_dropped(mut body: Body) {
        assert!(body.set_velocity(DVec3::new(0.1, 0.0, 0.0)));
        assert!(!body.add_velocity(DVec3::new(0.0, f64::INFINITY, 0.0)));
        assert_eq!(body.velocity(), DVec3::new(0.1, 0.0, 0.0));
    }

    #[rstest]
    fn box_follows_position_pose_and_scale(mut body: Body) {
        body.set_position(DVec3::new(2.0, 3.0, 4.0));
        let bbox = body.bounding_box();
        assert!((bbox.min.x - 1.7).abs() < 1e-9);
        assert!((bbox.max.y - 4.8).abs() < 1e-6);

        let mut crouching = body.with_poses(
            PoseTable::default().with_pose(Pose::Crouching, Dimensions::new(0.6, 1.5)),
        );
        crouching.set_pose(Pose::Crouching);
        assert!((crouching.bounding_box().max.y - 4.5).abs() < 1e-6);
        crouching.set_scale(2.0);
        assert!((crouching.bounding_box().max.y - 6.0).abs() < 1e-6);
        assert!(!crouching.set_scale(0.0));
    }

    #[rstest]
    fn gliding_writes_are_all_recorded(mut body: Body) {
        body.set_gliding(true);
        body.set_gliding(true);
        assert_eq!(
            body.take_changes(),
            vec![ChangedField::Gliding(true), ChangedField::Gliding(true)]
        );
    }

    #[rstest]
    fn landing_pos_without_support_uses_offset(body: Body) {
        assert_eq!(body.landing_pos(), BlockPos::new(0, 0, 0));
        assert_eq!(body.stepping_pos(), BlockPos::new(0, 0, 0));
        assert_eq!(body.block_pos(), BlockPos::new(0, 1, 0));
    }

    #[rstest]
    fn teleport_clears_segments(mut body: Body) {
        body.segments
            .push(Segment::between(DVec3::ZERO, DVec3::ONE));
        assert!(body.teleport(DVec3::new(5.0, 5.0, 5.0)));
        assert!(body.segments().is_empty());
        assert_eq!(body.last_position(), DVec3::new(5.0, 5.0, 5.0));
    }
}
