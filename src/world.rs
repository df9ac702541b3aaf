//! The world interface consumed by the motion core.
//!
//! [`CollisionWorld`] is the read-only query surface (block and fluid state,
//! obstacle shapes, loaded regions, border, clock). [`MotionHooks`] is the
//! mutable sink the core notifies when bodies touch, land on or step on
//! blocks. Both are passed explicitly through [`MotionContext`]; nothing in
//! the crate reaches for an ambient world.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::config::MotionConfig;
use crate::error::HookError;
use crate::events::{BlockTouch, Damage, FluidTouch, GameEvent, IntersectionKind, Landing};
use crate::geometry::{blocks_in, Aabb, BlockPos, Shape};
use crate::numeric::floor_to_i32;

/// Height of a still fluid source.
pub const SOURCE_FLUID_HEIGHT: f32 = 8.0 / 9.0;

/// Fluid categories tracked by the fluid height map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FluidKind {
    /// Water. Resets falls and slows swimmers.
    Water,
    /// Lava. Heavily damps movement.
    Lava,
}

/// Fluid occupying a single block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FluidState {
    /// Fluid category, `None` when the block holds no fluid.
    pub kind: Option<FluidKind>,
    /// Surface height inside the block, `0..=1`.
    pub height: f32,
    /// Flow direction and strength.
    pub flow: DVec3,
}

impl FluidState {
    /// No fluid.
    pub const EMPTY: Self = Self {
        kind: None,
        height: 0.0,
        flow: DVec3::ZERO,
    };

    /// A still source block of `kind`.
    #[must_use]
    pub const fn source(kind: FluidKind) -> Self {
        Self {
            kind: Some(kind),
            height: SOURCE_FLUID_HEIGHT,
            flow: DVec3::ZERO,
        }
    }

    /// A flowing block of `kind`.
    #[must_use]
    pub const fn flowing(kind: FluidKind, height: f32, flow: DVec3) -> Self {
        Self {
            kind: Some(kind),
            height,
            flow,
        }
    }

    /// Whether the block holds no fluid.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.kind.is_none()
    }

    /// Whether the fluid is of `kind`.
    #[must_use]
    pub fn is_of(&self, kind: FluidKind) -> bool {
        self.kind == Some(kind)
    }

    /// Volume of the fluid at `pos`, if any.
    #[must_use]
    pub fn collision_box(&self, pos: BlockPos) -> Option<Aabb> {
        if self.is_empty() {
            return None;
        }
        let corner = pos.corner();
        Some(Aabb::new(
            corner,
            corner + DVec3::new(1.0, f64::from(self.height), 1.0),
        ))
    }
}

/// Movement-relevant description of a block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockState {
    /// Registry name, used for diagnostics.
    pub name: &'static str,
    /// Solid region bodies cannot enter.
    pub collision: Shape,
    /// Region whose overlap triggers the block collision callback.
    pub inside: Shape,
    /// Fluid contained in the block.
    pub fluid: FluidState,
    /// Ground friction; higher is slipperier. `None` uses the configured
    /// default for ordinary blocks.
    pub slipperiness: Option<f32>,
    /// Horizontal velocity scale for bodies standing on or in the block.
    pub velocity_multiplier: f32,
    /// Jump velocity scale for bodies standing on the block.
    pub jump_velocity_multiplier: f32,
    /// Whether bodies inside can climb.
    pub climbable: bool,
    /// Whether a fast fall through this block cancels the fall.
    pub resets_fall: bool,
    /// Scale applied to fall damage when landing on the block.
    pub fall_damage_factor: f32,
    /// Movement multiplier imposed on bodies inside, such as webs.
    pub slows_movement: Option<DVec3>,
    /// Whether this is an air block.
    pub air: bool,
}

impl BlockState {
    fn base(name: &'static str, collision: Shape) -> Self {
        Self {
            name,
            inside: collision.clone(),
            collision,
            fluid: FluidState::EMPTY,
            slipperiness: None,
            velocity_multiplier: 1.0,
            jump_velocity_multiplier: 1.0,
            climbable: false,
            resets_fall: false,
            fall_damage_factor: 1.0,
            slows_movement: None,
            air: false,
        }
    }

    /// Empty space.
    #[must_use]
    pub fn air() -> Self {
        Self {
            air: true,
            ..Self::base("air", Shape::empty())
        }
    }

    /// An ordinary full cube.
    #[must_use]
    pub fn solid(name: &'static str) -> Self {
        Self::base(name, Shape::full_cube())
    }

    /// A bottom half slab.
    #[must_use]
    pub fn slab(name: &'static str) -> Self {
        Self::base(
            name,
            Shape::cuboid(DVec3::ZERO, DVec3::new(1.0, 0.5, 1.0)),
        )
    }

    /// Slippery full cube.
    #[must_use]
    pub fn ice() -> Self {
        Self {
            slipperiness: Some(0.98),
            ..Self::solid("ice")
        }
    }

    /// Full cube that slows walkers.
    #[must_use]
    pub fn soul_sand() -> Self {
        Self {
            velocity_multiplier: 0.4,
            ..Self::base(
                "soul_sand",
                Shape::cuboid(DVec3::ZERO, DVec3::new(1.0, 0.875, 1.0)),
            )
        }
    }

    /// Sticky block that slows walkers and damps jumps.
    #[must_use]
    pub fn honey() -> Self {
        Self {
            velocity_multiplier: 0.4,
            jump_velocity_multiplier: 0.5,
            ..Self::base(
                "honey_block",
                Shape::cuboid(DVec3::new(0.0625, 0.0, 0.0625), DVec3::new(0.9375, 0.9375, 0.9375)),
            )
        }
    }

    /// Full cube that cushions falls.
    #[must_use]
    pub fn hay_bale() -> Self {
        Self {
            fall_damage_factor: 0.2,
            ..Self::solid("hay_block")
        }
    }

    /// Climbable block without a solid region.
    #[must_use]
    pub fn ladder() -> Self {
        Self {
            climbable: true,
            inside: Shape::full_cube(),
            ..Self::base("ladder", Shape::empty())
        }
    }

    /// Non-solid block that drags bodies passing through.
    #[must_use]
    pub fn cobweb() -> Self {
        Self {
            inside: Shape::full_cube(),
            slows_movement: Some(DVec3::new(0.25, 0.05, 0.25)),
            ..Self::base("cobweb", Shape::empty())
        }
    }

    /// A still water source.
    #[must_use]
    pub fn water() -> Self {
        Self::fluid("water", FluidState::source(FluidKind::Water))
    }

    /// A still lava source.
    #[must_use]
    pub fn lava() -> Self {
        Self::fluid("lava", FluidState::source(FluidKind::Lava))
    }

    /// A non-solid block holding `fluid`.
    #[must_use]
    pub fn fluid(name: &'static str, fluid: FluidState) -> Self {
        Self {
            fluid,
            resets_fall: fluid.is_of(FluidKind::Water),
            ..Self::base(name, Shape::empty())
        }
    }

    /// Whether the block is water.
    #[must_use]
    pub fn is_water(&self) -> bool {
        self.fluid.is_of(FluidKind::Water)
    }
}

impl Default for BlockState {
    fn default() -> Self {
        Self::air()
    }
}

/// Square world boundary centred on `(center_x, center_z)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBorder {
    /// Centre on the X axis.
    pub center_x: f64,
    /// Centre on the Z axis.
    pub center_z: f64,
    /// Edge length.
    pub size: f64,
}

/// Reach of the border slabs beyond the playable square.
const BORDER_SLAB_REACH: f64 = 1.0e9;

impl Default for WorldBorder {
    fn default() -> Self {
        Self {
            center_x: 0.0,
            center_z: 0.0,
            size: 59_999_968.0,
        }
    }
}

impl WorldBorder {
    /// West edge.
    #[must_use]
    pub fn west(&self) -> f64 {
        self.center_x - self.size / 2.0
    }

    /// East edge.
    #[must_use]
    pub fn east(&self) -> f64 {
        self.center_x + self.size / 2.0
    }

    /// North edge.
    #[must_use]
    pub fn north(&self) -> f64 {
        self.center_z - self.size / 2.0
    }

    /// South edge.
    #[must_use]
    pub fn south(&self) -> f64 {
        self.center_z + self.size / 2.0
    }

    /// Distance from `(x, z)` to the nearest edge, negative outside.
    #[must_use]
    pub fn distance_inside(&self, x: f64, z: f64) -> f64 {
        (z - self.north())
            .min(self.south() - z)
            .min(x - self.west())
            .min(self.east() - x)
    }

    /// Whether `(x, z)` lies inside the border grown by `margin`.
    #[must_use]
    pub fn contains(&self, x: f64, z: f64, margin: f64) -> bool {
        x >= self.west() - margin
            && x < self.east() + margin
            && z >= self.north() - margin
            && z < self.south() + margin
    }

    /// Whether a body at `position` sweeping `area` may touch the border.
    #[must_use]
    pub fn can_collide(&self, position: DVec3, area: &Aabb) -> bool {
        let lx = area.len(crate::geometry::Axis::X);
        let lz = area.len(crate::geometry::Axis::Z);
        let reach = abs_max(lx, lz).max(1.0);
        self.distance_inside(position.x, position.z) < reach * 2.0
            && self.contains(position.x, position.z, reach)
    }

    /// Solid region outside the border as four slabs.
    #[must_use]
    pub fn as_shape(&self) -> Shape {
        let far = BORDER_SLAB_REACH;
        let slab = |min: DVec3, max: DVec3| Aabb::new(min, max);
        Shape::from_boxes(vec![
            slab(
                DVec3::new(-far, -far, -far),
                DVec3::new(self.west(), far, far),
            ),
            slab(
                DVec3::new(self.east(), -far, -far),
                DVec3::new(far, far, far),
            ),
            slab(
                DVec3::new(self.west(), -far, -far),
                DVec3::new(self.east(), far, self.north()),
            ),
            slab(
                DVec3::new(self.west(), -far, self.south()),
                DVec3::new(self.east(), far, far),
            ),
        ])
    }
}

/// Larger of two magnitudes.
#[must_use]
pub fn abs_max(a: f64, b: f64) -> f64 {
    a.abs().max(b.abs())
}

/// Read-only world queries used during a body's tick.
///
/// Only [`CollisionWorld::block_state`] is required; every other query has a
/// default derived from it. Implementors with spatial indices or dynamic
/// obstacles override the relevant methods.
pub trait CollisionWorld {
    /// Block at `pos`. Unknown positions are air.
    fn block_state(&self, pos: BlockPos) -> &BlockState;

    /// Fluid at `pos`.
    fn fluid_state(&self, pos: BlockPos) -> FluidState {
        self.block_state(pos).fluid
    }

    /// Shapes of other bodies (boats, shulkers) overlapping `area`.
    fn entity_collisions(&self, _area: &Aabb) -> Vec<Shape> {
        Vec::new()
    }

    /// Block collision shapes intersecting `area`, placed in world space.
    fn block_collisions(&self, area: &Aabb) -> Vec<Shape> {
        blocks_in(&area.expand(crate::constants::COLLISION_EPSILON))
            .filter_map(|pos| {
                let state = self.block_state(pos);
                if state.collision.is_empty() {
                    return None;
                }
                let placed = state.collision.at_block(pos);
                placed.intersects(area).then_some(placed)
            })
            .collect()
    }

    /// Whether every column in the inclusive range is loaded.
    fn is_region_loaded(&self, _min_x: i32, _min_z: i32, _max_x: i32, _max_z: i32) -> bool {
        true
    }

    /// Whether the column holding `pos` is loaded.
    fn is_chunk_loaded(&self, pos: BlockPos) -> bool {
        self.is_region_loaded(pos.x, pos.z, pos.x, pos.z)
    }

    /// The world border.
    fn world_border(&self) -> WorldBorder {
        WorldBorder::default()
    }

    /// Current world time in ticks.
    fn time(&self) -> u64 {
        0
    }

    /// Lowest buildable Y.
    fn bottom_y(&self) -> i32 {
        -64
    }

    /// Whether lava flows and pushes at the fast rate.
    fn fast_lava(&self) -> bool {
        false
    }

    /// Nearest block whose collision shape intersects `area`.
    ///
    /// Distance is measured from `origin` to block centres; ties prefer the
    /// position ordered last by `(y, z, x)`.
    fn find_supporting_block(&self, area: &Aabb, origin: DVec3) -> Option<BlockPos> {
        let mut best: Option<(BlockPos, f64)> = None;
        for pos in blocks_in(&area.expand(crate::constants::COLLISION_EPSILON)) {
            let state = self.block_state(pos);
            if !state.collision.at_block(pos).intersects(area) {
                continue;
            }
            let distance = pos.center().distance_squared(origin);
            let better = match best {
                None => true,
                Some((current, d)) => {
                    distance < d
                        || (distance == d
                            && (current.y, current.z, current.x) < (pos.y, pos.z, pos.x))
                }
            };
            if better {
                best = Some((pos, distance));
            }
        }
        best.map(|(pos, _)| pos)
    }

    /// Whether no solid obstacle intersects `area`.
    fn is_space_empty(&self, area: &Aabb) -> bool {
        self.entity_collisions(area).iter().all(|s| !s.intersects(area))
            && self.block_collisions(area).is_empty()
    }

    /// Whether any block overlapping `area` holds fluid.
    fn contains_fluid(&self, area: &Aabb) -> bool {
        let min = BlockPos::containing(area.min);
        let max = BlockPos::new(
            floor_to_i32(area.max.x.ceil()),
            floor_to_i32(area.max.y.ceil()),
            floor_to_i32(area.max.z.ceil()),
        );
        (min.x..max.x).any(|x| {
            (min.y..max.y).any(|y| {
                (min.z..max.z).any(|z| !self.fluid_state(BlockPos::new(x, y, z)).is_empty())
            })
        })
    }

    /// Whether the segment crosses a fall-resetting block or water.
    fn raycast_resets_fall(&self, from: DVec3, to: DVec3) -> bool {
        blocks_in(&Aabb::new(from, to)).any(|pos| {
            let state = self.block_state(pos);
            let resets = (state.resets_fall && !state.collision.is_empty())
                || state.fluid.is_of(FluidKind::Water);
            resets && Aabb::block(pos).raycast(from, to).is_some()
        })
    }
}

/// Notifications the motion core sends to collaborators.
///
/// Collision callbacks may fail; the failure is wrapped with context and
/// ends the body's tick. Every method defaults to a no-op.
pub trait MotionHooks {
    /// A body's swept path touched a block's inside shape.
    ///
    /// # Errors
    /// Implementations return [`HookError`] to abort the body's tick.
    fn on_block_collision(&mut self, _touch: &BlockTouch<'_>) -> Result<(), HookError> {
        Ok(())
    }

    /// A body's swept path touched a block's fluid volume.
    ///
    /// # Errors
    /// Implementations return [`HookError`] to abort the body's tick.
    fn on_fluid_collision(&mut self, _touch: &FluidTouch) -> Result<(), HookError> {
        Ok(())
    }

    /// A grounded body stands on `landing.pos` during the touch pass.
    fn on_stepped_on(&mut self, _landing: &Landing<'_>) {}

    /// A move ended with its vertical component blocked.
    ///
    /// `landing.velocity` is the velocity before the vertical reset. The
    /// returned value replaces the vertical velocity; `None` stops the body.
    fn on_entity_land(&mut self, _landing: &Landing<'_>) -> Option<f64> {
        None
    }

    /// A falling body reached the ground with positive fall distance.
    fn on_landed_upon(&mut self, _landing: &Landing<'_>, _fall_distance: f64) {}

    /// A discrete game event fired.
    fn emit_game_event(&mut self, _event: &GameEvent) {}

    /// The body took damage from movement.
    fn apply_damage(&mut self, _damage: &Damage) {}

    /// Debug report for each block the touch pipeline visits.
    fn on_intersection(&mut self, _pos: BlockPos, _kind: IntersectionKind) {}
}

/// Hook sink that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl MotionHooks for NoHooks {}

/// Everything a body's tick needs besides the body itself.
pub struct MotionContext<'a> {
    /// World queries.
    pub world: &'a dyn CollisionWorld,
    /// Collaborator notifications.
    pub hooks: &'a mut dyn MotionHooks,
    /// Tunables.
    pub config: &'a MotionConfig,
}

impl<'a> MotionContext<'a> {
    /// Bundles the collaborators for one tick.
    pub fn new(
        world: &'a dyn CollisionWorld,
        hooks: &'a mut dyn MotionHooks,
        config: &'a MotionConfig,
    ) -> Self {
        Self {
            world,
            hooks,
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    fn border_collides_only_near_the_edge() {
        let border = WorldBorder {
            center_x: 0.0,
            center_z: 0.0,
            size: 20.0,
        };
        let body = Aabb::from_bottom_center(DVec3::new(9.5, 0.0, 0.0), 0.6, 1.8);
        assert!(border.can_collide(DVec3::new(9.5, 0.0, 0.0), &body));
        let inner = Aabb::from_bottom_center(DVec3::ZERO, 0.6, 1.8);
        assert!(!border.can_collide(DVec3::ZERO, &inner));
    }

    #[rstest]
    fn border_shape_blocks_leaving_bodies() {
        let border = WorldBorder {
            center_x: 0.0,
            center_z: 0.0,
            size: 20.0,
        };
        let body = Aabb::from_bottom_center(DVec3::new(9.5, 0.0, 0.0), 0.6, 1.8);
        let d = border
            .as_shape()
            .max_offset(crate::geometry::Axis::X, &body, 2.0);
        assert_relative_eq!(d, 0.2, epsilon = 1e-9);
    }

    #[rstest]
    fn fluid_box_follows_surface_height() {
        let water = FluidState::source(FluidKind::Water);
        let area = water.collision_box(BlockPos::new(1, 2, 3));
        assert_relative_eq!(
            area.map_or(0.0, |b| b.max.y),
            2.0 + f64::from(SOURCE_FLUID_HEIGHT)
        );
        assert!(FluidState::EMPTY.collision_box(BlockPos::default()).is_none());
    }
}
