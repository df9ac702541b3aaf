//! Fluid height sampling and fluid push.
//!
//! Every tick the body's fluid height map is cleared and rebuilt from the
//! blocks its box overlaps. Sampling a fluid also applies that fluid's
//! current to the body's velocity.

use glam::DVec3;

use crate::body::Body;
use crate::constants::{
    FAST_LAVA_PUSH_SPEED, FULL_PUSH_DEPTH, LAVA_PUSH_SPEED, MIN_FLUID_PUSH, WATER_PUSH_SPEED,
};
use crate::events::{GameEvent, GameEventKind};
use crate::geometry::BlockPos;
use crate::numeric::floor_to_i32;
use crate::vector_math::vec_normalize;
use crate::world::{CollisionWorld, FluidKind, MotionContext};

/// Contraction applied to the body box before sampling fluids.
const SAMPLE_CONTRACTION: f64 = 0.001;
/// Velocity component under which a body counts as nearly still.
const STILL_VELOCITY: f64 = 0.003;

fn ceil_to_i32(value: f64) -> i32 {
    floor_to_i32(value.ceil())
}

/// Lava push speed for `world`.
#[must_use]
pub fn lava_push_speed(world: &dyn CollisionWorld) -> f64 {
    if world.fast_lava() {
        FAST_LAVA_PUSH_SPEED
    } else {
        LAVA_PUSH_SPEED
    }
}

/// Whether the columns around the body are loaded.
#[must_use]
pub fn is_region_loaded(world: &dyn CollisionWorld, body: &Body) -> bool {
    let area = body.bounding_box().expand(1.0);
    world.is_region_loaded(
        floor_to_i32(area.min.x),
        floor_to_i32(area.min.z),
        ceil_to_i32(area.max.x),
        ceil_to_i32(area.max.z),
    )
}

/// Samples fluid `kind` around the body, records its submersion height and
/// applies its current scaled by `speed`.
///
/// Returns whether any block of `kind` reaches the body. Unloaded regions
/// are skipped entirely and leave the map untouched.
pub fn update_movement_in_fluid(
    world: &dyn CollisionWorld,
    body: &mut Body,
    kind: FluidKind,
    speed: f64,
) -> bool {
    if !is_region_loaded(world, body) {
        return false;
    }
    let area = body.bounding_box().contract(SAMPLE_CONTRACTION);
    let pushed = body.capabilities.pushed_by_fluids;
    let mut touching = false;
    let mut height = 0.0_f64;
    let mut push = DVec3::ZERO;
    let mut sources = 0_u32;
    for x in floor_to_i32(area.min.x)..ceil_to_i32(area.max.x) {
        for y in floor_to_i32(area.min.y)..ceil_to_i32(area.max.y) {
            for z in floor_to_i32(area.min.z)..ceil_to_i32(area.max.z) {
                let fluid = world.fluid_state(BlockPos::new(x, y, z));
                if !fluid.is_of(kind) {
                    continue;
                }
                let surface = f64::from(y) + f64::from(fluid.height);
                if surface < area.min.y {
                    continue;
                }
                touching = true;
                height = height.max(surface - area.min.y);
                if pushed {
                    let flow = if height < FULL_PUSH_DEPTH {
                        fluid.flow * height
                    } else {
                        fluid.flow
                    };
                    push += flow;
                    sources += 1;
                }
            }
        }
    }
    if push.length() > 0.0 {
        if sources > 0 {
            push /= f64::from(sources);
        }
        if !body.capabilities.player {
            push = vec_normalize(push);
        }
        push *= speed;
        let v = body.velocity();
        if v.x.abs() < STILL_VELOCITY && v.z.abs() < STILL_VELOCITY && push.length() < MIN_FLUID_PUSH
        {
            push = vec_normalize(push) * MIN_FLUID_PUSH;
        }
        body.add_velocity(push);
    }
    body.fluid_heights.insert(kind, height);
    touching
}

/// Refreshes the water contact flag.
///
/// Entering water after the first tick emits [`GameEventKind::Splash`];
/// any water contact resets the fall distance.
pub fn check_water_state(ctx: &mut MotionContext<'_>, body: &mut Body) {
    if update_movement_in_fluid(ctx.world, body, FluidKind::Water, WATER_PUSH_SPEED) {
        if !body.touching_water && !body.first_update {
            ctx.hooks.emit_game_event(&GameEvent {
                kind: GameEventKind::Splash,
                position: body.position(),
                entity: body.id(),
                block: None,
            });
        }
        body.on_landing();
        body.touching_water = true;
    } else {
        body.touching_water = false;
    }
}

/// Rebuilds the fluid height map for this tick.
///
/// Returns whether the body touches water or lava.
pub fn update_water_state(ctx: &mut MotionContext<'_>, body: &mut Body) -> bool {
    body.fluid_heights.clear();
    check_water_state(ctx, body);
    let in_lava = update_movement_in_fluid(
        ctx.world,
        body,
        FluidKind::Lava,
        lava_push_speed(ctx.world),
    );
    body.touching_water || in_lava
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::EntityId;
    use crate::config::MotionConfig;
    use crate::events::EventLog;
    use crate::world::{BlockState, FluidState};
    use approx::assert_relative_eq;
    use rstest::{fixture, rstest};

    /// Water fills every block below y = 2.
    struct Pool {
        water: BlockState,
        air: BlockState,
        loaded: bool,
    }

    impl CollisionWorld for Pool {
        fn block_state(&self, pos: BlockPos) -> &BlockState {
            if pos.y < 2 {
                &self.water
            } else {
                &self.air
            }
        }

        fn is_region_loaded(&self, _: i32, _: i32, _: i32, _: i32) -> bool {
            self.loaded
        }
    }

    #[fixture]
    fn pool() -> Pool {
        Pool {
            water: BlockState::water(),
            air: BlockState::air(),
            loaded: true,
        }
    }

    #[rstest]
    fn submersion_height_is_measured_from_the_feet(pool: Pool) {
        let mut body = Body::new(EntityId(1), DVec3::new(0.5, 1.0, 0.5));
        assert!(update_movement_in_fluid(&pool, &mut body, FluidKind::Water, WATER_PUSH_SPEED));
        let expected = 1.0 + f64::from(crate::world::SOURCE_FLUID_HEIGHT) - 1.001;
        assert_relative_eq!(body.fluid_height(FluidKind::Water), expected, epsilon = 1e-6);
        assert_eq!(body.velocity(), DVec3::ZERO);
    }

    #[rstest]
    fn unloaded_regions_are_skipped(mut pool: Pool) {
        pool.loaded = false;
        let mut body = Body::new(EntityId(1), DVec3::new(0.5, 1.0, 0.5));
        assert!(!update_movement_in_fluid(&pool, &mut body, FluidKind::Water, WATER_PUSH_SPEED));
        assert_eq!(body.fluid_height(FluidKind::Water), 0.0);
    }

    #[rstest]
    fn flowing_water_pushes_at_least_the_minimum() {
        let current = BlockState::fluid(
            "water",
            FluidState::flowing(FluidKind::Water, 0.5, DVec3::new(0.1, 0.0, 0.0)),
        );
        let world = Pool {
            water: current,
            air: BlockState::air(),
            loaded: true,
        };
        let mut body = Body::new(EntityId(1), DVec3::new(0.5, 1.0, 0.5));
        update_movement_in_fluid(&world, &mut body, FluidKind::Water, WATER_PUSH_SPEED);
        assert_relative_eq!(body.velocity().x, WATER_PUSH_SPEED, epsilon = 1e-12);
    }

    #[rstest]
    fn splash_fires_once_per_entry(pool: Pool) {
        let config = MotionConfig::default();
        let mut log = EventLog::new();
        let mut body = Body::new(EntityId(1), DVec3::new(0.5, 1.0, 0.5));
        body.first_update = false;
        body.set_fall_distance(3.0);
        for _ in 0..3 {
            let mut ctx = MotionContext::new(&pool, &mut log, &config);
            update_water_state(&mut ctx, &mut body);
        }
        assert_eq!(log.events(GameEventKind::Splash).count(), 1);
        assert!(body.is_touching_water());
        assert_eq!(body.fall_distance(), 0.0);
    }
}
