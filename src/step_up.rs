//! Step-up assistance for low ledges.
//!
//! When horizontal motion is blocked while the body is grounded (or lands
//! during the same move), candidate heights taken from the tops of nearby
//! obstacles are tried in ascending order. The first height that lets the
//! body travel further horizontally wins.

use std::collections::BTreeSet;

use glam::DVec3;
use ordered_float::OrderedFloat;

use crate::body::Body;
use crate::geometry::{Aabb, Axis, Shape};
use crate::numeric::narrow;
use crate::sweep::{gather_obstacles, resolve_axes};
use crate::vector_math::horizontal_length_squared;
use crate::world::CollisionWorld;

/// Downward reach of the probe for bodies already on the ground.
const GROUND_PROBE: f64 = -1.0e-5;

/// Obstacle top heights above `base` usable as step targets.
///
/// Heights are measured from `base.min.y`, exclude negatives and the height
/// the body already reached, stop at `step_height`, and come back sorted
/// ascending without duplicates.
#[must_use]
pub fn collect_step_heights(
    base: &Aabb,
    obstacles: &[Shape],
    step_height: f32,
    reached: f32,
) -> Vec<f32> {
    let mut heights = BTreeSet::new();
    for shape in obstacles {
        for y in shape.point_positions(Axis::Y) {
            let height = narrow(y - base.min.y);
            if height < 0.0 || height == reached {
                continue;
            }
            if height > step_height {
                break;
            }
            heights.insert(OrderedFloat(height));
        }
    }
    heights.into_iter().map(OrderedFloat::into_inner).collect()
}

/// Attempts to climb onto the obstacle that blocked `movement`.
///
/// `resolved` is the plain per-axis result and `dynamic` the shapes of
/// other bodies along the sweep. Returns the stepped displacement, or
/// `None` when stepping is not allowed or gains nothing.
#[must_use]
pub fn try_step_up(
    world: &dyn CollisionWorld,
    body: &Body,
    movement: DVec3,
    resolved: DVec3,
    dynamic: &[Shape],
) -> Option<DVec3> {
    let step_height = body.attributes.step_height;
    let blocked_x = movement.x != resolved.x;
    let blocked_z = movement.z != resolved.z;
    let landing = movement.y != resolved.y && movement.y < 0.0;
    if step_height <= 0.0 || !(landing || body.on_ground()) || !(blocked_x || blocked_z) {
        return None;
    }
    let bbox = body.bounding_box();
    let base = if landing {
        bbox.offset(DVec3::new(0.0, resolved.y, 0.0))
    } else {
        bbox
    };
    let mut probe = base.stretch(DVec3::new(movement.x, f64::from(step_height), movement.z));
    if !landing {
        probe = probe.stretch(DVec3::new(0.0, GROUND_PROBE, 0.0));
    }
    let obstacles = gather_obstacles(world, body.position(), dynamic, &probe);
    let reached = narrow(resolved.y);
    let plain = horizontal_length_squared(resolved);
    collect_step_heights(&base, &obstacles, step_height, reached)
        .into_iter()
        .find_map(|height| {
            let attempt = resolve_axes(
                DVec3::new(movement.x, f64::from(height), movement.z),
                &base,
                &obstacles,
            );
            (horizontal_length_squared(attempt) > plain)
                .then(|| attempt + DVec3::new(0.0, base.min.y - bbox.min.y, 0.0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::EntityId;
    use crate::geometry::BlockPos;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn cube(x: i32, y: i32, z: i32) -> Shape {
        Shape::full_cube().at_block(BlockPos::new(x, y, z))
    }

    #[rstest]
    fn heights_are_sorted_bounded_and_unique() {
        let base = Aabb::from_bottom_center(DVec3::new(0.5, 1.0, 0.5), 0.6, 1.8);
        let slab = Shape::cuboid(DVec3::ZERO, DVec3::new(1.0, 0.5, 1.0)).at_block(BlockPos::new(1, 1, 0));
        let obstacles = vec![cube(1, 1, 0), slab, cube(0, 0, 0), cube(2, 1, 0)];
        let heights = collect_step_heights(&base, &obstacles, 1.0, 0.0);
        assert_eq!(heights, vec![0.5, 1.0]);
    }

    #[rstest]
    fn heights_above_the_limit_are_skipped() {
        let base = Aabb::from_bottom_center(DVec3::new(0.5, 1.0, 0.5), 0.6, 1.8);
        let heights = collect_step_heights(&base, &[cube(1, 1, 0)], 0.6, 0.0);
        assert!(heights.is_empty());
    }

    struct Ledge {
        floor: crate::world::BlockState,
        air: crate::world::BlockState,
    }

    impl CollisionWorld for Ledge {
        fn block_state(&self, pos: BlockPos) -> &crate::world::BlockState {
            if pos.y == 0 || (pos.y == 1 && pos.x >= 1) {
                &self.floor
            } else {
                &self.air
            }
        }
    }

    #[rstest]
    fn climbs_a_full_block_ledge() {
        let world = Ledge {
            floor: crate::world::BlockState::solid("stone"),
            air: crate::world::BlockState::air(),
        };
        let mut body = Body::new(EntityId(1), DVec3::new(0.5, 1.0, 0.5));
        body.attributes.step_height = 1.0;
        body.on_ground = true;
        let movement = DVec3::new(0.3, 0.0, 0.0);
        let resolved = DVec3::new(0.2, 0.0, 0.0);
        let stepped = try_step_up(&world, &body, movement, resolved, &[])
            .unwrap_or_else(|| panic!("expected a step"));
        assert_relative_eq!(stepped.y, 1.0);
        assert!(stepped.x > 0.2);
    }

    #[rstest]
    fn airborne_bodies_do_not_step() {
        let world = Ledge {
            floor: crate::world::BlockState::solid("stone"),
            air: crate::world::BlockState::air(),
        };
        let mut body = Body::new(EntityId(1), DVec3::new(0.5, 1.5, 0.5));
        body.attributes.step_height = 1.0;
        let movement = DVec3::new(0.3, 0.0, 0.0);
        assert!(try_step_up(&world, &body, movement, DVec3::new(0.2, 0.0, 0.0), &[]).is_none());
    }
}
