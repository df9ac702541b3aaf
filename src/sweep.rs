//! Per-axis sweep resolution.
//!
//! A displacement is settled one axis at a time in [`collision_order`],
//! each axis clipped against every obstacle shape offset by the motion
//! already accepted on earlier axes. The result is a pure function of the
//! box, the displacement and the obstacle list.

use glam::DVec3;

use crate::body::Body;
use crate::geometry::{calculate_max_offset, collision_order, Aabb, Shape};
use crate::step_up::try_step_up;
use crate::world::CollisionWorld;

/// Largest displacement not exceeding `delta` that keeps `bbox` out of
/// every shape in `obstacles`.
///
/// An empty obstacle list returns `delta` unchanged.
///
/// # Examples
/// ```
/// use glam::DVec3;
/// use tumble::geometry::{Aabb, BlockPos, Shape};
/// use tumble::sweep::resolve_axes;
///
/// let bbox = Aabb::from_bottom_center(DVec3::new(0.5, 2.0, 0.5), 0.6, 1.8);
/// let floor = vec![Shape::full_cube().at_block(BlockPos::new(0, 0, 0))];
/// let resolved = resolve_axes(DVec3::new(0.0, -3.0, 0.0), &bbox, &floor);
/// assert!((resolved.y + 1.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn resolve_axes(delta: DVec3, bbox: &Aabb, obstacles: &[Shape]) -> DVec3 {
    if obstacles.is_empty() {
        return delta;
    }
    collision_order(delta)
        .into_iter()
        .fold(DVec3::ZERO, |resolved, axis| {
            let d = axis.component(delta);
            if d == 0.0 {
                return resolved;
            }
            let moved = bbox.offset(resolved);
            axis.with_component(resolved, calculate_max_offset(axis, &moved, obstacles, d))
        })
}

/// Obstacles relevant to a body at `position` sweeping `area`.
///
/// Order: the given dynamic shapes, then the world border when the body is
/// close enough to touch it, then block shapes.
#[must_use]
pub fn gather_obstacles(
    world: &dyn CollisionWorld,
    position: DVec3,
    dynamic: &[Shape],
    area: &Aabb,
) -> Vec<Shape> {
    let mut shapes = dynamic.to_vec();
    let border = world.world_border();
    if border.can_collide(position, area) {
        shapes.push(border.as_shape());
    }
    shapes.extend(world.block_collisions(area));
    shapes
}

/// Resolves `delta` for a box standing at `position` against everything in
/// the world, without step assistance.
#[must_use]
pub fn adjust_for_world(
    world: &dyn CollisionWorld,
    position: DVec3,
    bbox: &Aabb,
    dynamic: &[Shape],
    delta: DVec3,
) -> DVec3 {
    let swept = bbox.stretch(delta);
    let obstacles = gather_obstacles(world, position, dynamic, &swept);
    resolve_axes(delta, bbox, &obstacles)
}

/// Resolves a body's intended displacement, including step assistance.
///
/// A zero displacement returns immediately without querying the world.
#[must_use]
pub fn resolve_movement(world: &dyn CollisionWorld, body: &Body, movement: DVec3) -> DVec3 {
    if movement.length_squared() == 0.0 {
        return movement;
    }
    let bbox = body.bounding_box();
    let dynamic = world.entity_collisions(&bbox.stretch(movement));
    let resolved = adjust_for_world(world, body.position(), &bbox, &dynamic, movement);
    try_step_up(world, body, movement, resolved, &dynamic).unwrap_or(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BlockPos;
    use approx::assert_relative_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn body_box() -> Aabb {
        Aabb::from_bottom_center(DVec3::new(0.5, 2.0, 0.5), 0.6, 1.8)
    }

    fn cube(x: i32, y: i32, z: i32) -> Shape {
        Shape::full_cube().at_block(BlockPos::new(x, y, z))
    }

    #[rstest]
    fn lands_exactly_on_the_surface(body_box: Aabb) {
        let resolved = resolve_axes(DVec3::new(0.0, -1.0, 0.0), &body_box, &[cube(0, 0, 0)]);
        assert_relative_eq!(resolved.y, -1.0);
        let lower = body_box.offset(DVec3::new(0.0, -0.5, 0.0));
        let partial = resolve_axes(DVec3::new(0.0, -1.0, 0.0), &lower, &[cube(0, 0, 0)]);
        assert_relative_eq!(partial.y, -0.5);
    }

    #[rstest]
    fn resolved_box_never_penetrates(body_box: Aabb) {
        let obstacles = vec![cube(1, 2, 0), cube(0, 1, 0), cube(0, 2, 1)];
        for delta in [
            DVec3::new(0.7, -0.9, 0.0),
            DVec3::new(0.4, -2.0, 0.6),
            DVec3::new(-0.3, -0.2, 0.9),
        ] {
            let resolved = resolve_axes(delta, &body_box, &obstacles);
            let end = body_box.offset(resolved).contract(1.0e-7);
            assert!(obstacles.iter().all(|s| !s.intersects(&end)), "{delta:?}");
        }
    }

    #[rstest]
    fn diagonal_corner_follows_collision_order(body_box: Aabb) {
        // A corner block diagonally ahead: X resolves first and slides past
        // the corner, so Z is then blocked by the block's side.
        let obstacles = vec![cube(1, 2, 1)];
        let resolved = resolve_axes(DVec3::new(0.5, 0.0, 0.5), &body_box, &obstacles);
        assert_relative_eq!(resolved.x, 0.5);
        assert_relative_eq!(resolved.z, 0.2, epsilon = 1e-12);
    }

    #[rstest]
    fn resolution_is_deterministic(body_box: Aabb) {
        let obstacles = vec![cube(1, 2, 0), cube(0, 1, 0)];
        let delta = DVec3::new(0.35, -0.6, 0.12);
        let first = resolve_axes(delta, &body_box, &obstacles);
        for _ in 0..10 {
            assert_eq!(resolve_axes(delta, &body_box, &obstacles), first);
        }
    }

    #[rstest]
    fn empty_obstacles_pass_through(body_box: Aabb) {
        let delta = DVec3::new(3.0, -4.0, 5.0);
        assert_eq!(resolve_axes(delta, &body_box, &[]), delta);
    }
}
