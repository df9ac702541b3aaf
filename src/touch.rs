//! Swept block and fluid touch pipeline.
//!
//! Once per tick the body's queued segments are drained and swept through
//! the voxel grid. Every block whose inside shape or fluid volume the swept
//! box reaches is reported to the hooks at most once per batch, no matter
//! how many segments cross it.

use glam::DVec3;
use hashbrown::HashSet;
use log::debug;

use crate::body::Body;
use crate::constants::TOUCH_CONTRACTION;
use crate::error::{CollisionError, CollisionTarget};
use crate::events::{BlockTouch, FluidTouch, IntersectionKind, Landing};
use crate::geometry::{blocks_in, blocks_in_ordered, collision_order, Aabb, Axis, BlockPos};
use crate::segments::Segment;
use crate::world::MotionContext;

/// Squared distance below which the body counts as not having moved since
/// the last queued segment.
const TAIL_EPSILON: f64 = 9.999_999_4e-11;
/// Squared length below which a sweep degenerates to a box scan.
const SWEEP_EPSILON: f64 = 1.0e-10;
/// Segments longer than this count as entering every touched block.
const FAR_MOVE: f64 = 0.999_990_000_000_252_6;

/// Blocks visited by `area` moving from `from` to `to`, with the sub-step
/// at which each was first reached.
///
/// `area` is the box at `to`. The starting box comes first at version 0,
/// then each crossing of an integer plane by a leading face adds the newly
/// covered blocks at the next version, then the destination box. Blocks are
/// never repeated. Visiting stops before the first block whose version
/// reaches `budget`.
///
/// Every plane crossed by any leading face counts as a sub-step, not only
/// those crossed by the leading corner, so long diagonal sweeps spend the
/// budget faster than a corner walk would while covering at least the same
/// blocks.
#[must_use]
pub fn swept_blocks(from: DVec3, to: DVec3, area: &Aabb, budget: i32) -> Vec<(BlockPos, i32)> {
    let mut visits = Vec::new();
    if budget <= 0 {
        return visits;
    }
    let delta = to - from;
    if delta.length_squared() < SWEEP_EPSILON {
        visits.extend(blocks_in(area).map(|pos| (pos, 0)));
        return visits;
    }
    let start = area.offset(-delta);
    let limit = usize::try_from(budget).unwrap_or(usize::MAX);
    let mut seen = HashSet::new();
    let mut visit = |hull: &Aabb, version: i32, visits: &mut Vec<(BlockPos, i32)>| {
        visits.extend(
            blocks_in_ordered(hull, delta)
                .filter(|pos| seen.insert(*pos))
                .map(|pos| (pos, version)),
        );
    };
    visit(&start, 0, &mut visits);
    let mut previous = 0.0;
    let mut version = 0;
    for t in crossing_times(&start, delta, limit) {
        version += 1;
        if version >= budget {
            return visits;
        }
        let hull = start
            .offset(delta * previous)
            .union(&start.offset(delta * t));
        visit(&hull, version, &mut visits);
        previous = t;
    }
    if version + 1 < budget {
        visit(area, version + 1, &mut visits);
    }
    visits
}

/// Fractions of `delta` at which a leading face of `start` crosses an
/// integer plane, ascending, at most `limit` of them.
fn crossing_times(start: &Aabb, delta: DVec3, limit: usize) -> Vec<f64> {
    let mut times = Vec::new();
    for axis in Axis::ALL {
        let d = axis.component(delta);
        if d == 0.0 {
            continue;
        }
        let (lead, plane) = if d > 0.0 {
            let lead = axis.component(start.max);
            (lead, lead.floor() + 1.0)
        } else {
            let lead = axis.component(start.min);
            (lead, lead.ceil() - 1.0)
        };
        let step = 1.0 / d.abs();
        let mut t = (plane - lead) / d;
        let mut taken = 0;
        while t <= 1.0 && taken < limit {
            times.push(t);
            t += step;
            taken += 1;
        }
    }
    times.sort_by(f64::total_cmp);
    times.truncate(limit);
    times
}

/// Reports every block and fluid the body's queued path touched this tick.
///
/// Grounded bodies first notify the block they stand on. Segments are then
/// drained oldest first; a segment carrying its requested displacement is
/// swept one axis at a time in collision order. Each segment has a sub-step
/// budget; once exhausted the remainder collapses to a single check at the
/// segment's end.
///
/// # Errors
/// A failing collision hook ends the batch with a [`CollisionError`]
/// naming the block and body involved. Blocks notified before the failure
/// keep their effects.
pub fn touch_blocks(ctx: &mut MotionContext<'_>, body: &mut Body) -> Result<(), CollisionError> {
    if body.is_removed() || body.flags.no_clip {
        return Ok(());
    }
    if body.on_ground() {
        let world = ctx.world;
        let pos = body.landing_pos();
        ctx.hooks.on_stepped_on(&Landing {
            entity: body.id(),
            pos,
            state: world.block_state(pos),
            velocity: body.velocity(),
        });
    }
    let segments = pending_segments(body);
    let mut visited = HashSet::new();
    let cap = ctx.config.touch_substep_cap;
    for segment in segments {
        let mut budget = cap;
        match segment.original {
            Some(original) if segment.delta().length_squared() > 0.0 => {
                let delta = segment.delta();
                let mut start = segment.from;
                for axis in collision_order(original) {
                    let d = axis.component(delta);
                    if d == 0.0 {
                        continue;
                    }
                    let next = start + axis.unit() * d;
                    budget -= touch_between(ctx, body, &mut visited, start, next, budget)?;
                    start = next;
                }
            }
            _ => {
                budget -= touch_between(ctx, body, &mut visited, segment.from, segment.to, cap)?;
            }
        }
        if budget <= 0 {
            debug!(
                "entity {}: touch budget exhausted between {:?} and {:?}",
                body.id(),
                segment.from,
                segment.to
            );
            touch_between(ctx, body, &mut visited, segment.to, segment.to, 1)?;
        }
    }
    Ok(())
}

/// Drains the queue, closing the gap to the current position.
fn pending_segments(body: &mut Body) -> Vec<Segment> {
    let position = body.position();
    let mut segments = body.segments.drain();
    match segments.last() {
        None => segments.push(Segment::between(body.last_position(), position)),
        Some(last) if last.to.distance_squared(position) > TAIL_EPSILON => {
            segments.push(Segment::between(last.to, position));
        }
        Some(_) => {}
    }
    segments
}

/// Touches the blocks between `from` and `to`, returning the sub-steps used.
fn touch_between(
    ctx: &mut MotionContext<'_>,
    body: &mut Body,
    visited: &mut HashSet<BlockPos>,
    from: DVec3,
    to: DVec3,
    budget: i32,
) -> Result<i32, CollisionError> {
    let world = ctx.world;
    let area = body.default_box_at(to).contract(TOUCH_CONTRACTION);
    let far = from.distance_squared(to) > FAR_MOVE * FAR_MOVE;
    let swept = body.default_box_at(from);
    let movement = to - from;
    let mut last_version = 0;
    for (pos, version) in swept_blocks(from, to, &area, budget) {
        last_version = version;
        let state = world.block_state(pos);
        if state.air {
            ctx.hooks.on_intersection(pos, IntersectionKind::InAir);
            continue;
        }
        let in_block = state.inside.is_full_cube()
            || swept.collides_swept(movement, state.inside.at_block(pos).boxes());
        let in_fluid = state
            .fluid
            .collision_box(pos)
            .is_some_and(|volume| swept.collides_swept(movement, &[volume]));
        if !(in_block || in_fluid) || !visited.insert(pos) {
            continue;
        }
        if in_block {
            let touch = BlockTouch {
                entity: body.id(),
                pos,
                state,
                entered: far || area.contains_point(pos.corner()),
            };
            ctx.hooks
                .on_block_collision(&touch)
                .map_err(|source| CollisionError {
                    target: CollisionTarget::Block,
                    pos,
                    block: state.name,
                    entity: body.snapshot(),
                    source,
                })?;
            if let Some(multiplier) = state.slows_movement {
                body.slow_movement(multiplier);
            }
        }
        if in_fluid {
            let touch = FluidTouch {
                entity: body.id(),
                pos,
                fluid: state.fluid,
            };
            ctx.hooks
                .on_fluid_collision(&touch)
                .map_err(|source| CollisionError {
                    target: CollisionTarget::Fluid,
                    pos,
                    block: state.name,
                    entity: body.snapshot(),
                    source,
                })?;
        }
        let kind = if in_fluid {
            IntersectionKind::InFluid
        } else {
            IntersectionKind::InBlock
        };
        ctx.hooks.on_intersection(pos, kind);
    }
    Ok(last_version + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::EntityId;
    use crate::config::MotionConfig;
    use crate::events::{EventLog, Recorded};
    use crate::world::{BlockState, CollisionWorld};
    use rstest::{fixture, rstest};

    /// A two-block cobweb column at the origin, a water block east of it.
    struct Web {
        web: BlockState,
        water: BlockState,
        air: BlockState,
    }

    impl CollisionWorld for Web {
        fn block_state(&self, pos: BlockPos) -> &BlockState {
            match (pos.x, pos.y, pos.z) {
                (0, 0 | 1, 0) => &self.web,
                (2, 0, 0) => &self.water,
                _ => &self.air,
            }
        }
    }

    #[fixture]
    fn web() -> Web {
        Web {
            web: BlockState::cobweb(),
            water: BlockState::water(),
            air: BlockState::air(),
        }
    }

    fn wobbling_body() -> Body {
        let mut body = Body::new(EntityId(4), DVec3::new(0.5, 0.0, 0.5));
        let path = [
            DVec3::new(0.5, 0.0, 0.5),
            DVec3::new(0.5, 0.0, 0.6),
            DVec3::new(0.5, 0.0, 0.4),
            DVec3::new(0.5, 0.0, 0.5),
        ];
        for pair in path.windows(2) {
            if let [from, to] = pair {
                body.segments.push(Segment::resolved(*from, *to, *to - *from));
            }
        }
        body
    }

    #[rstest]
    fn overlapping_segments_touch_each_block_once(web: Web) {
        let config = MotionConfig::default();
        let mut log = EventLog::new();
        let mut body = wobbling_body();
        let mut ctx = MotionContext::new(&web, &mut log, &config);
        assert!(touch_blocks(&mut ctx, &mut body).is_ok());
        assert_eq!(log.block_collisions_at(BlockPos::new(0, 0, 0)), 1);
        assert_eq!(log.block_collisions_at(BlockPos::new(0, 1, 0)), 1);
        assert!(body.segments().is_empty());
    }

    #[rstest]
    fn webs_slow_the_next_move(web: Web) {
        let config = MotionConfig::default();
        let mut log = EventLog::new();
        let mut body = wobbling_body();
        body.set_fall_distance(2.0);
        let mut ctx = MotionContext::new(&web, &mut log, &config);
        assert!(touch_blocks(&mut ctx, &mut body).is_ok());
        assert_eq!(body.movement_multiplier, DVec3::new(0.25, 0.05, 0.25));
        assert_eq!(body.fall_distance(), 0.0);
    }

    #[rstest]
    fn failing_hook_is_wrapped_with_context(web: Web) {
        let config = MotionConfig::default();
        let mut log = EventLog::new();
        log.failing_blocks.push(BlockPos::new(0, 1, 0));
        let mut body = wobbling_body();
        let mut ctx = MotionContext::new(&web, &mut log, &config);
        let err = touch_blocks(&mut ctx, &mut body)
            .err()
            .unwrap_or_else(|| panic!("expected the hook failure"));
        assert_eq!(err.target, CollisionTarget::Block);
        assert_eq!(err.pos, BlockPos::new(0, 1, 0));
        assert_eq!(err.block, "cobweb");
        assert_eq!(err.entity.id, EntityId(4));
    }

    #[rstest]
    fn fluids_are_reported_separately(web: Web) {
        let config = MotionConfig::default();
        let mut log = EventLog::new();
        let mut body = Body::new(EntityId(5), DVec3::new(2.5, 0.0, 0.5));
        body.begin_tick();
        let mut ctx = MotionContext::new(&web, &mut log, &config);
        assert!(touch_blocks(&mut ctx, &mut body).is_ok());
        assert_eq!(log.fluid_collisions_at(BlockPos::new(2, 0, 0)), 1);
        assert_eq!(log.block_collisions_at(BlockPos::new(2, 0, 0)), 0);
        assert!(log.entries.contains(&Recorded::Intersection {
            pos: BlockPos::new(2, 0, 0),
            kind: IntersectionKind::InFluid,
        }));
    }

    #[rstest]
    fn grounded_bodies_step_on_the_landing_block_first(web: Web) {
        let config = MotionConfig::default();
        let mut log = EventLog::new();
        let mut body = Body::new(EntityId(6), DVec3::new(5.5, 0.0, 5.5));
        body.on_ground = true;
        body.begin_tick();
        let mut ctx = MotionContext::new(&web, &mut log, &config);
        assert!(touch_blocks(&mut ctx, &mut body).is_ok());
        assert_eq!(
            log.entries.first(),
            Some(&Recorded::SteppedOn {
                entity: EntityId(6),
                pos: BlockPos::new(5, -1, 5),
            })
        );
    }

    #[rstest]
    fn removed_and_noclip_bodies_touch_nothing(web: Web) {
        let config = MotionConfig::default();
        let mut log = EventLog::new();
        let mut ghost = wobbling_body();
        ghost.flags.no_clip = true;
        let mut gone = wobbling_body();
        gone.remove();
        let mut ctx = MotionContext::new(&web, &mut log, &config);
        assert!(touch_blocks(&mut ctx, &mut ghost).is_ok());
        assert!(touch_blocks(&mut ctx, &mut gone).is_ok());
        assert!(log.entries.is_empty());
    }

    /// Cobwebs at x = 2 and x = 5 along the z = 0 row.
    struct Corridor {
        web: BlockState,
        air: BlockState,
    }

    impl CollisionWorld for Corridor {
        fn block_state(&self, pos: BlockPos) -> &BlockState {
            match (pos.x, pos.y, pos.z) {
                (2 | 5, 0, 0) => &self.web,
                _ => &self.air,
            }
        }
    }

    #[rstest]
    #[case::exhausted(1, 0)]
    #[case::ample(16, 1)]
    fn destination_is_touched_even_when_the_budget_runs_out(
        #[case] cap: i32,
        #[case] midway_touches: usize,
    ) {
        let corridor = Corridor {
            web: BlockState::cobweb(),
            air: BlockState::air(),
        };
        let config = MotionConfig {
            touch_substep_cap: cap,
            ..MotionConfig::default()
        };
        let mut log = EventLog::new();
        let from = DVec3::new(0.5, 0.0, 0.5);
        let to = DVec3::new(5.5, 0.0, 0.5);
        let mut body = Body::new(EntityId(7), to);
        body.segments.push(Segment::resolved(from, to, to - from));
        let mut ctx = MotionContext::new(&corridor, &mut log, &config);
        assert!(touch_blocks(&mut ctx, &mut body).is_ok());
        assert_eq!(log.block_collisions_at(BlockPos::new(5, 0, 0)), 1);
        assert_eq!(log.block_collisions_at(BlockPos::new(2, 0, 0)), midway_touches);
    }

    fn body_box(feet: DVec3) -> Aabb {
        Aabb::from_bottom_center(feet, 0.6, 1.8).contract(TOUCH_CONTRACTION)
    }

    #[rstest]
    fn long_sweeps_visit_every_block_in_order() {
        let from = DVec3::new(0.5, 0.0, 0.5);
        let to = DVec3::new(3.5, 0.0, 0.5);
        let visits = swept_blocks(from, to, &body_box(to), 16);
        let columns: Vec<i32> = visits
            .iter()
            .filter(|(pos, _)| pos.y == 0)
            .map(|(pos, _)| pos.x)
            .collect();
        assert_eq!(columns, vec![0, 1, 2, 3]);
        assert!(visits.windows(2).all(|w| match w {
            [a, b] => a.1 <= b.1,
            _ => true,
        }));
        assert_eq!(visits.first().map(|v| v.1), Some(0));
    }

    #[rstest]
    fn budget_truncates_the_sweep() {
        let from = DVec3::new(0.5, 0.0, 0.5);
        let to = DVec3::new(8.5, 0.0, 0.5);
        let visits = swept_blocks(from, to, &body_box(to), 2);
        assert!(visits.iter().all(|(_, version)| *version < 2));
        assert!(visits.iter().all(|(pos, _)| pos.x <= 2));
    }

    #[rstest]
    fn standing_still_scans_the_box() {
        let at = DVec3::new(0.5, 0.0, 0.5);
        let visits = swept_blocks(at, at, &body_box(at), 1);
        assert_eq!(visits, vec![(BlockPos::new(0, 0, 0), 0), (BlockPos::new(0, 1, 0), 0)]);
    }
}
