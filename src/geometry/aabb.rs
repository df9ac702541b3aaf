//! Axis-aligned bounding boxes.
//!
//! [`Aabb`] is the moving volume of a body and the building block of every
//! obstacle shape. Besides the usual construction and containment helpers it
//! carries the two collision primitives the motion core needs: the
//! per-axis [`Aabb::max_offset`] clip and the swept [`Aabb::collides_swept`]
//! test.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::{Axis, BlockPos};
use crate::constants::COLLISION_EPSILON;

/// Axis-aligned box with `min <= max` on every axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner.
    pub min: DVec3,
    /// Maximum corner.
    pub max: DVec3,
}

impl Aabb {
    /// Builds a box spanning the two corners in any order.
    #[must_use]
    pub fn new(a: DVec3, b: DVec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// The unit cube occupying `pos`.
    #[must_use]
    pub fn block(pos: BlockPos) -> Self {
        let corner = pos.corner();
        Self::new(corner, corner + DVec3::ONE)
    }

    /// Box of the given footprint whose bottom face is centred on `feet`.
    #[must_use]
    pub fn from_bottom_center(feet: DVec3, width: f64, height: f64) -> Self {
        let half = width / 2.0;
        Self::new(
            DVec3::new(feet.x - half, feet.y, feet.z - half),
            DVec3::new(feet.x + half, feet.y + height, feet.z + half),
        )
    }

    /// Translated copy.
    #[must_use]
    pub fn offset(&self, delta: DVec3) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }

    /// Grows the box towards `delta` on each axis, leaving the opposite faces.
    #[must_use]
    pub fn stretch(&self, delta: DVec3) -> Self {
        let mut out = *self;
        for axis in Axis::ALL {
            let d = axis.component(delta);
            if d < 0.0 {
                out.min = axis.with_component(out.min, axis.component(out.min) + d);
            } else if d > 0.0 {
                out.max = axis.with_component(out.max, axis.component(out.max) + d);
            }
        }
        out
    }

    /// Grows every face outwards by `amount`.
    #[must_use]
    pub fn expand(&self, amount: f64) -> Self {
        self.expand_by(DVec3::splat(amount))
    }

    /// Grows each axis outwards by the matching component of `amount`.
    #[must_use]
    pub fn expand_by(&self, amount: DVec3) -> Self {
        Self::new(self.min - amount, self.max + amount)
    }

    /// Shrinks every face inwards by `amount`.
    #[must_use]
    pub fn contract(&self, amount: f64) -> Self {
        self.expand(-amount)
    }

    /// Copy with a replaced bottom face.
    #[must_use]
    pub fn with_min_y(&self, y: f64) -> Self {
        Self::new(DVec3::new(self.min.x, y, self.min.z), self.max)
    }

    /// Copy with a replaced top face.
    #[must_use]
    pub fn with_max_y(&self, y: f64) -> Self {
        Self::new(self.min, DVec3::new(self.max.x, y, self.max.z))
    }

    /// Extent along `axis`.
    #[must_use]
    pub fn len(&self, axis: Axis) -> f64 {
        axis.component(self.max) - axis.component(self.min)
    }

    /// Extent along all three axes.
    #[must_use]
    pub fn lengths(&self) -> DVec3 {
        self.max - self.min
    }

    /// Geometric centre.
    #[must_use]
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Smallest box containing both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Strict overlap test; touching faces do not intersect.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Half-open containment: the minimum face is inside, the maximum is not.
    #[must_use]
    pub fn contains_point(&self, point: DVec3) -> bool {
        point.x >= self.min.x
            && point.x < self.max.x
            && point.y >= self.min.y
            && point.y < self.max.y
            && point.z >= self.min.z
            && point.z < self.max.z
    }

    /// Slab intersection of the segment `from -> to` with this box.
    ///
    /// Returns the entry fraction along the segment when the segment enters
    /// the box from outside within `[0, 1]`.
    #[must_use]
    pub fn raycast(&self, from: DVec3, to: DVec3) -> Option<f64> {
        let delta = to - from;
        let mut enter = 0.0_f64;
        let mut exit = 1.0_f64;
        for axis in Axis::ALL {
            let d = axis.component(delta);
            let origin = axis.component(from);
            let low = axis.component(self.min);
            let high = axis.component(self.max);
            if d == 0.0 {
                if origin < low || origin > high {
                    return None;
                }
                continue;
            }
            let (near, far) = {
                let a = (low - origin) / d;
                let b = (high - origin) / d;
                if a <= b {
                    (a, b)
                } else {
                    (b, a)
                }
            };
            enter = enter.max(near);
            exit = exit.min(far);
            if enter > exit {
                return None;
            }
        }
        Some(enter)
    }

    /// Whether this box, swept by `movement`, touches any of `boxes`.
    ///
    /// Each target is inflated by half this box's size and tested against
    /// the centre path, so the sweep reduces to a point test plus a ray test.
    #[must_use]
    pub fn collides_swept(&self, movement: DVec3, boxes: &[Self]) -> bool {
        let start = self.center();
        let end = start + movement;
        let half = self.lengths() * 0.5;
        boxes.iter().any(|target| {
            let inflated = target.expand_by(half);
            inflated.contains_point(end)
                || inflated.contains_point(start)
                || inflated.raycast(start, end).is_some()
        })
    }

    /// Clips `delta` along `axis` so `moving` stops at this box's face.
    ///
    /// The box only blocks when it overlaps `moving` on both other axes by
    /// more than the collision tolerance and lies ahead of it on `axis`.
    #[must_use]
    pub fn max_offset(&self, axis: Axis, moving: &Self, delta: f64) -> f64 {
        let (a, b) = axis.others();
        let overlaps = |other: Axis| {
            other.component(self.max) - COLLISION_EPSILON > other.component(moving.min)
                && other.component(self.min) + COLLISION_EPSILON < other.component(moving.max)
        };
        if !overlaps(a) || !overlaps(b) {
            return delta;
        }
        if delta > 0.0 {
            let face = axis.component(self.min);
            let front = axis.component(moving.max);
            if face >= front - COLLISION_EPSILON {
                return delta.min(face - front);
            }
        } else if delta < 0.0 {
            let face = axis.component(self.max);
            let back = axis.component(moving.min);
            if face <= back + COLLISION_EPSILON {
                return delta.max(face - back);
            }
        }
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn body_box() -> Aabb {
        Aabb::from_bottom_center(DVec3::new(0.5, 1.5, 0.5), 0.6, 1.8)
    }

    #[rstest]
    fn new_orders_corners() {
        let b = Aabb::new(DVec3::new(1.0, -1.0, 3.0), DVec3::new(0.0, 2.0, 1.0));
        assert_eq!(b.min, DVec3::new(0.0, -1.0, 1.0));
        assert_eq!(b.max, DVec3::new(1.0, 2.0, 3.0));
    }

    #[rstest]
    fn stretch_only_moves_leading_faces(body_box: Aabb) {
        let s = body_box.stretch(DVec3::new(-1.0, 0.5, 0.0));
        assert_relative_eq!(s.min.x, body_box.min.x - 1.0);
        assert_relative_eq!(s.max.x, body_box.max.x);
        assert_relative_eq!(s.max.y, body_box.max.y + 0.5);
        assert_relative_eq!(s.min.y, body_box.min.y);
    }

    #[rstest]
    fn touching_boxes_do_not_intersect() {
        let a = Aabb::block(BlockPos::new(0, 0, 0));
        let b = Aabb::block(BlockPos::new(1, 0, 0));
        assert!(!a.intersects(&b));
        assert!(a.expand(0.01).intersects(&b));
    }

    #[rstest]
    fn max_offset_stops_at_floor(body_box: Aabb) {
        let floor = Aabb::block(BlockPos::new(0, 0, 0));
        assert_relative_eq!(floor.max_offset(Axis::Y, &body_box, -1.0), -0.5);
    }

    #[rstest]
    fn max_offset_ignores_boxes_behind(body_box: Aabb) {
        let floor = Aabb::block(BlockPos::new(0, 0, 0));
        assert_relative_eq!(floor.max_offset(Axis::Y, &body_box, 1.0), 1.0);
    }

    #[rstest]
    fn max_offset_ignores_grazing_boxes(body_box: Aabb) {
        let side = Aabb::block(BlockPos::new(1, 0, 0)).offset(DVec3::new(0.3, 0.0, 0.0));
        assert_relative_eq!(side.max_offset(Axis::Y, &body_box, -1.0), -1.0);
    }

    #[rstest]
    fn raycast_reports_entry_fraction() {
        let target = Aabb::block(BlockPos::new(2, 0, 0));
        let hit = target.raycast(DVec3::new(0.0, 0.5, 0.5), DVec3::new(4.0, 0.5, 0.5));
        assert_relative_eq!(hit.unwrap_or(f64::NAN), 0.5);
        assert!(target
            .raycast(DVec3::new(0.0, 1.5, 0.5), DVec3::new(4.0, 1.5, 0.5))
            .is_none());
    }

    #[rstest]
    fn swept_test_catches_tunnelling(body_box: Aabb) {
        let wall = Aabb::block(BlockPos::new(3, 1, 0));
        assert!(body_box.collides_swept(DVec3::new(5.0, 0.0, 0.0), &[wall]));
        assert!(!body_box.collides_swept(DVec3::new(-5.0, 0.0, 0.0), &[wall]));
    }
}
