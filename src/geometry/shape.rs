//! Obstacle shapes built from box lists.

use glam::DVec3;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use super::{Aabb, Axis, BlockPos};
use crate::constants::COLLISION_EPSILON;

/// A solid region made of one or more boxes.
///
/// Block shapes are authored in local block space (`0..=1`) and placed with
/// [`Shape::at_block`]. A shape flagged as a full cube short-circuits the
/// inside-collision test of the touch pipeline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Shape {
    boxes: Vec<Aabb>,
    full_cube: bool,
}

impl Shape {
    /// A shape with no solid region.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            boxes: Vec::new(),
            full_cube: false,
        }
    }

    /// The unit cube in local block space.
    #[must_use]
    pub fn full_cube() -> Self {
        Self {
            boxes: vec![Aabb::new(DVec3::ZERO, DVec3::ONE)],
            full_cube: true,
        }
    }

    /// A single box in local block space.
    #[must_use]
    pub fn cuboid(min: DVec3, max: DVec3) -> Self {
        Self::from_boxes(vec![Aabb::new(min, max)])
    }

    /// A shape from arbitrary boxes.
    #[must_use]
    pub const fn from_boxes(boxes: Vec<Aabb>) -> Self {
        Self {
            boxes,
            full_cube: false,
        }
    }

    /// The boxes making up this shape.
    #[must_use]
    pub fn boxes(&self) -> &[Aabb] {
        &self.boxes
    }

    /// Whether this shape has no solid region.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Whether this shape is the canonical unit cube.
    #[must_use]
    pub const fn is_full_cube(&self) -> bool {
        self.full_cube
    }

    /// Translated copy.
    #[must_use]
    pub fn offset(&self, delta: DVec3) -> Self {
        Self {
            boxes: self.boxes.iter().map(|b| b.offset(delta)).collect(),
            full_cube: self.full_cube,
        }
    }

    /// Places a local-space shape at `pos`.
    #[must_use]
    pub fn at_block(&self, pos: BlockPos) -> Self {
        self.offset(pos.corner())
    }

    /// Tight bounds, or `None` for an empty shape.
    #[must_use]
    pub fn bounds(&self) -> Option<Aabb> {
        let (first, rest) = self.boxes.split_first()?;
        Some(rest.iter().fold(*first, |acc, b| acc.union(b)))
    }

    /// Whether any box strictly overlaps `area`.
    #[must_use]
    pub fn intersects(&self, area: &Aabb) -> bool {
        self.boxes.iter().any(|b| b.intersects(area))
    }

    /// Sorted, deduplicated face coordinates along `axis`.
    #[must_use]
    pub fn point_positions(&self, axis: Axis) -> Vec<f64> {
        let mut points: Vec<OrderedFloat<f64>> = self
            .boxes
            .iter()
            .flat_map(|b| [axis.component(b.min), axis.component(b.max)])
            .map(OrderedFloat)
            .collect();
        points.sort_unstable();
        points.dedup();
        points.into_iter().map(OrderedFloat::into_inner).collect()
    }

    /// Clips `delta` along `axis` against every box of this shape.
    #[must_use]
    pub fn max_offset(&self, axis: Axis, moving: &Aabb, delta: f64) -> f64 {
        if self.is_empty() {
            return delta;
        }
        if delta.abs() < COLLISION_EPSILON {
            return 0.0;
        }
        self.boxes
            .iter()
            .fold(delta, |d, b| b.max_offset(axis, moving, d))
    }
}

/// Clips `delta` along `axis` against a list of shapes.
///
/// Once the remaining offset falls under the collision tolerance the result
/// is exactly zero.
#[must_use]
pub fn calculate_max_offset(axis: Axis, moving: &Aabb, shapes: &[Shape], delta: f64) -> f64 {
    let mut d = delta;
    for shape in shapes {
        if d.abs() < COLLISION_EPSILON {
            return 0.0;
        }
        d = shape.max_offset(axis, moving, d);
    }
    d
}
