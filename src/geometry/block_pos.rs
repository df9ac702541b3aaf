//! Integer block coordinates and box-to-block iteration.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::Aabb;
use crate::numeric::floor_to_i32;

/// Integer coordinate of a unit voxel.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct BlockPos {
    /// East-west coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
    /// North-south coordinate.
    pub z: i32,
}

impl BlockPos {
    /// Creates a block position.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The block containing `point`.
    #[must_use]
    pub fn containing(point: DVec3) -> Self {
        Self::new(
            floor_to_i32(point.x),
            floor_to_i32(point.y),
            floor_to_i32(point.z),
        )
    }

    /// Minimum corner of the block.
    #[must_use]
    pub fn corner(self) -> DVec3 {
        DVec3::new(f64::from(self.x), f64::from(self.y), f64::from(self.z))
    }

    /// Centre of the block.
    #[must_use]
    pub fn center(self) -> DVec3 {
        self.corner() + DVec3::splat(0.5)
    }

    /// Same column, different height.
    #[must_use]
    pub const fn with_y(self, y: i32) -> Self {
        Self::new(self.x, y, self.z)
    }

    /// The block directly above.
    #[must_use]
    pub const fn up(self) -> Self {
        Self::new(self.x, self.y.saturating_add(1), self.z)
    }

    /// The block directly below.
    #[must_use]
    pub const fn down(self) -> Self {
        Self::new(self.x, self.y.saturating_sub(1), self.z)
    }
}

impl From<(i32, i32, i32)> for BlockPos {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self::new(x, y, z)
    }
}

/// Iterates every block whose cell the box touches, bounds inclusive.
///
/// Iteration runs `x` fastest, then `y`, then `z`.
pub fn blocks_in(area: &Aabb) -> impl Iterator<Item = BlockPos> {
    blocks_in_ordered(area, DVec3::ZERO)
}

/// Iterates the blocks of `area` visiting cells nearest the origin of
/// `direction` first on each axis.
pub fn blocks_in_ordered(area: &Aabb, direction: DVec3) -> impl Iterator<Item = BlockPos> {
    let min = BlockPos::containing(area.min);
    let max = BlockPos::containing(area.max);
    let xs = AxisRange::new(min.x, max.x, direction.x < 0.0);
    let ys = AxisRange::new(min.y, max.y, direction.y < 0.0);
    let zs = AxisRange::new(min.z, max.z, direction.z < 0.0);
    zs.iter().flat_map(move |z| {
        ys.iter()
            .flat_map(move |y| xs.iter().map(move |x| BlockPos::new(x, y, z)))
    })
}

#[derive(Clone, Copy)]
struct AxisRange {
    low: i32,
    high: i32,
    descending: bool,
}

impl AxisRange {
    const fn new(low: i32, high: i32, descending: bool) -> Self {
        Self {
            low,
            high,
            descending,
        }
    }

    fn iter(self) -> Box<dyn Iterator<Item = i32>> {
        if self.descending {
            Box::new((self.low..=self.high).rev())
        } else {
            Box::new(self.low..=self.high)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn containing_floors_negative_coordinates() {
        assert_eq!(
            BlockPos::containing(DVec3::new(-0.1, 2.0, 3.9)),
            BlockPos::new(-1, 2, 3)
        );
    }

    #[rstest]
    fn blocks_in_covers_inclusive_cells() {
        let area = Aabb::new(DVec3::new(0.2, 0.0, 0.2), DVec3::new(1.2, 0.5, 0.8));
        let blocks: Vec<_> = blocks_in(&area).collect();
        assert_eq!(blocks, vec![BlockPos::new(0, 0, 0), BlockPos::new(1, 0, 0)]);
    }

    #[rstest]
    fn ordered_iteration_starts_from_the_far_side_when_moving_negative() {
        let area = Aabb::new(DVec3::new(0.2, 0.0, 0.2), DVec3::new(1.2, 0.5, 0.8));
        let first = blocks_in_ordered(&area, DVec3::new(-1.0, 0.0, 0.0)).next();
        assert_eq!(first, Some(BlockPos::new(1, 0, 0)));
    }
}
