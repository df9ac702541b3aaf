//! Cartesian axes and the collision order rule.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// One of the three world axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Axis {
    /// East-west.
    X,
    /// Vertical.
    Y,
    /// North-south.
    Z,
}

/// Vertical first, then X, then Z.
pub const YXZ: [Axis; 3] = [Axis::Y, Axis::X, Axis::Z];
/// Vertical first, then Z, then X.
pub const YZX: [Axis; 3] = [Axis::Y, Axis::Z, Axis::X];

impl Axis {
    /// All axes in declaration order.
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Component of `vector` along this axis.
    #[must_use]
    pub const fn component(self, vector: DVec3) -> f64 {
        match self {
            Self::X => vector.x,
            Self::Y => vector.y,
            Self::Z => vector.z,
        }
    }

    /// Copy of `vector` with this axis' component replaced by `value`.
    #[must_use]
    pub const fn with_component(self, vector: DVec3, value: f64) -> DVec3 {
        match self {
            Self::X => DVec3::new(value, vector.y, vector.z),
            Self::Y => DVec3::new(vector.x, value, vector.z),
            Self::Z => DVec3::new(vector.x, vector.y, value),
        }
    }

    /// Unit vector pointing along the positive direction of this axis.
    #[must_use]
    pub const fn unit(self) -> DVec3 {
        match self {
            Self::X => DVec3::X,
            Self::Y => DVec3::Y,
            Self::Z => DVec3::Z,
        }
    }

    /// The two axes perpendicular to this one.
    #[must_use]
    pub const fn others(self) -> (Self, Self) {
        match self {
            Self::X => (Self::Y, Self::Z),
            Self::Y => (Self::X, Self::Z),
            Self::Z => (Self::X, Self::Y),
        }
    }
}

/// Order in which the per-axis resolver settles a displacement.
///
/// The vertical axis always resolves first. The horizontal axes follow with
/// X ahead of Z unless Z strictly dominates, so ties keep X first. The
/// result decides which surface wins on diagonal corner approaches and is
/// shared by the touch pipeline when it splits segments per axis.
///
/// # Examples
/// ```
/// use glam::DVec3;
/// use tumble::geometry::{collision_order, Axis};
/// assert_eq!(collision_order(DVec3::new(0.5, 0.0, 0.5)), [Axis::Y, Axis::X, Axis::Z]);
/// assert_eq!(collision_order(DVec3::new(0.1, 0.0, -0.5)), [Axis::Y, Axis::Z, Axis::X]);
/// ```
#[must_use]
pub fn collision_order(delta: DVec3) -> [Axis; 3] {
    if delta.x.abs() < delta.z.abs() {
        YZX
    } else {
        YXZ
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(DVec3::new(1.0, 5.0, 0.0), YXZ)]
    #[case(DVec3::new(0.0, 5.0, 1.0), YZX)]
    #[case(DVec3::new(-2.0, 0.0, 2.0), YXZ)]
    #[case(DVec3::ZERO, YXZ)]
    fn vertical_always_leads(#[case] delta: DVec3, #[case] expected: [Axis; 3]) {
        assert_eq!(collision_order(delta), expected);
    }

    #[rstest]
    fn with_component_replaces_single_axis() {
        let v = Axis::Z.with_component(DVec3::new(1.0, 2.0, 3.0), 9.0);
        assert_eq!(v, DVec3::new(1.0, 2.0, 9.0));
        assert_eq!(Axis::Y.component(v), 2.0);
    }
}
