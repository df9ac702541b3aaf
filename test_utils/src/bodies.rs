//! Body constructors.

use glam::DVec3;
use tumble::body::{Body, Capabilities, EntityId};

/// A living body with default attributes standing at block `(x, z)` on a
/// floor whose top is `y = 0`.
pub fn standing(id: u64, x: i32, z: i32) -> Body {
    Body::new(EntityId(id), centre(x, 0.0, z))
}

/// A living body `height` blocks above the floor of block `(x, z)`.
pub fn dropped(id: u64, x: i32, z: i32, height: f64) -> Body {
    Body::new(EntityId(id), centre(x, height, z))
}

/// A non-living object such as an item `height` blocks above the floor.
pub fn object(id: u64, x: i32, z: i32, height: f64) -> Body {
    dropped(id, x, z, height).with_capabilities(Capabilities::OBJECT)
}

fn centre(x: i32, y: f64, z: i32) -> DVec3 {
    DVec3::new(f64::from(x) + 0.5, y, f64::from(z) + 0.5)
}
