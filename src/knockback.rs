//! Knockback, mutual pushing and the piston displacement clamp.

use glam::DVec3;
use rand::Rng;

use crate::body::Body;
use crate::constants::{MOVE_EPSILON, PUSH_STRENGTH};
use crate::geometry::Axis;
use crate::vector_math::vec_normalize;
use crate::world::abs_max;

/// Squared horizontal length under which a knockback direction is
/// replaced by a random one.
const DEGENERATE_DIRECTION: f64 = 1.0e-5;
/// Clamped piston moves this small are discarded.
const PISTON_DEADZONE: f64 = 1.0e-5;
/// Minimum separation for two bodies to push each other.
const PUSH_MIN_SEPARATION: f64 = 0.01;

/// Per-tick running total of piston displacement on each axis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PistonAccumulator {
    tick: Option<u64>,
    total: DVec3,
}

impl PistonAccumulator {
    /// Clamps a piston move so this tick's total on its axis stays within
    /// `±limit`.
    ///
    /// Moves shorter than `sqrt(1e-7)` pass through. Otherwise only the first
    /// non-zero axis (X, then Y, then Z) moves, and a clamped remainder of
    /// `1e-5` or less becomes zero.
    pub fn clamp(&mut self, movement: DVec3, time: u64, limit: f64) -> DVec3 {
        if movement.length_squared() <= MOVE_EPSILON {
            return movement;
        }
        if self.tick != Some(time) {
            self.total = DVec3::ZERO;
            self.tick = Some(time);
        }
        let Some(axis) = [Axis::X, Axis::Y, Axis::Z]
            .into_iter()
            .find(|axis| axis.component(movement) != 0.0)
        else {
            return DVec3::ZERO;
        };
        let previous = axis.component(self.total);
        let clamped = (axis.component(movement) + previous).clamp(-limit, limit);
        self.total = axis.with_component(self.total, clamped);
        let delta = clamped - previous;
        if delta.abs() <= PISTON_DEADZONE {
            DVec3::ZERO
        } else {
            axis.with_component(DVec3::ZERO, delta)
        }
    }
}

/// Applies a knockback of `strength` pushing the body away from the
/// direction `(x, z)`.
///
/// Strength is reduced by the knockback resistance attribute; a result of
/// zero or less leaves the body untouched. A degenerate direction is
/// replaced by a small random one drawn from the body's seeded source.
pub fn take_knockback(body: &mut Body, strength: f64, x: f64, z: f64, vertical_cap: f64) {
    let effective = strength * (1.0 - body.attributes.knockback_resistance);
    if effective <= 0.0 || !effective.is_finite() {
        return;
    }
    let (mut dx, mut dz) = (x, z);
    while dx * dx + dz * dz < DEGENERATE_DIRECTION {
        dx = (body.rng.gen::<f64>() - body.rng.gen::<f64>()) * 0.01;
        dz = (body.rng.gen::<f64>() - body.rng.gen::<f64>()) * 0.01;
    }
    let push = vec_normalize(DVec3::new(dx, 0.0, dz)) * effective;
    let v = body.velocity();
    let vy = if body.on_ground() {
        vertical_cap.min(v.y / 2.0 + effective)
    } else {
        v.y
    };
    body.set_velocity(DVec3::new(v.x / 2.0 - push.x, vy, v.z / 2.0 - push.z));
}

/// Pushes two overlapping bodies apart horizontally.
///
/// `body` is pushed away from `other` and vice versa, each only when
/// pushable. Bodies closer than `0.01` on both axes, or passing through
/// obstacles, are left alone.
pub fn push_apart(body: &mut Body, other: &mut Body) {
    if body.flags.no_clip || other.flags.no_clip {
        return;
    }
    let mut dx = other.position().x - body.position().x;
    let mut dz = other.position().z - body.position().z;
    let mut distance = abs_max(dx, dz);
    if distance < PUSH_MIN_SEPARATION {
        return;
    }
    distance = distance.sqrt();
    dx /= distance;
    dz /= distance;
    let falloff = (1.0 / distance).min(1.0);
    dx *= falloff * PUSH_STRENGTH;
    dz *= falloff * PUSH_STRENGTH;
    if body.capabilities.pushable {
        body.add_velocity(DVec3::new(-dx, 0.0, -dz));
    }
    if other.capabilities.pushable {
        other.add_velocity(DVec3::new(dx, 0.0, dz));
    }
}
