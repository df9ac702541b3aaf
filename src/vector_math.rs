//! Basic vector math helper functions.
//! Small helpers for horizontal magnitudes, input rotation and look vectors.
use glam::DVec3;

/// Squared length of the horizontal (`x`, `z`) part of a vector.
///
/// # Examples
/// ```
/// use glam::DVec3;
/// use tumble::vector_math::horizontal_length_squared;
/// assert!((horizontal_length_squared(DVec3::new(3.0, 9.0, 4.0)) - 25.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn horizontal_length_squared(vector: DVec3) -> f64 {
    vector.x * vector.x + vector.z * vector.z
}

/// Length of the horizontal (`x`, `z`) part of a vector.
#[must_use]
pub fn horizontal_length(vector: DVec3) -> f64 {
    horizontal_length_squared(vector).sqrt()
}

/// Returns the unit vector in the direction of `vector`.
///
/// Non-finite or zero input yields [`DVec3::ZERO`].
///
/// # Examples
///
/// ```
/// use glam::DVec3;
/// use tumble::vec_normalize;
/// let n = vec_normalize(DVec3::new(3.0, 0.0, 4.0));
/// assert!((n.x - 0.6).abs() < 1e-12);
/// assert!((n.z - 0.8).abs() < 1e-12);
/// assert_eq!(vec_normalize(DVec3::ZERO), DVec3::ZERO);
/// ```
#[must_use]
pub fn vec_normalize(vector: DVec3) -> DVec3 {
    if !vector.is_finite() {
        return DVec3::ZERO;
    }
    vector.try_normalize().unwrap_or(DVec3::ZERO)
}

/// Converts a movement input (sideways, upward, forward) into a velocity
/// delta facing `yaw` degrees.
///
/// Input shorter than `sqrt(1e-7)` is ignored; input longer than one is
/// normalised before scaling by `speed`.
#[must_use]
pub fn input_to_velocity(input: DVec3, speed: f32, yaw: f32) -> DVec3 {
    let length_squared = input.length_squared();
    if length_squared < 1.0e-7 {
        return DVec3::ZERO;
    }
    let scaled = if length_squared > 1.0 {
        input.normalize()
    } else {
        input
    } * f64::from(speed);
    let radians = yaw.to_radians();
    let sin = f64::from(radians.sin());
    let cos = f64::from(radians.cos());
    DVec3::new(
        scaled.x * cos - scaled.z * sin,
        scaled.y,
        scaled.z * cos + scaled.x * sin,
    )
}

/// Unit look vector for `pitch` and `yaw` in degrees.
#[must_use]
pub fn rotation_vector(pitch: f32, yaw: f32) -> DVec3 {
    let pitch_rad = pitch.to_radians();
    let yaw_rad = -yaw.to_radians();
    let yaw_cos = f64::from(yaw_rad.cos());
    let yaw_sin = f64::from(yaw_rad.sin());
    let pitch_cos = f64::from(pitch_rad.cos());
    let pitch_sin = f64::from(pitch_rad.sin());
    DVec3::new(yaw_sin * pitch_cos, -pitch_sin, yaw_cos * pitch_cos)
}
