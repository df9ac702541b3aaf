//! Numeric conversion helpers used across the motion core.
//!
//! These utilities guard conversions between floating-point and integer
//! domains and mirror the single-precision rounding the movement formulas
//! depend on.

/// Floor an `f64` and clamp it into the `i32` domain.
///
/// Non-finite input floors to `0`.
///
/// # Examples
/// ```
/// use tumble::numeric::floor_to_i32;
/// assert_eq!(floor_to_i32(-0.5), -1);
/// assert_eq!(floor_to_i32(2.9), 2);
/// ```
#[expect(
    clippy::cast_possible_truncation,
    reason = "The value is clamped to the i32 bounds before casting."
)]
#[must_use]
pub fn floor_to_i32(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    let floored = value.floor();
    let clamped = floored.clamp(f64::from(i32::MIN), f64::from(i32::MAX));
    clamped as i32
}

/// Round an `f64` through `f32`, matching single-precision call sites.
#[expect(
    clippy::cast_possible_truncation,
    reason = "Narrowing to f32 is the purpose of this helper."
)]
#[must_use]
pub fn narrow(value: f64) -> f32 {
    value as f32
}

/// Whether two values are equal within `1e-5`.
#[must_use]
pub fn approximately_equals(a: f64, b: f64) -> bool {
    (b - a).abs() < 1.0e-5
}

/// Fractional part of `value`, always in `[0, 1)`.
#[must_use]
pub fn fractional_part(value: f64) -> f64 {
    value - value.floor()
}

/// Returns `true` when every component is finite.
#[must_use]
pub fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 0)]
    #[case(-0.000_1, -1)]
    #[case(1.999, 1)]
    #[case(f64::NAN, 0)]
    #[case(f64::INFINITY, i32::MAX)]
    #[case(f64::NEG_INFINITY, i32::MIN)]
    fn floor_clamps(#[case] input: f64, #[case] expected: i32) {
        assert_eq!(floor_to_i32(input), expected);
    }

    #[rstest]
    fn fractional_part_is_positive_for_negatives() {
        let frac = fractional_part(-0.25);
        assert!((frac - 0.75).abs() < 1e-12);
    }

    #[rstest]
    fn approximate_equality_uses_small_tolerance() {
        assert!(approximately_equals(1.0, 1.000_001));
        assert!(!approximately_equals(1.0, 1.001));
    }
}
