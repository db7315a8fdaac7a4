//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float
{
    target_range.0
        + ((value - source_range.0)
        * (target_range.1 - target_range.0)
        / (source_range.1 - source_range.0))
}

/// Limit a value to the range `[min, max]`.
///
/// NaN values are passed through unchanged.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float
{
    let mut ret = value;

    if ret > max {
        ret = max
    }
    if ret < min {
        ret = min
    }

    ret
}

/// Raise the magnitude of `value` to at least `min_magn`, preserving its sign.
///
/// Zero is returned unchanged as it has no direction to push in.
pub fn apply_min_magnitude<T>(value: T, min_magn: T) -> T
where
    T: Float
{
    if value > T::zero() && value < min_magn {
        min_magn
    }
    else if value < T::zero() && value > -min_magn {
        -min_magn
    }
    else {
        value
    }
}

/// Wrap an angle into the half open range (-pi, pi].
///
/// Angles already inside the range are returned untouched, so the function is exactly
/// idempotent.
pub fn normalise_angle<T>(angle: T) -> T
where
    T: Float
{
    let pi_t: T = (-T::one()).acos();
    let tau_t: T = pi_t + pi_t;

    if angle > -pi_t && angle <= pi_t {
        return angle;
    }

    // Shift into [0, 2pi), wrap, then shift back. Round-off can land exactly on -pi, which
    // belongs to the other end of the range.
    let wrapped = rem_euclid(angle + pi_t, tau_t) - pi_t;

    if wrapped <= -pi_t {
        wrapped + tau_t
    }
    else {
        wrapped
    }
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}
