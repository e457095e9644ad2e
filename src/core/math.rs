// Math utilities and helper functions

/// Snap a value onto the nearest multiple of `step`
pub fn quantize(value: f32, step: f32) -> f32 {
    (value / step).round() * step
}

/// Sign of a non-zero value computed as `|v| / v`
///
/// Only meaningful for `value != 0.0`; zero yields NaN.
pub fn sign_by_division(value: f32) -> f32 {
    value.abs() / value
}
