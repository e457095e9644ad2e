// Analog axis normalization

use crate::core::math::{quantize, sign_by_division};
use log::warn;

/// Default dead zone / step size for analog axes
pub const DEFAULT_AXIS_THRESHOLD: f32 = 0.35;

/// How raw axis values are turned into dispatchable values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisMode {
    /// Past the dead zone the axis reads as a digital direction (±1)
    #[default]
    Threshold,
    /// The axis is quantized into steps of `threshold`
    Step,
}

/// Converts raw axis readings into normalized values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisNormalizer {
    threshold: f32,
    mode: AxisMode,
}

impl AxisNormalizer {
    /// Create a normalizer. Non-positive or non-finite thresholds fall back
    /// to [`DEFAULT_AXIS_THRESHOLD`].
    pub fn new(threshold: f32, mode: AxisMode) -> Self {
        let threshold = if threshold.is_finite() && threshold > 0.0 {
            threshold
        } else {
            warn!(
                "Invalid axis threshold {}, using {}",
                threshold, DEFAULT_AXIS_THRESHOLD
            );
            DEFAULT_AXIS_THRESHOLD
        };
        Self { threshold, mode }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn mode(&self) -> AxisMode {
        self.mode
    }

    /// Normalize a raw axis reading. Readings are clamped to `-1.0..=1.0`;
    /// NaN reads as centered.
    pub fn normalize(&self, raw: f32) -> f32 {
        let raw = if raw.is_nan() { 0.0 } else { raw.clamp(-1.0, 1.0) };
        match self.mode {
            AxisMode::Threshold => {
                if raw.abs() > self.threshold {
                    sign_by_division(raw)
                } else {
                    0.0
                }
            }
            // `+ 0.0` folds a rounded -0.0 into 0.0
            AxisMode::Step => quantize(raw, self.threshold) + 0.0,
        }
    }
}

impl Default for AxisNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_AXIS_THRESHOLD, AxisMode::Threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_threshold_mode_dead_zone() {
        let n = AxisNormalizer::default();
        for v in [0.0, 0.1, -0.2, 0.35, -0.35] {
            assert_eq!(n.normalize(v), 0.0, "value {} should be inside dead zone", v);
        }
    }

    #[test]
    fn test_threshold_mode_sign_independent_of_magnitude() {
        let n = AxisNormalizer::default();
        for v in [0.36, 0.6, 1.0, 7.5] {
            assert_eq!(n.normalize(v), 1.0);
            assert_eq!(n.normalize(-v), -1.0);
        }
    }

    #[test]
    fn test_zero_never_nan() {
        let n = AxisNormalizer::new(0.5, AxisMode::Threshold);
        assert_eq!(n.normalize(0.0), 0.0);
        let n = AxisNormalizer::new(0.5, AxisMode::Step);
        assert_eq!(n.normalize(0.0), 0.0);
    }

    #[test]
    fn test_step_mode_quantizes() {
        let n = AxisNormalizer::new(0.25, AxisMode::Step);
        assert_relative_eq!(n.normalize(0.6), 0.5);
        assert_relative_eq!(n.normalize(-0.9), -1.0);
        assert_eq!(n.normalize(0.1), 0.0);
    }

    #[test]
    fn test_step_mode_idempotent() {
        let n = AxisNormalizer::new(DEFAULT_AXIS_THRESHOLD, AxisMode::Step);
        let mut v = -1.0f32;
        while v <= 1.0 {
            let once = n.normalize(v);
            assert_eq!(n.normalize(once), once, "not idempotent at {}", v);
            v += 0.01;
        }
    }

    #[test]
    fn test_non_finite_readings() {
        for mode in [AxisMode::Threshold, AxisMode::Step] {
            let n = AxisNormalizer::new(0.5, mode);
            assert_eq!(n.normalize(f32::INFINITY), 1.0);
            assert_eq!(n.normalize(f32::NEG_INFINITY), -1.0);
            assert_eq!(n.normalize(f32::NAN), 0.0);
        }
    }

    #[test]
    fn test_invalid_threshold_falls_back() {
        assert_eq!(
            AxisNormalizer::new(0.0, AxisMode::Step).threshold(),
            DEFAULT_AXIS_THRESHOLD
        );
        assert_eq!(
            AxisNormalizer::new(f32::NAN, AxisMode::Threshold).threshold(),
            DEFAULT_AXIS_THRESHOLD
        );
        assert_eq!(AxisNormalizer::new(-0.2, AxisMode::Threshold).threshold(), DEFAULT_AXIS_THRESHOLD);
    }
}
