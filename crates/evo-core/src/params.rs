//! Parameter ranges for the control surface

use serde::{Deserialize, Serialize};

/// Closed parameter range; out-of-range input is clamped, never rejected
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    pub min: f32,
    pub max: f32,
    pub default: f32,
}

impl ParamRange {
    pub const fn new(min: f32, max: f32, default: f32) -> Self {
        Self { min, max, default }
    }

    /// Clamp a value into range. NaN maps to the default.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.default
        } else {
            value.clamp(self.min, self.max)
        }
    }

    #[inline]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Per-band equalizer gain (dB)
pub const GAIN_RANGE: ParamRange = ParamRange::new(-18.0, 18.0, 0.0);

/// Analyzer sensitivity multiplier
pub const SENSITIVITY_RANGE: ParamRange = ParamRange::new(0.1, 2.0, 0.3);

/// Analyzer AGC gain
pub const AGC_GAIN_RANGE: ParamRange = ParamRange::new(0.3, 3.0, 1.0);

/// Logarithmic interpolation between `min` and `max`: `min * (max/min)^t`
#[inline]
pub fn log_interpolate(min: f64, max: f64, t: f64) -> f64 {
    min * (max / min).powf(t)
}
