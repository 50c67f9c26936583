//! evo-core: Shared types for the Evo runtime equalizer
//!
//! This crate provides the foundational types used by the DSP and runtime
//! crates: sample representation, PCM conversion, band constants, parameter
//! ranges and the error type.

mod error;
mod params;
mod sample;

pub use error::*;
pub use params::*;
pub use sample::*;

/// Number of equalizer / analyzer bands
pub const BAND_COUNT: usize = 16;

/// Lowest band center frequency (Hz)
pub const MIN_BAND_FREQ: f64 = 20.0;

/// Highest band center frequency (Hz)
pub const MAX_BAND_FREQ: f64 = 20_000.0;

/// Sample rate assumed when the host reports none
pub const DEFAULT_SAMPLE_RATE: f64 = 48_000.0;

/// Nominal per-band frequencies shown to the user (Hz)
pub const DISPLAY_FREQUENCIES: [u32; BAND_COUNT] = [
    20, 31, 50, 79, 126, 200, 316, 502, 796, 1261, 2000, 3169, 5023, 7962, 12619, 20000,
];

/// Validate a host-reported sample rate, falling back to the default
#[inline]
pub fn sanitize_sample_rate(sample_rate: f64) -> f64 {
    if sample_rate > 0.0 && sample_rate.is_finite() {
        sample_rate
    } else {
        DEFAULT_SAMPLE_RATE
    }
}

/// Decibel value wrapper
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Decibels(pub f32);

impl Decibels {
    pub const ZERO: Self = Self(0.0);

    /// Convert a linear amplitude, flooring it before the logarithm
    #[inline]
    pub fn from_amplitude(amplitude: f32, floor: f32) -> Self {
        Self(20.0 * amplitude.max(floor).log10())
    }

    /// Peaking-filter amplitude factor `A = 10^(dB/40)`
    #[inline]
    pub fn peaking_amplitude(self) -> f64 {
        10.0_f64.powf(self.0 as f64 / 40.0)
    }

    #[inline]
    pub fn clamp(self, min: f32, max: f32) -> Self {
        Self(self.0.clamp(min, max))
    }
}

impl Default for Decibels {
    fn default() -> Self {
        Self::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sanitize_sample_rate() {
        assert_eq!(sanitize_sample_rate(44100.0), 44100.0);
        assert_eq!(sanitize_sample_rate(0.0), DEFAULT_SAMPLE_RATE);
        assert_eq!(sanitize_sample_rate(-1.0), DEFAULT_SAMPLE_RATE);
        assert_eq!(sanitize_sample_rate(f64::NAN), DEFAULT_SAMPLE_RATE);
    }

    #[test]
    fn test_decibels_floor() {
        let db = Decibels::from_amplitude(0.0, 1e-9);
        assert_relative_eq!(db.0, -180.0, epsilon = 1e-3);

        let db = Decibels::from_amplitude(1.0, 1e-9);
        assert_relative_eq!(db.0, 0.0);
    }

    #[test]
    fn test_decibels_default_is_unity() {
        assert_eq!(Decibels::default(), Decibels::ZERO);
        assert_relative_eq!(Decibels::ZERO.peaking_amplitude(), 1.0);
    }

    #[test]
    fn test_peaking_amplitude() {
        assert_relative_eq!(Decibels(0.0).peaking_amplitude(), 1.0);
        assert_relative_eq!(Decibels(40.0).peaking_amplitude(), 10.0, epsilon = 1e-12);
    }
}
