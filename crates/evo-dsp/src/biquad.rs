//! Biquad sections for the graphic equalizer
//!
//! Coefficients are designed in f64 and stored as f32. Sections run in
//! Direct Form I (two delayed inputs, two delayed outputs), which keeps the
//! state independent of the coefficients: a coefficient swap mid-stream
//! never rescales stored memory.

use evo_core::{Decibels, Sample};
use std::f64::consts::PI;

/// Biquad coefficients, normalized so that a0 == 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoeffs {
    pub b0: Sample,
    pub b1: Sample,
    pub b2: Sample,
    pub a1: Sample,
    pub a2: Sample,
}

impl BiquadCoeffs {
    /// Identity section (unity gain, no filtering)
    pub const BYPASS: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Calculate peaking EQ filter coefficients (RBJ cookbook)
    /// gain_db: gain in decibels
    pub fn peaking(freq: f64, q: f64, gain_db: f32, sample_rate: f64) -> Self {
        let a = Decibels(gain_db).peaking_amplitude();
        let omega = 2.0 * PI * freq / sample_rate;
        let sin_omega = omega.sin();
        let cos_omega = omega.cos();
        let alpha = sin_omega / (2.0 * q);

        let b0 = 1.0 + alpha * a;
        let b1 = -2.0 * cos_omega;
        let b2 = 1.0 - alpha * a;
        let a0 = 1.0 + alpha / a;
        let a1 = -2.0 * cos_omega;
        let a2 = 1.0 - alpha / a;

        Self {
            b0: (b0 / a0) as Sample,
            b1: (b1 / a0) as Sample,
            b2: (b2 / a0) as Sample,
            a1: (a1 / a0) as Sample,
            a2: (a2 / a0) as Sample,
        }
    }

    #[inline]
    pub fn is_bypass(&self) -> bool {
        *self == Self::BYPASS
    }

    /// Magnitude response in dB at `freq`
    pub fn magnitude_db(&self, freq: f64, sample_rate: f64) -> f64 {
        let w = 2.0 * PI * freq / sample_rate;
        let (cos1, sin1) = (w.cos(), w.sin());
        let (cos2, sin2) = ((2.0 * w).cos(), (2.0 * w).sin());

        let (b0, b1, b2) = (self.b0 as f64, self.b1 as f64, self.b2 as f64);
        let (a1, a2) = (self.a1 as f64, self.a2 as f64);

        let num_re = b0 + b1 * cos1 + b2 * cos2;
        let num_im = -(b1 * sin1 + b2 * sin2);
        let den_re = 1.0 + a1 * cos1 + a2 * cos2;
        let den_im = -(a1 * sin1 + a2 * sin2);

        let num = (num_re * num_re + num_im * num_im).sqrt();
        let den = (den_re * den_re + den_im * den_im).sqrt().max(1e-12);
        20.0 * (num / den).max(1e-12).log10()
    }
}

impl Default for BiquadCoeffs {
    fn default() -> Self {
        Self::BYPASS
    }
}

/// Direct Form I filter memory for one band of one channel
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BiquadState {
    x1: Sample,
    x2: Sample,
    y1: Sample,
    y2: Sample,
}

impl BiquadState {
    /// Run one sample through the section and rotate the delay memory
    #[inline(always)]
    pub fn process(&mut self, c: &BiquadCoeffs, input: Sample) -> Sample {
        let output = c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2
            - c.a1 * self.y1
            - c.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;
        output
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[inline]
    pub fn is_cleared(&self) -> bool {
        *self == Self::default()
    }
}
