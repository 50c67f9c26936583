//! 16-Band Graphic EQ
//!
//! Fixed-Q peaking sections at the log-spaced band centers, cascaded in
//! band order over two independent channels.
//!
//! - Bands within ±0.25 dB are designed as identity sections and skipped.
//! - Coefficients are redesigned as a full set, only when the requested gains
//!   move more than 0.2 dB from the applied ones (or the sample rate changes).
//! - Filter memory is fixed-size and embedded; nothing allocates after `new`.

use evo_core::{BAND_COUNT, GAIN_RANGE, Sample, StereoSample, sanitize_sample_rate};
use serde::{Deserialize, Serialize};

use crate::bands::BandLayout;
use crate::biquad::{BiquadCoeffs, BiquadState};
use crate::{Processor, ProcessorConfig, StereoProcessor};

/// Quality factor shared by every band
pub const PEAKING_Q: f64 = 1.0;

/// Gains with a smaller magnitude are designed as bypass
pub const BYPASS_THRESHOLD_DB: f32 = 0.25;

/// Minimum per-band change that triggers a redesign
pub const RECOMPUTE_THRESHOLD_DB: f32 = 0.2;

const LEFT: usize = 0;
const RIGHT: usize = 1;

// ============================================================================
// GAIN VECTOR
// ============================================================================

/// Per-band gains in dB, always within ±18 dB
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; BAND_COUNT]", into = "[f32; BAND_COUNT]")]
pub struct GainVector([f32; BAND_COUNT]);

impl GainVector {
    pub const FLAT: Self = Self([0.0; BAND_COUNT]);

    /// Build from raw dB values, clamping each one
    pub fn from_db(values: [f32; BAND_COUNT]) -> Self {
        Self(values.map(|g| GAIN_RANGE.clamp(g)))
    }

    /// Set one band, clamped. Out-of-range indices are ignored.
    pub fn set(&mut self, index: usize, gain_db: f32) {
        if let Some(slot) = self.0.get_mut(index) {
            *slot = GAIN_RANGE.clamp(gain_db);
        }
    }

    #[inline]
    pub fn get(&self, index: usize) -> f32 {
        self.0.get(index).copied().unwrap_or(0.0)
    }

    #[inline]
    pub fn as_array(&self) -> &[f32; BAND_COUNT] {
        &self.0
    }

    /// True when any band differs from `other` by more than `threshold_db`
    pub fn differs_from(&self, other: &Self, threshold_db: f32) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .any(|(a, b)| (a - b).abs() > threshold_db)
    }
}

impl Default for GainVector {
    fn default() -> Self {
        Self::FLAT
    }
}

impl From<[f32; BAND_COUNT]> for GainVector {
    fn from(values: [f32; BAND_COUNT]) -> Self {
        Self::from_db(values)
    }
}

impl From<GainVector> for [f32; BAND_COUNT] {
    fn from(gains: GainVector) -> Self {
        gains.0
    }
}

// ============================================================================
// COEFFICIENT DESIGNER
// ============================================================================

/// Design the full coefficient set for `gains` at `sample_rate`.
///
/// Pure: identical inputs give bit-identical output.
pub fn design_coefficients(
    gains: &GainVector,
    layout: &BandLayout,
    sample_rate: f64,
) -> [BiquadCoeffs; BAND_COUNT] {
    std::array::from_fn(|band| {
        let gain_db = gains.get(band);
        if gain_db.abs() < BYPASS_THRESHOLD_DB {
            BiquadCoeffs::BYPASS
        } else {
            BiquadCoeffs::peaking(layout.center(band) as f64, PEAKING_Q, gain_db, sample_rate)
        }
    })
}

// ============================================================================
// FILTER CASCADE
// ============================================================================

/// Stereo cascade of 16 peaking sections
#[derive(Debug, Clone)]
pub struct GraphicEq {
    layout: BandLayout,
    sample_rate: f64,
    coeffs: [BiquadCoeffs; BAND_COUNT],
    /// Cached `!coeffs[b].is_bypass()`
    active: [bool; BAND_COUNT],
    /// [band][channel]
    state: [[BiquadState; 2]; BAND_COUNT],
    applied: GainVector,
}

impl GraphicEq {
    pub fn new(sample_rate: f64) -> Self {
        let mut eq = Self {
            layout: BandLayout::new(),
            sample_rate: sanitize_sample_rate(sample_rate),
            coeffs: [BiquadCoeffs::BYPASS; BAND_COUNT],
            active: [false; BAND_COUNT],
            state: [[BiquadState::default(); 2]; BAND_COUNT],
            applied: GainVector::FLAT,
        };
        eq.redesign();
        eq
    }

    /// Adopt `gains` if any band moved more than the recompute threshold.
    ///
    /// Returns true when the coefficient set was redesigned.
    pub fn apply_gains(&mut self, gains: &GainVector) -> bool {
        if !gains.differs_from(&self.applied, RECOMPUTE_THRESHOLD_DB) {
            return false;
        }
        self.force_gains(gains);
        true
    }

    /// Adopt `gains` and redesign unconditionally
    pub fn force_gains(&mut self, gains: &GainVector) {
        self.applied = *gains;
        self.redesign();
    }

    fn redesign(&mut self) {
        self.coeffs = design_coefficients(&self.applied, &self.layout, self.sample_rate);
        for (active, c) in self.active.iter_mut().zip(self.coeffs.iter()) {
            *active = !c.is_bypass();
        }
        log::debug!(
            "EQ coefficients redesigned at {} Hz ({} active bands)",
            self.sample_rate,
            self.active_bands()
        );
    }

    /// Gains the current coefficient set was designed from
    #[inline]
    pub fn applied_gains(&self) -> &GainVector {
        &self.applied
    }

    #[inline]
    pub fn coeffs(&self) -> &[BiquadCoeffs; BAND_COUNT] {
        &self.coeffs
    }

    #[inline]
    pub fn layout(&self) -> &BandLayout {
        &self.layout
    }

    #[inline]
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Number of non-bypass sections
    pub fn active_bands(&self) -> usize {
        self.active.iter().filter(|&&a| a).count()
    }

    /// True when every section's delay memory is zero
    pub fn is_cleared(&self) -> bool {
        self.state.iter().flatten().all(BiquadState::is_cleared)
    }

    /// Combined magnitude response of the cascade in dB
    pub fn frequency_response_db(&self, freq: f64) -> f64 {
        self.coeffs
            .iter()
            .zip(self.active.iter())
            .filter(|(_, active)| **active)
            .map(|(c, _)| c.magnitude_db(freq, self.sample_rate))
            .sum()
    }

    /// Filter one stereo pair; output is clamped to [-1, 1]
    #[inline]
    pub fn process(&mut self, left: Sample, right: Sample) -> (Sample, Sample) {
        let mut l = left;
        let mut r = right;

        for band in 0..BAND_COUNT {
            if !self.active[band] {
                continue;
            }
            let c = &self.coeffs[band];
            let [state_l, state_r] = &mut self.state[band];
            l = state_l.process(c, l);
            r = state_r.process(c, r);
        }

        (l.clamp(-1.0, 1.0), r.clamp(-1.0, 1.0))
    }
}

impl Processor for GraphicEq {
    fn reset(&mut self) {
        for channels in self.state.iter_mut() {
            channels[LEFT].reset();
            channels[RIGHT].reset();
        }
    }
}

impl StereoProcessor for GraphicEq {
    #[inline]
    fn process_frame(&mut self, frame: StereoSample) -> StereoSample {
        let (left, right) = self.process(frame.left, frame.right);
        StereoSample::new(left, right)
    }
}

impl ProcessorConfig for GraphicEq {
    fn set_sample_rate(&mut self, sample_rate: f64) {
        let sample_rate = sanitize_sample_rate(sample_rate);
        if sample_rate != self.sample_rate {
            self.sample_rate = sample_rate;
            self.redesign();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SR: f64 = 48000.0;

    fn sine(freq: f64, amplitude: f32, n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| amplitude * (2.0 * std::f64::consts::PI * freq * i as f64 / SR).sin() as f32)
            .collect()
    }

    #[test]
    fn test_gain_vector_clamps() {
        let mut values = [0.0; BAND_COUNT];
        values[0] = 40.0;
        values[1] = -40.0;
        values[2] = 7.5;
        let gains = GainVector::from_db(values);
        assert_eq!(gains.get(0), 18.0);
        assert_eq!(gains.get(1), -18.0);
        assert_eq!(gains.get(2), 7.5);
    }

    #[test]
    fn test_differs_from_threshold() {
        let mut gains = GainVector::FLAT;
        gains.set(3, 0.15);
        assert!(!gains.differs_from(&GainVector::FLAT, RECOMPUTE_THRESHOLD_DB));
        gains.set(3, 0.25);
        assert!(gains.differs_from(&GainVector::FLAT, RECOMPUTE_THRESHOLD_DB));
    }

    #[test]
    fn test_design_bypass_below_threshold() {
        let layout = BandLayout::new();
        let mut gains = GainVector::FLAT;
        gains.set(0, 0.24);
        gains.set(1, -0.24);
        gains.set(2, 0.25);
        let coeffs = design_coefficients(&gains, &layout, SR);
        assert!(coeffs[0].is_bypass());
        assert!(coeffs[1].is_bypass());
        assert!(!coeffs[2].is_bypass());
    }

    #[test]
    fn test_design_is_deterministic() {
        let layout = BandLayout::new();
        let gains = GainVector::from_db(std::array::from_fn(|i| i as f32 * 2.3 - 17.0));
        let a = design_coefficients(&gains, &layout, 44100.0);
        let b = design_coefficients(&gains, &layout, 44100.0);
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.b0.to_bits(), y.b0.to_bits());
            assert_eq!(x.b1.to_bits(), y.b1.to_bits());
            assert_eq!(x.b2.to_bits(), y.b2.to_bits());
            assert_eq!(x.a1.to_bits(), y.a1.to_bits());
            assert_eq!(x.a2.to_bits(), y.a2.to_bits());
        }
    }

    #[test]
    fn test_flat_cascade_is_exact_identity() {
        let mut eq = GraphicEq::new(SR);
        let mut gains = GainVector::FLAT;
        for band in 0..BAND_COUNT {
            gains.set(band, if band % 2 == 0 { 0.2 } else { -0.2 });
        }
        eq.force_gains(&gains);
        assert_eq!(eq.active_bands(), 0);

        for x in sine(440.0, 0.9, 2048) {
            let (l, r) = eq.process(x, -x);
            assert_eq!(l, x);
            assert_eq!(r, -x);
        }
    }

    #[test]
    fn test_apply_gains_threshold() {
        let mut eq = GraphicEq::new(SR);
        let mut gains = GainVector::FLAT;
        gains.set(5, 0.1);
        assert!(!eq.apply_gains(&gains));
        assert_eq!(eq.applied_gains(), &GainVector::FLAT);

        gains.set(5, 6.0);
        assert!(eq.apply_gains(&gains));
        assert_eq!(eq.applied_gains().get(5), 6.0);
        assert_eq!(eq.active_bands(), 1);
    }

    #[test]
    fn test_channels_are_independent() {
        let mut eq = GraphicEq::new(SR);
        let mut gains = GainVector::FLAT;
        gains.set(8, 9.0);
        eq.force_gains(&gains);

        let signal = sine(800.0, 0.3, 1024);
        let mut mono = GraphicEq::new(SR);
        mono.force_gains(&gains);

        for &x in &signal {
            // Right channel silent must not disturb the left pipeline
            let (l, r) = eq.process(x, 0.0);
            let (reference, _) = mono.process(x, x);
            assert_eq!(l, reference);
            assert_eq!(r, 0.0);
        }
    }

    #[test]
    fn test_reset_clears_memory() {
        let mut eq = GraphicEq::new(SR);
        let mut gains = GainVector::FLAT;
        gains.set(0, 12.0);
        eq.force_gains(&gains);
        for x in sine(20.0, 0.5, 512) {
            eq.process(x, x);
        }
        assert!(!eq.is_cleared());

        eq.reset();
        assert!(eq.is_cleared());

        // With zero history the output is b0 * x
        let b0 = eq.coeffs()[0].b0;
        let (l, _) = eq.process(0.25, 0.25);
        assert_relative_eq!(l, b0 * 0.25);
    }

    #[test]
    fn test_block_matches_per_frame() {
        let mut gains = GainVector::FLAT;
        gains.set(3, 9.0);
        gains.set(12, -6.0);

        let mut per_frame = GraphicEq::new(SR);
        per_frame.force_gains(&gains);
        let mut block = GraphicEq::new(SR);
        block.force_gains(&gains);

        let signal = sine(300.0, 0.6, 1024);
        let mut frames: Vec<StereoSample> =
            signal.iter().map(|&x| StereoSample::new(x, -0.5 * x)).collect();
        block.process_block(&mut frames);

        for (&x, frame) in signal.iter().zip(&frames) {
            let (l, r) = per_frame.process(x, -0.5 * x);
            assert_eq!(frame.left, l);
            assert_eq!(frame.right, r);
        }
    }

    #[test]
    fn test_output_clamped() {
        let mut eq = GraphicEq::new(SR);
        eq.force_gains(&GainVector::from_db([18.0; BAND_COUNT]));
        for x in sine(1000.0, 0.99, 4096) {
            let (l, r) = eq.process(x, x);
            assert!((-1.0..=1.0).contains(&l));
            assert!((-1.0..=1.0).contains(&r));
        }
    }

    #[test]
    fn test_sample_rate_change_redesigns() {
        let mut eq = GraphicEq::new(48000.0);
        let mut gains = GainVector::FLAT;
        gains.set(10, 6.0);
        eq.force_gains(&gains);
        let before = eq.coeffs()[10];
        eq.set_sample_rate(44100.0);
        assert_ne!(before, eq.coeffs()[10]);
        assert_relative_eq!(
            eq.frequency_response_db(eq.layout().center(10) as f64),
            6.0,
            epsilon = 0.5
        );
    }
}
