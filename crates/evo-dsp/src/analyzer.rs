//! 16-band spectrum analyzer
//!
//! Runs on demand (from a level accessor), never in the sample loop:
//!
//! 1. copy the analysis ring oldest-first and find the window peak
//! 2. track a slow running peak and adapt the AGC gain towards it
//! 3. optionally normalize the window to the input ceiling
//! 4. Hann window + 256-point FFT
//! 5. `(|re| + |im|) / N` magnitudes for the lower half of the spectrum
//! 6. per-band RMS → dB (-80..0) → sqrt-compressed 0..1
//! 7. frequency shaping × sensitivity × AGC, then attack/release + peak hold
//!
//! The magnitude in step 5 is an approximation of the modulus (it reads up
//! to √2 high off-axis). It is intentional: the frequency-shaping table is
//! calibrated against it.

use evo_core::{
    AGC_GAIN_RANGE, BAND_COUNT, DISPLAY_FREQUENCIES, Decibels, SENSITIVITY_RANGE, Sample,
    sanitize_sample_rate,
};
use serde::Serialize;

use crate::bands::{BandLayout, analysis_edges};
use crate::consts::{
    AGC_MIN_PEAK, AGC_SPEED, AGC_TARGET, BIN_COUNT, DB_FLOOR, FFT_SIZE, INPUT_CEILING,
    RMS_FLOOR, RUNNING_PEAK_RETENTION,
};
use crate::fft::{hann_window, transform};
use crate::meter::{BandMeter, release_retention};
use crate::ring::AnalysisRing;
use crate::ProcessorConfig;

/// Loudness compensation by band center frequency.
///
/// Equal RMS reads lower in the bass, so treble is lifted up to 2x.
pub fn frequency_gain(center_hz: f32) -> Sample {
    match center_hz {
        f if f < 35.0 => 0.8,
        f if f < 55.0 => 0.9,
        f if f < 90.0 => 1.0,
        f if f < 150.0 => 1.1,
        f if f < 250.0 => 1.15,
        f if f < 450.0 => 1.05,
        f if f < 750.0 => 1.0,
        f if f < 1300.0 => 1.1,
        f if f < 2200.0 => 1.15,
        f if f < 4000.0 => 1.25,
        f if f < 7000.0 => 1.45,
        f if f < 11000.0 => 1.7,
        f if f < 16000.0 => 1.9,
        _ => 2.0,
    }
}

/// Band descriptor for display collaborators
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BandInfo {
    pub band: usize,
    pub frequency: u32,
    pub level: f32,
}

impl BandInfo {
    /// Pair each level with its band index and display frequency
    pub fn from_levels(levels: &[f32; BAND_COUNT]) -> [Self; BAND_COUNT] {
        std::array::from_fn(|band| Self {
            band,
            frequency: DISPLAY_FREQUENCIES[band],
            level: levels[band],
        })
    }
}

/// Aggregate level statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AnalyzerStats {
    pub sum: f32,
    pub max: f32,
}

impl AnalyzerStats {
    pub fn from_levels(levels: &[f32; BAND_COUNT]) -> Self {
        levels.iter().fold(Self::default(), |acc, &l| Self {
            sum: acc.sum + l,
            max: acc.max.max(l),
        })
    }
}

// ============================================================================
// LOOKUP TABLES
// ============================================================================

/// Precomputed per-band tables; bin ranges depend on the sample rate
#[derive(Debug, Clone)]
struct BandTables {
    /// Half-open `[start, end)` FFT bin range per band
    bins: [(usize, usize); BAND_COUNT],
    freq_gain: [Sample; BAND_COUNT],
    release: [Sample; BAND_COUNT],
}

impl BandTables {
    fn new(layout: &BandLayout, sample_rate: f64) -> Self {
        let bin_hz = sample_rate / FFT_SIZE as f64;

        let bins = std::array::from_fn(|band| {
            let (freq_start, freq_end) = analysis_edges(band, BAND_COUNT);
            let start = (freq_start / bin_hz) as usize;
            let end = ((freq_end / bin_hz) as usize).min(BIN_COUNT - 1).max(start);

            // Guard against collapsed ranges; every band reads at least one bin
            let start = start.min(BIN_COUNT - 1);
            let end = end.min(BIN_COUNT);
            if start >= end { (start, start + 1) } else { (start, end) }
        });

        Self {
            bins,
            freq_gain: std::array::from_fn(|b| frequency_gain(layout.center(b))),
            release: std::array::from_fn(|b| release_retention(layout.center(b))),
        }
    }
}

// ============================================================================
// ANALYZER
// ============================================================================

/// FFT band analyzer with AGC and level smoothing.
///
/// All buffers are embedded; `evaluate` does not allocate.
#[derive(Debug, Clone)]
pub struct SpectrumAnalyzer {
    layout: BandLayout,
    sample_rate: f64,
    hann: [Sample; FFT_SIZE],
    tables: BandTables,
    meters: [BandMeter; BAND_COUNT],

    sensitivity: Sample,
    agc_enabled: bool,
    agc_gain: Sample,
    normalize: bool,
    pre_gain: bool,
    running_peak: Sample,

    // Scratch
    window: [Sample; FFT_SIZE],
    re: [Sample; FFT_SIZE],
    im: [Sample; FFT_SIZE],
    mags: [Sample; BIN_COUNT],
}

impl SpectrumAnalyzer {
    pub fn new(sample_rate: f64) -> Self {
        let layout = BandLayout::new();
        let sample_rate = sanitize_sample_rate(sample_rate);
        Self {
            tables: BandTables::new(&layout, sample_rate),
            layout,
            sample_rate,
            hann: hann_window::<FFT_SIZE>(),
            meters: [BandMeter::default(); BAND_COUNT],
            sensitivity: SENSITIVITY_RANGE.default,
            agc_enabled: true,
            agc_gain: AGC_GAIN_RANGE.default,
            normalize: true,
            pre_gain: true,
            running_peak: 0.0,
            window: [0.0; FFT_SIZE],
            re: [0.0; FFT_SIZE],
            im: [0.0; FFT_SIZE],
            mags: [0.0; BIN_COUNT],
        }
    }

    /// Run one analysis cycle over the ring contents.
    ///
    /// Returns false (state untouched) until the ring has seen a full window.
    pub fn evaluate(&mut self, ring: &AnalysisRing) -> bool {
        if !ring.is_full() {
            log::trace!("analyzer skipped: {}/{} samples", ring.filled(), FFT_SIZE);
            return false;
        }

        let window_peak = ring.copy_ordered(&mut self.window);
        self.update_agc(window_peak);

        if self.normalize && window_peak > INPUT_CEILING {
            let factor = INPUT_CEILING / window_peak;
            for s in self.window.iter_mut() {
                *s *= factor;
            }
        }

        for i in 0..FFT_SIZE {
            self.re[i] = self.window[i] * self.hann[i];
            self.im[i] = 0.0;
        }
        transform(&mut self.re, &mut self.im);

        let inv_n = 1.0 / FFT_SIZE as Sample;
        for (k, mag) in self.mags.iter_mut().enumerate() {
            *mag = (self.re[k].abs() + self.im[k].abs()) * inv_n;
        }

        let gain = self.sensitivity * self.agc_gain;
        for band in 0..BAND_COUNT {
            let value = (self.band_value(band) * self.tables.freq_gain[band] * gain).min(1.0);
            self.meters[band].update(value, self.tables.release[band]);
        }
        true
    }

    /// sqrt-compressed 0..1 value of one band before shaping
    fn band_value(&self, band: usize) -> Sample {
        let (start, end) = self.tables.bins[band];
        let bins = &self.mags[start..end];

        let sum_sq: Sample = bins.iter().map(|m| m * m).sum();
        let rms = (sum_sq / bins.len() as Sample).sqrt();

        let db = Decibels::from_amplitude(rms, RMS_FLOOR).clamp(DB_FLOOR, 0.0);
        ((db.0 - DB_FLOOR) / -DB_FLOOR).sqrt()
    }

    fn update_agc(&mut self, window_peak: Sample) {
        self.running_peak =
            self.running_peak * RUNNING_PEAK_RETENTION + window_peak * (1.0 - RUNNING_PEAK_RETENTION);

        if self.agc_enabled && self.running_peak > AGC_MIN_PEAK {
            let target = AGC_GAIN_RANGE.clamp(AGC_TARGET / self.running_peak);
            self.agc_gain = self.agc_gain * AGC_SPEED + target * (1.0 - AGC_SPEED);
        } else {
            self.agc_gain = AGC_GAIN_RANGE.default;
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // READOUT
    // ═══════════════════════════════════════════════════════════════════════

    pub fn levels(&self) -> [Sample; BAND_COUNT] {
        std::array::from_fn(|b| self.meters[b].level())
    }

    pub fn peaks(&self) -> [Sample; BAND_COUNT] {
        std::array::from_fn(|b| self.meters[b].peak())
    }

    /// Bin range `[start, end)` analyzed for `band`
    pub fn bin_range(&self, band: usize) -> Option<(usize, usize)> {
        self.tables.bins.get(band).copied()
    }

    #[inline]
    pub fn running_peak(&self) -> Sample {
        self.running_peak
    }

    #[inline]
    pub fn agc_gain(&self) -> Sample {
        self.agc_gain
    }

    #[inline]
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    // ═══════════════════════════════════════════════════════════════════════
    // CONTROL
    // ═══════════════════════════════════════════════════════════════════════

    pub fn set_sensitivity(&mut self, sensitivity: Sample) {
        self.sensitivity = SENSITIVITY_RANGE.clamp(sensitivity);
    }

    #[inline]
    pub fn sensitivity(&self) -> Sample {
        self.sensitivity
    }

    /// Disabling resets the AGC gain to unity immediately
    pub fn set_agc(&mut self, enabled: bool) {
        self.agc_enabled = enabled;
        if !enabled {
            self.agc_gain = AGC_GAIN_RANGE.default;
        }
    }

    #[inline]
    pub fn agc(&self) -> bool {
        self.agc_enabled
    }

    pub fn set_normalize(&mut self, normalize: bool) {
        self.normalize = normalize;
    }

    #[inline]
    pub fn normalize(&self) -> bool {
        self.normalize
    }

    /// Informational only: the capture point is fixed post-EQ, pre-volume
    pub fn set_pre_gain(&mut self, pre_gain: bool) {
        self.pre_gain = pre_gain;
    }

    #[inline]
    pub fn pre_gain(&self) -> bool {
        self.pre_gain
    }

    /// Zero levels, peaks and the running peak; settings are kept
    pub fn reset_levels(&mut self) {
        for m in self.meters.iter_mut() {
            m.reset();
        }
        self.running_peak = 0.0;
    }
}

impl ProcessorConfig for SpectrumAnalyzer {
    fn set_sample_rate(&mut self, sample_rate: f64) {
        let sample_rate = sanitize_sample_rate(sample_rate);
        if sample_rate != self.sample_rate {
            self.sample_rate = sample_rate;
            self.tables = BandTables::new(&self.layout, sample_rate);
        }
    }
}
