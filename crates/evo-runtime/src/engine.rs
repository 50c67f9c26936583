//! Equalizer engine
//!
//! One owned value holding the whole runtime state: filter cascade, analysis
//! ring, analyzer and the control settings. The host drives it through
//! [`EqEngine::process_buffer`]; UI collaborators use the accessors.
//!
//! Per buffer:
//! 1. initialize on first use, otherwise track codec and sample-rate changes
//! 2. redesign coefficients if the requested gains moved
//! 3. per frame: i16 → f32, EQ cascade (clamped), analyzer capture,
//!    volume, f32 → i16

use evo_core::{
    BAND_COUNT, DEFAULT_SAMPLE_RATE, Sample, StereoSample, sample_to_pcm, sanitize_sample_rate,
};
use evo_dsp::consts::PLAYING_PEAK_FLOOR;
use evo_dsp::{
    AnalysisRing, AnalyzerStats, BandInfo, GainVector, GraphicEq, Processor, ProcessorConfig,
    SpectrumAnalyzer, StereoProcessor,
};

use crate::host::{CODEC_FLAC, HostStream};

/// Default volume: full scale of 21 steps
pub const DEFAULT_VOLUME_STEPS: u8 = 21;

/// Runtime equalizer and spectrum analyzer
#[derive(Debug, Clone)]
pub struct EqEngine {
    eq: GraphicEq,
    analyzer: SpectrumAnalyzer,
    ring: AnalysisRing,

    /// Requested gains; the cascade follows them at the next buffer
    gains: GainVector,
    gains_pending: bool,

    initialized: bool,
    codec: Option<i32>,

    eq_enabled: bool,
    analyzer_enabled: bool,
    volume_step: u8,
    max_volume_step: u8,
}

impl EqEngine {
    pub fn new() -> Self {
        Self {
            eq: GraphicEq::new(DEFAULT_SAMPLE_RATE),
            analyzer: SpectrumAnalyzer::new(DEFAULT_SAMPLE_RATE),
            ring: AnalysisRing::new(),
            gains: GainVector::FLAT,
            gains_pending: false,
            initialized: false,
            codec: None,
            eq_enabled: true,
            analyzer_enabled: true,
            volume_step: DEFAULT_VOLUME_STEPS,
            max_volume_step: DEFAULT_VOLUME_STEPS,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // HOST ENTRY POINT
    // ═══════════════════════════════════════════════════════════════════════

    /// Process `frames` interleaved stereo frames of `pcm` in place.
    ///
    /// Always returns true (keep streaming). Non-positive frame counts are a
    /// no-op; counts beyond the buffer are truncated to whole frames.
    pub fn process_buffer<H: HostStream + ?Sized>(
        &mut self,
        host: &H,
        pcm: &mut [i16],
        frames: i32,
    ) -> bool {
        if frames <= 0 {
            return true;
        }
        let frames = (frames as usize).min(pcm.len() / 2);

        if self.initialized {
            self.track_stream(host);
        } else {
            self.initialize(host);
        }

        if std::mem::take(&mut self.gains_pending) {
            self.eq.force_gains(&self.gains);
        } else {
            self.eq.apply_gains(&self.gains);
        }

        let volume = self.volume();
        for frame in pcm[..frames * 2].chunks_exact_mut(2) {
            let input = StereoSample::from_pcm(frame[0], frame[1]);

            let output = if self.eq_enabled {
                self.eq.process_frame(input)
            } else {
                input.clamped()
            };

            if self.analyzer_enabled {
                self.ring.push_frame(output);
            }

            let output = output.scaled(volume);
            frame[0] = sample_to_pcm(output.left);
            frame[1] = sample_to_pcm(output.right);
        }

        true
    }

    fn initialize<H: HostStream + ?Sized>(&mut self, host: &H) {
        let sample_rate = sanitize_sample_rate(host.sample_rate() as f64);
        self.eq.set_sample_rate(sample_rate);
        self.analyzer.set_sample_rate(sample_rate);

        self.eq.reset();
        self.eq.force_gains(&self.gains);
        self.gains_pending = false;

        self.ring.clear();
        self.analyzer.reset_levels();
        self.codec = Some(host.codec());
        self.initialized = true;

        log::info!(
            "EQ engine initialized: {} Hz, codec {}, {} active bands",
            sample_rate,
            host.codec(),
            self.eq.active_bands()
        );
    }

    fn track_stream<H: HostStream + ?Sized>(&mut self, host: &H) {
        let codec = host.codec();
        if self.codec != Some(codec) {
            self.codec = Some(codec);
            self.eq.reset();
            log::debug!("codec changed to {codec}, filter state reset");
        }

        // 0 means "unknown": keep the current rate
        let reported = host.sample_rate();
        if reported > 0 && reported as f64 != self.eq.sample_rate() {
            let sample_rate = reported as f64;
            log::info!("sample rate changed: {} -> {} Hz", self.eq.sample_rate(), sample_rate);
            self.eq.set_sample_rate(sample_rate);
            self.analyzer.set_sample_rate(sample_rate);
        }
    }

    /// Return to the uninitialized state; settings and gains are kept
    pub fn reset(&mut self) {
        self.eq.reset();
        self.ring = AnalysisRing::new();
        self.analyzer.reset_levels();
        self.initialized = false;
        self.codec = None;
        self.gains_pending = false;
    }

    // ═══════════════════════════════════════════════════════════════════════
    // GAINS
    // ═══════════════════════════════════════════════════════════════════════

    /// Store a new gain vector (each value clamped to ±18 dB)
    pub fn set_gains(&mut self, gains: impl Into<GainVector>) {
        self.gains = gains.into();
        self.gains_pending = self.initialized;
    }

    /// Set one band (clamped); out-of-range indices are ignored
    pub fn set_band_gain(&mut self, band: usize, gain_db: f32) {
        self.gains.set(band, gain_db);
        self.gains_pending = self.initialized;
    }

    #[inline]
    pub fn gains(&self) -> GainVector {
        self.gains
    }

    /// Gains the running cascade was designed from
    #[inline]
    pub fn applied_gains(&self) -> GainVector {
        *self.eq.applied_gains()
    }

    /// Combined EQ magnitude response in dB at `freq`
    pub fn frequency_response_db(&self, freq: f64) -> f64 {
        self.eq.frequency_response_db(freq)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // ANALYZER READOUT
    // ═══════════════════════════════════════════════════════════════════════

    /// Evaluate the analyzer over the current window and return band levels.
    ///
    /// All zeros while the analyzer is disabled.
    pub fn levels(&mut self) -> [Sample; BAND_COUNT] {
        if !self.analyzer_enabled {
            return [0.0; BAND_COUNT];
        }
        self.analyzer.evaluate(&self.ring);
        self.analyzer.levels()
    }

    /// Peak-hold markers as of the last evaluation
    pub fn peaks(&self) -> [Sample; BAND_COUNT] {
        if !self.analyzer_enabled {
            return [0.0; BAND_COUNT];
        }
        self.analyzer.peaks()
    }

    pub fn bands(&mut self) -> [BandInfo; BAND_COUNT] {
        BandInfo::from_levels(&self.levels())
    }

    pub fn stats(&mut self) -> AnalyzerStats {
        AnalyzerStats::from_levels(&self.levels())
    }

    pub fn is_audio_playing(&self) -> bool {
        self.ring.filled() > 0 && self.analyzer.running_peak() > PLAYING_PEAK_FLOOR
    }

    /// Fraction of captured samples at or above the clip threshold
    pub fn clipping_ratio(&self) -> f32 {
        self.ring.clipping_ratio()
    }

    pub fn reset_clipping(&mut self) {
        self.ring.reset_clipping();
    }

    /// Ring fill count and write cursor
    pub fn analyzer_debug(&self) -> (usize, usize) {
        (self.ring.filled(), self.ring.write_pos())
    }

    /// Raw ring slot; `None` outside `0..256`
    pub fn fft_buffer_sample(&self, index: usize) -> Option<Sample> {
        self.ring.sample(index)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // ANALYZER SETTINGS
    // ═══════════════════════════════════════════════════════════════════════

    pub fn set_sensitivity(&mut self, sensitivity: f32) {
        self.analyzer.set_sensitivity(sensitivity);
    }

    pub fn sensitivity(&self) -> f32 {
        self.analyzer.sensitivity()
    }

    pub fn set_normalize(&mut self, normalize: bool) {
        self.analyzer.set_normalize(normalize);
    }

    pub fn normalize(&self) -> bool {
        self.analyzer.normalize()
    }

    pub fn set_agc(&mut self, enabled: bool) {
        self.analyzer.set_agc(enabled);
    }

    pub fn agc(&self) -> bool {
        self.analyzer.agc()
    }

    pub fn agc_gain(&self) -> f32 {
        self.analyzer.agc_gain()
    }

    pub fn set_pre_gain(&mut self, pre_gain: bool) {
        self.analyzer.set_pre_gain(pre_gain);
    }

    pub fn pre_gain(&self) -> bool {
        self.analyzer.pre_gain()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // SAMPLE-PATH FLAGS
    // ═══════════════════════════════════════════════════════════════════════

    pub fn set_eq_enabled(&mut self, enabled: bool) {
        self.eq_enabled = enabled;
    }

    pub fn eq_enabled(&self) -> bool {
        self.eq_enabled
    }

    /// While disabled, nothing is captured and all level getters read zero
    pub fn set_analyzer_enabled(&mut self, enabled: bool) {
        self.analyzer_enabled = enabled;
    }

    pub fn analyzer_enabled(&self) -> bool {
        self.analyzer_enabled
    }

    pub fn set_volume(&mut self, step: u8, max_step: u8) {
        self.volume_step = step;
        self.max_volume_step = max_step;
    }

    pub fn volume_steps(&self) -> (u8, u8) {
        (self.volume_step, self.max_volume_step)
    }

    /// Linear output factor `step / max`, 1.0 when max is 0
    pub fn volume(&self) -> f32 {
        if self.max_volume_step == 0 {
            return 1.0;
        }
        (self.volume_step as f32 / self.max_volume_step as f32).clamp(0.0, 1.0)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // STREAM STATE
    // ═══════════════════════════════════════════════════════════════════════

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn sample_rate(&self) -> f64 {
        self.eq.sample_rate()
    }

    /// Last codec seen; `None` before the first buffer
    pub fn codec(&self) -> Option<i32> {
        self.codec
    }

    pub fn is_flac(&self) -> bool {
        self.codec == Some(CODEC_FLAC)
    }
}

impl Default for EqEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::FixedHost;

    const HOST: FixedHost = FixedHost::new(48000, 2);

    #[test]
    fn test_first_buffer_initializes() {
        let mut engine = EqEngine::new();
        assert!(!engine.is_initialized());
        assert_eq!(engine.codec(), None);

        let mut pcm = [0i16; 64];
        assert!(engine.process_buffer(&HOST, &mut pcm, 32));
        assert!(engine.is_initialized());
        assert_eq!(engine.codec(), Some(2));
        assert!(!engine.is_flac());
        assert_eq!(engine.analyzer_debug(), (32, 32));
    }

    #[test]
    fn test_zero_rate_falls_back() {
        let mut engine = EqEngine::new();
        let mut pcm = [0i16; 4];
        engine.process_buffer(&FixedHost::new(0, 0), &mut pcm, 2);
        assert_eq!(engine.sample_rate(), DEFAULT_SAMPLE_RATE);
    }

    #[test]
    fn test_frames_truncated_to_buffer() {
        let mut engine = EqEngine::new();
        let mut pcm = [1000i16; 7];
        assert!(engine.process_buffer(&HOST, &mut pcm, 100));
        assert_eq!(engine.analyzer_debug().0, 3);
        // Trailing half frame untouched
        assert_eq!(pcm[6], 1000);
    }

    #[test]
    fn test_gain_set_before_init_applies_on_first_buffer() {
        let mut engine = EqEngine::new();
        engine.set_band_gain(4, 9.0);
        assert_eq!(engine.applied_gains(), GainVector::FLAT);

        let mut pcm = [0i16; 4];
        engine.process_buffer(&HOST, &mut pcm, 2);
        assert_eq!(engine.applied_gains().get(4), 9.0);
    }

    #[test]
    fn test_small_change_after_init_still_applies() {
        let mut engine = EqEngine::new();
        let mut pcm = [0i16; 4];
        engine.process_buffer(&HOST, &mut pcm, 2);

        engine.set_band_gain(3, 0.1);
        engine.process_buffer(&HOST, &mut pcm, 2);
        assert_eq!(engine.applied_gains().get(3), 0.1);
    }

    #[test]
    fn test_sample_rate_change_tracked() {
        let mut engine = EqEngine::new();
        let mut pcm = [0i16; 4];
        engine.process_buffer(&HOST, &mut pcm, 2);
        engine.process_buffer(&FixedHost::new(44100, 2), &mut pcm, 2);
        assert_eq!(engine.sample_rate(), 44100.0);

        // Unknown rate keeps the current one
        engine.process_buffer(&FixedHost::new(0, 2), &mut pcm, 2);
        assert_eq!(engine.sample_rate(), 44100.0);
    }

    #[test]
    fn test_flac_detection() {
        let mut engine = EqEngine::new();
        let mut pcm = [0i16; 4];
        engine.process_buffer(&FixedHost::new(44100, CODEC_FLAC), &mut pcm, 2);
        assert!(engine.is_flac());
        engine.process_buffer(&FixedHost::new(44100, 2), &mut pcm, 2);
        assert!(!engine.is_flac());
    }

    #[test]
    fn test_volume_factor() {
        let mut engine = EqEngine::new();
        assert_eq!(engine.volume(), 1.0);
        engine.set_volume(21, 42);
        assert_eq!(engine.volume(), 0.5);
        engine.set_volume(50, 42);
        assert_eq!(engine.volume(), 1.0);
        engine.set_volume(3, 0);
        assert_eq!(engine.volume(), 1.0);
    }

    #[test]
    fn test_reset_returns_to_uninitialized() {
        let mut engine = EqEngine::new();
        engine.set_band_gain(0, 6.0);
        let mut pcm = [5000i16; 1024];
        engine.process_buffer(&HOST, &mut pcm, 512);
        assert_eq!(engine.analyzer_debug().0, 256);

        engine.reset();
        assert!(!engine.is_initialized());
        assert_eq!(engine.analyzer_debug(), (0, 0));
        assert_eq!(engine.clipping_ratio(), 0.0);
        assert_eq!(engine.gains().get(0), 6.0);
    }
}
