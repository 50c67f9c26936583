//! evo-dsp: DSP core of the Evo runtime equalizer
//!
//! Allocation-free, fixed-size processing for a 16-band graphic EQ and a
//! 256-point spectrum analyzer, designed to run inside an audio output
//! callback.
//!
//! ## Modules
//! - `bands` - Logarithmic band layout (20 Hz .. 20 kHz)
//! - `biquad` - Peaking-EQ coefficient design and Direct Form I sections
//! - `eq` - Gain vector, coefficient designer and stereo filter cascade
//! - `ring` - Mono analysis ring buffer with clipping statistics
//! - `fft` - In-place iterative radix-2 FFT
//! - `meter` - Per-band attack/release smoothing and peak hold
//! - `analyzer` - Band-energy and leveling pipeline
//! - `consts` - Analyzer tuning constants

pub mod analyzer;
pub mod bands;
pub mod biquad;
pub mod consts;
pub mod eq;
pub mod fft;
pub mod meter;
pub mod ring;

pub use analyzer::{AnalyzerStats, BandInfo, SpectrumAnalyzer};
pub use bands::{Band, BandLayout};
pub use eq::{GainVector, GraphicEq};
pub use ring::AnalysisRing;

use evo_core::StereoSample;

/// Trait for all DSP processors
pub trait Processor {
    /// Reset processor state
    fn reset(&mut self);
}

/// Stereo processor trait
pub trait StereoProcessor: Processor {
    /// Process a stereo sample pair
    fn process_frame(&mut self, frame: StereoSample) -> StereoSample;

    /// Process a stereo block in place
    fn process_block(&mut self, frames: &mut [StereoSample]) {
        for frame in frames.iter_mut() {
            *frame = self.process_frame(*frame);
        }
    }
}

/// Processor configuration for sample rate changes
pub trait ProcessorConfig {
    fn set_sample_rate(&mut self, sample_rate: f64);
}
