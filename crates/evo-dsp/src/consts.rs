//! Analyzer tuning constants

use evo_core::Sample;

/// Analysis window / FFT length
pub const FFT_SIZE: usize = 256;

/// Retained spectrum bins (first half)
pub const BIN_COUNT: usize = FFT_SIZE / 2;

/// Downmixed magnitude counted as clipping
pub const CLIP_THRESHOLD: Sample = 0.99;

/// Retention of the slow running peak per evaluation
pub const RUNNING_PEAK_RETENTION: Sample = 0.95;

/// Level the AGC steers the running peak towards
pub const AGC_TARGET: Sample = 0.4;

/// AGC gain retention per evaluation (0.9-0.99)
pub const AGC_SPEED: Sample = 0.95;

/// Running peak below which the AGC does not adapt
pub const AGC_MIN_PEAK: Sample = 0.01;

/// Window peak ceiling applied by input normalization
pub const INPUT_CEILING: Sample = 0.5;

/// Floor applied to band RMS before the logarithm
pub const RMS_FLOOR: Sample = 1e-9;

/// Bottom of the displayed dB range
pub const DB_FLOOR: Sample = -80.0;

/// Smoothed levels and peaks below this are forced to zero
pub const LEVEL_FLOOR: Sample = 0.03;

/// Evaluations a new peak is held before decaying
pub const PEAK_HOLD_CYCLES: u32 = 5;

/// Geometric peak decay per evaluation once the hold expires
pub const PEAK_DECAY: Sample = 0.90;

/// Running peak above which audio counts as playing
pub const PLAYING_PEAK_FLOOR: Sample = 0.001;
