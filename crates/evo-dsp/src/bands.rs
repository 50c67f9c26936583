//! Logarithmic band layout
//!
//! Sixteen slots spaced evenly in log-frequency between 20 Hz and 20 kHz.
//! Shared by the equalizer (peaking centers) and the analyzer (bin mapping
//! and frequency shaping).

use evo_core::{BAND_COUNT, DISPLAY_FREQUENCIES, MAX_BAND_FREQ, MIN_BAND_FREQ, log_interpolate};
use serde::Serialize;

/// Center frequency of band `index` out of `count`:
/// `f0 * (f1/f0)^(index/(count-1))`
#[inline]
pub fn center_frequency(index: usize, count: usize) -> f64 {
    if count < 2 {
        return MIN_BAND_FREQ;
    }
    let t = index as f64 / (count - 1) as f64;
    log_interpolate(MIN_BAND_FREQ, MAX_BAND_FREQ, t)
}

/// Analysis edges of band `index` out of `count`.
///
/// Unlike the centers, edges divide the range into `count` equal log slices,
/// so band `i` spans `[f(i/count), f((i+1)/count))`.
#[inline]
pub fn analysis_edges(index: usize, count: usize) -> (f64, f64) {
    let count = count.max(1) as f64;
    let start = log_interpolate(MIN_BAND_FREQ, MAX_BAND_FREQ, index as f64 / count);
    let end = log_interpolate(MIN_BAND_FREQ, MAX_BAND_FREQ, (index + 1) as f64 / count);
    (start, end)
}

/// One fixed frequency slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Band {
    pub index: usize,
    /// Exact center frequency (Hz)
    pub center_hz: f32,
    /// Rounded nominal frequency for display (Hz)
    pub display_hz: u32,
}

/// The immutable set of bands, computed once
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandLayout {
    bands: [Band; BAND_COUNT],
}

impl BandLayout {
    pub fn new() -> Self {
        let bands = std::array::from_fn(|index| Band {
            index,
            center_hz: center_frequency(index, BAND_COUNT) as f32,
            display_hz: DISPLAY_FREQUENCIES[index],
        });
        Self { bands }
    }

    #[inline]
    pub fn bands(&self) -> &[Band; BAND_COUNT] {
        &self.bands
    }

    #[inline]
    pub fn band(&self, index: usize) -> Option<&Band> {
        self.bands.get(index)
    }

    #[inline]
    pub fn center(&self, index: usize) -> f32 {
        self.bands[index].center_hz
    }

    pub fn iter(&self) -> impl Iterator<Item = &Band> {
        self.bands.iter()
    }
}

impl Default for BandLayout {
    fn default() -> Self {
        Self::new()
    }
}
