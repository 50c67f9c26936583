//! Analysis ring buffer
//!
//! Holds the most recent `FFT_SIZE` mono samples of the post-EQ, pre-volume
//! signal. The producer (sample loop) overwrites unconditionally; the
//! analyzer copies the window out in time order without consuming it.

use evo_core::{Sample, StereoSample};

use crate::consts::{CLIP_THRESHOLD, FFT_SIZE};

/// Fixed-capacity circular buffer with fill and clipping statistics
#[derive(Debug, Clone)]
pub struct AnalysisRing {
    buffer: [Sample; FFT_SIZE],
    write_pos: usize,
    /// Saturates at FFT_SIZE
    filled: usize,
    total_samples: u64,
    clipped_samples: u64,
}

impl AnalysisRing {
    pub fn new() -> Self {
        Self {
            buffer: [0.0; FFT_SIZE],
            write_pos: 0,
            filled: 0,
            total_samples: 0,
            clipped_samples: 0,
        }
    }

    /// Downmix a stereo pair and capture it
    #[inline]
    pub fn push_frame(&mut self, frame: StereoSample) {
        self.push(frame.signed_rms());
    }

    /// Capture one mono sample
    #[inline]
    pub fn push(&mut self, sample: Sample) {
        self.total_samples += 1;
        if sample.abs() >= CLIP_THRESHOLD {
            self.clipped_samples += 1;
        }

        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % FFT_SIZE;
        if self.filled < FFT_SIZE {
            self.filled += 1;
        }
    }

    /// Copy the window into `out` oldest-first; returns the peak |sample|
    pub fn copy_ordered(&self, out: &mut [Sample; FFT_SIZE]) -> Sample {
        let (newer, older) = self.buffer.split_at(self.write_pos);
        let (head, tail) = out.split_at_mut(older.len());
        head.copy_from_slice(older);
        tail.copy_from_slice(newer);

        out.iter().fold(0.0, |peak: Sample, s| peak.max(s.abs()))
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.filled >= FFT_SIZE
    }

    #[inline]
    pub fn filled(&self) -> usize {
        self.filled
    }

    #[inline]
    pub fn write_pos(&self) -> usize {
        self.write_pos
    }

    /// Raw slot by physical index
    #[inline]
    pub fn sample(&self, index: usize) -> Option<Sample> {
        self.buffer.get(index).copied()
    }

    #[inline]
    pub fn total_samples(&self) -> u64 {
        self.total_samples
    }

    #[inline]
    pub fn clipped_samples(&self) -> u64 {
        self.clipped_samples
    }

    /// Clipped / total since the last reset; 0 when nothing was captured
    pub fn clipping_ratio(&self) -> f32 {
        if self.total_samples == 0 {
            return 0.0;
        }
        (self.clipped_samples as f64 / self.total_samples as f64) as f32
    }

    pub fn reset_clipping(&mut self) {
        self.clipped_samples = 0;
        self.total_samples = 0;
    }

    /// Rewind cursor and fill state. Statistics are kept.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
        self.filled = 0;
    }
}

impl Default for AnalysisRing {
    fn default() -> Self {
        Self::new()
    }
}
