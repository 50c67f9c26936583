//! Host pipeline queries
//!
//! The decoder/output pipeline that owns the PCM buffers is external; the
//! engine only asks it for the current stream parameters.

/// Codec identifier the host reports for FLAC streams
pub const CODEC_FLAC: i32 = 5;

/// Stream parameters provided by the host audio pipeline
pub trait HostStream {
    /// Current output sample rate (Hz); 0 when unknown
    fn sample_rate(&self) -> u32;

    /// Current decoder identifier. Only compared for changes.
    fn codec(&self) -> i32;
}

/// Host with fixed stream parameters, for offline processing and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedHost {
    pub sample_rate: u32,
    pub codec: i32,
}

impl FixedHost {
    pub const fn new(sample_rate: u32, codec: i32) -> Self {
        Self { sample_rate, codec }
    }
}

impl HostStream for FixedHost {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn codec(&self) -> i32 {
        self.codec
    }
}

impl<T: HostStream + ?Sized> HostStream for &T {
    fn sample_rate(&self) -> u32 {
        (**self).sample_rate()
    }

    fn codec(&self) -> i32 {
        (**self).codec()
    }
}
