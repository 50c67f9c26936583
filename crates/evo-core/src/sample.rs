//! Sample types and PCM conversion

/// Type alias for audio samples
///
/// 32-bit: the target is a single-precision embedded FPU.
pub type Sample = f32;

/// Full-scale divisor for signed 16-bit PCM
pub const PCM_SCALE: Sample = 32768.0;

/// Stereo sample pair
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C)]
pub struct StereoSample {
    pub left: Sample,
    pub right: Sample,
}

impl StereoSample {
    #[inline]
    pub const fn new(left: Sample, right: Sample) -> Self {
        Self { left, right }
    }

    #[inline]
    pub fn from_pcm(left: i16, right: i16) -> Self {
        Self {
            left: pcm_to_sample(left),
            right: pcm_to_sample(right),
        }
    }

    /// Clamp both channels to [-1, 1]
    #[inline]
    pub fn clamped(self) -> Self {
        Self {
            left: self.left.clamp(-1.0, 1.0),
            right: self.right.clamp(-1.0, 1.0),
        }
    }

    #[inline]
    pub fn scaled(self, gain: Sample) -> Self {
        Self {
            left: self.left * gain,
            right: self.right * gain,
        }
    }

    /// RMS combine of both channels, `sqrt(0.5 * (L² + R²))`
    #[inline]
    pub fn rms(self) -> Sample {
        (0.5 * (self.left * self.left + self.right * self.right)).sqrt()
    }

    /// RMS combine carrying the polarity of the stereo sum.
    ///
    /// When the sum is exactly zero the louder channel decides the sign.
    #[inline]
    pub fn signed_rms(self) -> Sample {
        let magnitude = self.rms();
        let sum = self.left + self.right;
        let negative = if sum != 0.0 {
            sum < 0.0
        } else if self.left.abs() >= self.right.abs() {
            self.left < 0.0
        } else {
            self.right < 0.0
        };
        if negative { -magnitude } else { magnitude }
    }
}

/// Convert a signed 16-bit PCM value to [-1, 1)
#[inline]
pub fn pcm_to_sample(value: i16) -> Sample {
    value as Sample / PCM_SCALE
}

/// Convert a sample back to 16-bit PCM, rounding half away from zero and
/// saturating to the i16 range.
#[inline]
pub fn sample_to_pcm(value: Sample) -> i16 {
    let scaled = (value * PCM_SCALE).round();
    scaled.clamp(i16::MIN as Sample, i16::MAX as Sample) as i16
}
