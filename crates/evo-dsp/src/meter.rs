//! Per-band display level with instant attack, frequency-dependent release
//! and an independent peak-hold marker.

use evo_core::Sample;

use crate::consts::{LEVEL_FLOOR, PEAK_DECAY, PEAK_HOLD_CYCLES};

/// Release retention per evaluation by band center frequency.
///
/// Bass bands keep 60% of their level per cycle, treble bands only 5%.
pub fn release_retention(center_hz: f32) -> Sample {
    match center_hz {
        f if f < 80.0 => 0.60,
        f if f < 200.0 => 0.50,
        f if f < 500.0 => 0.40,
        f if f < 1500.0 => 0.30,
        f if f < 5000.0 => 0.20,
        f if f < 10000.0 => 0.10,
        _ => 0.05,
    }
}

/// Smoothed level and peak hold for one band
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BandMeter {
    level: Sample,
    peak: Sample,
    /// Evaluations left before the peak starts to decay
    hold: u32,
}

impl BandMeter {
    /// Feed one normalized value (0..1) with the band's release retention
    pub fn update(&mut self, value: Sample, retention: Sample) {
        let value = value.clamp(0.0, 1.0);

        if value > self.level {
            self.level = value;
        } else {
            self.level = self.level * retention + value * (1.0 - retention);
            if self.level < LEVEL_FLOOR {
                self.level = 0.0;
            }
        }

        if value > self.peak {
            self.peak = value;
            self.hold = PEAK_HOLD_CYCLES;
        } else if self.hold > 0 {
            self.hold -= 1;
        } else {
            self.peak *= PEAK_DECAY;
            if self.peak < LEVEL_FLOOR {
                self.peak = 0.0;
            }
        }

        self.level = self.level.clamp(0.0, 1.0);
        self.peak = self.peak.clamp(0.0, 1.0);
    }

    #[inline]
    pub fn level(&self) -> Sample {
        self.level
    }

    #[inline]
    pub fn peak(&self) -> Sample {
        self.peak
    }

    #[inline]
    pub fn hold(&self) -> u32 {
        self.hold
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_instant_attack() {
        let mut m = BandMeter::default();
        m.update(0.8, 0.6);
        assert_eq!(m.level(), 0.8);
        assert_eq!(m.peak(), 0.8);
        assert_eq!(m.hold(), PEAK_HOLD_CYCLES);
    }

    #[test]
    fn test_release_blend() {
        let mut m = BandMeter::default();
        m.update(0.8, 0.6);
        m.update(0.2, 0.6);
        assert_relative_eq!(m.level(), 0.8 * 0.6 + 0.2 * 0.4);
    }

    #[test]
    fn test_level_floor_forces_zero() {
        let mut m = BandMeter::default();
        m.update(0.05, 0.5);
        m.update(0.0, 0.5);
        // 0.025 < floor
        assert_eq!(m.level(), 0.0);
    }

    #[test]
    fn test_peak_holds_then_decays() {
        let mut m = BandMeter::default();
        m.update(0.9, 0.05);
        for _ in 0..PEAK_HOLD_CYCLES {
            m.update(0.0, 0.05);
            assert_eq!(m.peak(), 0.9);
        }
        m.update(0.0, 0.05);
        assert_relative_eq!(m.peak(), 0.9 * PEAK_DECAY);
        m.update(0.0, 0.05);
        assert_relative_eq!(m.peak(), 0.9 * PEAK_DECAY * PEAK_DECAY);
    }

    #[test]
    fn test_peak_decays_to_zero() {
        let mut m = BandMeter::default();
        m.update(1.0, 0.6);
        for _ in 0..200 {
            m.update(0.0, 0.6);
        }
        assert_eq!(m.peak(), 0.0);
        assert_eq!(m.level(), 0.0);
    }

    #[test]
    fn test_new_high_rearms_hold() {
        let mut m = BandMeter::default();
        m.update(0.5, 0.3);
        m.update(0.1, 0.3);
        m.update(0.1, 0.3);
        m.update(0.7, 0.3);
        assert_eq!(m.peak(), 0.7);
        assert_eq!(m.hold(), PEAK_HOLD_CYCLES);
        assert!(m.peak() >= m.level());
    }

    #[test]
    fn test_release_table_monotonic() {
        let centers = [20.0, 100.0, 300.0, 1000.0, 3000.0, 8000.0, 15000.0];
        for pair in centers.windows(2) {
            assert!(release_retention(pair[0]) > release_retention(pair[1]));
        }
    }
}
