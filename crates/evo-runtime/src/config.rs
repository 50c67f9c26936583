//! Engine configuration
//!
//! Serializable snapshot of every user-facing setting. Missing fields take
//! their defaults, so partial JSON documents are valid. Values are clamped
//! when applied, not when parsed.

use evo_core::{EvoError, EvoResult, SENSITIVITY_RANGE};
use evo_dsp::GainVector;
use serde::{Deserialize, Serialize};

use crate::engine::{DEFAULT_VOLUME_STEPS, EqEngine};

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub eq_enabled: bool,
    pub analyzer_enabled: bool,
    pub volume_step: u8,
    pub max_volume_step: u8,
    /// Per-band gains in dB
    pub gains: GainVector,
    pub analyzer: AnalyzerSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            eq_enabled: true,
            analyzer_enabled: true,
            volume_step: DEFAULT_VOLUME_STEPS,
            max_volume_step: DEFAULT_VOLUME_STEPS,
            gains: GainVector::FLAT,
            analyzer: AnalyzerSettings::default(),
        }
    }
}

/// Spectrum analyzer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerSettings {
    pub sensitivity: f32,
    pub agc: bool,
    pub normalize: bool,
    pub pre_gain: bool,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            sensitivity: SENSITIVITY_RANGE.default,
            agc: true,
            normalize: true,
            pre_gain: true,
        }
    }
}

impl EngineConfig {
    /// Parse from JSON text
    pub fn from_json(json: &str) -> EvoResult<Self> {
        serde_json::from_str(json).map_err(|e| EvoError::Serialization(e.to_string()))
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> EvoResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| EvoError::Serialization(e.to_string()))
    }

    /// Snapshot the current settings of an engine
    pub fn from_engine(engine: &EqEngine) -> Self {
        let (volume_step, max_volume_step) = engine.volume_steps();
        Self {
            eq_enabled: engine.eq_enabled(),
            analyzer_enabled: engine.analyzer_enabled(),
            volume_step,
            max_volume_step,
            gains: engine.gains(),
            analyzer: AnalyzerSettings {
                sensitivity: engine.sensitivity(),
                agc: engine.agc(),
                normalize: engine.normalize(),
                pre_gain: engine.pre_gain(),
            },
        }
    }

    /// Push every setting through the engine's clamping setters
    pub fn apply_to(&self, engine: &mut EqEngine) {
        engine.set_eq_enabled(self.eq_enabled);
        engine.set_analyzer_enabled(self.analyzer_enabled);
        engine.set_volume(self.volume_step, self.max_volume_step);
        engine.set_gains(self.gains);
        engine.set_sensitivity(self.analyzer.sensitivity);
        engine.set_agc(self.analyzer.agc);
        engine.set_normalize(self.analyzer.normalize);
        engine.set_pre_gain(self.analyzer.pre_gain);
    }
}

impl EqEngine {
    /// Build an uninitialized engine with `config` applied
    pub fn with_config(config: &EngineConfig) -> Self {
        let mut engine = Self::new();
        config.apply_to(&mut engine);
        engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_engine() {
        let engine = EqEngine::new();
        assert_eq!(EngineConfig::from_engine(&engine), EngineConfig::default());
    }

    #[test]
    fn test_serialization() {
        let mut config = EngineConfig::default();
        config.gains.set(3, -4.5);
        config.analyzer.sensitivity = 0.8;
        config.analyzer.agc = false;

        let json = config.to_json().unwrap();
        let loaded = EngineConfig::from_json(&json).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EngineConfig::from_json(r#"{ "eq_enabled": false }"#).unwrap();
        assert!(!config.eq_enabled);
        assert!(config.analyzer_enabled);
        assert_eq!(config.gains, GainVector::FLAT);
        assert_eq!(config.analyzer, AnalyzerSettings::default());
    }

    #[test]
    fn test_gains_clamped_on_parse() {
        let json = r#"{ "gains": [30, -30, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0] }"#;
        let config = EngineConfig::from_json(json).unwrap();
        assert_eq!(config.gains.get(0), 18.0);
        assert_eq!(config.gains.get(1), -18.0);
        assert_eq!(config.gains.get(2), 1.0);
    }

    #[test]
    fn test_wrong_band_count_rejected() {
        let err = EngineConfig::from_json(r#"{ "gains": [1, 2, 3] }"#).unwrap_err();
        assert!(matches!(err, EvoError::Serialization(_)));
    }

    #[test]
    fn test_apply_clamps_sensitivity() {
        let config = EngineConfig {
            analyzer: AnalyzerSettings {
                sensitivity: 9.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let engine = EqEngine::with_config(&config);
        assert_eq!(engine.sensitivity(), 2.0);
        assert_eq!(EngineConfig::from_engine(&engine).analyzer.sensitivity, 2.0);
    }
}
