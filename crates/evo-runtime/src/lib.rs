//! evo-runtime: Host-facing equalizer engine
//!
//! Wires the DSP blocks into a single owned engine driven by the host's
//! per-buffer PCM callback, plus the configuration and control surface.
//!
//! ## Modules
//! - `host` - Host pipeline queries (sample rate, codec)
//! - `engine` - Per-buffer entry point and control surface
//! - `config` - Serializable engine configuration
//! - `shared` - Lock-protected handle for multi-threaded hosts

pub mod config;
pub mod engine;
pub mod host;
pub mod shared;

pub use config::{AnalyzerSettings, EngineConfig};
pub use engine::EqEngine;
pub use host::{CODEC_FLAC, FixedHost, HostStream};
pub use shared::SharedEngine;
