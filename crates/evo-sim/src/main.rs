//! Evo EQ simulator
//!
//! Plays a synthesized signal through the engine the way the decoder
//! pipeline would, then prints the analyzer readout.
//!
//! Usage:
//!   evo-sim tone --freq 1000            - Sine tone
//!   evo-sim noise --seed 7              - White noise
//!   evo-sim silence                     - Digital silence
//!
//! Common options: `--gain 9=6.0` (repeatable), `--config eq.json`,
//! `--sensitivity 0.5`, `--no-agc`, `--no-eq`, `--json`.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use evo_core::{BAND_COUNT, PCM_SCALE, sanitize_sample_rate};
use evo_runtime::{EngineConfig, EqEngine, FixedHost};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Frames handed to the engine per callback
const BLOCK_FRAMES: usize = 512;

#[derive(Parser)]
#[command(name = "evo-sim", about = "Run test signals through the Evo equalizer")]
struct Cli {
    #[command(subcommand)]
    signal: Signal,

    #[command(flatten)]
    options: Options,
}

#[derive(Subcommand)]
enum Signal {
    /// Sine tone in both channels
    Tone {
        /// Frequency in Hz
        #[arg(short, long, default_value_t = 1000.0)]
        freq: f64,
        /// Peak amplitude, 0..1
        #[arg(short, long, default_value_t = 0.8)]
        amplitude: f64,
    },
    /// Uncorrelated white noise
    Noise {
        /// Peak amplitude, 0..1
        #[arg(short, long, default_value_t = 0.5)]
        amplitude: f64,
        #[arg(long, default_value_t = 1)]
        seed: u64,
    },
    /// Digital silence
    Silence,
}

#[derive(Args)]
struct Options {
    /// Host sample rate (0 = unknown)
    #[arg(long, global = true, default_value_t = 48000)]
    sample_rate: u32,

    /// Host codec identifier
    #[arg(long, global = true, default_value_t = 0)]
    codec: i32,

    /// Signal length in seconds
    #[arg(long, global = true, default_value_t = 0.5)]
    seconds: f64,

    /// Engine configuration (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Band gain as BAND=DB, e.g. 9=6.0
    #[arg(long = "gain", global = true, value_parser = parse_band_gain)]
    gains: Vec<(usize, f32)>,

    /// Analyzer sensitivity (0.1..2.0)
    #[arg(long, global = true)]
    sensitivity: Option<f32>,

    /// Disable analyzer AGC
    #[arg(long, global = true)]
    no_agc: bool,

    /// Bypass the equalizer
    #[arg(long, global = true)]
    no_eq: bool,

    /// Print the readout as JSON
    #[arg(long, global = true)]
    json: bool,
}

fn parse_band_gain(value: &str) -> Result<(usize, f32), String> {
    let (band, gain) = value
        .split_once('=')
        .ok_or_else(|| format!("expected BAND=DB, got '{value}'"))?;
    let band: usize = band
        .trim()
        .parse()
        .map_err(|e| format!("invalid band '{band}': {e}"))?;
    if band >= BAND_COUNT {
        return Err(format!("band must be below {BAND_COUNT}, got {band}"));
    }
    let gain: f32 = gain
        .trim()
        .parse()
        .map_err(|e| format!("invalid gain '{gain}': {e}"))?;
    Ok((band, gain))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let options = &cli.options;

    if options.seconds <= 0.0 {
        bail!("--seconds must be positive");
    }

    let mut engine = build_engine(options)?;
    let host = FixedHost::new(options.sample_rate, options.codec);

    let rate = sanitize_sample_rate(options.sample_rate as f64);
    let frames = (rate * options.seconds) as usize;
    let mut pcm = synthesize(&cli.signal, frames, rate);
    log::info!("processing {frames} frames at {rate} Hz");

    for block in pcm.chunks_mut(BLOCK_FRAMES * 2) {
        let frames = (block.len() / 2) as i32;
        engine.process_buffer(&host, block, frames);
    }

    report(&mut engine, options.json)
}

fn build_engine(options: &Options) -> Result<EqEngine> {
    let config = match &options.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            EngineConfig::from_json(&text)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => EngineConfig::default(),
    };

    let mut engine = EqEngine::with_config(&config);
    for &(band, gain) in &options.gains {
        engine.set_band_gain(band, gain);
    }
    if let Some(sensitivity) = options.sensitivity {
        engine.set_sensitivity(sensitivity);
    }
    if options.no_agc {
        engine.set_agc(false);
    }
    if options.no_eq {
        engine.set_eq_enabled(false);
    }
    Ok(engine)
}

/// Interleaved stereo i16 PCM
fn synthesize(signal: &Signal, frames: usize, sample_rate: f64) -> Vec<i16> {
    let to_pcm = |x: f64| (x.clamp(-1.0, 1.0) * (PCM_SCALE as f64 - 1.0)).round() as i16;

    match *signal {
        Signal::Tone { freq, amplitude } => (0..frames)
            .flat_map(|i| {
                let phase = 2.0 * std::f64::consts::PI * freq * i as f64 / sample_rate;
                let s = to_pcm(amplitude * phase.sin());
                [s, s]
            })
            .collect(),
        Signal::Noise { amplitude, seed } => {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..frames * 2)
                .map(|_| to_pcm(amplitude * rng.random_range(-1.0..1.0)))
                .collect()
        }
        Signal::Silence => vec![0; frames * 2],
    }
}

fn report(engine: &mut EqEngine, json: bool) -> Result<()> {
    let bands = engine.bands();
    let peaks = engine.peaks();
    let stats = engine.stats();

    if json {
        let readout = serde_json::json!({
            "bands": bands,
            "peaks": peaks,
            "stats": stats,
            "clipping": engine.clipping_ratio(),
            "playing": engine.is_audio_playing(),
            "agc_gain": engine.agc_gain(),
        });
        println!("{}", serde_json::to_string_pretty(&readout)?);
        return Ok(());
    }

    println!("{:>6}  {:<32} {:>5}  {:>5}", "Hz", "level", "lvl", "peak");
    for (info, peak) in bands.iter().zip(peaks.iter()) {
        let width = (info.level * 32.0).round() as usize;
        println!(
            "{:>6}  {:<32} {:>5.2}  {:>5.2}",
            info.frequency,
            "#".repeat(width),
            info.level,
            peak
        );
    }
    println!();
    println!("sum {:.2}  max {:.2}  agc {:.2}", stats.sum, stats.max, engine.agc_gain());
    println!(
        "clipping {:.1}%  playing {}",
        engine.clipping_ratio() * 100.0,
        engine.is_audio_playing()
    );
    Ok(())
}
