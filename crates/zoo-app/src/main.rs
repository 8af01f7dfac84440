//! ZooEQ demo host
//!
//! Runs the whole pipeline without a plugin host: a synthetic audio thread
//! pushes a test signal through [`EqAudioProcessor`] while the main thread
//! drives the [`ResponseCurveController`] at the UI tick rate and logs what
//! an editor would draw.
//!
//! Usage:
//!   zooeq run [--config eq.json] [--preset preset.json] [--ticks 120]
//!   zooeq response --peak-freq 1000 --peak-gain 6
//!   zooeq init-config eq.json

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use portable_atomic::{AtomicBool, Ordering};
use std::f64::consts::TAU;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use zoo_core::{ChainSettings, EqConfig, EqParam, ParameterStore, Slope, check_sample_rate};
use zoo_dsp::design_chain;
use zoo_realtime::{EqAudioProcessor, EqContext, ResponseCurveController, create_pipeline, run_loop};
use zoo_viz::{
    FREQUENCY_GRID_HZ, FrequencyAxis, Rect, ResponseCurveEvaluator, format_frequency_label,
    format_gain_label,
};

/// Size of the simulated editor component
const COMPONENT_WIDTH: f64 = 600.0;
const COMPONENT_HEIGHT: f64 = 250.0;

#[derive(Parser)]
#[command(name = "zooeq", about = "ZooEQ pipeline demo host")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the audio and UI threads on a synthetic signal
    Run {
        /// JSON configuration file (defaults when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// JSON chain settings applied before playback
        #[arg(short, long)]
        preset: Option<PathBuf>,

        /// UI ticks to run before stopping
        #[arg(short, long, default_value_t = 120)]
        ticks: u64,

        #[arg(long, default_value_t = 48000.0)]
        sample_rate: f64,

        /// Host callback size in samples
        #[arg(long, default_value_t = 512)]
        host_block: usize,

        /// Sweep the peak gain while running to exercise redesigns
        #[arg(long)]
        sweep: bool,

        /// Start with the spectrum analyzer switched off
        #[arg(long)]
        no_analyzer: bool,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Print the magnitude response of a setting at the grid frequencies
    Response {
        #[arg(long, default_value_t = 48000.0)]
        sample_rate: f64,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Write the default configuration as JSON
    InitConfig {
        /// Destination file
        path: PathBuf,
    },
}

/// Per-parameter overrides; unset values keep their defaults
#[derive(Args)]
struct SettingsArgs {
    #[arg(long)]
    peak_freq: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    peak_gain: Option<f64>,

    #[arg(long)]
    peak_q: Option<f64>,

    #[arg(long)]
    low_cut: Option<f64>,

    #[arg(long)]
    high_cut: Option<f64>,

    /// Low-cut stage count (1-4)
    #[arg(long)]
    low_cut_slope: Option<u8>,

    /// High-cut stage count (1-4)
    #[arg(long)]
    high_cut_slope: Option<u8>,
}

impl SettingsArgs {
    fn apply(&self, mut settings: ChainSettings) -> Result<ChainSettings> {
        if let Some(freq) = self.peak_freq {
            settings.peak_freq = freq;
        }
        if let Some(gain) = self.peak_gain {
            settings.peak_gain_db = gain;
        }
        if let Some(q) = self.peak_q {
            settings.peak_quality = q;
        }
        if let Some(freq) = self.low_cut {
            settings.low_cut_freq = freq;
        }
        if let Some(freq) = self.high_cut {
            settings.high_cut_freq = freq;
        }
        if let Some(order) = self.low_cut_slope {
            settings.low_cut_slope = Slope::try_from(order)?;
        }
        if let Some(order) = self.high_cut_slope {
            settings.high_cut_slope = Slope::try_from(order)?;
        }
        settings.validate()?;
        Ok(settings)
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            preset,
            ticks,
            sample_rate,
            host_block,
            sweep,
            no_analyzer,
            settings,
        } => {
            let config = load_config(config.as_deref())?;
            let base = match preset {
                Some(path) => load_preset(&path)?,
                None => ChainSettings::default(),
            };
            let settings = settings.apply(base)?;
            run(
                &config,
                settings,
                RunOptions {
                    ticks,
                    sample_rate,
                    host_block,
                    sweep,
                    analyzer: !no_analyzer,
                },
            )
        }
        Commands::Response {
            sample_rate,
            settings,
        } => {
            let settings = settings.apply(ChainSettings::default())?;
            print_response(&settings, sample_rate)
        }
        Commands::InitConfig { path } => {
            EqConfig::default()
                .save(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote default configuration to {}", path.display());
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<EqConfig> {
    match path {
        Some(path) => {
            EqConfig::load(path).with_context(|| format!("Failed to load {}", path.display()))
        }
        None => Ok(EqConfig::default()),
    }
}

fn load_preset(path: &Path) -> Result<ChainSettings> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read preset {}", path.display()))?;
    let settings: ChainSettings = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse preset {}", path.display()))?;
    Ok(settings)
}

struct RunOptions {
    ticks: u64,
    sample_rate: f64,
    host_block: usize,
    sweep: bool,
    analyzer: bool,
}

fn run(config: &EqConfig, settings: ChainSettings, options: RunOptions) -> Result<()> {
    if options.ticks == 0 {
        bail!("--ticks must be at least 1");
    }
    if options.host_block == 0 {
        bail!("--host-block must be at least 1");
    }

    let params = Arc::new(ParameterStore::new());
    settings.apply_to(&params);
    params.set_bool(EqParam::AnalyzerEnabled, options.analyzer);

    let context = EqContext::new(Arc::clone(&params), options.sample_rate);
    let (mut processor, mut controller) =
        create_pipeline(&context, config).context("Failed to build pipeline")?;
    processor
        .prepare(options.sample_rate, options.host_block)
        .context("Failed to prepare audio processor")?;

    let stop = Arc::new(AtomicBool::new(false));
    let audio = spawn_audio_thread(
        processor,
        Arc::clone(&stop),
        options.sample_rate,
        options.host_block,
    )?;

    let component = Rect::new(0.0, 0.0, COMPONENT_WIDTH, COMPONENT_HEIGHT);
    let log_every = config.realtime.tick_rate_hz.round().max(1.0) as u64;
    let gain_range = EqParam::PeakGain.range();

    let ran = run_loop(config.realtime.tick_rate_hz, &stop, |tick| {
        if options.sweep {
            let phase = tick as f64 / options.ticks as f64;
            params.set(EqParam::PeakGain, gain_range.max * (TAU * phase).sin());
        }

        let report = controller.tick(component);
        if report.designed {
            log::debug!("tick {}: chain redesigned", tick);
        }
        if tick % log_every == 0 {
            log_tick(&controller, tick, report.dropped_blocks);
        }
        tick + 1 < options.ticks
    });

    stop.store(true, Ordering::Release);
    audio
        .join()
        .map_err(|_| anyhow!("Audio thread panicked"))?;

    log::info!(
        "Ran {} ticks, {} chain designs",
        ran,
        controller.designs_performed()
    );
    print_summary(&controller, component);
    Ok(())
}

/// Feed a three-tone test signal through the processor at real-time pace
fn spawn_audio_thread(
    mut processor: EqAudioProcessor,
    stop: Arc<AtomicBool>,
    sample_rate: f64,
    host_block: usize,
) -> Result<thread::JoinHandle<()>> {
    const TONES: [(f64, f64); 3] = [(100.0, 0.3), (1000.0, 0.3), (8000.0, 0.2)];
    let period = Duration::from_secs_f64(host_block as f64 / sample_rate);

    thread::Builder::new()
        .name("zoo-audio".into())
        .spawn(move || {
            let mut left = vec![0.0; host_block];
            let mut right = vec![0.0; host_block];
            let mut position: u64 = 0;

            while !stop.load(Ordering::Acquire) {
                for (i, (l, r)) in left.iter_mut().zip(right.iter_mut()).enumerate() {
                    let t = (position + i as u64) as f64 / sample_rate;
                    let sample: f64 = TONES
                        .iter()
                        .map(|&(freq, amp)| amp * (TAU * freq * t).sin())
                        .sum();
                    *l = sample;
                    *r = sample;
                }
                position += host_block as u64;

                processor.process(&mut left, &mut right);
                thread::sleep(period);
            }
            log::debug!("Audio thread stopped after {} samples", position);
        })
        .context("Failed to spawn audio thread")
}

fn log_tick(controller: &ResponseCurveController, tick: u64, dropped_blocks: u64) {
    let curve = controller.response_curve(COMPONENT_WIDTH as usize);
    let (min, max) = curve
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    let spectrum_points = match controller.spectrum_paths() {
        Some((left, _)) => left.map_or(0, |path| path.len()),
        None => 0,
    };

    log::info!(
        "tick {}: response {:+.1}..{:+.1} dB, spectrum path {} points, {} blocks dropped",
        tick,
        min,
        max,
        spectrum_points,
        dropped_blocks
    );
}

fn print_summary(controller: &ResponseCurveController, component: Rect) {
    let chain = controller.published();
    let evaluator = ResponseCurveEvaluator::default();
    println!("Published chain at {} Hz", chain.sample_rate);
    for freq in FREQUENCY_GRID_HZ {
        let db = evaluator.evaluate_at(chain, freq);
        println!("  {:>6}  {:>6} dB", format_frequency_label(freq), format_gain_label(db.round()));
    }

    let path = controller.response_path(component);
    println!("Response path: {} points", path.len());
    match controller.spectrum_paths() {
        Some((left, right)) => println!(
            "Spectrum paths: left {} points, right {} points",
            left.map_or(0, |p| p.len()),
            right.map_or(0, |p| p.len())
        ),
        None => println!("Spectrum analyzer disabled"),
    }
}

fn print_response(settings: &ChainSettings, sample_rate: f64) -> Result<()> {
    let sample_rate = check_sample_rate(sample_rate)?;
    let chain = design_chain(settings, sample_rate);
    let evaluator = ResponseCurveEvaluator::new(FrequencyAxis::default());

    println!(
        "Peak {:.1} Hz {:+.1} dB Q {:.2} | low cut {:.1} Hz {} | high cut {:.1} Hz {}",
        settings.peak_freq,
        settings.peak_gain_db,
        settings.peak_quality,
        settings.low_cut_freq,
        settings.low_cut_slope.label(),
        settings.high_cut_freq,
        settings.high_cut_slope.label()
    );
    for freq in FREQUENCY_GRID_HZ {
        println!(
            "  {:>6}  {:+7.2} dB",
            format_frequency_label(freq),
            evaluator.evaluate_at(&chain, freq)
        );
    }
    Ok(())
}
