//! Equalizer configuration
//!
//! Constants the pipeline depends on but never computes itself: FFT order,
//! magnitude floor, axis bounds, FIFO capacities and tick rate. Stored as
//! JSON; every section falls back to its defaults when missing.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::{DEFAULT_FLOOR_DB, MAX_DISPLAY_FREQ, MIN_DISPLAY_FREQ, ZooError, ZooResult};

/// Supported analysis FFT sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FftOrder {
    #[default]
    Order2048 = 11,
    Order4096 = 12,
    Order8192 = 13,
}

impl FftOrder {
    /// log2 of the FFT size
    #[inline]
    pub fn exponent(self) -> u32 {
        self as u32
    }

    #[inline]
    pub fn size(self) -> usize {
        1 << self.exponent()
    }
}

impl TryFrom<usize> for FftOrder {
    type Error = ZooError;

    fn try_from(size: usize) -> ZooResult<Self> {
        match size {
            2048 => Ok(FftOrder::Order2048),
            4096 => Ok(FftOrder::Order4096),
            8192 => Ok(FftOrder::Order8192),
            other => Err(ZooError::InvalidFftOrder(other)),
        }
    }
}

/// Analysis window applied before the FFT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WindowKind {
    Rectangular,
    Hann,
    #[default]
    BlackmanHarris,
}

/// Spectrum analyzer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub fft_order: FftOrder,
    pub window: WindowKind,
    /// Magnitudes below this are clamped (dB)
    pub floor_db: f64,
    /// New samples between analyses; 0 means one full FFT window
    pub hop_size: usize,
    /// Exponential smoothing between consecutive snapshots (0 = off, <1)
    pub smoothing: f64,
    /// Completed snapshots buffered for the path builder
    pub spectrum_fifo_capacity: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            fft_order: FftOrder::Order2048,
            window: WindowKind::BlackmanHarris,
            floor_db: DEFAULT_FLOOR_DB,
            hop_size: 0,
            smoothing: 0.0,
            spectrum_fifo_capacity: 50,
        }
    }
}

impl AnalyzerConfig {
    /// Hop size with the "one full window" default resolved
    pub fn effective_hop(&self) -> usize {
        if self.hop_size == 0 {
            self.fft_order.size()
        } else {
            self.hop_size.min(self.fft_order.size())
        }
    }
}

/// Display axes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub min_freq: f64,
    pub max_freq: f64,
    /// Response curve gain axis is symmetric: [-gain_range_db, +gain_range_db]
    pub gain_range_db: f64,
    /// Bins advanced per spectrum path point (1 = every bin)
    pub path_stride: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            min_freq: MIN_DISPLAY_FREQ,
            max_freq: MAX_DISPLAY_FREQ,
            gain_range_db: 24.0,
            path_stride: 1,
        }
    }
}

/// Cross-thread plumbing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealtimeConfig {
    /// Slots in each audio-to-analysis block FIFO
    pub block_fifo_capacity: usize,
    /// Frames per block pushed into the FIFO
    pub block_size: usize,
    pub tick_rate_hz: f64,
    /// Generated paths buffered before the renderer takes the latest
    pub path_fifo_capacity: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            block_fifo_capacity: 30,
            block_size: 2048,
            tick_rate_hz: 60.0,
            path_fifo_capacity: 8,
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EqConfig {
    pub analyzer: AnalyzerConfig,
    pub display: DisplayConfig,
    pub realtime: RealtimeConfig,
}

impl EqConfig {
    /// Load from a JSON file and validate
    pub fn load(path: &Path) -> ZooResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: EqConfig = serde_json::from_str(&content)?;
        config.validate()?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save as pretty-printed JSON
    pub fn save(&self, path: &Path) -> ZooResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        log::debug!("Saved configuration to {:?}", path);
        Ok(())
    }

    pub fn validate(&self) -> ZooResult<()> {
        let a = &self.analyzer;
        if !(a.floor_db.is_finite() && a.floor_db < 0.0) {
            return Err(ZooError::Config(format!(
                "analyzer.floor_db must be negative, got {}",
                a.floor_db
            )));
        }
        if !(0.0..1.0).contains(&a.smoothing) {
            return Err(ZooError::Config(format!(
                "analyzer.smoothing must be in [0, 1), got {}",
                a.smoothing
            )));
        }
        if a.spectrum_fifo_capacity == 0 {
            return Err(ZooError::Config("analyzer.spectrum_fifo_capacity must be > 0".into()));
        }

        let d = &self.display;
        if !(d.min_freq > 0.0 && d.max_freq > d.min_freq) {
            return Err(ZooError::Config(format!(
                "display frequency bounds invalid: {}..{}",
                d.min_freq, d.max_freq
            )));
        }
        if !(d.gain_range_db.is_finite() && d.gain_range_db > 0.0) {
            return Err(ZooError::Config("display.gain_range_db must be > 0".into()));
        }
        if d.path_stride == 0 {
            return Err(ZooError::Config("display.path_stride must be > 0".into()));
        }

        let r = &self.realtime;
        if r.block_fifo_capacity == 0 || r.path_fifo_capacity == 0 {
            return Err(ZooError::Config("FIFO capacities must be > 0".into()));
        }
        if r.block_size == 0 || r.block_size > self.analyzer.fft_order.size() {
            return Err(ZooError::Config(format!(
                "realtime.block_size must be in 1..={}, got {}",
                self.analyzer.fft_order.size(),
                r.block_size
            )));
        }
        if !(r.tick_rate_hz.is_finite() && r.tick_rate_hz > 0.0) {
            return Err(ZooError::Config("realtime.tick_rate_hz must be > 0".into()));
        }
        Ok(())
    }
}
