//! Spectrum analysis: rolling window, windowed real FFT, dB snapshots
//!
//! Runs on the UI-rate thread only. Blocks drained from the audio FIFO are
//! shifted into a fixed-length [`RollingSampleWindow`]; once `hop` new
//! samples have arrived the window is analysed and a [`SpectralSnapshot`]
//! is queued for the path builder.

use realfft::{RealFftPlanner, RealToComplex};
use rustfft::num_complex::Complex;
use std::f64::consts::PI;
use std::sync::Arc;
use zoo_core::{AnalyzerConfig, Decibels, Sample, SnapshotFifo, WindowKind};

// ============================================================================
// WINDOW FUNCTIONS
// ============================================================================

/// Analysis window, evaluated once into a lookup table
#[derive(Debug, Clone)]
pub struct WindowFunction {
    kind: WindowKind,
    table: Vec<f64>,
}

impl WindowFunction {
    pub fn new(kind: WindowKind, size: usize) -> Self {
        let denom = size.saturating_sub(1).max(1) as f64;
        let table = (0..size)
            .map(|i| {
                let x = 2.0 * PI * i as f64 / denom;
                match kind {
                    WindowKind::Rectangular => 1.0,
                    WindowKind::Hann => 0.5 * (1.0 - x.cos()),
                    WindowKind::BlackmanHarris => {
                        0.35875 - 0.48829 * x.cos() + 0.14128 * (2.0 * x).cos()
                            - 0.01168 * (3.0 * x).cos()
                    }
                }
            })
            .collect();
        Self { kind, table }
    }

    #[inline]
    pub fn kind(&self) -> WindowKind {
        self.kind
    }

    #[inline]
    pub fn table(&self) -> &[f64] {
        &self.table
    }

    /// Multiply `samples` into `out` element-wise
    pub fn apply(&self, samples: &[Sample], out: &mut [f64]) {
        for ((o, &s), &w) in out.iter_mut().zip(samples).zip(&self.table) {
            *o = s * w;
        }
    }
}

// ============================================================================
// ROLLING WINDOW
// ============================================================================

/// Fixed-length mono shift register: new samples enter at the tail, the
/// oldest fall off the head.
#[derive(Debug, Clone)]
pub struct RollingSampleWindow {
    samples: Vec<Sample>,
}

impl RollingSampleWindow {
    pub fn new(len: usize) -> Self {
        Self {
            samples: vec![0.0; len],
        }
    }

    /// Shift left by `block.len()` and append `block` at the tail
    pub fn push_block(&mut self, block: &[Sample]) {
        let len = self.samples.len();
        if block.is_empty() || len == 0 {
            return;
        }
        if block.len() >= len {
            self.samples.copy_from_slice(&block[block.len() - len..]);
            return;
        }
        let keep = len - block.len();
        self.samples.copy_within(block.len().., 0);
        self.samples[keep..].copy_from_slice(block);
    }

    #[inline]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.fill(0.0);
    }
}

// ============================================================================
// SNAPSHOTS
// ============================================================================

/// One completed analysis: `fft_size / 2` magnitudes in dB, floor-clamped
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralSnapshot {
    magnitudes_db: Arc<[f64]>,
}

impl SpectralSnapshot {
    pub fn new(magnitudes_db: Vec<f64>) -> Self {
        Self {
            magnitudes_db: magnitudes_db.into(),
        }
    }

    /// Every bin at `floor_db`
    pub fn silent(bins: usize, floor_db: f64) -> Self {
        Self::new(vec![floor_db; bins])
    }

    #[inline]
    pub fn magnitudes(&self) -> &[f64] {
        &self.magnitudes_db
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.magnitudes_db.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.magnitudes_db.is_empty()
    }
}

// ============================================================================
// ANALYZER
// ============================================================================

/// FFT analyzer producing spectral snapshots for display
pub struct SpectrumAnalyzer {
    fft: Arc<dyn RealToComplex<f64>>,
    fft_size: usize,
    window: WindowFunction,
    rolling: RollingSampleWindow,
    fft_input: Vec<f64>,
    fft_output: Vec<Complex<f64>>,
    fft_scratch: Vec<Complex<f64>>,
    previous_db: Vec<f64>,
    has_previous: bool,
    floor_db: f64,
    smoothing: f64,
    hop: usize,
    pending: usize,
    snapshots: SnapshotFifo<SpectralSnapshot>,
}

impl SpectrumAnalyzer {
    pub fn new(config: &AnalyzerConfig) -> Self {
        let fft_size = config.fft_order.size();
        let mut planner = RealFftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(fft_size);

        let fft_input = fft.make_input_vec();
        let fft_output = fft.make_output_vec();
        let fft_scratch = fft.make_scratch_vec();

        log::debug!(
            "Spectrum analyzer: {} point FFT, {:?} window, floor {} dB",
            fft_size,
            config.window,
            config.floor_db
        );

        Self {
            fft,
            fft_size,
            window: WindowFunction::new(config.window, fft_size),
            rolling: RollingSampleWindow::new(fft_size),
            fft_input,
            fft_output,
            fft_scratch,
            previous_db: vec![config.floor_db; fft_size / 2],
            has_previous: false,
            floor_db: config.floor_db,
            smoothing: config.smoothing.clamp(0.0, 0.99),
            hop: config.effective_hop(),
            pending: 0,
            snapshots: SnapshotFifo::new(config.spectrum_fifo_capacity),
        }
    }

    /// Shift a block into the rolling window; analyse once `hop` new samples arrived
    pub fn push_block(&mut self, block: &[Sample]) {
        if block.is_empty() {
            return;
        }
        self.rolling.push_block(block);
        self.pending += block.len();

        if self.pending >= self.hop {
            self.pending %= self.hop;
            self.analyze();
        }
    }

    /// Analyse the current window contents and queue the snapshot
    pub fn analyze(&mut self) {
        self.window.apply(self.rolling.samples(), &mut self.fft_input);

        if let Err(e) = self.fft.process_with_scratch(
            &mut self.fft_input,
            &mut self.fft_output,
            &mut self.fft_scratch,
        ) {
            log::warn!("FFT failed, snapshot skipped: {}", e);
            return;
        }

        let num_bins = self.fft_size / 2;
        let scale = 1.0 / num_bins as f64;
        let smoothing = if self.has_previous { self.smoothing } else { 0.0 };

        let mut magnitudes = Vec::with_capacity(num_bins);
        for (bin, previous) in self.fft_output[..num_bins]
            .iter()
            .zip(self.previous_db.iter_mut())
        {
            let db = Decibels::from_gain_floored(bin.norm() * scale, self.floor_db).0;
            let smoothed = (*previous * smoothing + db * (1.0 - smoothing)).max(self.floor_db);
            *previous = smoothed;
            magnitudes.push(smoothed);
        }
        self.has_previous = true;

        self.snapshots.push(SpectralSnapshot::new(magnitudes));
    }

    /// Completed snapshots waiting for the path builder
    #[inline]
    pub fn num_available_snapshots(&self) -> usize {
        self.snapshots.len()
    }

    /// Oldest queued snapshot
    pub fn pop_snapshot(&mut self) -> Option<SpectralSnapshot> {
        self.snapshots.pop()
    }

    /// Drop every queued snapshot except the newest, which is returned
    pub fn take_latest_snapshot(&mut self) -> Option<SpectralSnapshot> {
        self.snapshots.take_latest()
    }

    #[inline]
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Spacing between bins in Hz
    #[inline]
    pub fn bin_width(&self, sample_rate: f64) -> f64 {
        sample_rate / self.fft_size as f64
    }

    /// Get frequency for a bin index
    #[inline]
    pub fn bin_to_freq(&self, bin: usize, sample_rate: f64) -> f64 {
        bin as f64 * self.bin_width(sample_rate)
    }

    /// Get bin index for a frequency
    #[inline]
    pub fn freq_to_bin(&self, freq: f64, sample_rate: f64) -> usize {
        ((freq * self.fft_size as f64) / sample_rate).round() as usize
    }

    #[inline]
    pub fn floor_db(&self) -> f64 {
        self.floor_db
    }

    #[inline]
    pub fn window(&self) -> &RollingSampleWindow {
        &self.rolling
    }

    /// Snapshots discarded because the path builder fell behind
    #[inline]
    pub fn dropped_snapshots(&self) -> u64 {
        self.snapshots.dropped()
    }

    pub fn reset(&mut self) {
        self.rolling.clear();
        self.previous_db.fill(self.floor_db);
        self.has_previous = false;
        self.pending = 0;
        self.snapshots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zoo_core::FftOrder;

    const SR: f64 = 48000.0;

    fn config(window: WindowKind) -> AnalyzerConfig {
        AnalyzerConfig {
            fft_order: FftOrder::Order2048,
            window,
            ..AnalyzerConfig::default()
        }
    }

    fn sine_block(freq: f64, amplitude: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| amplitude * (2.0 * PI * freq * i as f64 / SR).sin())
            .collect()
    }

    #[test]
    fn test_rolling_window_shifts() {
        let mut window = RollingSampleWindow::new(4);
        window.push_block(&[1.0, 2.0]);
        assert_eq!(window.samples(), &[0.0, 0.0, 1.0, 2.0]);
        window.push_block(&[3.0]);
        assert_eq!(window.samples(), &[0.0, 1.0, 2.0, 3.0]);
        window.push_block(&[4.0, 5.0, 6.0, 7.0, 8.0]);
        assert_eq!(window.samples(), &[5.0, 6.0, 7.0, 8.0]);
        assert_eq!(window.len(), 4);
    }

    #[test]
    fn test_window_tables() {
        let bh = WindowFunction::new(WindowKind::BlackmanHarris, 1025);
        assert!(bh.table()[0] < 1e-4);
        assert!((bh.table()[512] - 1.0).abs() < 1e-9);

        let hann = WindowFunction::new(WindowKind::Hann, 9);
        assert!((hann.table()[4] - 1.0).abs() < 1e-12);
        assert!(hann.table()[0].abs() < 1e-12);
    }

    #[test]
    fn test_silence_hits_floor() {
        let mut analyzer = SpectrumAnalyzer::new(&config(WindowKind::BlackmanHarris));
        analyzer.push_block(&vec![0.0; 2048]);

        let snapshot = analyzer.pop_snapshot().unwrap();
        assert_eq!(snapshot.len(), 1024);
        assert!(snapshot.magnitudes().iter().all(|&db| db == -48.0));
    }

    #[test]
    fn test_full_scale_sine_reads_near_zero_db() {
        let mut analyzer = SpectrumAnalyzer::new(&config(WindowKind::Rectangular));
        // 1500 Hz sits exactly on bin 64 of a 2048 point FFT at 48 kHz
        analyzer.push_block(&sine_block(1500.0, 1.0, 2048));

        let snapshot = analyzer.pop_snapshot().unwrap();
        let bin = analyzer.freq_to_bin(1500.0, SR);
        assert_eq!(bin, 64);
        assert!(snapshot.magnitudes()[bin].abs() < 0.1);
        assert_eq!(snapshot.magnitudes()[bin + 10], -48.0);
    }

    #[test]
    fn test_peak_bin_follows_tone() {
        let mut analyzer = SpectrumAnalyzer::new(&config(WindowKind::BlackmanHarris));
        analyzer.push_block(&sine_block(1000.0, 0.5, 2048));

        let snapshot = analyzer.take_latest_snapshot().unwrap();
        let (peak_bin, _) = snapshot
            .magnitudes()
            .iter()
            .enumerate()
            .fold((0, f64::MIN), |best, (i, &m)| if m > best.1 { (i, m) } else { best });
        let peak_freq = analyzer.bin_to_freq(peak_bin, SR);
        assert!((peak_freq - 1000.0).abs() <= analyzer.bin_width(SR));
    }

    #[test]
    fn test_hop_gates_analysis() {
        let mut analyzer = SpectrumAnalyzer::new(&config(WindowKind::Hann));
        for _ in 0..3 {
            analyzer.push_block(&[0.1; 512]);
        }
        assert_eq!(analyzer.num_available_snapshots(), 0);
        analyzer.push_block(&[0.1; 512]);
        assert_eq!(analyzer.num_available_snapshots(), 1);

        let overlapped = AnalyzerConfig {
            hop_size: 512,
            ..config(WindowKind::Hann)
        };
        let mut analyzer = SpectrumAnalyzer::new(&overlapped);
        for _ in 0..4 {
            analyzer.push_block(&[0.1; 512]);
        }
        assert_eq!(analyzer.num_available_snapshots(), 4);
    }

    #[test]
    fn test_snapshot_fifo_overwrites_oldest() {
        let small = AnalyzerConfig {
            spectrum_fifo_capacity: 2,
            ..config(WindowKind::Hann)
        };
        let mut analyzer = SpectrumAnalyzer::new(&small);
        for _ in 0..5 {
            analyzer.push_block(&[0.0; 2048]);
        }
        assert_eq!(analyzer.num_available_snapshots(), 2);
        assert_eq!(analyzer.dropped_snapshots(), 3);
    }

    #[test]
    fn test_bin_width() {
        let analyzer = SpectrumAnalyzer::new(&config(WindowKind::Hann));
        assert_eq!(analyzer.fft_size(), 2048);
        assert!((analyzer.bin_width(SR) - 23.4375).abs() < 1e-12);
    }
}
