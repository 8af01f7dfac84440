//! DSP Integration Tests
//!
//! Verifies:
//! - Butterworth cutoff and rolloff per slope
//! - Zero-gain peak transparency
//! - Analytic response vs. measured audio-path gain
//! - Analyzer snapshots stay within [floor, 0 dB] for in-range input

use std::f64::consts::PI;
use zoo_core::{AnalyzerConfig, ChainSettings, Slope};
use zoo_dsp::{
    CutKind, MonoChain, MonoProcessor, SpectrumAnalyzer, design_chain, design_cut_cascade,
    design_peak,
};

const SAMPLE_RATE: f64 = 48000.0;

/// Generate test sine wave
fn generate_sine(samples: usize, freq: f64) -> Vec<f64> {
    (0..samples)
        .map(|i| (2.0 * PI * freq * i as f64 / SAMPLE_RATE).sin())
        .collect()
}

/// Check signal has no NaN or Infinity
fn is_valid_signal(signal: &[f64]) -> bool {
    signal.iter().all(|&x| x.is_finite())
}

fn rms(signal: &[f64]) -> f64 {
    let sum: f64 = signal.iter().map(|x| x * x).sum();
    (sum / signal.len() as f64).sqrt()
}

fn to_db(mag: f64) -> f64 {
    20.0 * mag.log10()
}

#[test]
fn test_single_stage_cutoff_is_minus_3db() {
    for freq in [50.0, 440.0, 1000.0, 8000.0] {
        let cascade = design_cut_cascade(freq, SAMPLE_RATE, Slope::Db12, CutKind::LowCut);
        assert_eq!(cascade.active_count(), 1);
        let mag = cascade.stages()[0].magnitude_for_frequency(freq);
        assert!((to_db(mag) + 3.0103).abs() < 0.01, "{} Hz: {} dB", freq, to_db(mag));
    }
}

#[test]
fn test_slope_order_adds_12db_per_octave() {
    let mut previous = 0.0;
    for slope in Slope::ALL {
        let cascade = design_cut_cascade(250.0, SAMPLE_RATE, slope, CutKind::HighCut);
        let near = to_db(cascade.magnitude_for_frequency(1000.0));
        let far = to_db(cascade.magnitude_for_frequency(2000.0));
        let per_octave = near - far;
        assert!(
            (per_octave - 12.0 * slope.order() as f64).abs() < 1.5,
            "{:?}: {} dB/oct",
            slope,
            per_octave
        );
        assert!(per_octave > previous);
        previous = per_octave;
    }
}

#[test]
fn test_zero_gain_peak_is_bypass_equivalent() {
    for freq in [30.0, 750.0, 15000.0] {
        for q in [0.1, 0.707, 4.0, 10.0] {
            let settings = ChainSettings {
                peak_freq: freq,
                peak_quality: q,
                peak_gain_db: 0.0,
                ..ChainSettings::default()
            };
            let peak = design_peak(&settings, SAMPLE_RATE);
            let mut f = 20.0;
            while f <= 20000.0 {
                assert!((peak.magnitude_for_frequency(f) - 1.0).abs() < 1e-9);
                f *= 1.5;
            }
        }
    }
}

#[test]
fn test_analytic_response_matches_audio_path() {
    let settings = ChainSettings {
        low_cut_freq: 200.0,
        low_cut_slope: Slope::Db24,
        high_cut_freq: 6000.0,
        high_cut_slope: Slope::Db12,
        peak_freq: 1000.0,
        peak_gain_db: -9.0,
        peak_quality: 2.0,
        ..ChainSettings::default()
    };
    let coefficients = design_chain(&settings, SAMPLE_RATE);

    for freq in [100.0, 1000.0, 3000.0] {
        let mut chain = MonoChain::new();
        chain.apply(&coefficients);

        let mut signal = generate_sine(48000, freq);
        let input_rms = rms(&signal[24000..]);
        chain.process_block(&mut signal);
        assert!(is_valid_signal(&signal));

        let measured = to_db(rms(&signal[24000..]) / input_rms);
        let predicted = to_db(coefficients.magnitude_for_frequency(freq));
        assert!(
            (measured - predicted).abs() < 0.2,
            "{} Hz: measured {} dB, predicted {} dB",
            freq,
            measured,
            predicted
        );
    }
}

#[test]
fn test_analyzer_output_bounded() {
    let config = AnalyzerConfig::default();
    let mut analyzer = SpectrumAnalyzer::new(&config);

    let block = generate_sine(2048, 3000.0);
    for _ in 0..4 {
        analyzer.push_block(&block);
    }

    let snapshot = analyzer.take_latest_snapshot().unwrap();
    assert_eq!(snapshot.len(), analyzer.fft_size() / 2);
    for &db in snapshot.magnitudes() {
        assert!(db >= config.floor_db);
        assert!(db <= 0.5);
    }
    assert_eq!(analyzer.num_available_snapshots(), 0);
}
