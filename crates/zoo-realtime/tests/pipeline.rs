//! UI-rate controller and audio processor working together

use approx::assert_relative_eq;
use std::f64::consts::PI;
use std::sync::Arc;
use zoo_core::{EqConfig, EqParam, ParameterStore, ZooError};
use zoo_realtime::{EqAudioProcessor, EqContext, ResponseCurveController, create_pipeline};
use zoo_viz::Rect;

const SAMPLE_RATE: f64 = 48000.0;

fn component() -> Rect {
    Rect::from_size(600.0, 250.0)
}

fn setup() -> (Arc<ParameterStore>, EqAudioProcessor, ResponseCurveController) {
    let params = Arc::new(ParameterStore::new());
    let context = EqContext::new(Arc::clone(&params), SAMPLE_RATE);
    let (processor, controller) = create_pipeline(&context, &EqConfig::default()).unwrap();
    (params, processor, controller)
}

fn sine(freq: f64, len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| (2.0 * PI * freq * i as f64 / SAMPLE_RATE).sin())
        .collect()
}

/// Run `len` samples of a stereo sine through the processor in host-sized chunks
fn run_audio(processor: &mut EqAudioProcessor, freq: f64, len: usize) -> Vec<f64> {
    let mut left = sine(freq, len);
    let mut right = left.clone();
    for (l, r) in left.chunks_mut(480).zip(right.chunks_mut(480)) {
        processor.process(l, r);
    }
    left
}

fn peak_abs(signal: &[f64]) -> f64 {
    signal.iter().fold(0.0_f64, |acc, &x| acc.max(x.abs()))
}

#[test]
fn test_tick_without_changes_designs_once() {
    let (params, _processor, mut controller) = setup();
    assert_eq!(controller.designs_performed(), 1);

    params.set(EqParam::PeakGain, 3.0);
    let first = controller.tick(component());
    let second = controller.tick(component());

    assert!(first.designed);
    assert!(!second.designed);
    assert_eq!(controller.designs_performed(), 2);
}

#[test]
fn test_latest_settings_win_between_ticks() {
    let (params, _processor, mut controller) = setup();

    params.set(EqParam::PeakGain, 3.0);
    params.set(EqParam::PeakGain, -9.0);
    params.set(EqParam::PeakFreq, 2000.0);
    assert!(controller.tick(component()).designed);
    assert_eq!(controller.designs_performed(), 2);

    let chain = controller.published();
    let db = 20.0 * chain.magnitude_for_frequency(2000.0).log10();
    assert_relative_eq!(db, -9.0, epsilon = 1e-3);
}

#[test]
fn test_response_curve_end_to_end() {
    let (params, _processor, mut controller) = setup();
    params.set(EqParam::PeakFreq, 1000.0);
    params.set(EqParam::PeakGain, 6.0);
    params.set(EqParam::PeakQuality, 1.0);
    params.set_bool(EqParam::LowCutBypassed, true);
    params.set_bool(EqParam::HighCutBypassed, true);
    controller.tick(component());

    let chain = controller.published();
    let db_at = |f: f64| 20.0 * chain.magnitude_for_frequency(f).log10();
    assert!((db_at(1000.0) - 6.0).abs() < 0.1);
    assert!(db_at(20.0).abs() < 0.5);
    assert!(db_at(20000.0).abs() < 0.5);

    let curve = controller.response_curve(560);
    assert_eq!(curve.len(), 560);
    let path = controller.response_path(component());
    assert_eq!(path.len(), 560);
}

#[test]
fn test_audio_thread_adopts_published_chain() {
    let (params, mut processor, mut controller) = setup();
    processor.prepare(SAMPLE_RATE, 480).unwrap();

    params.set(EqParam::PeakFreq, 1000.0);
    params.set(EqParam::PeakGain, 6.0);
    params.set_bool(EqParam::LowCutBypassed, true);
    params.set_bool(EqParam::HighCutBypassed, true);
    controller.tick(component());

    let out = run_audio(&mut processor, 1000.0, 48000);
    assert!((peak_abs(&out[24000..]) - 10.0_f64.powf(6.0 / 20.0)).abs() < 0.01);
    assert_eq!(processor.left_chain().low_cut_stages(), 0);
    assert!(!processor.right_chain().is_peak_bypassed());
}

#[test]
fn test_prepare_rejects_bad_sample_rate() {
    let (_params, mut processor, _controller) = setup();
    for bad in [0.0, 1.0, -44100.0, f64::NAN] {
        assert!(matches!(
            processor.prepare(bad, 64),
            Err(ZooError::InvalidSampleRate(_))
        ));
    }
    assert_eq!(processor.sample_rate(), SAMPLE_RATE);
}

#[test]
fn test_create_pipeline_rejects_bad_context_rate() {
    for bad in [0.0, 1.0, f64::NAN] {
        let context = EqContext::new(Arc::new(ParameterStore::new()), bad);
        assert!(matches!(
            create_pipeline(&context, &EqConfig::default()),
            Err(ZooError::InvalidSampleRate(_))
        ));
    }
}

#[test]
fn test_spectrum_paths_follow_analyzer_toggle() {
    let (params, mut processor, mut controller) = setup();
    processor.prepare(SAMPLE_RATE, 480).unwrap();

    run_audio(&mut processor, 440.0, 4800);
    let report = controller.tick(component());
    assert_eq!(report.paths_updated, 2);
    assert_eq!(report.dropped_blocks, 0);

    let (left, right) = controller.spectrum_paths().unwrap();
    assert!(!left.unwrap().is_empty());
    assert!(!right.unwrap().is_empty());

    params.set_bool(EqParam::AnalyzerEnabled, false);
    run_audio(&mut processor, 440.0, 4800);
    let report = controller.tick(component());
    assert_eq!(report.paths_updated, 0);
    assert!(controller.spectrum_paths().is_none());
}

#[test]
fn test_controller_unregisters_on_drop() {
    let (params, _processor, controller) = setup();
    assert_eq!(params.listener_count(), 1);
    drop(controller);
    assert_eq!(params.listener_count(), 0);
}
