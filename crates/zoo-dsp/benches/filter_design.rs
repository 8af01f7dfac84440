//! Coefficient design and chain processing benchmarks

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use zoo_core::{AnalyzerConfig, ChainSettings, Slope};
use zoo_dsp::{MonoChain, MonoProcessor, SpectrumAnalyzer, design_chain};

fn settings() -> ChainSettings {
    ChainSettings {
        low_cut_freq: 80.0,
        low_cut_slope: Slope::Db48,
        high_cut_freq: 12000.0,
        high_cut_slope: Slope::Db24,
        peak_freq: 1000.0,
        peak_gain_db: 6.0,
        ..ChainSettings::default()
    }
}

fn bench_design_chain(c: &mut Criterion) {
    let settings = settings();

    c.bench_function("design_chain", |b| {
        b.iter(|| design_chain(black_box(&settings), black_box(48000.0)))
    });
}

fn bench_chain_process(c: &mut Criterion) {
    let mut chain = MonoChain::new();
    chain.apply(&design_chain(&settings(), 48000.0));

    let mut buffer: Vec<f64> = (0..1024).map(|i| (i as f64 * 0.01).sin()).collect();

    c.bench_function("mono_chain_1024", |b| {
        b.iter(|| {
            chain.process_block(black_box(&mut buffer));
        })
    });
}

fn bench_response_evaluation(c: &mut Criterion) {
    let coefficients = design_chain(&settings(), 48000.0);

    c.bench_function("response_600_points", |b| {
        b.iter(|| {
            (0..600)
                .map(|i| {
                    let freq = 20.0 * 1000.0_f64.powf(i as f64 / 599.0);
                    coefficients.magnitude_for_frequency(black_box(freq))
                })
                .sum::<f64>()
        })
    });
}

fn bench_spectrum_analyzer(c: &mut Criterion) {
    let mut analyzer = SpectrumAnalyzer::new(&AnalyzerConfig::default());
    let block: Vec<f64> = (0..2048).map(|i| (i as f64 * 0.05).sin()).collect();

    c.bench_function("spectrum_2048", |b| {
        b.iter(|| {
            analyzer.push_block(black_box(&block));
            analyzer.take_latest_snapshot()
        })
    });
}

criterion_group!(
    benches,
    bench_design_chain,
    bench_chain_process,
    bench_response_evaluation,
    bench_spectrum_analyzer
);
criterion_main!(benches);
