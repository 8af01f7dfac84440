//! zoo-dsp: DSP for the ZooEQ pipeline
//!
//! ## Modules
//! - `biquad` - TDF-II biquad sections and their analytic magnitude response
//! - `design` - filter coefficient engine (peaking stage, Butterworth cut cascades)
//! - `chain` - the audio-path filter chain (low-cut, peak, high-cut)
//! - `analysis` - rolling sample window, windowed FFT, spectral snapshots

pub mod biquad;
pub mod design;
pub mod chain;
pub mod analysis;

pub use biquad::{BiquadCoeffs, BiquadTDF2, CoefficientSet};
pub use design::{
    ChainCoefficients, CutCascade, CutKind, MAX_CUT_STAGES, design_chain, design_cut_cascade,
    design_high_cut, design_low_cut, design_peak,
};
pub use chain::MonoChain;
pub use analysis::{RollingSampleWindow, SpectralSnapshot, SpectrumAnalyzer, WindowFunction};

use zoo_core::Sample;

/// Trait for all DSP processors
pub trait Processor: Send {
    /// Reset processor state
    fn reset(&mut self);
}

/// Mono processor trait
pub trait MonoProcessor: Processor {
    /// Process a single sample
    fn process_sample(&mut self, input: Sample) -> Sample;

    /// Process a block of samples
    fn process_block(&mut self, buffer: &mut [Sample]) {
        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }
}
