//! Audio-path filter chain: LowCut cascade → Peak → HighCut cascade
//!
//! Owned by the audio thread. Coefficients arrive as whole
//! [`ChainCoefficients`] values and are copied into pre-allocated biquads;
//! nothing here allocates after construction.

use zoo_core::Sample;

use crate::biquad::BiquadTDF2;
use crate::design::{ChainCoefficients, CutCascade, MAX_CUT_STAGES};
use crate::{MonoProcessor, Processor};

#[derive(Debug, Clone, Default)]
struct CutFilter {
    stages: [BiquadTDF2; MAX_CUT_STAGES],
    active: usize,
}

impl CutFilter {
    fn apply(&mut self, cascade: &CutCascade) {
        for (filter, set) in self.stages.iter_mut().zip(cascade.stages()) {
            filter.set_coeffs(set.coeffs);
        }
        self.active = cascade.active_count();
    }

    #[inline]
    fn process_sample(&mut self, input: Sample) -> Sample {
        let mut out = input;
        for stage in &mut self.stages[..self.active] {
            out = stage.process_sample(out);
        }
        out
    }

    fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }
}

/// One channel's filter chain
#[derive(Debug, Clone, Default)]
pub struct MonoChain {
    low_cut: CutFilter,
    peak: BiquadTDF2,
    high_cut: CutFilter,
    low_cut_bypassed: bool,
    peak_bypassed: bool,
    high_cut_bypassed: bool,
}

impl MonoChain {
    pub fn new() -> Self {
        Self {
            low_cut_bypassed: true,
            peak_bypassed: true,
            high_cut_bypassed: true,
            ..Self::default()
        }
    }

    /// Adopt a freshly published design; filter state is preserved
    pub fn apply(&mut self, coefficients: &ChainCoefficients) {
        self.low_cut.apply(&coefficients.low_cut);
        self.peak.set_coeffs(coefficients.peak.coeffs);
        self.high_cut.apply(&coefficients.high_cut);
        self.low_cut_bypassed = coefficients.low_cut_bypassed;
        self.peak_bypassed = coefficients.peak_bypassed;
        self.high_cut_bypassed = coefficients.high_cut_bypassed;
    }

    /// Active low-cut stages (0 while bypassed)
    pub fn low_cut_stages(&self) -> usize {
        if self.low_cut_bypassed { 0 } else { self.low_cut.active }
    }

    pub fn high_cut_stages(&self) -> usize {
        if self.high_cut_bypassed { 0 } else { self.high_cut.active }
    }

    pub fn is_peak_bypassed(&self) -> bool {
        self.peak_bypassed
    }
}

impl Processor for MonoChain {
    fn reset(&mut self) {
        self.low_cut.reset();
        self.peak.reset();
        self.high_cut.reset();
    }
}

impl MonoProcessor for MonoChain {
    #[inline]
    fn process_sample(&mut self, input: Sample) -> Sample {
        let mut out = input;
        if !self.low_cut_bypassed {
            out = self.low_cut.process_sample(out);
        }
        if !self.peak_bypassed {
            out = self.peak.process_sample(out);
        }
        if !self.high_cut_bypassed {
            out = self.high_cut.process_sample(out);
        }
        out
    }
}
