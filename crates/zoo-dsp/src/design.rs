//! Filter coefficient engine
//!
//! Turns a [`ChainSettings`] snapshot into biquad coefficient sets:
//! - a parametric peaking stage (RBJ cookbook form)
//! - low-cut / high-cut cascades of 1-4 second-order Butterworth sections
//!   (12/24/36/48 dB/oct)
//!
//! Every cascade is exactly [`MAX_CUT_STAGES`] slots long. The active stage
//! count is state; trailing slots stay allocated and are treated as bypassed.
//!
//! Input is assumed validated by [`ChainSettings::capture`]; the designer
//! only guards against values that would produce non-finite coefficients.

use std::f64::consts::PI;
use zoo_core::{ChainSettings, MIN_Q, Slope};

use crate::biquad::{BiquadCoeffs, CoefficientSet};

/// Stages in every cut cascade, used or not
pub const MAX_CUT_STAGES: usize = 4;

/// Lowest design frequency (Hz)
const MIN_DESIGN_FREQ: f64 = 1.0;

/// Fraction of the sample rate design frequencies are kept below
const MAX_DESIGN_RATIO: f64 = 0.4999;

/// Which side of the spectrum a cascade removes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutKind {
    /// Highpass response
    LowCut,
    /// Lowpass response
    HighCut,
}

/// Fixed-size cascade of second-order sections
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutCascade {
    stages: [CoefficientSet; MAX_CUT_STAGES],
    active: usize,
}

impl CutCascade {
    /// Every stage bypassed
    pub fn bypassed(sample_rate: f64) -> Self {
        Self {
            stages: [CoefficientSet::bypass(sample_rate); MAX_CUT_STAGES],
            active: 0,
        }
    }

    #[inline]
    pub fn stages(&self) -> &[CoefficientSet; MAX_CUT_STAGES] {
        &self.stages
    }

    /// Number of leading stages in use
    #[inline]
    pub fn active_count(&self) -> usize {
        self.active
    }

    #[inline]
    pub fn is_stage_bypassed(&self, index: usize) -> bool {
        index >= self.active
    }

    /// Stages that contribute to the response
    pub fn active_stages(&self) -> impl Iterator<Item = &CoefficientSet> {
        self.stages[..self.active].iter()
    }

    /// Product of the active stages' magnitudes at `freq`
    pub fn magnitude_for_frequency(&self, freq: f64) -> f64 {
        self.active_stages()
            .map(|stage| stage.magnitude_for_frequency(freq))
            .product()
    }
}

/// Complete coefficient state for one filter chain: {LowCut, Peak, HighCut}
///
/// Plain `Copy` data: publishing a new chain is a whole-value replacement,
/// so readers always see one internally consistent design.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainCoefficients {
    pub low_cut: CutCascade,
    pub peak: CoefficientSet,
    pub high_cut: CutCascade,
    pub low_cut_bypassed: bool,
    pub peak_bypassed: bool,
    pub high_cut_bypassed: bool,
    pub sample_rate: f64,
}

impl ChainCoefficients {
    /// A chain that passes audio untouched
    pub fn identity(sample_rate: f64) -> Self {
        Self {
            low_cut: CutCascade::bypassed(sample_rate),
            peak: CoefficientSet::bypass(sample_rate),
            high_cut: CutCascade::bypassed(sample_rate),
            low_cut_bypassed: true,
            peak_bypassed: true,
            high_cut_bypassed: true,
            sample_rate,
        }
    }

    /// Combined linear magnitude at `freq`; bypassed bands and stages are skipped
    pub fn magnitude_for_frequency(&self, freq: f64) -> f64 {
        let mut magnitude = 1.0;

        if !self.peak_bypassed {
            magnitude *= self.peak.magnitude_for_frequency(freq);
        }
        if !self.low_cut_bypassed {
            magnitude *= self.low_cut.magnitude_for_frequency(freq);
        }
        if !self.high_cut_bypassed {
            magnitude *= self.high_cut.magnitude_for_frequency(freq);
        }

        magnitude
    }
}

impl Default for ChainCoefficients {
    fn default() -> Self {
        Self::identity(48000.0)
    }
}

/// Keep a design frequency strictly inside (0, Nyquist)
///
/// Total over any sample rate; degenerate rates collapse to `MIN_DESIGN_FREQ`.
#[inline]
fn clamp_frequency(freq: f64, sample_rate: f64) -> f64 {
    let max = (sample_rate * MAX_DESIGN_RATIO).max(MIN_DESIGN_FREQ);
    if freq.is_finite() {
        freq.clamp(MIN_DESIGN_FREQ, max)
    } else {
        max
    }
}

/// Q of section `stage` in an order-`order` Butterworth filter
///
/// Poles sit at θ_k = π(2k + 1) / (2N); each conjugate pair gives
/// Q = 1 / (2 cos θ_k).
#[inline]
pub fn butterworth_q(order: usize, stage: usize) -> f64 {
    let theta = PI * (2 * stage + 1) as f64 / (2 * order) as f64;
    1.0 / (2.0 * theta.cos())
}

/// Parametric peaking stage
pub fn design_peak(settings: &ChainSettings, sample_rate: f64) -> CoefficientSet {
    let freq = clamp_frequency(settings.peak_freq, sample_rate);
    let q = if settings.peak_quality.is_finite() {
        settings.peak_quality.max(MIN_Q)
    } else {
        1.0
    };
    let coeffs = BiquadCoeffs::peaking(freq, q, settings.peak_gain_db, sample_rate);
    CoefficientSet::new(coeffs, sample_rate)
}

/// Butterworth cut cascade of `slope.order()` sections in four fixed slots
pub fn design_cut_cascade(
    frequency: f64,
    sample_rate: f64,
    slope: Slope,
    kind: CutKind,
) -> CutCascade {
    let freq = clamp_frequency(frequency, sample_rate);
    let order = slope.butterworth_order();
    let mut cascade = CutCascade::bypassed(sample_rate);

    for stage in 0..slope.order() {
        let q = butterworth_q(order, stage);
        let coeffs = match kind {
            CutKind::LowCut => BiquadCoeffs::highpass(freq, q, sample_rate),
            CutKind::HighCut => BiquadCoeffs::lowpass(freq, q, sample_rate),
        };
        cascade.stages[stage] = CoefficientSet::new(coeffs, sample_rate);
    }
    cascade.active = slope.order();

    cascade
}

pub fn design_low_cut(settings: &ChainSettings, sample_rate: f64) -> CutCascade {
    design_cut_cascade(
        settings.low_cut_freq,
        sample_rate,
        settings.low_cut_slope,
        CutKind::LowCut,
    )
}

pub fn design_high_cut(settings: &ChainSettings, sample_rate: f64) -> CutCascade {
    design_cut_cascade(
        settings.high_cut_freq,
        sample_rate,
        settings.high_cut_slope,
        CutKind::HighCut,
    )
}

/// Design every band of the chain from one snapshot
pub fn design_chain(settings: &ChainSettings, sample_rate: f64) -> ChainCoefficients {
    ChainCoefficients {
        low_cut: design_low_cut(settings, sample_rate),
        peak: design_peak(settings, sample_rate),
        high_cut: design_high_cut(settings, sample_rate),
        low_cut_bypassed: settings.low_cut_bypassed,
        peak_bypassed: settings.peak_bypassed,
        high_cut_bypassed: settings.high_cut_bypassed,
        sample_rate,
    }
}
