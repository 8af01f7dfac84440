//! Second-order sections: RBJ cookbook designs and a TDF-II runner
//!
//! Every stage in the EQ chain is one of these. Coefficients are stored
//! with `a0` divided out; the processor keeps two state registers.

use rustfft::num_complex::Complex;
use std::f64::consts::PI;
use zoo_core::Sample;

use crate::{MonoProcessor, Processor};

/// Normalized biquad coefficients (a0 divided out)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BiquadCoeffs {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

/// `(cos ω, α)` for a section centred on `freq`
#[inline]
fn cookbook_terms(freq: f64, q: f64, sample_rate: f64) -> (f64, f64) {
    let w = 2.0 * PI * freq / sample_rate;
    (w.cos(), w.sin() / (2.0 * q))
}

impl BiquadCoeffs {
    fn normalized(b: [f64; 3], a: [f64; 3]) -> Self {
        let inv = 1.0 / a[0];
        Self {
            b0: b[0] * inv,
            b1: b[1] * inv,
            b2: b[2] * inv,
            a1: a[1] * inv,
            a2: a[2] * inv,
        }
    }

    /// Second-order low-pass; `q` of 1/√2 gives a Butterworth section
    pub fn lowpass(freq: f64, q: f64, sample_rate: f64) -> Self {
        let (cos_w, alpha) = cookbook_terms(freq, q, sample_rate);
        let b1 = 1.0 - cos_w;
        Self::normalized(
            [b1 * 0.5, b1, b1 * 0.5],
            [1.0 + alpha, -2.0 * cos_w, 1.0 - alpha],
        )
    }

    /// Second-order high-pass
    pub fn highpass(freq: f64, q: f64, sample_rate: f64) -> Self {
        let (cos_w, alpha) = cookbook_terms(freq, q, sample_rate);
        let b1 = 1.0 + cos_w;
        Self::normalized(
            [b1 * 0.5, -b1, b1 * 0.5],
            [1.0 + alpha, -2.0 * cos_w, 1.0 - alpha],
        )
    }

    /// Peaking bell with `gain_db` at `freq`
    pub fn peaking(freq: f64, q: f64, gain_db: f64, sample_rate: f64) -> Self {
        let amp = 10.0_f64.powf(gain_db / 40.0);
        let (cos_w, alpha) = cookbook_terms(freq, q, sample_rate);
        Self::normalized(
            [1.0 + alpha * amp, -2.0 * cos_w, 1.0 - alpha * amp],
            [1.0 + alpha / amp, -2.0 * cos_w, 1.0 - alpha / amp],
        )
    }

    /// Identity section
    pub const fn bypass() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
        }
    }

    /// Transfer function evaluated on the unit circle at `freq`
    pub fn response(&self, freq: f64, sample_rate: f64) -> Complex<f64> {
        let omega = 2.0 * PI * freq / sample_rate;
        let z1 = Complex::from_polar(1.0, -omega);
        let z2 = z1 * z1;

        let num = self.b0 + z1 * self.b1 + z2 * self.b2;
        let den = 1.0 + z1 * self.a1 + z2 * self.a2;
        num / den
    }

    /// Linear magnitude |H(e^jω)| at `freq`
    #[inline]
    pub fn magnitude(&self, freq: f64, sample_rate: f64) -> f64 {
        self.response(freq, sample_rate).norm()
    }

    pub fn is_finite(&self) -> bool {
        [self.b0, self.b1, self.b2, self.a1, self.a2]
            .iter()
            .all(|c| c.is_finite())
    }
}

/// One designed biquad together with the sample rate it was designed for
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoefficientSet {
    pub coeffs: BiquadCoeffs,
    pub sample_rate: f64,
}

impl CoefficientSet {
    pub const fn new(coeffs: BiquadCoeffs, sample_rate: f64) -> Self {
        Self { coeffs, sample_rate }
    }

    pub const fn bypass(sample_rate: f64) -> Self {
        Self::new(BiquadCoeffs::bypass(), sample_rate)
    }

    /// Linear magnitude at `freq`, evaluated at the design sample rate
    #[inline]
    pub fn magnitude_for_frequency(&self, freq: f64) -> f64 {
        self.coeffs.magnitude(freq, self.sample_rate)
    }
}

impl Default for CoefficientSet {
    fn default() -> Self {
        Self::bypass(48000.0)
    }
}

/// Biquad runner, transposed direct form II
#[derive(Debug, Clone)]
pub struct BiquadTDF2 {
    coeffs: BiquadCoeffs,
    z1: f64,
    z2: f64,
}

impl BiquadTDF2 {
    pub fn new() -> Self {
        Self::with_coeffs(BiquadCoeffs::bypass())
    }

    pub fn with_coeffs(coeffs: BiquadCoeffs) -> Self {
        Self {
            coeffs,
            z1: 0.0,
            z2: 0.0,
        }
    }

    /// Swap in new coefficients, keeping the filter state
    #[inline]
    pub fn set_coeffs(&mut self, coeffs: BiquadCoeffs) {
        self.coeffs = coeffs;
    }

    #[inline]
    pub fn coeffs(&self) -> &BiquadCoeffs {
        &self.coeffs
    }
}

impl Default for BiquadTDF2 {
    fn default() -> Self {
        Self::new()
    }
}

impl Processor for BiquadTDF2 {
    fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }
}

impl MonoProcessor for BiquadTDF2 {
    #[inline(always)]
    fn process_sample(&mut self, x: Sample) -> Sample {
        let c = &self.coeffs;
        let y = c.b0 * x + self.z1;
        self.z1 = c.b1 * x - c.a1 * y + self.z2;
        self.z2 = c.b2 * x - c.a2 * y;
        y
    }
}
