//! Analytic response curve of the published filter chain
//!
//! Reads a [`ChainCoefficients`] value (the same one the audio path uses)
//! and evaluates |H(e^jω)| per pixel column. Stateless: nothing here
//! touches live filter state.

use zoo_core::{ChainSettings, Decibels};
use zoo_dsp::{ChainCoefficients, design_chain};

use crate::common::{FrequencyAxis, GainAxis, Point, Rect};
use crate::path::RenderPath;

/// Per-column magnitude response over a log frequency grid
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseCurveEvaluator {
    axis: FrequencyAxis,
}

impl ResponseCurveEvaluator {
    pub fn new(axis: FrequencyAxis) -> Self {
        Self { axis }
    }

    /// Combined chain response at one frequency, in dB
    pub fn evaluate_at(&self, coefficients: &ChainCoefficients, freq: f64) -> f64 {
        Decibels::from_gain(coefficients.magnitude_for_frequency(freq)).0
    }

    /// One dB value per column; column `i` sits at `i / width` on the log axis
    pub fn evaluate(&self, coefficients: &ChainCoefficients, width: usize) -> Vec<f64> {
        (0..width)
            .map(|i| {
                let freq = self.axis.denormalize(i as f64 / width as f64);
                self.evaluate_at(coefficients, freq)
            })
            .collect()
    }

    /// Design from a settings snapshot, then evaluate
    pub fn evaluate_settings(
        &self,
        settings: &ChainSettings,
        width: usize,
        sample_rate: f64,
    ) -> Vec<f64> {
        self.evaluate(&design_chain(settings, sample_rate), width)
    }

    /// Map evaluated magnitudes onto `bounds`, one point per pixel column
    pub fn curve_path(&self, magnitudes_db: &[f64], bounds: Rect, gain: &GainAxis) -> RenderPath {
        let mut path = RenderPath::with_capacity(bounds, magnitudes_db.len());
        for (i, &db) in magnitudes_db.iter().enumerate() {
            path.line_to(Point::new(bounds.left() + i as f64, gain.db_to_y(db, &bounds)));
        }
        path
    }

    #[inline]
    pub fn axis(&self) -> &FrequencyAxis {
        &self.axis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zoo_core::Slope;

    const SR: f64 = 48000.0;

    fn peak_only(gain_db: f64) -> ChainSettings {
        ChainSettings {
            peak_freq: 1000.0,
            peak_gain_db: gain_db,
            peak_quality: 1.0,
            low_cut_bypassed: true,
            high_cut_bypassed: true,
            ..ChainSettings::default()
        }
    }

    #[test]
    fn test_peak_boost_end_to_end() {
        let evaluator = ResponseCurveEvaluator::default();
        let chain = design_chain(&peak_only(6.0), SR);

        assert!((evaluator.evaluate_at(&chain, 1000.0) - 6.0).abs() < 0.1);
        assert!(evaluator.evaluate_at(&chain, 20.0).abs() < 0.5);
        assert!(evaluator.evaluate_at(&chain, 20000.0).abs() < 0.5);
    }

    #[test]
    fn test_grid_width_and_start() {
        let evaluator = ResponseCurveEvaluator::default();
        let mags = evaluator.evaluate_settings(&peak_only(6.0), 600, SR);
        assert_eq!(mags.len(), 600);
        assert!(mags[0].abs() < 0.5);
        let max = mags.iter().cloned().fold(f64::MIN, f64::max);
        assert!((max - 6.0).abs() < 0.1);

        assert!(evaluator.evaluate_settings(&peak_only(6.0), 0, SR).is_empty());
    }

    #[test]
    fn test_bypassed_bands_contribute_nothing() {
        let evaluator = ResponseCurveEvaluator::default();
        let settings = ChainSettings {
            low_cut_freq: 2000.0,
            low_cut_slope: Slope::Db48,
            high_cut_freq: 100.0,
            low_cut_bypassed: true,
            high_cut_bypassed: true,
            ..peak_only(0.0)
        };
        let mags = evaluator.evaluate_settings(&settings, 200, SR);
        assert!(mags.iter().all(|db| db.abs() < 1e-9));
    }

    #[test]
    fn test_curve_path_one_point_per_column() {
        let evaluator = ResponseCurveEvaluator::default();
        let bounds = Rect::new(20.0, 16.0, 300.0, 96.0);
        let mags = vec![0.0, 24.0, -24.0, -60.0];
        let path = evaluator.curve_path(&mags, bounds, &GainAxis::default());

        let ys: Vec<f64> = path.points().iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![64.0, 16.0, 112.0, 112.0]);
        assert_eq!(path.points()[3].x, 23.0);
    }
}
