//! UI-rate controller: dirty-flag gated redesign, spectrum paths, response curve
//!
//! One `tick` per timer period:
//! 1. drain both channel FIFOs into spectrum paths (when the analyzer is on)
//! 2. if any parameter changed since the last tick, capture a settings
//!    snapshot, design the chain once and publish it to the audio thread
//!
//! The response curve is evaluated from the last published chain, the same
//! coefficients the audio thread runs.

use std::sync::Arc;
use zoo_core::{ChainSettings, DisplayConfig, EqParam, ListenerRegistration, ZooError, ZooResult};
use zoo_dsp::{ChainCoefficients, design_chain};
use zoo_viz::{
    AnalysisGrid, FrequencyAxis, GainAxis, Rect, RenderPath, ResponseCurveEvaluator, analysis_area,
};

use crate::context::EqContext;
use crate::producer::PathProducer;
use crate::state::TripleInput;

/// What one tick did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Whether the chain was redesigned and republished
    pub designed: bool,
    /// Spectrum paths replaced this tick (0-2)
    pub paths_updated: usize,
    /// Blocks overwritten in the FIFOs since construction
    pub dropped_blocks: u64,
}

pub struct ResponseCurveController {
    context: Arc<EqContext>,
    publisher: TripleInput<ChainCoefficients>,
    published: ChainCoefficients,
    left: PathProducer,
    right: PathProducer,
    evaluator: ResponseCurveEvaluator,
    freq_axis: FrequencyAxis,
    gain_axis: GainAxis,
    floor_db: f64,
    designs: u64,
    dropped_blocks: u64,
    _registration: ListenerRegistration,
}

impl ResponseCurveController {
    /// Registers for parameter changes and publishes an initial design
    pub fn new(
        context: Arc<EqContext>,
        publisher: TripleInput<ChainCoefficients>,
        left: PathProducer,
        right: PathProducer,
        display: &DisplayConfig,
        floor_db: f64,
    ) -> ZooResult<Self> {
        let freq_axis =
            FrequencyAxis::from_config(display).map_err(|e| ZooError::Config(e.to_string()))?;
        let gain_axis = GainAxis::symmetric(display.gain_range_db)
            .map_err(|e| ZooError::Config(e.to_string()))?;
        let registration = context.listen();
        let published = ChainCoefficients::identity(context.sample_rate());

        let mut controller = Self {
            context,
            publisher,
            published,
            left,
            right,
            evaluator: ResponseCurveEvaluator::new(freq_axis),
            freq_axis,
            gain_axis,
            floor_db,
            designs: 0,
            dropped_blocks: 0,
            _registration: registration,
        };
        controller.update_chain();
        Ok(controller)
    }

    /// One UI-rate step; `component` is the whole response-curve component
    pub fn tick(&mut self, component: Rect) -> TickReport {
        let mut report = TickReport::default();

        if self.analyzer_enabled() {
            let bounds = analysis_area(component);
            let sample_rate = self.context.sample_rate();
            report.paths_updated += usize::from(self.left.process(bounds, sample_rate));
            report.paths_updated += usize::from(self.right.process(bounds, sample_rate));
        }

        if self.context.take_dirty() {
            self.update_chain();
            report.designed = true;
        }

        report.dropped_blocks = self.left.dropped_blocks() + self.right.dropped_blocks();
        if report.dropped_blocks > self.dropped_blocks {
            log::debug!(
                "Analyzer fell behind: {} blocks overwritten since last tick",
                report.dropped_blocks - self.dropped_blocks
            );
            self.dropped_blocks = report.dropped_blocks;
        }
        report
    }

    fn update_chain(&mut self) {
        let settings = ChainSettings::capture(self.context.params());
        let sample_rate = self.context.sample_rate();
        let chain = design_chain(&settings, sample_rate);

        self.publisher.publish(chain);
        self.published = chain;
        self.designs += 1;

        log::debug!(
            "Chain redesigned at {} Hz: peak {:.1} Hz {:+.1} dB Q {:.2}, low cut {:.1} Hz ({}), high cut {:.1} Hz ({})",
            sample_rate,
            settings.peak_freq,
            settings.peak_gain_db,
            settings.peak_quality,
            settings.low_cut_freq,
            settings.low_cut_slope.label(),
            settings.high_cut_freq,
            settings.high_cut_slope.label()
        );
    }

    /// Response in dB, one value per pixel column
    pub fn response_curve(&self, width: usize) -> Vec<f64> {
        self.evaluator.evaluate(&self.published, width)
    }

    /// Response curve mapped into the component's analysis area (±gain range)
    pub fn response_path(&self, component: Rect) -> RenderPath {
        let area = analysis_area(component);
        let magnitudes = self.response_curve(area.width.max(0.0) as usize);
        self.evaluator.curve_path(&magnitudes, area, &self.gain_axis)
    }

    /// Latest left/right spectrum paths; `None` while the analyzer is off
    pub fn spectrum_paths(&self) -> Option<(Option<&RenderPath>, Option<&RenderPath>)> {
        if !self.analyzer_enabled() {
            return None;
        }
        Some((self.left.path(), self.right.path()))
    }

    pub fn grid(&self, component: Rect) -> AnalysisGrid {
        AnalysisGrid::build(
            analysis_area(component),
            &self.freq_axis,
            &self.gain_axis,
            self.floor_db,
        )
    }

    pub fn analyzer_enabled(&self) -> bool {
        self.context.params().get_bool(EqParam::AnalyzerEnabled)
    }

    /// Chain most recently handed to the audio thread
    pub fn published(&self) -> &ChainCoefficients {
        &self.published
    }

    /// Designs performed since construction, including the initial one
    pub fn designs_performed(&self) -> u64 {
        self.designs
    }

    pub fn context(&self) -> &Arc<EqContext> {
        &self.context
    }
}
