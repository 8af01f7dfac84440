//! zoo-viz: Display geometry for ZooEQ
//!
//! Everything here is renderer-agnostic: components produce point lists and
//! labelled grid lines in pixel space, keyed to caller-supplied rectangles.
//!
//! - Spectrum paths (one polyline per analysed channel)
//! - Analytic response curve of the published filter chain
//! - Analysis grid (frequency and gain lines, labels)

pub mod common;
pub mod path;
pub mod response;
pub mod grid;

pub use common::{FrequencyAxis, GainAxis, Point, Rect, VizError, VizResult};
pub use path::{PathBuilder, RenderPath};
pub use response::ResponseCurveEvaluator;
pub use grid::{
    AnalysisGrid, FREQUENCY_GRID_HZ, GAIN_GRID_DB, GridLine, analysis_area, format_frequency_label,
    format_gain_label, format_parameter_value, render_area,
};
