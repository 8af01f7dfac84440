//! Analysis grid: frequency/gain grid lines, axis labels, value strings

use zoo_core::{EqParam, Slope, jmap};

use crate::common::{FrequencyAxis, GainAxis, Rect};

/// Frequencies that get a vertical grid line (Hz)
pub const FREQUENCY_GRID_HZ: [f64; 10] = [
    20.0, 50.0, 100.0, 200.0, 500.0, 1000.0, 2000.0, 5000.0, 10000.0, 20000.0,
];

/// Response-curve gains that get a horizontal grid line (dB)
pub const GAIN_GRID_DB: [f64; 5] = [-24.0, -12.0, 0.0, 12.0, 24.0];

/// Area inside the component where curves are drawn
pub fn render_area(component: Rect) -> Rect {
    component.trimmed(12.0, 2.0, 20.0, 20.0)
}

/// Render area with a gap so labels never collide with curve bounds
pub fn analysis_area(component: Rect) -> Rect {
    render_area(component).trimmed(4.0, 4.0, 0.0, 0.0)
}

/// One labelled grid line; `position` is x for frequency lines, y for gain lines
#[derive(Debug, Clone, PartialEq)]
pub struct GridLine {
    pub value: f64,
    pub position: f64,
    pub label: String,
    /// The 0 dB line is drawn in its own colour
    pub emphasized: bool,
}

/// Every grid line and label for one analysis area
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisGrid {
    pub frequency_lines: Vec<GridLine>,
    pub gain_lines: Vec<GridLine>,
    /// Spectrum-scale labels on the left edge, one per gain line
    pub analyzer_labels: Vec<GridLine>,
}

impl AnalysisGrid {
    pub fn build(
        area: Rect,
        freq_axis: &FrequencyAxis,
        gain_axis: &GainAxis,
        floor_db: f64,
    ) -> Self {
        let frequency_lines = FREQUENCY_GRID_HZ
            .iter()
            .filter(|&&f| f >= freq_axis.min_freq() && f <= freq_axis.max_freq())
            .map(|&f| GridLine {
                value: f,
                position: freq_axis.frequency_to_x(f, &area),
                label: format_frequency_label(f),
                emphasized: false,
            })
            .collect();

        let visible_gains = || {
            GAIN_GRID_DB
                .iter()
                .copied()
                .filter(|&g| g >= gain_axis.min_db() && g <= gain_axis.max_db())
        };

        let gain_lines = visible_gains()
            .map(|g| GridLine {
                value: g,
                position: gain_axis.db_to_y(g, &area),
                label: format_gain_label(g),
                emphasized: g == 0.0,
            })
            .collect();

        // Same heights, read on the spectrum's [floor, 0] scale
        let analyzer_labels = visible_gains()
            .map(|g| {
                let db = jmap(g, gain_axis.min_db(), gain_axis.max_db(), floor_db, 0.0);
                GridLine {
                    value: db,
                    position: gain_axis.db_to_y(g, &area),
                    label: format!("{}", db.round() as i64),
                    emphasized: false,
                }
            })
            .collect();

        Self {
            frequency_lines,
            gain_lines,
            analyzer_labels,
        }
    }
}

/// "20Hz", "500Hz", "1kHz", "20kHz"
pub fn format_frequency_label(freq: f64) -> String {
    if freq > 999.0 {
        format!("{}kHz", trim_number(freq / 1000.0))
    } else {
        format!("{}Hz", trim_number(freq))
    }
}

/// "+12", "0", "-24"
pub fn format_gain_label(db: f64) -> String {
    if db > 0.0 {
        format!("+{}", trim_number(db))
    } else {
        trim_number(db)
    }
}

/// Slider readout for a parameter value, e.g. "1.50 kHz", "750 Hz", "12 dB/Oct"
pub fn format_parameter_value(param: EqParam, value: f64) -> String {
    let unit = match param {
        EqParam::LowCutSlope | EqParam::HighCutSlope => {
            return Slope::from_choice(value).label().to_string();
        }
        EqParam::LowCutBypassed
        | EqParam::PeakBypassed
        | EqParam::HighCutBypassed
        | EqParam::AnalyzerEnabled => {
            return if value >= 0.5 { "On" } else { "Off" }.to_string();
        }
        EqParam::LowCutFreq | EqParam::HighCutFreq | EqParam::PeakFreq => "Hz",
        EqParam::PeakGain => "dB",
        EqParam::PeakQuality => "",
    };

    let (number, kilo) = if value > 999.0 {
        (format!("{:.2}", value / 1000.0), true)
    } else {
        (format!("{:.0}", value), false)
    };

    match (unit.is_empty(), kilo) {
        (true, true) => format!("{number}k"),
        (true, false) => number,
        (false, true) => format!("{number} k{unit}"),
        (false, false) => format!("{number} {unit}"),
    }
}

fn trim_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
