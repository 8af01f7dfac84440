//! Geometry and axis mapping shared by every display component

use thiserror::Error;
use zoo_core::{
    DEFAULT_FLOOR_DB, DisplayConfig, MAX_DISPLAY_FREQ, MIN_DISPLAY_FREQ, jmap, map_from_log10,
    map_to_log10,
};

/// Visualization errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VizError {
    #[error("Invalid frequency axis: {min} Hz to {max} Hz")]
    InvalidFrequencyAxis { min: f64, max: f64 },
    #[error("Invalid gain axis: {min} dB to {max} dB")]
    InvalidGainAxis { min: f64, max: f64 },
}

pub type VizResult<T> = Result<T, VizError>;

// ============================================================================
// GEOMETRY
// ============================================================================

/// Point in pixel space (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in pixel space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle anchored at the origin
    pub const fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    #[inline]
    pub fn left(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn top(&self) -> f64 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// Shrink each edge inward; never produces negative extents
    pub fn trimmed(&self, top: f64, bottom: f64, left: f64, right: f64) -> Self {
        let width = (self.width - left - right).max(0.0);
        let height = (self.height - top - bottom).max(0.0);
        Self::new(self.x + left, self.y + top, width, height)
    }
}

// ============================================================================
// AXES
// ============================================================================

/// Logarithmic frequency axis mapped onto a rectangle's width
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyAxis {
    min_freq: f64,
    max_freq: f64,
}

impl FrequencyAxis {
    pub fn new(min_freq: f64, max_freq: f64) -> VizResult<Self> {
        let finite = min_freq.is_finite() && max_freq.is_finite();
        if !(finite && min_freq > 0.0 && max_freq > min_freq) {
            return Err(VizError::InvalidFrequencyAxis {
                min: min_freq,
                max: max_freq,
            });
        }
        Ok(Self { min_freq, max_freq })
    }

    pub fn from_config(config: &DisplayConfig) -> VizResult<Self> {
        Self::new(config.min_freq, config.max_freq)
    }

    #[inline]
    pub fn min_freq(&self) -> f64 {
        self.min_freq
    }

    #[inline]
    pub fn max_freq(&self) -> f64 {
        self.max_freq
    }

    /// Normalized (0-1) position, clamped; non-positive frequencies map to 0
    pub fn normalize(&self, freq: f64) -> f64 {
        if freq <= 0.0 || freq.is_nan() {
            return 0.0;
        }
        map_from_log10(freq, self.min_freq, self.max_freq).clamp(0.0, 1.0)
    }

    /// Frequency at normalized position `t`
    #[inline]
    pub fn denormalize(&self, t: f64) -> f64 {
        map_to_log10(t, self.min_freq, self.max_freq)
    }

    /// Frequency (Hz) to x, clamped to the rectangle
    #[inline]
    pub fn frequency_to_x(&self, freq: f64, bounds: &Rect) -> f64 {
        bounds.left() + self.normalize(freq) * bounds.width
    }

    /// x to frequency (Hz)
    pub fn x_to_frequency(&self, x: f64, bounds: &Rect) -> f64 {
        if bounds.width <= 0.0 {
            return self.min_freq;
        }
        self.denormalize((x - bounds.left()) / bounds.width)
    }
}

impl Default for FrequencyAxis {
    fn default() -> Self {
        Self {
            min_freq: MIN_DISPLAY_FREQ,
            max_freq: MAX_DISPLAY_FREQ,
        }
    }
}

/// Linear dB axis: `min_db` at the bottom edge, `max_db` at the top
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainAxis {
    min_db: f64,
    max_db: f64,
}

impl GainAxis {
    pub fn new(min_db: f64, max_db: f64) -> VizResult<Self> {
        if !(min_db.is_finite() && max_db.is_finite() && max_db > min_db) {
            return Err(VizError::InvalidGainAxis {
                min: min_db,
                max: max_db,
            });
        }
        Ok(Self { min_db, max_db })
    }

    /// Axis spanning `-range_db..=+range_db`
    pub fn symmetric(range_db: f64) -> VizResult<Self> {
        Self::new(-range_db, range_db)
    }

    /// Spectrum axis: `floor_db` at the bottom, 0 dBFS at the top
    pub fn spectrum(floor_db: f64) -> VizResult<Self> {
        Self::new(floor_db, 0.0)
    }

    /// Spectrum axis with the default floor
    pub const fn default_spectrum() -> Self {
        Self {
            min_db: DEFAULT_FLOOR_DB,
            max_db: 0.0,
        }
    }

    #[inline]
    pub fn min_db(&self) -> f64 {
        self.min_db
    }

    #[inline]
    pub fn max_db(&self) -> f64 {
        self.max_db
    }

    /// dB to y, clamped to the rectangle
    #[inline]
    pub fn db_to_y(&self, db: f64, bounds: &Rect) -> f64 {
        let db = if db.is_nan() { self.min_db } else { db.clamp(self.min_db, self.max_db) };
        jmap(db, self.min_db, self.max_db, bounds.bottom(), bounds.top())
    }

    /// y to dB
    #[inline]
    pub fn y_to_db(&self, y: f64, bounds: &Rect) -> f64 {
        jmap(y, bounds.bottom(), bounds.top(), self.min_db, self.max_db)
    }
}

impl Default for GainAxis {
    fn default() -> Self {
        Self {
            min_db: -24.0,
            max_db: 24.0,
        }
    }
}
