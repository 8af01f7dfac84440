//! Immutable parameter snapshot consumed by the filter designer

use serde::{Deserialize, Serialize};

use crate::{EqParam, ParameterStore, ZooError, ZooResult};

/// Cut filter steepness, one 12 dB/oct biquad stage per step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Slope {
    #[default]
    Db12,
    Db24,
    Db36,
    Db48,
}

impl Slope {
    pub const ALL: [Slope; 4] = [Slope::Db12, Slope::Db24, Slope::Db36, Slope::Db48];

    /// Number of cascaded second-order stages (1-4)
    #[inline]
    pub fn order(self) -> usize {
        match self {
            Slope::Db12 => 1,
            Slope::Db24 => 2,
            Slope::Db36 => 3,
            Slope::Db48 => 4,
        }
    }

    /// Butterworth filter order (twice the stage count)
    #[inline]
    pub fn butterworth_order(self) -> usize {
        self.order() * 2
    }

    #[inline]
    pub fn db_per_octave(self) -> u32 {
        self.order() as u32 * 12
    }

    /// Map a stepped choice parameter value (0-3), clamping out-of-range input
    pub fn from_choice(value: f64) -> Self {
        let index = if value.is_finite() { value.round().clamp(0.0, 3.0) } else { 0.0 };
        Self::ALL[index as usize]
    }

    pub fn label(self) -> &'static str {
        match self {
            Slope::Db12 => "12 dB/Oct",
            Slope::Db24 => "24 dB/Oct",
            Slope::Db36 => "36 dB/Oct",
            Slope::Db48 => "48 dB/Oct",
        }
    }
}

impl TryFrom<u8> for Slope {
    type Error = ZooError;

    /// Slope from its stage count (1-4)
    fn try_from(order: u8) -> ZooResult<Self> {
        match order {
            1 => Ok(Slope::Db12),
            2 => Ok(Slope::Db24),
            3 => Ok(Slope::Db36),
            4 => Ok(Slope::Db48),
            other => Err(ZooError::InvalidSlope(other)),
        }
    }
}

/// Lowest Q accepted by the designer
pub const MIN_Q: f64 = 0.1;

/// Point-in-time copy of every parameter the filter chain depends on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainSettings {
    pub peak_freq: f64,
    pub peak_gain_db: f64,
    pub peak_quality: f64,
    pub low_cut_freq: f64,
    pub high_cut_freq: f64,
    pub low_cut_slope: Slope,
    pub high_cut_slope: Slope,
    pub low_cut_bypassed: bool,
    pub peak_bypassed: bool,
    pub high_cut_bypassed: bool,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            peak_freq: EqParam::PeakFreq.range().default,
            peak_gain_db: EqParam::PeakGain.range().default,
            peak_quality: EqParam::PeakQuality.range().default,
            low_cut_freq: EqParam::LowCutFreq.range().default,
            high_cut_freq: EqParam::HighCutFreq.range().default,
            low_cut_slope: Slope::Db12,
            high_cut_slope: Slope::Db12,
            low_cut_bypassed: false,
            peak_bypassed: false,
            high_cut_bypassed: false,
        }
    }
}

impl ChainSettings {
    /// Capture the live parameters into an immutable snapshot
    ///
    /// Values are read individually from lock-free atomics; each one is
    /// clamped into its range so the designer never sees invalid input.
    pub fn capture(store: &ParameterStore) -> Self {
        Self {
            peak_freq: store.get(EqParam::PeakFreq),
            peak_gain_db: store.get(EqParam::PeakGain),
            peak_quality: store.get(EqParam::PeakQuality),
            low_cut_freq: store.get(EqParam::LowCutFreq),
            high_cut_freq: store.get(EqParam::HighCutFreq),
            low_cut_slope: Slope::from_choice(store.get(EqParam::LowCutSlope)),
            high_cut_slope: Slope::from_choice(store.get(EqParam::HighCutSlope)),
            low_cut_bypassed: store.get_bool(EqParam::LowCutBypassed),
            peak_bypassed: store.get_bool(EqParam::PeakBypassed),
            high_cut_bypassed: store.get_bool(EqParam::HighCutBypassed),
        }
        .clamped()
    }

    /// Copy with every field forced into its valid range
    pub fn clamped(self) -> Self {
        let freq = |f: f64, param: EqParam| {
            let range = param.range();
            if f.is_finite() { f.clamp(range.min, range.max) } else { range.default }
        };
        let gain = EqParam::PeakGain.range();
        let quality = EqParam::PeakQuality.range();

        Self {
            peak_freq: freq(self.peak_freq, EqParam::PeakFreq),
            peak_gain_db: if self.peak_gain_db.is_finite() {
                self.peak_gain_db.clamp(gain.min, gain.max)
            } else {
                gain.default
            },
            peak_quality: if self.peak_quality.is_finite() {
                self.peak_quality.clamp(MIN_Q, quality.max)
            } else {
                quality.default
            },
            low_cut_freq: freq(self.low_cut_freq, EqParam::LowCutFreq),
            high_cut_freq: freq(self.high_cut_freq, EqParam::HighCutFreq),
            ..self
        }
    }

    /// Reject values the designer cannot handle
    pub fn validate(&self) -> ZooResult<()> {
        let check_freq = |name: &str, f: f64| {
            if f.is_finite() && f > 0.0 {
                Ok(())
            } else {
                Err(ZooError::InvalidParam(format!("{name} must be > 0 Hz, got {f}")))
            }
        };
        check_freq("peak frequency", self.peak_freq)?;
        check_freq("low-cut frequency", self.low_cut_freq)?;
        check_freq("high-cut frequency", self.high_cut_freq)?;

        if !(self.peak_quality.is_finite() && self.peak_quality > 0.0) {
            return Err(ZooError::InvalidParam(format!(
                "peak Q must be > 0, got {}",
                self.peak_quality
            )));
        }
        if !self.peak_gain_db.is_finite() {
            return Err(ZooError::InvalidParam("peak gain must be finite".into()));
        }
        Ok(())
    }

    /// Copy the snapshot back into a store (preset recall)
    pub fn apply_to(&self, store: &ParameterStore) {
        store.set(EqParam::PeakFreq, self.peak_freq);
        store.set(EqParam::PeakGain, self.peak_gain_db);
        store.set(EqParam::PeakQuality, self.peak_quality);
        store.set(EqParam::LowCutFreq, self.low_cut_freq);
        store.set(EqParam::HighCutFreq, self.high_cut_freq);
        store.set(EqParam::LowCutSlope, (self.low_cut_slope.order() - 1) as f64);
        store.set(EqParam::HighCutSlope, (self.high_cut_slope.order() - 1) as f64);
        store.set_bool(EqParam::LowCutBypassed, self.low_cut_bypassed);
        store.set_bool(EqParam::PeakBypassed, self.peak_bypassed);
        store.set_bool(EqParam::HighCutBypassed, self.high_cut_bypassed);
    }
}
