//! zoo-core: Shared types, traits, and utilities for ZooEQ
//!
//! This crate provides the foundational types used across all ZooEQ crates:
//! audio blocks, the parameter model, the immutable [`ChainSettings`]
//! snapshot, configuration and the bounded snapshot FIFO.

mod sample;
mod params;
mod error;
mod chain_settings;
mod config;
mod fifo;

pub use sample::*;
pub use params::*;
pub use error::*;
pub use chain_settings::*;
pub use config::*;
pub use fifo::*;

/// Lowest frequency shown on any display axis (Hz)
pub const MIN_DISPLAY_FREQ: f64 = 20.0;

/// Highest frequency shown on any display axis (Hz)
pub const MAX_DISPLAY_FREQ: f64 = 20000.0;

/// Default magnitude floor for spectral analysis (dB)
pub const DEFAULT_FLOOR_DB: f64 = -48.0;

/// Lowest host sample rate the pipeline accepts (Hz)
pub const MIN_SAMPLE_RATE: f64 = 8000.0;

/// Reject sample rates the filter designer cannot work with
pub fn check_sample_rate(sample_rate: f64) -> ZooResult<f64> {
    if sample_rate.is_finite() && sample_rate >= MIN_SAMPLE_RATE {
        Ok(sample_rate)
    } else {
        Err(ZooError::InvalidSampleRate(sample_rate))
    }
}

/// Decibel value wrapper
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Decibels(pub f64);

impl Decibels {
    pub const ZERO: Self = Self(0.0);
    pub const NEG_INF: Self = Self(f64::NEG_INFINITY);

    #[inline]
    pub fn from_gain(gain: f64) -> Self {
        if gain <= 0.0 {
            Self::NEG_INF
        } else {
            Self(20.0 * gain.log10())
        }
    }

    /// Gain to decibels, never reporting less than `floor_db`
    #[inline]
    pub fn from_gain_floored(gain: f64, floor_db: f64) -> Self {
        if gain <= 0.0 {
            Self(floor_db)
        } else {
            Self((20.0 * gain.log10()).max(floor_db))
        }
    }

    #[inline]
    pub fn to_gain(self) -> f64 {
        if self.0 <= -144.0 {
            0.0
        } else {
            10.0_f64.powf(self.0 / 20.0)
        }
    }
}

impl Default for Decibels {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Linear remap of `value` from `[src_min, src_max]` to `[dst_min, dst_max]`
#[inline]
pub fn jmap(value: f64, src_min: f64, src_max: f64, dst_min: f64, dst_max: f64) -> f64 {
    dst_min + (value - src_min) * (dst_max - dst_min) / (src_max - src_min)
}

/// Normalized (0-1) position of `freq` on a log10 axis spanning `[min, max]`
#[inline]
pub fn map_from_log10(freq: f64, min: f64, max: f64) -> f64 {
    (freq.log10() - min.log10()) / (max.log10() - min.log10())
}

/// Inverse of [`map_from_log10`]
#[inline]
pub fn map_to_log10(normalized: f64, min: f64, max: f64) -> f64 {
    let log_min = min.log10();
    let log_max = max.log10();
    10.0_f64.powf(log_min + normalized * (log_max - log_min))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_decibels_round_trip() {
        let db = Decibels::from_gain(2.0);
        assert_relative_eq!(db.0, 6.0206, epsilon = 1e-3);
        assert_relative_eq!(db.to_gain(), 2.0, epsilon = 1e-9);
        assert_eq!(Decibels::from_gain(0.0), Decibels::NEG_INF);
    }

    #[test]
    fn test_floored_gain() {
        assert_eq!(Decibels::from_gain_floored(0.0, -48.0).0, -48.0);
        assert_eq!(Decibels::from_gain_floored(1e-9, -48.0).0, -48.0);
        assert_relative_eq!(Decibels::from_gain_floored(1.0, -48.0).0, 0.0);
    }

    #[test]
    fn test_sample_rate_check() {
        assert_eq!(check_sample_rate(44100.0).ok(), Some(44100.0));
        for bad in [0.0, 1.0, -48000.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(check_sample_rate(bad), Err(ZooError::InvalidSampleRate(_))));
        }
    }

    #[test]
    fn test_log_mapping() {
        assert_relative_eq!(map_from_log10(20.0, 20.0, 20000.0), 0.0);
        assert_relative_eq!(map_from_log10(20000.0, 20.0, 20000.0), 1.0);
        assert_relative_eq!(map_from_log10(632.4555, 20.0, 20000.0), 0.5, epsilon = 1e-6);
        assert_relative_eq!(map_to_log10(0.5, 20.0, 20000.0), 632.4555, epsilon = 1e-3);
    }

    #[test]
    fn test_jmap() {
        assert_relative_eq!(jmap(0.0, -24.0, 24.0, 100.0, 0.0), 50.0);
        assert_relative_eq!(jmap(-48.0, -48.0, 0.0, 200.0, 10.0), 200.0);
    }
}
