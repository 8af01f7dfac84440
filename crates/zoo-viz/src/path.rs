//! Spectrum path builder
//!
//! Turns a [`SpectralSnapshot`] into a polyline over a log-frequency axis.
//! Bins map one-to-one onto points in increasing frequency order; there is
//! no interpolation or curve fitting. Finished paths are queued and the
//! renderer only ever takes the most recent one.

use zoo_core::{DisplayConfig, RealtimeConfig, SnapshotFifo};
use zoo_dsp::SpectralSnapshot;

use crate::common::{FrequencyAxis, GainAxis, Point, Rect, VizResult};

/// Polyline in pixel space, scoped to the rectangle it was built for
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderPath {
    points: Vec<Point>,
    bounds: Rect,
}

impl RenderPath {
    pub fn new(bounds: Rect) -> Self {
        Self {
            points: Vec::new(),
            bounds,
        }
    }

    pub fn with_capacity(bounds: Rect, capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
            bounds,
        }
    }

    /// Append the next vertex; the first one starts the path
    #[inline]
    pub fn line_to(&mut self, point: Point) {
        self.points.push(point);
    }

    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[inline]
    pub fn start(&self) -> Option<Point> {
        self.points.first().copied()
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Consecutive vertex pairs
    pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }
}

/// Builds spectrum paths and buffers them for the renderer
#[derive(Debug, Clone)]
pub struct PathBuilder {
    axis: FrequencyAxis,
    stride: usize,
    paths: SnapshotFifo<RenderPath>,
}

impl PathBuilder {
    pub fn new(axis: FrequencyAxis, stride: usize, path_capacity: usize) -> Self {
        Self {
            axis,
            stride: stride.max(1),
            paths: SnapshotFifo::new(path_capacity),
        }
    }

    pub fn from_config(display: &DisplayConfig, realtime: &RealtimeConfig) -> VizResult<Self> {
        let axis = FrequencyAxis::from_config(display)?;
        log::debug!(
            "Path builder: {}-{} Hz, stride {}, queue {}",
            axis.min_freq(),
            axis.max_freq(),
            display.path_stride,
            realtime.path_fifo_capacity
        );
        Ok(Self::new(axis, display.path_stride, realtime.path_fifo_capacity))
    }

    /// Map every `stride`-th bin of `snapshot` into `bounds`
    ///
    /// Bin `k` sits at `k * bin_width` Hz. Magnitudes map linearly from
    /// `[floor_db, 0]` onto `[bottom, top]`; non-finite values are skipped.
    pub fn build_path(
        &self,
        snapshot: &SpectralSnapshot,
        bounds: Rect,
        fft_size: usize,
        bin_width: f64,
        floor_db: f64,
    ) -> RenderPath {
        let num_bins = (fft_size / 2).min(snapshot.len());
        let gain = GainAxis::spectrum(floor_db).unwrap_or(GainAxis::default_spectrum());
        let mut path = RenderPath::with_capacity(bounds, num_bins / self.stride + 1);

        for bin in (0..num_bins).step_by(self.stride) {
            let db = snapshot.magnitudes()[bin];
            if !db.is_finite() {
                continue;
            }
            let x = self.axis.frequency_to_x(bin as f64 * bin_width, &bounds);
            let y = gain.db_to_y(db, &bounds);
            path.line_to(Point::new(x, y));
        }

        path
    }

    /// Build a path and queue it, dropping the oldest queued path when full
    pub fn generate_path(
        &mut self,
        snapshot: &SpectralSnapshot,
        bounds: Rect,
        fft_size: usize,
        bin_width: f64,
        floor_db: f64,
    ) {
        let path = self.build_path(snapshot, bounds, fft_size, bin_width, floor_db);
        self.paths.push(path);
    }

    #[inline]
    pub fn num_paths_available(&self) -> usize {
        self.paths.len()
    }

    /// Newest queued path; anything older is discarded
    pub fn take_latest_path(&mut self) -> Option<RenderPath> {
        self.paths.take_latest()
    }

    #[inline]
    pub fn dropped_paths(&self) -> u64 {
        self.paths.dropped()
    }

    #[inline]
    pub fn axis(&self) -> &FrequencyAxis {
        &self.axis
    }
}

impl Default for PathBuilder {
    fn default() -> Self {
        Self::new(FrequencyAxis::default(), 1, 8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const FFT_SIZE: usize = 2048;
    const BIN_WIDTH: f64 = 48000.0 / 2048.0;

    #[test]
    fn test_floor_snapshot_lies_on_bottom_edge() {
        let builder = PathBuilder::default();
        let bounds = Rect::new(24.0, 16.0, 560.0, 240.0);
        let snapshot = SpectralSnapshot::silent(FFT_SIZE / 2, -48.0);

        let path = builder.build_path(&snapshot, bounds, FFT_SIZE, BIN_WIDTH, -48.0);
        assert_eq!(path.len(), FFT_SIZE / 2);
        for p in path.points() {
            assert_relative_eq!(p.y, bounds.bottom());
            assert!(bounds.contains(*p));
        }
    }

    #[test]
    fn test_points_follow_increasing_frequency() {
        let builder = PathBuilder::default();
        let bounds = Rect::from_size(800.0, 300.0);
        let snapshot = SpectralSnapshot::new(
            (0..FFT_SIZE / 2).map(|i| -(i as f64 % 48.0)).collect(),
        );

        let path = builder.build_path(&snapshot, bounds, FFT_SIZE, BIN_WIDTH, -48.0);
        assert_eq!(path.start().map(|p| p.x), Some(0.0));
        assert!(path.segments().all(|(a, b)| b.x >= a.x));
        // 0 dBFS bin sits on the top edge
        assert_relative_eq!(path.points()[0].y, 0.0);
    }

    #[test]
    fn test_stride_and_non_finite_bins() {
        let builder = PathBuilder::new(FrequencyAxis::default(), 2, 4);
        let mut values = vec![-12.0; 8];
        values[2] = f64::NAN;
        let snapshot = SpectralSnapshot::new(values);

        let path = builder.build_path(&snapshot, Rect::from_size(100.0, 100.0), 16, 3000.0, -48.0);
        // Bins 0, 4, 6 (bin 2 skipped)
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn test_only_latest_path_is_kept() {
        let mut builder = PathBuilder::new(FrequencyAxis::default(), 1, 2);
        let bounds = Rect::from_size(100.0, 100.0);
        for level in [-40.0, -30.0, -20.0] {
            let snapshot = SpectralSnapshot::new(vec![level; 8]);
            builder.generate_path(&snapshot, bounds, 16, BIN_WIDTH, -48.0);
        }
        assert_eq!(builder.num_paths_available(), 2);
        assert_eq!(builder.dropped_paths(), 1);

        let latest = builder.take_latest_path().unwrap();
        let expected = GainAxis::spectrum(-48.0).unwrap().db_to_y(-20.0, &bounds);
        assert_relative_eq!(latest.points()[3].y, expected);
        assert_eq!(builder.num_paths_available(), 0);
        assert!(builder.take_latest_path().is_none());
    }
}
