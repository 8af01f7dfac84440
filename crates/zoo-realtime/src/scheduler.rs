//! Fixed-rate tick loop for the UI-rate thread
//!
//! Ticks run to completion synchronously; the timer then sleeps until the
//! next period boundary. A tick that overruns its period resets the
//! schedule instead of trying to catch up.

use portable_atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

pub struct FixedRateTimer {
    interval: Duration,
    last_tick: Instant,
    ticks: u64,
    skipped: u64,
}

impl FixedRateTimer {
    pub fn new(rate_hz: f64) -> Self {
        let rate_hz = if rate_hz.is_finite() && rate_hz > 0.0 { rate_hz } else { 60.0 };
        Self {
            interval: Duration::from_secs_f64(1.0 / rate_hz),
            last_tick: Instant::now(),
            ticks: 0,
            skipped: 0,
        }
    }

    /// Sleep until the next period boundary
    pub fn sleep_until_next_tick(&mut self) {
        let now = Instant::now();
        let scheduled = self.last_tick + self.interval;

        let next_tick = if scheduled > now {
            scheduled
        } else {
            self.skipped += 1;
            log::debug!("UI tick overran its {:?} period", self.interval);
            now + self.interval
        };

        thread::sleep(next_tick.saturating_duration_since(Instant::now()));
        self.last_tick = next_tick;
        self.ticks += 1;
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Periods completed
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Periods whose deadline had already passed
    #[inline]
    pub fn skipped(&self) -> u64 {
        self.skipped
    }
}

/// Call `tick` once per period until `stop` is set or `tick` returns `false`
///
/// Returns the number of ticks run.
pub fn run_loop<F>(rate_hz: f64, stop: &AtomicBool, mut tick: F) -> u64
where
    F: FnMut(u64) -> bool,
{
    let mut timer = FixedRateTimer::new(rate_hz);
    let mut count = 0;

    while !stop.load(Ordering::Acquire) {
        let keep_going = tick(count);
        count += 1;
        if !keep_going {
            break;
        }
        timer.sleep_until_next_tick();
    }

    log::debug!(
        "Tick loop stopped after {} ticks ({} overran)",
        count,
        timer.skipped()
    );
    count
}
