//! Process-wide EQ context shared by the audio path and the UI-rate side
//!
//! Owns the parameter store, the "settings changed" flag and the current
//! sample rate. Passed explicitly (as an `Arc`) to both sides.

use portable_atomic::{AtomicBool, AtomicF64, Ordering};
use std::sync::Arc;
use zoo_core::{EqParam, ListenerRegistration, ParameterListener, ParameterStore};

pub struct EqContext {
    params: Arc<ParameterStore>,
    dirty: AtomicBool,
    sample_rate: AtomicF64,
}

impl EqContext {
    pub fn new(params: Arc<ParameterStore>, sample_rate: f64) -> Arc<Self> {
        Arc::new(Self {
            params,
            dirty: AtomicBool::new(false),
            sample_rate: AtomicF64::new(sample_rate),
        })
    }

    #[inline]
    pub fn params(&self) -> &Arc<ParameterStore> {
        &self.params
    }

    /// Flag the chain for redesign on the next tick; never blocks
    #[inline]
    pub fn mark_dirty(&self) {
        let _ = self
            .dirty
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Relaxed);
    }

    /// Test-and-clear: `true` exactly once per batch of changes
    #[inline]
    pub fn take_dirty(&self) -> bool {
        self.dirty
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Relaxed)
            .is_ok()
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    #[inline]
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate.load(Ordering::Acquire)
    }

    pub fn set_sample_rate(&self, sample_rate: f64) {
        self.sample_rate.store(sample_rate, Ordering::Release);
    }

    /// Subscribe to every parameter change for as long as the guard lives
    pub fn listen(self: &Arc<Self>) -> ListenerRegistration {
        let listener: Arc<dyn ParameterListener> = self.clone();
        self.params.add_listener(listener)
    }
}

impl ParameterListener for EqContext {
    fn parameter_changed(&self, _param: EqParam, _value: f64) {
        self.mark_dirty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_dirty_clears() {
        let context = EqContext::new(Arc::new(ParameterStore::new()), 48000.0);
        assert!(!context.take_dirty());

        context.mark_dirty();
        context.mark_dirty();
        assert!(context.is_dirty());
        assert!(context.take_dirty());
        assert!(!context.take_dirty());
    }

    #[test]
    fn test_listener_lifetime() {
        let params = Arc::new(ParameterStore::new());
        let context = EqContext::new(Arc::clone(&params), 44100.0);

        let registration = context.listen();
        params.set(EqParam::PeakGain, 3.0);
        assert!(context.take_dirty());

        drop(registration);
        assert_eq!(params.listener_count(), 0);
        params.set(EqParam::PeakGain, 6.0);
        assert!(!context.take_dirty());
        assert_eq!(context.sample_rate(), 44100.0);
    }
}
