//! Parameter types for the equalizer
//!
//! Every tracked parameter lives in a [`ParameterStore`] as a lock-free
//! [`AtomicParam`]. Writers (UI controls, host automation) call
//! [`ParameterStore::set`], which notifies registered [`ParameterListener`]s.
//! Readers capture the whole set at once through
//! [`ChainSettings::capture`](crate::ChainSettings::capture).

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Parameter value (normalized 0.0-1.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedValue(f64);

impl NormalizedValue {
    pub const ZERO: Self = Self(0.0);
    pub const ONE: Self = Self(1.0);
    pub const HALF: Self = Self(0.5);

    #[inline]
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, 1.0))
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for NormalizedValue {
    fn default() -> Self {
        Self::HALF
    }
}

/// Atomic parameter for lock-free access
pub struct AtomicParam {
    bits: AtomicU64,
}

impl AtomicParam {
    pub fn new(value: f64) -> Self {
        Self {
            bits: AtomicU64::new(value.to_bits()),
        }
    }

    #[inline]
    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn set(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::Relaxed);
    }

    /// Store `value` and return the previous one
    #[inline]
    pub fn swap(&self, value: f64) -> f64 {
        f64::from_bits(self.bits.swap(value.to_bits(), Ordering::Relaxed))
    }
}

impl Default for AtomicParam {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Parameter skew type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParamSkew {
    Linear,
    Logarithmic,
    /// Stepped integer choice (slope selectors)
    Choice,
    /// On/off
    Toggle,
}

/// Value range, default and skew of one parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub skew: ParamSkew,
}

impl ParamRange {
    pub const fn linear(min: f64, max: f64, default: f64) -> Self {
        Self {
            min,
            max,
            default,
            skew: ParamSkew::Linear,
        }
    }

    pub const fn logarithmic(min: f64, max: f64, default: f64) -> Self {
        Self {
            min,
            max,
            default,
            skew: ParamSkew::Logarithmic,
        }
    }

    pub const fn choice(count: usize, default: f64) -> Self {
        Self {
            min: 0.0,
            max: (count - 1) as f64,
            default,
            skew: ParamSkew::Choice,
        }
    }

    pub const fn toggle(default: bool) -> Self {
        Self {
            min: 0.0,
            max: 1.0,
            default: if default { 1.0 } else { 0.0 },
            skew: ParamSkew::Toggle,
        }
    }

    /// Clamp (and for stepped params, round) a plain value into range
    pub fn constrain(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.default;
        }
        let clamped = value.clamp(self.min, self.max);
        match self.skew {
            ParamSkew::Choice | ParamSkew::Toggle => clamped.round(),
            _ => clamped,
        }
    }

    /// Denormalize a 0-1 value to actual value
    pub fn denormalize(&self, normalized: NormalizedValue) -> f64 {
        let n = normalized.get();
        let value = match self.skew {
            ParamSkew::Linear | ParamSkew::Choice | ParamSkew::Toggle => {
                self.min + n * (self.max - self.min)
            }
            ParamSkew::Logarithmic => {
                let log_min = self.min.ln();
                let log_max = self.max.ln();
                (log_min + n * (log_max - log_min)).exp()
            }
        };
        self.constrain(value)
    }

    /// Normalize an actual value to 0-1
    pub fn normalize(&self, value: f64) -> NormalizedValue {
        let clamped = self.constrain(value);
        let n = match self.skew {
            ParamSkew::Linear | ParamSkew::Choice | ParamSkew::Toggle => {
                (clamped - self.min) / (self.max - self.min)
            }
            ParamSkew::Logarithmic => {
                let log_min = self.min.ln();
                let log_max = self.max.ln();
                (clamped.ln() - log_min) / (log_max - log_min)
            }
        };
        NormalizedValue::new(n)
    }
}

/// Every parameter tracked by the equalizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EqParam {
    LowCutFreq,
    HighCutFreq,
    PeakFreq,
    PeakGain,
    PeakQuality,
    LowCutSlope,
    HighCutSlope,
    LowCutBypassed,
    PeakBypassed,
    HighCutBypassed,
    AnalyzerEnabled,
}

impl EqParam {
    pub const COUNT: usize = 11;

    pub const ALL: [EqParam; Self::COUNT] = [
        EqParam::LowCutFreq,
        EqParam::HighCutFreq,
        EqParam::PeakFreq,
        EqParam::PeakGain,
        EqParam::PeakQuality,
        EqParam::LowCutSlope,
        EqParam::HighCutSlope,
        EqParam::LowCutBypassed,
        EqParam::PeakBypassed,
        EqParam::HighCutBypassed,
        EqParam::AnalyzerEnabled,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Host-visible parameter name
    pub fn name(self) -> &'static str {
        match self {
            EqParam::LowCutFreq => "LowCut Freq",
            EqParam::HighCutFreq => "HighCut Freq",
            EqParam::PeakFreq => "Peak Freq",
            EqParam::PeakGain => "Peak Gain",
            EqParam::PeakQuality => "Peak Quality",
            EqParam::LowCutSlope => "LowCut Slope",
            EqParam::HighCutSlope => "HighCut Slope",
            EqParam::LowCutBypassed => "LowCut Bypassed",
            EqParam::PeakBypassed => "Peak Bypassed",
            EqParam::HighCutBypassed => "HighCut Bypassed",
            EqParam::AnalyzerEnabled => "Analyzer Enabled",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.name() == name)
    }

    pub fn range(self) -> ParamRange {
        match self {
            EqParam::LowCutFreq => ParamRange::logarithmic(20.0, 20000.0, 20.0),
            EqParam::HighCutFreq => ParamRange::logarithmic(20.0, 20000.0, 20000.0),
            EqParam::PeakFreq => ParamRange::logarithmic(20.0, 20000.0, 750.0),
            EqParam::PeakGain => ParamRange::linear(-24.0, 24.0, 0.0),
            EqParam::PeakQuality => ParamRange::linear(0.1, 10.0, 1.0),
            EqParam::LowCutSlope | EqParam::HighCutSlope => ParamRange::choice(4, 0.0),
            EqParam::LowCutBypassed | EqParam::PeakBypassed | EqParam::HighCutBypassed => {
                ParamRange::toggle(false)
            }
            EqParam::AnalyzerEnabled => ParamRange::toggle(true),
        }
    }
}

/// Receives a callback for every parameter change
///
/// Implementations may be invoked from the audio thread (host automation),
/// so they must not block or allocate.
pub trait ParameterListener: Send + Sync {
    fn parameter_changed(&self, param: EqParam, value: f64);
}

type ListenerList = Vec<(u64, Arc<dyn ParameterListener>)>;

/// Lock-free store of the live parameter values
///
/// The listener list is published as an immutable snapshot: `set` walks
/// whatever list is current without locking, (un)registration builds a new
/// list and swaps it in.
pub struct ParameterStore {
    values: [AtomicParam; EqParam::COUNT],
    listeners: ArcSwap<ListenerList>,
    /// Serializes (un)registration; never taken by `set`
    registry: Mutex<()>,
    next_listener_id: AtomicU64,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self {
            values: EqParam::ALL.map(|p| AtomicParam::new(p.range().default)),
            listeners: ArcSwap::from_pointee(Vec::new()),
            registry: Mutex::new(()),
            next_listener_id: AtomicU64::new(1),
        }
    }

    #[inline]
    pub fn get(&self, param: EqParam) -> f64 {
        self.values[param.index()].get()
    }

    #[inline]
    pub fn get_bool(&self, param: EqParam) -> bool {
        self.get(param) >= 0.5
    }

    pub fn get_normalized(&self, param: EqParam) -> NormalizedValue {
        param.range().normalize(self.get(param))
    }

    /// Set a plain value (clamped into range); listeners hear about real changes only
    pub fn set(&self, param: EqParam, value: f64) {
        let value = param.range().constrain(value);
        let previous = self.values[param.index()].swap(value);
        if previous != value {
            self.notify(param, value);
        }
    }

    pub fn set_bool(&self, param: EqParam, value: bool) {
        self.set(param, if value { 1.0 } else { 0.0 });
    }

    pub fn set_normalized(&self, param: EqParam, value: NormalizedValue) {
        self.set(param, param.range().denormalize(value));
    }

    /// Restore every parameter to its default
    pub fn reset(&self) {
        for param in EqParam::ALL {
            self.set(param, param.range().default);
        }
    }

    fn notify(&self, param: EqParam, value: f64) {
        let listeners = self.listeners.load();
        for (_, listener) in listeners.iter() {
            listener.parameter_changed(param, value);
        }
    }

    /// Register `listener`; it stays registered until the returned guard is dropped
    pub fn add_listener(
        self: &Arc<Self>,
        listener: Arc<dyn ParameterListener>,
    ) -> ListenerRegistration {
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
        {
            let _registry = self.registry.lock();
            let mut list = ListenerList::clone(&self.listeners.load());
            list.push((id, listener));
            self.listeners.store(Arc::new(list));
        }
        log::debug!("Parameter listener {} registered", id);
        ListenerRegistration {
            store: Arc::downgrade(self),
            id,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.load().len()
    }

    fn remove_listener(&self, id: u64) {
        {
            let _registry = self.registry.lock();
            let mut list = ListenerList::clone(&self.listeners.load());
            list.retain(|(lid, _)| *lid != id);
            self.listeners.store(Arc::new(list));
        }
        log::debug!("Parameter listener {} unregistered", id);
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard tying a listener's registration to its owner's lifetime
pub struct ListenerRegistration {
    store: Weak<ParameterStore>,
    id: u64,
}

impl Drop for ListenerRegistration {
    fn drop(&mut self) {
        if let Some(store) = self.store.upgrade() {
            store.remove_listener(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc;
    use std::thread;
    use std::time::{Duration, Instant};

    struct CountingListener(AtomicUsize);

    impl ParameterListener for CountingListener {
        fn parameter_changed(&self, _param: EqParam, _value: f64) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn test_defaults() {
        let store = ParameterStore::new();
        assert_eq!(store.get(EqParam::PeakFreq), 750.0);
        assert_eq!(store.get(EqParam::HighCutFreq), 20000.0);
        assert!(store.get_bool(EqParam::AnalyzerEnabled));
        assert!(!store.get_bool(EqParam::PeakBypassed));
    }

    #[test]
    fn test_set_clamps() {
        let store = ParameterStore::new();
        store.set(EqParam::PeakGain, 100.0);
        assert_eq!(store.get(EqParam::PeakGain), 24.0);
        store.set(EqParam::LowCutSlope, 2.4);
        assert_eq!(store.get(EqParam::LowCutSlope), 2.0);
        store.set(EqParam::PeakQuality, f64::NAN);
        assert_eq!(store.get(EqParam::PeakQuality), 1.0);
    }

    #[test]
    fn test_log_range_normalization() {
        let range = EqParam::PeakFreq.range();
        let mid = range.denormalize(NormalizedValue::HALF);
        assert_relative_eq!(mid, (20.0_f64 * 20000.0).sqrt(), epsilon = 1e-6);
        assert_relative_eq!(range.normalize(mid).get(), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_listener_lifetime() {
        let store = Arc::new(ParameterStore::new());
        let listener = Arc::new(CountingListener(AtomicUsize::new(0)));

        let registration = store.add_listener(listener.clone());
        store.set(EqParam::PeakGain, 6.0);
        // Unchanged value: no notification
        store.set(EqParam::PeakGain, 6.0);
        assert_eq!(listener.0.load(Ordering::Relaxed), 1);

        drop(registration);
        assert_eq!(store.listener_count(), 0);
        store.set(EqParam::PeakGain, -6.0);
        assert_eq!(listener.0.load(Ordering::Relaxed), 1);
    }

    /// Stalls inside its first PeakFreq callback until released
    struct StallingListener {
        entered: mpsc::SyncSender<()>,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl ParameterListener for StallingListener {
        fn parameter_changed(&self, param: EqParam, _value: f64) {
            if param == EqParam::PeakFreq {
                let _ = self.entered.try_send(());
                let _ = self.release.lock().recv_timeout(Duration::from_millis(500));
            }
        }
    }

    #[test]
    fn test_set_never_waits_on_registration() {
        let store = Arc::new(ParameterStore::new());
        let (entered_tx, entered_rx) = mpsc::sync_channel(1);
        let (release_tx, release_rx) = mpsc::channel();
        let _stalling = store.add_listener(Arc::new(StallingListener {
            entered: entered_tx,
            release: Mutex::new(release_rx),
        }));

        // A writer parked inside a callback
        let parked = {
            let store = Arc::clone(&store);
            thread::spawn(move || store.set(EqParam::PeakFreq, 1000.0))
        };
        entered_rx.recv().unwrap();

        // Registration from another thread while that callback is running
        let start = Instant::now();
        let counter = Arc::new(CountingListener(AtomicUsize::new(0)));
        let registering = {
            let store = Arc::clone(&store);
            let counter = Arc::clone(&counter);
            thread::spawn(move || store.add_listener(counter))
        };
        let registration = registering.join().unwrap();
        store.set(EqParam::PeakGain, 3.0);
        let waited = start.elapsed();

        release_tx.send(()).unwrap();
        parked.join().unwrap();

        assert!(waited < Duration::from_millis(100), "register + set waited {:?}", waited);
        assert_eq!(counter.0.load(Ordering::Relaxed), 1);
        assert_eq!(store.listener_count(), 2);
        drop(registration);
        assert_eq!(store.listener_count(), 1);
    }

    #[test]
    fn test_param_names() {
        for param in EqParam::ALL {
            assert_eq!(EqParam::from_name(param.name()), Some(param));
            assert_eq!(EqParam::from_index(param.index()), Some(param));
        }
    }
}
