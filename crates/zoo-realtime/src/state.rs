//! Lock-free state handoff (UI thread → audio thread)
//!
//! Triple buffering: the writer owns one buffer, the reader owns another,
//! and the third ("back") buffer is exchanged atomically. Publishing swaps
//! the freshly written buffer into the back slot; the reader swaps it out
//! only when the dirty bit says something new is there. Neither side ever
//! waits, and the reader always sees a whole value, never a half-written one.

use portable_atomic::{AtomicU8, Ordering};
use std::cell::UnsafeCell;
use std::sync::Arc;

const INDEX_MASK: u8 = 0b011;
const DIRTY: u8 = 0b100;

struct Shared<T> {
    buffers: [UnsafeCell<T>; 3],
    /// Back buffer index (bits 0-1) plus the dirty flag (bit 2)
    back_info: AtomicU8,
}

// SAFETY: each buffer index is owned by exactly one of {input, back, output}
// at any time; ownership only moves through the atomic swap on `back_info`.
unsafe impl<T: Send> Send for Shared<T> {}
unsafe impl<T: Send> Sync for Shared<T> {}

/// Triple buffer; split into its input and output halves before use
pub struct TripleBuffer<T> {
    shared: Arc<Shared<T>>,
}

impl<T: Clone> TripleBuffer<T> {
    /// Create a new triple buffer with every slot holding `initial`
    pub fn new(initial: T) -> Self {
        Self {
            shared: Arc::new(Shared {
                buffers: [
                    UnsafeCell::new(initial.clone()),
                    UnsafeCell::new(initial.clone()),
                    UnsafeCell::new(initial),
                ],
                back_info: AtomicU8::new(1),
            }),
        }
    }

    /// Split into the writing and reading halves
    pub fn split(self) -> (TripleInput<T>, TripleOutput<T>) {
        (
            TripleInput {
                shared: Arc::clone(&self.shared),
                input_idx: 0,
            },
            TripleOutput {
                shared: self.shared,
                output_idx: 2,
            },
        )
    }
}

/// Writing half
pub struct TripleInput<T> {
    shared: Arc<Shared<T>>,
    input_idx: u8,
}

impl<T> TripleInput<T> {
    /// Replace the published value (last writer wins)
    pub fn publish(&mut self, value: T) {
        // SAFETY: `input_idx` is owned by this half exclusively.
        unsafe {
            *self.shared.buffers[self.input_idx as usize].get() = value;
        }
        let former_back = self
            .shared
            .back_info
            .swap(self.input_idx | DIRTY, Ordering::AcqRel);
        self.input_idx = former_back & INDEX_MASK;
    }

    /// Published value not yet picked up by the reader
    pub fn consumed(&self) -> bool {
        self.shared.back_info.load(Ordering::Relaxed) & DIRTY == 0
    }
}

/// Reading half
pub struct TripleOutput<T> {
    shared: Arc<Shared<T>>,
    output_idx: u8,
}

impl<T> TripleOutput<T> {
    /// Adopt the latest published value if there is one; `true` if it changed
    ///
    /// Real-time safe: one load, at most one atomic swap.
    pub fn update(&mut self) -> bool {
        if self.shared.back_info.load(Ordering::Relaxed) & DIRTY == 0 {
            return false;
        }
        let former_back = self
            .shared
            .back_info
            .swap(self.output_idx, Ordering::AcqRel);
        self.output_idx = former_back & INDEX_MASK;
        true
    }

    /// Current value (as of the last `update`)
    pub fn read(&self) -> &T {
        // SAFETY: `output_idx` is owned by this half exclusively.
        unsafe { &*self.shared.buffers[self.output_idx as usize].get() }
    }

    pub fn has_update(&self) -> bool {
        self.shared.back_info.load(Ordering::Relaxed) & DIRTY != 0
    }
}
