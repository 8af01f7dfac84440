//! Lock-free block FIFO (audio thread → UI thread)
//!
//! Single producer, single consumer, fixed capacity. The producer never
//! blocks, never allocates and never fails: when the consumer falls behind,
//! the oldest unread slot is overwritten.
//!
//! Every slot carries a sequence stamp. For block `n` the producer stores
//! `2n + 1` (writing), copies the samples, then stores `2n + 2` (complete).
//! The consumer accepts a slot only if the stamp reads `2n + 2` both before
//! and after copying, so a block overwritten mid-read is detected and
//! skipped instead of being delivered torn.

use portable_atomic::{AtomicF64, AtomicU64, Ordering, fence};
use std::sync::Arc;
use zoo_core::{AudioBlock, Sample};

struct Slot {
    stamp: AtomicU64,
    samples: Box<[AtomicF64]>,
}

struct Shared {
    slots: Box<[Slot]>,
    channels: usize,
    frames: usize,
    /// Blocks ever completed by the producer
    write_index: AtomicU64,
    /// Next block the consumer will look at
    read_index: AtomicU64,
}

impl Shared {
    #[inline]
    fn capacity(&self) -> u64 {
        self.slots.len() as u64
    }

    #[inline]
    fn slot(&self, index: u64) -> &Slot {
        &self.slots[(index % self.capacity()) as usize]
    }

    fn available(&self) -> usize {
        let w = self.write_index.load(Ordering::Acquire);
        let r = self.read_index.load(Ordering::Acquire);
        w.saturating_sub(r).min(self.capacity()) as usize
    }
}

/// Fixed-capacity block FIFO; split into its two halves before use
pub struct BlockFifo {
    shared: Arc<Shared>,
}

impl BlockFifo {
    /// `capacity` slots of `channels` × `frames` samples, all allocated here
    pub fn new(capacity: usize, channels: usize, frames: usize) -> Self {
        let capacity = capacity.max(1);
        let slots = (0..capacity)
            .map(|_| Slot {
                stamp: AtomicU64::new(0),
                samples: (0..channels * frames).map(|_| AtomicF64::new(0.0)).collect(),
            })
            .collect();

        Self {
            shared: Arc::new(Shared {
                slots,
                channels,
                frames,
                write_index: AtomicU64::new(0),
                read_index: AtomicU64::new(0),
            }),
        }
    }

    /// Split into producer and consumer
    pub fn split(self) -> (BlockProducer, BlockConsumer) {
        (
            BlockProducer {
                shared: Arc::clone(&self.shared),
            },
            BlockConsumer {
                shared: self.shared,
                read: 0,
                dropped: 0,
            },
        )
    }
}

/// Writing half, owned by the audio thread
pub struct BlockProducer {
    shared: Arc<Shared>,
}

impl BlockProducer {
    /// Copy one block in; missing channels or frames are written as silence
    ///
    /// Real-time safe: no allocation, no locks, constant time per sample.
    pub fn push(&mut self, channels: &[&[Sample]]) {
        let shared = &*self.shared;
        let n = shared.write_index.load(Ordering::Relaxed);
        let slot = shared.slot(n);

        slot.stamp.store(2 * n + 1, Ordering::Relaxed);
        fence(Ordering::Release);

        for ch in 0..shared.channels {
            let src = channels.get(ch).copied().unwrap_or(&[]);
            let dst = &slot.samples[ch * shared.frames..(ch + 1) * shared.frames];
            for (i, cell) in dst.iter().enumerate() {
                cell.store(src.get(i).copied().unwrap_or(0.0), Ordering::Relaxed);
            }
        }

        slot.stamp.store(2 * n + 2, Ordering::Release);
        shared.write_index.store(n + 1, Ordering::Release);
    }

    /// Unread blocks, capped at capacity
    pub fn available(&self) -> usize {
        self.shared.available()
    }

    pub fn capacity(&self) -> usize {
        self.shared.slots.len()
    }
}

/// Reading half, owned by the UI-rate thread
pub struct BlockConsumer {
    shared: Arc<Shared>,
    read: u64,
    dropped: u64,
}

impl BlockConsumer {
    /// Copy the oldest unread block into `out`; `false` when empty
    ///
    /// `out` is reshaped to the FIFO's block shape if it differs.
    pub fn pop(&mut self, out: &mut AudioBlock) -> bool {
        let shared = &*self.shared;
        if out.num_channels() != shared.channels || out.num_frames() != shared.frames {
            *out = AudioBlock::new(shared.channels, shared.frames);
        }

        loop {
            let w = shared.write_index.load(Ordering::Acquire);
            if w - self.read > shared.capacity() {
                let oldest = w - shared.capacity();
                self.dropped += oldest - self.read;
                self.read = oldest;
            }
            if self.read == w {
                shared.read_index.store(self.read, Ordering::Release);
                return false;
            }

            let n = self.read;
            let complete = 2 * n + 2;
            let slot = shared.slot(n);

            let before = slot.stamp.load(Ordering::Acquire);
            if before == complete {
                for (dst, cell) in out.as_mut_slice().iter_mut().zip(slot.samples.iter()) {
                    *dst = cell.load(Ordering::Relaxed);
                }
            }
            fence(Ordering::Acquire);
            let after = slot.stamp.load(Ordering::Relaxed);

            self.read = n + 1;
            shared.read_index.store(self.read, Ordering::Release);

            if before == complete && after == complete {
                return true;
            }
            // Overwritten while we looked at it
            self.dropped += 1;
        }
    }

    /// Unread blocks, capped at capacity
    pub fn available(&self) -> usize {
        self.shared.available()
    }

    /// Blocks overwritten before they could be read
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn channels(&self) -> usize {
        self.shared.channels
    }

    pub fn frames(&self) -> usize {
        self.shared.frames
    }
}

// ============================================================================
// SAMPLE COLLECTOR
// ============================================================================

/// Gathers host buffers of any length into fixed-size mono blocks
///
/// Each completed block is pushed into the FIFO. The staging buffer is
/// allocated once; `update` is real-time safe.
pub struct SampleCollector {
    producer: BlockProducer,
    buffer: Vec<Sample>,
    fill: usize,
}

impl SampleCollector {
    pub fn new(producer: BlockProducer) -> Self {
        let frames = producer.shared.frames;
        Self {
            producer,
            buffer: vec![0.0; frames],
            fill: 0,
        }
    }

    pub fn update(&mut self, mut samples: &[Sample]) {
        let block_size = self.buffer.len();
        if block_size == 0 {
            return;
        }

        while !samples.is_empty() {
            let take = (block_size - self.fill).min(samples.len());
            self.buffer[self.fill..self.fill + take].copy_from_slice(&samples[..take]);
            self.fill += take;
            samples = &samples[take..];

            if self.fill == block_size {
                self.producer.push(&[self.buffer.as_slice()]);
                self.fill = 0;
            }
        }
    }

    /// Samples waiting for the current block to complete
    pub fn pending(&self) -> usize {
        self.fill
    }

    pub fn block_size(&self) -> usize {
        self.buffer.len()
    }

    /// Discard a partially collected block
    pub fn reset(&mut self) {
        self.fill = 0;
    }

    pub fn producer(&self) -> &BlockProducer {
        &self.producer
    }
}
