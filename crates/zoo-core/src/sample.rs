//! Sample types and audio block definitions

/// Type alias for audio samples (always f64 for maximum precision)
pub type Sample = f64;

/// Audio buffer trait for generic buffer operations
pub trait AudioBuffer {
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn clear(&mut self);
}

/// Fixed-size, multi-channel block of samples (planar layout)
///
/// One block is produced per processing callback. Channel count and frame
/// count are fixed at construction; the block is reused, never resized.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBlock {
    channels: usize,
    frames: usize,
    samples: Vec<Sample>,
}

impl AudioBlock {
    pub fn new(channels: usize, frames: usize) -> Self {
        Self {
            channels,
            frames,
            samples: vec![0.0; channels * frames],
        }
    }

    /// Build a block from per-channel slices; every slice must have the same length
    pub fn from_channels(channels: &[&[Sample]]) -> Self {
        let frames = channels.first().map_or(0, |c| c.len());
        let mut block = Self::new(channels.len(), frames);
        for (index, data) in channels.iter().enumerate() {
            let len = data.len().min(frames);
            block.channel_mut(index)[..len].copy_from_slice(&data[..len]);
        }
        block
    }

    #[inline]
    pub fn num_channels(&self) -> usize {
        self.channels
    }

    #[inline]
    pub fn num_frames(&self) -> usize {
        self.frames
    }

    #[inline]
    pub fn channel(&self, index: usize) -> &[Sample] {
        let start = index * self.frames;
        &self.samples[start..start + self.frames]
    }

    #[inline]
    pub fn channel_mut(&mut self, index: usize) -> &mut [Sample] {
        let start = index * self.frames;
        &mut self.samples[start..start + self.frames]
    }

    /// All samples, channel after channel
    #[inline]
    pub fn as_slice(&self) -> &[Sample] {
        &self.samples
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Sample] {
        &mut self.samples
    }
}

impl AudioBuffer for AudioBlock {
    fn len(&self) -> usize {
        self.frames
    }

    fn clear(&mut self) {
        self.samples.fill(0.0);
    }
}
