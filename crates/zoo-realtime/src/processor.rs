//! Audio-thread side of the EQ
//!
//! `process` is the host callback: it adopts freshly published
//! coefficients, filters both channels in place and feeds the analyzer
//! FIFOs. No allocation, locking or logging happens there.

use std::sync::Arc;
use zoo_core::{ChainSettings, Sample, ZooResult, check_sample_rate};
use zoo_dsp::{ChainCoefficients, MonoChain, MonoProcessor, Processor, design_chain};

use crate::block_fifo::SampleCollector;
use crate::context::EqContext;
use crate::state::TripleOutput;

/// Stereo EQ processor owned by the audio thread
pub struct EqAudioProcessor {
    context: Arc<EqContext>,
    coefficients: TripleOutput<ChainCoefficients>,
    left_chain: MonoChain,
    right_chain: MonoChain,
    left_collector: SampleCollector,
    right_collector: SampleCollector,
    sample_rate: f64,
}

impl EqAudioProcessor {
    pub fn new(
        context: Arc<EqContext>,
        coefficients: TripleOutput<ChainCoefficients>,
        left_collector: SampleCollector,
        right_collector: SampleCollector,
    ) -> Self {
        let sample_rate = context.sample_rate();
        Self {
            context,
            coefficients,
            left_chain: MonoChain::new(),
            right_chain: MonoChain::new(),
            left_collector,
            right_collector,
            sample_rate,
        }
    }

    /// Called before playback starts or when the host changes sample rate
    ///
    /// Designs the chain directly from the current parameters so the first
    /// callback is already filtered, then asks the UI side to republish.
    pub fn prepare(&mut self, sample_rate: f64, max_block: usize) -> ZooResult<()> {
        let sample_rate = check_sample_rate(sample_rate)?;
        self.sample_rate = sample_rate;
        self.context.set_sample_rate(sample_rate);

        let settings = ChainSettings::capture(self.context.params());
        let chain = design_chain(&settings, sample_rate);
        self.left_chain.apply(&chain);
        self.right_chain.apply(&chain);
        self.left_chain.reset();
        self.right_chain.reset();
        self.left_collector.reset();
        self.right_collector.reset();

        self.context.mark_dirty();

        log::info!(
            "EQ prepared: {} Hz, host block up to {} samples, analyzer block {}",
            sample_rate,
            max_block,
            self.left_collector.block_size()
        );
        Ok(())
    }

    /// Host callback: filter both channels in place
    pub fn process(&mut self, left: &mut [Sample], right: &mut [Sample]) {
        if self.coefficients.update() {
            let chain = *self.coefficients.read();
            // Designs for a previous sample rate are superseded by `prepare`
            if chain.sample_rate == self.sample_rate {
                self.left_chain.apply(&chain);
                self.right_chain.apply(&chain);
            }
        }

        self.left_chain.process_block(left);
        self.right_chain.process_block(right);

        self.left_collector.update(left);
        self.right_collector.update(right);
    }

    #[inline]
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn left_chain(&self) -> &MonoChain {
        &self.left_chain
    }

    pub fn right_chain(&self) -> &MonoChain {
        &self.right_chain
    }
}
