//! Per-channel spectrum path producer (UI-rate thread)
//!
//! BlockFifo → rolling window → SpectrumAnalyzer → PathBuilder. Every tick
//! drains whatever the audio thread pushed, turns every finished snapshot
//! into a path and keeps only the newest one for drawing.

use zoo_core::{AudioBlock, EqConfig, ZooError, ZooResult};
use zoo_dsp::SpectrumAnalyzer;
use zoo_viz::{PathBuilder, Rect, RenderPath};

use crate::block_fifo::BlockConsumer;

pub struct PathProducer {
    consumer: BlockConsumer,
    block: AudioBlock,
    analyzer: SpectrumAnalyzer,
    builder: PathBuilder,
    floor_db: f64,
    path: Option<RenderPath>,
}

impl PathProducer {
    pub fn new(consumer: BlockConsumer, config: &EqConfig) -> ZooResult<Self> {
        let builder = PathBuilder::from_config(&config.display, &config.realtime)
            .map_err(|e| ZooError::Config(e.to_string()))?;
        let block = AudioBlock::new(consumer.channels(), consumer.frames());

        Ok(Self {
            consumer,
            block,
            analyzer: SpectrumAnalyzer::new(&config.analyzer),
            builder,
            floor_db: config.analyzer.floor_db,
            path: None,
        })
    }

    /// Drain the FIFO and rebuild the path; `true` if a new path is available
    pub fn process(&mut self, bounds: Rect, sample_rate: f64) -> bool {
        while self.consumer.pop(&mut self.block) {
            self.analyzer.push_block(self.block.channel(0));
        }

        let fft_size = self.analyzer.fft_size();
        let bin_width = self.analyzer.bin_width(sample_rate);

        while let Some(snapshot) = self.analyzer.pop_snapshot() {
            self.builder
                .generate_path(&snapshot, bounds, fft_size, bin_width, self.floor_db);
        }

        match self.builder.take_latest_path() {
            Some(path) => {
                self.path = Some(path);
                true
            }
            None => false,
        }
    }

    /// Most recent spectrum path
    pub fn path(&self) -> Option<&RenderPath> {
        self.path.as_ref()
    }

    /// Blocks the audio thread overwrote before they were drained
    pub fn dropped_blocks(&self) -> u64 {
        self.consumer.dropped()
    }

    pub fn analyzer(&self) -> &SpectrumAnalyzer {
        &self.analyzer
    }
}
