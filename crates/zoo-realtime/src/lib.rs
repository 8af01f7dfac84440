//! zoo-realtime: real-time plumbing for ZooEQ
//!
//! Two execution contexts share this crate:
//! - the audio thread ([`EqAudioProcessor`]): filters, pushes blocks into
//!   the [`BlockFifo`]s, picks up published coefficients; never blocks
//! - the UI-rate thread ([`ResponseCurveController`]): drains blocks into
//!   spectrum paths, redesigns the chain when parameters change, evaluates
//!   the response curve
//!
//! [`create_pipeline`] wires both halves around one [`EqContext`].

pub mod block_fifo;
pub mod state;
pub mod context;
pub mod processor;
pub mod producer;
pub mod controller;
pub mod scheduler;

pub use block_fifo::{BlockConsumer, BlockFifo, BlockProducer, SampleCollector};
pub use state::{TripleBuffer, TripleInput, TripleOutput};
pub use context::EqContext;
pub use processor::EqAudioProcessor;
pub use producer::PathProducer;
pub use controller::{ResponseCurveController, TickReport};
pub use scheduler::{FixedRateTimer, run_loop};

use std::sync::Arc;
use zoo_core::{EqConfig, ZooResult, check_sample_rate};
use zoo_dsp::ChainCoefficients;

/// Build the audio-thread processor and the UI-rate controller around `context`
///
/// Each channel gets its own mono block FIFO of
/// `realtime.block_fifo_capacity` blocks of `realtime.block_size` samples.
pub fn create_pipeline(
    context: &Arc<EqContext>,
    config: &EqConfig,
) -> ZooResult<(EqAudioProcessor, ResponseCurveController)> {
    config.validate()?;
    check_sample_rate(context.sample_rate())?;
    let realtime = &config.realtime;

    let (left_tx, left_rx) =
        BlockFifo::new(realtime.block_fifo_capacity, 1, realtime.block_size).split();
    let (right_tx, right_rx) =
        BlockFifo::new(realtime.block_fifo_capacity, 1, realtime.block_size).split();

    let (publisher, reader) =
        TripleBuffer::new(ChainCoefficients::identity(context.sample_rate())).split();

    let processor = EqAudioProcessor::new(
        Arc::clone(context),
        reader,
        SampleCollector::new(left_tx),
        SampleCollector::new(right_tx),
    );

    let controller = ResponseCurveController::new(
        Arc::clone(context),
        publisher,
        PathProducer::new(left_rx, config)?,
        PathProducer::new(right_rx, config)?,
        &config.display,
        config.analyzer.floor_db,
    )?;

    log::info!(
        "Pipeline ready: {} x {} sample blocks per channel, {} point FFT",
        realtime.block_fifo_capacity,
        realtime.block_size,
        config.analyzer.fft_order.size()
    );

    Ok((processor, controller))
}
