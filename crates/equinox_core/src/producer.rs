//! Per-Channel Path Producer
//!
//! Drives one channel through the analyzer pipeline on each refresh tick:
//!
//! ```text
//! BlockReceiver ──▶ SpectrumGenerator ──fifo──▶ AnalyzerPathGenerator ──fifo──▶ latest path
//! ```
//!
//! Every stage drains whatever is available; only the newest curve is kept.

use equinox_dsp::FftOrder;
use tracing::debug;

use crate::analyzer_path::AnalyzerPathGenerator;
use crate::collector::BlockReceiver;
use crate::config::AnalyzerConfig;
use crate::error::AnalysisResult;
use crate::fifo::FifoReader;
use crate::path::{CurvePath, PathSink, Rect};
use crate::spectrum::{CycleOutcome, Spectrum, SpectrumGenerator};

/// What one `process` call did, for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessStats {
    pub blocks: usize,
    pub spectra: usize,
    pub paths: usize,
}

pub struct PathProducer<P = CurvePath> {
    channel: usize,
    blocks: BlockReceiver,
    spectrum: SpectrumGenerator,
    spectra: FifoReader<Spectrum>,
    path_generator: AnalyzerPathGenerator<P>,
    paths: FifoReader<P>,
    latest: P,
    negative_infinity_db: f32,
    reported_drops: usize,
}

impl<P: PathSink + Default> PathProducer<P> {
    pub fn new(channel: usize, blocks: BlockReceiver, config: &AnalyzerConfig) -> AnalysisResult<Self> {
        let (spectrum, spectra) =
            SpectrumGenerator::new(config.fft_order, config.spectrum_fifo_capacity)?;
        let (path_generator, paths) = AnalyzerPathGenerator::new(
            config.attack,
            config.decay_db_per_frame,
            config.path_resolution(),
            config.path_fifo_capacity,
        )?;

        Ok(Self {
            channel,
            blocks,
            spectrum,
            spectra,
            path_generator,
            paths,
            latest: P::default(),
            negative_infinity_db: config.negative_infinity_db,
            reported_drops: 0,
        })
    }

    /// Run every available block and spectrum through the pipeline
    pub fn process(&mut self, bounds: Rect, sample_rate: f64) -> ProcessStats {
        let mut stats = ProcessStats::default();
        let floor = self.negative_infinity_db;

        let spectrum = &mut self.spectrum;
        stats.blocks = self.blocks.drain(|block| {
            if spectrum.process_block(block, floor) == CycleOutcome::Dropped {
                debug!("Spectrum FIFO full, dropping spectrum");
            }
        });

        let fft_size = self.spectrum.fft_size();
        let bin_width = (sample_rate / fft_size as f64) as f32;
        while let Some(spectrum) = self.spectra.read() {
            // Spectra queued before a resolution change are stale
            if spectrum.len() == fft_size / 2 {
                self.path_generator
                    .generate(&spectrum, bounds, fft_size, bin_width, floor);
                stats.spectra += 1;
            }
        }

        while let Some(path) = self.paths.read() {
            self.latest = path;
            stats.paths += 1;
        }

        let dropped = self.blocks.dropped_blocks();
        if dropped > self.reported_drops {
            debug!(
                channel = self.channel,
                dropped = dropped - self.reported_drops,
                "Analyzer fell behind the audio thread, blocks dropped"
            );
            self.reported_drops = dropped;
        }

        stats
    }

    /// Newest analyzer curve (empty until the first spectrum arrives)
    pub fn path(&self) -> &P {
        &self.latest
    }

    pub fn fft_order(&self) -> FftOrder {
        self.spectrum.order()
    }

    /// Change analysis resolution; the envelope reseeds on the next spectrum
    pub fn set_fft_order(&mut self, order: FftOrder) {
        self.spectrum.set_order(order);
    }

    pub fn set_smoothing(&mut self, attack: f32, decay_db: f32) {
        let envelope = self.path_generator.envelope_mut();
        envelope.set_attack(attack);
        envelope.set_decay_db(decay_db);
    }

    pub fn dropped_blocks(&self) -> usize {
        self.blocks.dropped_blocks()
    }
}
