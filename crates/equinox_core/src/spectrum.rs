//! Spectral Magnitude Generator
//!
//! Keeps a sliding analysis window of the most recent `fft_size` samples.
//! Each incoming block shifts the window left by the block length and lands
//! at its end; the window is then transformed into a dB spectrum and
//! published to the spectrum FIFO.
//!
//! Runs on the UI refresh tick only. The audio thread never sees this type.

use equinox_dsp::{FftOrder, MagnitudeTransform};
use tracing::debug;

use crate::error::AnalysisResult;
use crate::fifo::{fifo, FifoReader, FifoWriter};

/// Magnitudes in dB, one per bin, `fft_size / 2` long
pub type Spectrum = Vec<f32>;

/// Result of feeding one block through the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Spectrum computed and queued
    Published,
    /// Spectrum computed but the FIFO was full
    Dropped,
    /// Block longer than the analysis window; nothing changed
    Skipped,
}

pub struct SpectrumGenerator {
    transform: MagnitudeTransform,
    window: Vec<f32>,
    output: FifoWriter<Spectrum>,
}

impl SpectrumGenerator {
    /// Create a generator and the reader for its spectra
    pub fn new(order: FftOrder, capacity: usize) -> AnalysisResult<(Self, FifoReader<Spectrum>)> {
        let (output, reader) = fifo(capacity)?;
        let generator = Self {
            transform: MagnitudeTransform::new(order),
            window: vec![0.0; order.fft_size()],
            output,
        };
        Ok((generator, reader))
    }

    pub fn order(&self) -> FftOrder {
        self.transform.order()
    }

    pub fn fft_size(&self) -> usize {
        self.transform.fft_size()
    }

    /// Current analysis window, oldest sample first
    pub fn window(&self) -> &[f32] {
        &self.window
    }

    /// Switch resolution. Reallocates the window, plan and window table and
    /// clears the window; spectra already queued keep their old length.
    pub fn set_order(&mut self, order: FftOrder) {
        if order == self.order() {
            return;
        }
        debug!(fft_size = order.fft_size(), "Reconfiguring spectrum generator");
        self.transform.set_order(order);
        self.window = vec![0.0; order.fft_size()];
    }

    /// Slide `block` into the window without transforming.
    ///
    /// Returns false (window untouched) when the block is longer than the
    /// window.
    ///
    /// # Panics
    /// Panics on an oversized block in debug builds only
    pub fn push_block(&mut self, block: &[f32]) -> bool {
        let size = self.window.len();
        debug_assert!(block.len() <= size, "Block longer than analysis window");
        if block.len() > size {
            return false;
        }

        let keep = size - block.len();
        self.window.copy_within(block.len().., 0);
        self.window[keep..].copy_from_slice(block);
        true
    }

    /// Transform the current window and queue the spectrum
    pub fn produce(&mut self, negative_infinity_db: f32) -> CycleOutcome {
        let mut spectrum = vec![0.0; self.transform.num_bins()];
        if !self
            .transform
            .process(&self.window, negative_infinity_db, &mut spectrum)
        {
            return CycleOutcome::Skipped;
        }

        if self.output.write(spectrum) {
            CycleOutcome::Published
        } else {
            CycleOutcome::Dropped
        }
    }

    /// One full analysis cycle: slide, window, transform, publish
    pub fn process_block(&mut self, block: &[f32], negative_infinity_db: f32) -> CycleOutcome {
        if !self.push_block(block) {
            return CycleOutcome::Skipped;
        }
        self.produce(negative_infinity_db)
    }
}
