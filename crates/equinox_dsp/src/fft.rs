//! FFT Magnitude Transform
//!
//! Turns one analysis window of mono samples into a magnitude spectrum in
//! decibels. The caller owns the sliding window; this type owns the FFT plan,
//! the windowing table and the working buffers, all sized once per FFT order.
//!
//! Output bin `i` corresponds to `i * sample_rate / fft_size` Hz. Only the
//! first `fft_size / 2` bins are produced since the input is real.

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use serde::{Deserialize, Serialize};

use crate::error::DspError;
use crate::window::WindowTable;

/// Supported analysis resolutions
/// 2048 samples at 48kHz = ~42ms window, ~23Hz resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FftOrder {
    #[default]
    Order2048,
    Order4096,
    Order8192,
}

impl FftOrder {
    /// log2 of the FFT size
    pub fn order(self) -> u32 {
        match self {
            FftOrder::Order2048 => 11,
            FftOrder::Order4096 => 12,
            FftOrder::Order8192 => 13,
        }
    }

    pub fn fft_size(self) -> usize {
        1 << self.order()
    }

    pub fn num_bins(self) -> usize {
        self.fft_size() / 2
    }
}

impl TryFrom<u32> for FftOrder {
    type Error = DspError;

    fn try_from(order: u32) -> Result<Self, Self::Error> {
        match order {
            11 => Ok(FftOrder::Order2048),
            12 => Ok(FftOrder::Order4096),
            13 => Ok(FftOrder::Order8192),
            other => Err(DspError::InvalidFftOrder(other)),
        }
    }
}

/// Convert linear gain to decibels, never going below `negative_infinity_db`
#[inline]
pub fn gain_to_decibels(gain: f32, negative_infinity_db: f32) -> f32 {
    if gain > 0.0 {
        (20.0 * gain.log10()).max(negative_infinity_db)
    } else {
        negative_infinity_db
    }
}

/// Windowed forward FFT producing dB magnitudes
pub struct MagnitudeTransform {
    order: FftOrder,
    fft: Arc<dyn Fft<f32>>,
    window: WindowTable,
    /// Working copy of the analysis window (windowing happens here, never on the caller's data)
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl MagnitudeTransform {
    pub fn new(order: FftOrder) -> Self {
        let size = order.fft_size();
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        Self {
            order,
            fft,
            window: WindowTable::blackman_harris(size),
            buffer: vec![Complex::new(0.0, 0.0); size],
            scratch,
        }
    }

    pub fn order(&self) -> FftOrder {
        self.order
    }

    pub fn fft_size(&self) -> usize {
        self.order.fft_size()
    }

    pub fn num_bins(&self) -> usize {
        self.order.num_bins()
    }

    /// Rebuild plan, window and buffers for a new resolution.
    /// Allocates; never call from the audio thread.
    pub fn set_order(&mut self, order: FftOrder) {
        if order != self.order {
            *self = Self::new(order);
        }
    }

    /// Transform `input` (exactly `fft_size` samples) into `output`
    /// (exactly `num_bins` dB values, each `>= negative_infinity_db`).
    ///
    /// Returns false without touching `output` when either length is wrong.
    ///
    /// # Panics
    /// Panics on a length mismatch in debug builds only
    pub fn process(&mut self, input: &[f32], negative_infinity_db: f32, output: &mut [f32]) -> bool {
        let size = self.fft_size();
        let bins = self.num_bins();
        debug_assert_eq!(input.len(), size, "Analysis window must match FFT size");
        debug_assert_eq!(output.len(), bins, "Spectrum must hold fft_size / 2 bins");
        if input.len() != size || output.len() != bins {
            return false;
        }

        for (i, (slot, &sample)) in self.buffer.iter_mut().zip(input).enumerate() {
            *slot = Complex::new(self.window.apply(sample, i), 0.0);
        }

        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        let normalization = bins as f32;
        for (db, bin) in output.iter_mut().zip(&self.buffer[..bins]) {
            *db = gain_to_decibels(bin.norm() / normalization, negative_infinity_db);
        }

        true
    }
}
