//! Analyzer Configuration

use equinox_dsp::FftOrder;
use serde::{Deserialize, Serialize};

use crate::analyzer_path::PathResolution;
use crate::error::{AnalysisError, AnalysisResult};

/// Settings for the spectrum analyzer and response curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Analysis resolution (FFT size)
    pub fft_order: FftOrder,

    /// Samples per block handed from the audio thread (must not exceed the FFT size)
    pub block_size: usize,

    /// dB value treated as silence; spectra never go below it
    pub negative_infinity_db: f32,

    /// Fraction of the gap to a louder bin closed per frame (0, 1]
    pub attack: f32,

    /// dB an envelope bin falls per frame when the signal drops
    pub decay_db_per_frame: f32,

    /// Bin stride near DC
    pub min_path_stride: usize,

    /// Bin stride near Nyquist
    pub max_path_stride: usize,

    /// Completed sample blocks that may queue per channel
    pub block_fifo_capacity: usize,

    /// Spectra that may queue per channel
    pub spectrum_fifo_capacity: usize,

    /// Analyzer curves that may queue per channel
    pub path_fifo_capacity: usize,

    /// UI refresh rate driving `tick()`
    pub refresh_rate_hz: u32,

    /// Response curve vertical range, symmetric around 0dB
    pub response_range_db: f32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            fft_order: FftOrder::Order2048,
            block_size: 2048,
            negative_infinity_db: -48.0,
            attack: 0.5,
            decay_db_per_frame: 0.85,
            min_path_stride: 2,
            max_path_stride: 20,
            block_fifo_capacity: 30,
            spectrum_fifo_capacity: 30,
            path_fifo_capacity: 30,
            refresh_rate_hz: 60,
            response_range_db: 24.0,
        }
    }
}

impl AnalyzerConfig {
    /// Finer frequency resolution, deeper floor
    pub fn high_resolution() -> Self {
        Self {
            fft_order: FftOrder::Order8192,
            block_size: 2048,
            negative_infinity_db: -96.0,
            ..Self::default()
        }
    }

    /// Smaller blocks so the display follows transients closely
    pub fn low_latency() -> Self {
        Self {
            fft_order: FftOrder::Order2048,
            block_size: 512,
            block_fifo_capacity: 64,
            spectrum_fifo_capacity: 64,
            ..Self::default()
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_order.fft_size()
    }

    /// Seconds between refresh ticks
    pub fn refresh_interval_secs(&self) -> f32 {
        1.0 / self.refresh_rate_hz as f32
    }

    pub fn path_resolution(&self) -> PathResolution {
        PathResolution {
            min_stride: self.min_path_stride,
            max_stride: self.max_path_stride,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> AnalysisResult<()> {
        let invalid = |msg: String| Err(AnalysisError::InvalidConfig(msg));

        if self.block_size == 0 || self.block_size > self.fft_size() {
            return Err(AnalysisError::InvalidBlockSize {
                got: self.block_size,
                max: self.fft_size(),
            });
        }
        if !(self.negative_infinity_db.is_finite() && self.negative_infinity_db < 0.0) {
            return invalid(format!(
                "Negative infinity floor must be below 0dB: {}",
                self.negative_infinity_db
            ));
        }
        if !(self.attack > 0.0 && self.attack <= 1.0) {
            return invalid(format!("Attack must be in (0, 1]: {}", self.attack));
        }
        if !(self.decay_db_per_frame.is_finite() && self.decay_db_per_frame > 0.0) {
            return invalid(format!("Decay step must be positive: {}", self.decay_db_per_frame));
        }
        if self.min_path_stride == 0 || self.min_path_stride > self.max_path_stride {
            return invalid(format!(
                "Invalid path stride range: {}..{}",
                self.min_path_stride, self.max_path_stride
            ));
        }
        if self.block_fifo_capacity == 0
            || self.spectrum_fifo_capacity == 0
            || self.path_fifo_capacity == 0
        {
            return Err(AnalysisError::ZeroCapacity);
        }
        if self.refresh_rate_hz == 0 || self.refresh_rate_hz > 240 {
            return invalid(format!("Invalid refresh rate: {}", self.refresh_rate_hz));
        }
        if !(self.response_range_db.is_finite() && self.response_range_db > 0.0) {
            return invalid(format!("Invalid response range: {}", self.response_range_db));
        }
        Ok(())
    }
}
