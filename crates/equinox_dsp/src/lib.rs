//! Equinox DSP - Digital Signal Processing Module
//!
//! This crate provides the signal math behind the Equinox equalizer display:
//! - Three-stage filter chain (low-cut, peak, high-cut) built from BiQuad filters
//! - Analytic magnitude response of the chain at any frequency
//! - Windowed FFT magnitude transform for the spectrum analyzer
//!
//! # Architecture
//!
//! Nothing here spawns threads or shares state. The filter chain's
//! `process_*` methods follow the "no allocation in audio callback" rule;
//! everything else runs on the UI refresh tick.

mod error;
mod fft;
mod filter_chain;
mod params;
mod window;

pub use error::{DspError, DspResult};
pub use fft::{gain_to_decibels, FftOrder, MagnitudeTransform};
pub use filter_chain::{
    butterworth_q, make_high_cut_filter, make_low_cut_filter, make_peak_filter, ChainPosition,
    FilterChain, MAX_CUT_SECTIONS,
};
pub use params::{
    FilterParameters, Slope, MAX_FREQUENCY, MAX_PEAK_GAIN_DB, MAX_PEAK_QUALITY, MIN_FREQUENCY,
    MIN_PEAK_QUALITY,
};
pub use window::WindowTable;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crate_exports() {
        // Verify all public types are accessible
        let _params = FilterParameters::default();
        let _chain = FilterChain::new(48000.0).unwrap();
        let _transform = MagnitudeTransform::new(FftOrder::default());
    }
}
