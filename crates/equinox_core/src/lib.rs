//! Equinox Core - Analyzer Pipeline
//!
//! This crate connects the audio thread to the equalizer display:
//! - Lock-free block hand-off from the audio callback (via rtrb)
//! - Sliding-window spectrum analysis and smoothed analyzer curves
//! - Coalesced filter chain recomputation from shared parameters
//! - Response curve and axis grid generation for any path backend
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Audio Thread                           │
//! │   samples ──▶ BlockCollector ──rtrb──▶ (full blocks)        │
//! │                     ▲                        │              │
//! │                     └──rtrb── (spare blocks) │              │
//! │              (Zero allocation in this path)  │              │
//! └──────────────────────────────────────────────┼──────────────┘
//!                                                ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  UI Thread (refresh tick)                   │
//! │  BlockReceiver ──▶ SpectrumGenerator ──▶ AnalyzerPath ──▶   │
//! │                                            latest curve     │
//! │  ParameterStore ──changed?──▶ FilterChain ──▶ response      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod analyzer;
mod analyzer_path;
mod axis;
mod collector;
mod config;
mod error;
mod fifo;
mod parameters;
mod path;
mod producer;
mod response;
mod spectrum;

pub use analyzer::{AnalysisEngine, TickSummary};
pub use analyzer_path::{
    build_path, jmap, map_from_log10, map_to_log10, AnalyzerPathGenerator, Envelope,
    PathResolution, MAX_DISPLAY_FREQ, MIN_DISPLAY_FREQ,
};
pub use axis::{
    frequency_grid, frequency_label, gain_grid, gain_label, GridLine, GRID_FREQUENCIES,
    GRID_GAINS,
};
pub use collector::{block_channel, BlockCollector, BlockReceiver, SampleBlock};
pub use config::AnalyzerConfig;
pub use error::{AnalysisError, AnalysisResult};
pub use fifo::{fifo, FifoReader, FifoWriter};
pub use parameters::ParameterStore;
pub use path::{CurvePath, PathElement, PathSink, Point, Rect};
pub use producer::{PathProducer, ProcessStats};
pub use response::{db_to_y, frequency_at, response_curve};
pub use spectrum::{CycleOutcome, Spectrum, SpectrumGenerator};

// Re-export DSP types for convenience
pub use equinox_dsp::{ChainPosition, FftOrder, FilterChain, FilterParameters, Slope};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crate_exports() {
        // Verify public API is accessible
        let _config = AnalyzerConfig::default();
        let _store = ParameterStore::default();
        let _path = CurvePath::new();
    }
}
