//! Analysis Error Types

use thiserror::Error;

/// Errors that can occur while building or reconfiguring the analysis pipeline
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid analyzer configuration: {0}")]
    InvalidConfig(String),

    #[error("FIFO capacity must be at least one slot")]
    ZeroCapacity,

    #[error("Block size must be between 1 and {max}, got {got}")]
    InvalidBlockSize { got: usize, max: usize },

    #[error("Channel {index} out of range ({channels} channels)")]
    ChannelOutOfRange { index: usize, channels: usize },

    #[error("DSP error: {0}")]
    DspError(#[from] equinox_dsp::DspError),
}

/// Result type alias for analysis operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;
