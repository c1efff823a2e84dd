//! DSP Error Types

use thiserror::Error;

/// Errors that can occur during DSP operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DspError {
    #[error("Invalid filter coefficients for frequency {frequency}Hz at sample rate {sample_rate}Hz")]
    InvalidCoefficients { frequency: f32, sample_rate: f32 },

    #[error("Sample rate must be positive, got {0}")]
    InvalidSampleRate(f32),

    #[error("Unsupported FFT order: {0} (must be 11, 12 or 13)")]
    InvalidFftOrder(u32),

    #[error("Buffer size mismatch: expected {expected}, got {got}")]
    BufferSizeMismatch { expected: usize, got: usize },
}

/// Result type alias for DSP operations
pub type DspResult<T> = Result<T, DspError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DspError::InvalidFftOrder(15);
        assert!(err.to_string().contains("15"));

        let err = DspError::InvalidCoefficients {
            frequency: 30000.0,
            sample_rate: 48000.0,
        };
        assert!(err.to_string().contains("30000"));

        let err = DspError::BufferSizeMismatch {
            expected: 2048,
            got: 512,
        };
        assert!(err.to_string().contains("2048"));
        assert!(err.to_string().contains("512"));
    }
}
