// Analysis error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Analysis error code constants
///
/// These constants provide a single source of truth for the codes host
/// applications receive alongside analysis failures.
///
/// Error code range: 2001-2003
pub struct AnalysisErrorCodes {}

impl AnalysisErrorCodes {
    /// Buffer shorter than the minimum analyzable window
    pub const INSUFFICIENT_SAMPLES: i32 = 2001;

    /// Sample rate of zero or outside the supported bounds
    pub const INVALID_SAMPLE_RATE: i32 = 2002;

    /// No periodicity detectable in the signal (strict mode only)
    pub const DEGENERATE_SIGNAL: i32 = 2003;
}

/// Log an analysis error with structured context
///
/// Logs the numeric error code, component, and message so failures can
/// be correlated from host-application logs. Non-blocking; never panics.
pub fn log_analysis_error(err: &AnalysisError, context: &str) {
    error!(
        "Analysis error in {}: code={}, component=VoiceAnalyzer, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Analysis-related errors
///
/// These errors cover input validation and degenerate-signal detection
/// for the single `analyze` operation.
///
/// Error code range: 2001-2003
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// Buffer shorter than one pitch period at the configured F0 floor
    InsufficientSamples { required: usize, got: usize },

    /// Sample rate of zero or outside the supported bounds
    InvalidSampleRate { rate: u32 },

    /// Silence or aperiodic input where no pitch could be detected
    /// (returned only when strict degenerate handling is configured)
    DegenerateSignal,
}

impl ErrorCode for AnalysisError {
    fn code(&self) -> i32 {
        match self {
            AnalysisError::InsufficientSamples { .. } => {
                AnalysisErrorCodes::INSUFFICIENT_SAMPLES
            }
            AnalysisError::InvalidSampleRate { .. } => AnalysisErrorCodes::INVALID_SAMPLE_RATE,
            AnalysisError::DegenerateSignal => AnalysisErrorCodes::DEGENERATE_SIGNAL,
        }
    }

    fn message(&self) -> String {
        match self {
            AnalysisError::InsufficientSamples { required, got } => {
                format!(
                    "Buffer too short for analysis: need at least {} samples, got {}",
                    required, got
                )
            }
            AnalysisError::InvalidSampleRate { rate } => {
                format!(
                    "Sample rate {} Hz outside supported range [{}, {}]",
                    rate,
                    crate::analysis::SAMPLE_RATE_MIN,
                    crate::analysis::SAMPLE_RATE_MAX
                )
            }
            AnalysisError::DegenerateSignal => {
                "No periodicity detected; signal is silence or aperiodic".to_string()
            }
        }
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AnalysisError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for AnalysisError {}
