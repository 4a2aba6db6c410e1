//! VoiceLab acoustic analysis library.
//!
//! Extracts clinically relevant voice-quality metrics from mono PCM audio:
//! fundamental frequency statistics, jitter and shimmer perturbation
//! measures, LPC formant estimates, harmonics-to-noise ratio, intensity,
//! and a derived quality composite with normative comparisons.
//!
//! The typical entry point is [`VoiceAnalyzer::analyze`], which runs the
//! full pipeline over a clip and returns an [`AnalysisResult`].

pub mod analysis;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod synth;

pub use analysis::norms::{assess, NormativeAssessment, SpeakerCategory};
pub use analysis::types::{AnalysisResult, AnalysisWarning, QualityScores};
pub use analysis::VoiceAnalyzer;
pub use config::AnalyzerConfig;
pub use error::{AnalysisError, ErrorCode};
