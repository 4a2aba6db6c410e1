// Types module - Data structures for voice-quality metrics
//
// This module defines the aggregates returned by a single analysis pass.
// Every field is a plain finite number; the aggregate carries no identity
// and is created fresh per call.

use serde::{Deserialize, Serialize};

/// Complete result of one voice-quality analysis pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Fundamental frequency statistics across voiced analysis frames
    pub f0: F0Stats,
    /// Cycle-to-cycle period perturbation metrics
    pub jitter: JitterMetrics,
    /// Cycle-to-cycle amplitude perturbation metrics
    pub shimmer: ShimmerMetrics,
    /// Estimated vocal-tract resonances F1-F4
    pub formants: FormantEstimate,
    /// Harmonics-to-noise ratio in dB, clamped to [0, 30]
    pub hnr_db: f32,
    /// Approximate dB SPL statistics over fixed windows
    pub intensity: IntensityStats,
    /// Derived perceptual quality composite, each score in [0, 100]
    pub quality: QualityScores,
    /// Recording duration in seconds
    pub duration_secs: f32,
    /// Non-fatal conditions encountered during analysis
    #[serde(default)]
    pub warnings: Vec<AnalysisWarning>,
}

impl AnalysisResult {
    /// True when no meaningful periodicity was found in the signal.
    pub fn is_degenerate(&self) -> bool {
        self.warnings.contains(&AnalysisWarning::DegenerateSignal)
    }
}

/// Fundamental frequency statistics in Hz.
///
/// Aggregated over voiced analysis frames only. All fields are 0.0 when
/// no frame cleared the voicing threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct F0Stats {
    /// Mean F0 across voiced frames
    pub mean: f32,
    /// Lowest voiced-frame F0
    pub min: f32,
    /// Highest voiced-frame F0
    pub max: f32,
    /// Population standard deviation of voiced-frame F0
    pub std_dev: f32,
    /// Fraction of analysis frames classified as voiced (0.0 to 1.0)
    pub voiced_ratio: f32,
}

impl F0Stats {
    pub fn silent() -> Self {
        Self {
            mean: 0.0,
            min: 0.0,
            max: 0.0,
            std_dev: 0.0,
            voiced_ratio: 0.0,
        }
    }
}

/// Jitter: cycle-to-cycle frequency (period) perturbation.
///
/// Fields degrade to 0.0 when fewer periods are available than the
/// respective quotient needs (2 for absolute/relative, 3 for RAP,
/// 5 for PPQ5).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JitterMetrics {
    /// Mean absolute period-to-period difference in microseconds
    pub absolute_us: f32,
    /// Mean absolute period difference as % of the mean period
    pub relative: f32,
    /// Relative average perturbation, 3-point smoothed (%)
    pub rap: f32,
    /// 5-point period perturbation quotient (%)
    pub ppq5: f32,
}

impl JitterMetrics {
    pub fn zero() -> Self {
        Self {
            absolute_us: 0.0,
            relative: 0.0,
            rap: 0.0,
            ppq5: 0.0,
        }
    }
}

/// Shimmer: cycle-to-cycle amplitude perturbation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShimmerMetrics {
    /// Mean peak-amplitude difference expressed as 20*log10(1 + diff) dB
    pub absolute_db: f32,
    /// Mean absolute amplitude difference as % of the mean peak amplitude
    pub relative: f32,
    /// 3-point amplitude perturbation quotient (%)
    pub apq3: f32,
    /// 5-point amplitude perturbation quotient (%)
    pub apq5: f32,
}

impl ShimmerMetrics {
    pub fn zero() -> Self {
        Self {
            absolute_db: 0.0,
            relative: 0.0,
            apq3: 0.0,
            apq5: 0.0,
        }
    }
}

/// Estimated formant frequencies in Hz.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FormantEstimate {
    pub f1: f32,
    pub f2: f32,
    pub f3: f32,
    pub f4: f32,
    /// How the estimate was produced
    pub method: FormantMethod,
}

/// Formant extraction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormantMethod {
    /// LPC analysis over voiced frames
    Lpc,
    /// Fixed nominal vocal-tract resonances (500/1500/2500/3500 Hz)
    Nominal,
}

/// Intensity statistics in approximate dB SPL.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntensityStats {
    pub mean_db: f32,
    pub min_db: f32,
    pub max_db: f32,
    pub std_db: f32,
}

/// Perceptual voice-quality composite. Each score lies in [0, 100].
///
/// Higher breathiness/roughness/strain indicate a stronger deviation from
/// the respective clinical threshold; `overall` is 100 minus their mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityScores {
    pub breathiness: f32,
    pub roughness: f32,
    pub strain: f32,
    pub overall: f32,
}

/// Non-fatal analysis conditions reported alongside the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisWarning {
    /// No autocorrelation peak cleared the voicing threshold; the signal
    /// is silence or aperiodic and the period-based metrics were zeroed.
    DegenerateSignal,
    /// Too few pitch cycles for the smoothed perturbation quotients;
    /// the affected fields were zeroed.
    TooFewCycles,
}
