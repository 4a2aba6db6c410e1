// Norms module - Normative reference tables
//
// Static, read-only reference ranges for the supported speaker
// categories, and the comparison of one analysis result against them.
// Values follow the ranges commonly cited in clinical voice assessment.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::analysis::types::AnalysisResult;

/// Speaker population the normative ranges are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeakerCategory {
    AdultMale,
    AdultFemale,
    Child,
}

impl SpeakerCategory {
    /// Reference ranges for this category.
    pub fn norms(&self) -> &'static NormativeRange {
        &NORMATIVE_TABLE[self]
    }
}

/// Expected healthy-voice ranges for one speaker category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormativeRange {
    /// Expected mean F0 range in Hz
    pub f0_min_hz: f32,
    pub f0_max_hz: f32,
    /// Relative jitter ceiling (%)
    pub jitter_max_pct: f32,
    /// Relative shimmer ceiling (%)
    pub shimmer_max_pct: f32,
    /// HNR floor in dB
    pub hnr_min_db: f32,
}

static NORMATIVE_TABLE: Lazy<HashMap<SpeakerCategory, NormativeRange>> = Lazy::new(|| {
    HashMap::from([
        (
            SpeakerCategory::AdultMale,
            NormativeRange {
                f0_min_hz: 85.0,
                f0_max_hz: 180.0,
                jitter_max_pct: 1.04,
                shimmer_max_pct: 3.81,
                hnr_min_db: 20.0,
            },
        ),
        (
            SpeakerCategory::AdultFemale,
            NormativeRange {
                f0_min_hz: 165.0,
                f0_max_hz: 255.0,
                jitter_max_pct: 1.04,
                shimmer_max_pct: 3.81,
                hnr_min_db: 20.0,
            },
        ),
        (
            SpeakerCategory::Child,
            NormativeRange {
                f0_min_hz: 250.0,
                f0_max_hz: 400.0,
                jitter_max_pct: 1.20,
                shimmer_max_pct: 4.00,
                hnr_min_db: 18.0,
            },
        ),
    ])
});

/// Per-metric verdicts of a result against one category's ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormativeAssessment {
    pub category: SpeakerCategory,
    pub f0_in_range: bool,
    pub jitter_within_norm: bool,
    pub shimmer_within_norm: bool,
    pub hnr_within_norm: bool,
}

impl NormativeAssessment {
    /// True when every measured metric sits inside the reference range.
    pub fn all_within_norm(&self) -> bool {
        self.f0_in_range
            && self.jitter_within_norm
            && self.shimmer_within_norm
            && self.hnr_within_norm
    }
}

/// Compare an analysis result against a speaker category's ranges.
pub fn assess(result: &AnalysisResult, category: SpeakerCategory) -> NormativeAssessment {
    let norms = category.norms();
    NormativeAssessment {
        category,
        f0_in_range: result.f0.mean >= norms.f0_min_hz && result.f0.mean <= norms.f0_max_hz,
        jitter_within_norm: result.jitter.relative <= norms.jitter_max_pct,
        shimmer_within_norm: result.shimmer.relative <= norms.shimmer_max_pct,
        hnr_within_norm: result.hnr_db >= norms.hnr_min_db,
    }
}
