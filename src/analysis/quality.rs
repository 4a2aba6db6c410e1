// Quality module - Perceptual voice-quality composite
//
// Maps the measured acoustics onto 0-100 deviation scores against the
// clinical thresholds: breathiness grows as HNR falls below its floor,
// roughness as relative jitter exceeds its threshold, strain as relative
// shimmer exceeds its threshold. The overall score inverts their mean.

use crate::analysis::types::QualityScores;
use crate::config::QualityConfig;

/// Relative jitter (%) that maps to maximum roughness.
const JITTER_CEILING_PCT: f32 = 6.0;

/// Relative shimmer (%) that maps to maximum strain.
const SHIMMER_CEILING_PCT: f32 = 13.5;

/// Derive the quality composite from HNR, jitter and shimmer.
pub fn quality_scores(
    hnr_db: f32,
    jitter_relative_pct: f32,
    shimmer_relative_pct: f32,
    config: &QualityConfig,
) -> QualityScores {
    let breathiness = if config.hnr_floor_db > 0.0 {
        ((config.hnr_floor_db - hnr_db) / config.hnr_floor_db * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };

    let roughness = scale_above(
        jitter_relative_pct,
        config.jitter_threshold_pct,
        JITTER_CEILING_PCT,
    );
    let strain = scale_above(
        shimmer_relative_pct,
        config.shimmer_threshold_pct,
        SHIMMER_CEILING_PCT,
    );

    let overall = (100.0 - (breathiness + roughness + strain) / 3.0).clamp(0.0, 100.0);

    QualityScores {
        breathiness,
        roughness,
        strain,
        overall,
    }
}

/// Linear 0-100 score for how far `value` sits above `threshold`,
/// reaching 100 at `ceiling`.
fn scale_above(value: f32, threshold: f32, ceiling: f32) -> f32 {
    if value <= threshold || ceiling <= threshold {
        return 0.0;
    }
    ((value - threshold) / (ceiling - threshold) * 100.0).clamp(0.0, 100.0)
}
