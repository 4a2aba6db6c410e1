// Pitch module - Fundamental frequency tracking
//
// F0 is estimated per short analysis frame with normalized autocorrelation:
// the lag of the autocorrelation maximum inside the candidate pitch range
// is converted to Hz, and statistics are aggregated across the frames that
// clear the voicing threshold. Frames are two maximum pitch periods long
// with 50% overlap, which keeps at least one full cycle of the lowest
// candidate F0 inside every frame.

use log::warn;

use crate::analysis::dsp::{self, Autocorrelator};
use crate::analysis::types::F0Stats;
use crate::config::PitchConfig;

/// Per-clip outcome of pitch tracking.
#[derive(Debug, Clone)]
pub struct PitchAnalysis {
    /// Aggregated statistics over voiced frames
    pub stats: F0Stats,
    /// F0 of each voiced frame, in Hz, in clip order
    pub voiced_f0: Vec<f32>,
    /// Total number of analysis frames examined
    pub total_frames: usize,
}

impl PitchAnalysis {
    /// True when no frame produced a usable pitch estimate.
    pub fn is_unvoiced(&self) -> bool {
        self.voiced_f0.is_empty()
    }
}

/// Frame-based autocorrelation pitch tracker.
pub struct PitchTracker {
    sample_rate: u32,
    /// Shortest lag searched (highest candidate F0)
    min_lag: usize,
    /// Longest lag searched (lowest candidate F0)
    max_lag: usize,
    voicing_threshold: f32,
}

impl PitchTracker {
    /// Create a tracker for the given sample rate.
    ///
    /// A non-positive or non-finite F0 range in the config (possible via a
    /// hand-edited config file) falls back to the defaults with a logged
    /// warning; the lag range must stay a finite, non-empty interval.
    ///
    /// # Arguments
    /// * `sample_rate` - Audio sample rate in Hz
    /// * `config` - Candidate F0 range and voicing threshold
    pub fn new(sample_rate: u32, config: &PitchConfig) -> Self {
        let defaults = PitchConfig::default();
        let mut f0_min = config.f0_min_hz;
        if !f0_min.is_finite() || f0_min <= 0.0 {
            warn!(
                "[Pitch] Invalid f0_min_hz {}; using {}",
                f0_min, defaults.f0_min_hz
            );
            f0_min = defaults.f0_min_hz;
        }
        let mut f0_max = config.f0_max_hz;
        if !f0_max.is_finite() || f0_max <= f0_min {
            let fallback = defaults.f0_max_hz.max(f0_min * 2.0);
            warn!(
                "[Pitch] Invalid f0_max_hz {} for f0_min_hz {}; using {}",
                f0_max, f0_min, fallback
            );
            f0_max = fallback;
        }

        let min_lag = ((sample_rate as f32 / f0_max).floor() as usize).max(2);
        let max_lag = ((sample_rate as f32 / f0_min).ceil() as usize).max(min_lag + 1);
        Self {
            sample_rate,
            min_lag,
            max_lag,
            voicing_threshold: config.voicing_threshold,
        }
    }

    /// Longest autocorrelation lag searched; one period of the F0 floor.
    pub fn max_lag(&self) -> usize {
        self.max_lag
    }

    /// Track F0 across the clip.
    ///
    /// The caller guarantees `samples.len() > max_lag`; shorter input
    /// yields an empty (unvoiced) analysis.
    pub fn track(&self, samples: &[f32]) -> PitchAnalysis {
        let frame_len = (2 * self.max_lag).min(samples.len());
        let hop = (frame_len / 2).max(1);

        let mut autocorr = Autocorrelator::new();
        let mut voiced_f0 = Vec::new();
        let mut total_frames = 0usize;

        let mut start = 0usize;
        while start + frame_len <= samples.len() {
            total_frames += 1;
            let frame = &samples[start..start + frame_len];
            if let Some(f0) = self.frame_f0(&mut autocorr, frame) {
                voiced_f0.push(f0);
            }
            if start + frame_len == samples.len() {
                break;
            }
            start += hop;
        }

        let stats = if voiced_f0.is_empty() {
            F0Stats::silent()
        } else {
            F0Stats {
                mean: dsp::mean(&voiced_f0),
                min: voiced_f0.iter().copied().fold(f32::INFINITY, f32::min),
                max: voiced_f0.iter().copied().fold(f32::NEG_INFINITY, f32::max),
                std_dev: dsp::std_dev(&voiced_f0),
                voiced_ratio: voiced_f0.len() as f32 / total_frames.max(1) as f32,
            }
        };

        PitchAnalysis {
            stats,
            voiced_f0,
            total_frames,
        }
    }

    /// Estimate one frame's F0, or None when the frame is unvoiced.
    fn frame_f0(&self, autocorr: &mut Autocorrelator, frame: &[f32]) -> Option<f32> {
        let max_lag = self.max_lag.min(frame.len().saturating_sub(1));
        if max_lag < self.min_lag {
            return None;
        }

        let r = autocorr.compute(frame, max_lag);
        if r.is_empty() || r[0] < 1e-9 {
            // Silence: lag-zero energy carries no information
            return None;
        }

        let best_lag = (self.min_lag..=max_lag)
            .max_by(|&a, &b| r[a].partial_cmp(&r[b]).unwrap_or(std::cmp::Ordering::Equal))?;

        let peak = r[best_lag] / r[0];
        if peak < self.voicing_threshold {
            return None;
        }

        Some(self.sample_rate as f32 / best_lag as f32)
    }
}
