// Perturbation module - Jitter and shimmer measurement
//
// Jitter is measured from real cycle boundaries: the first peak is located
// inside one expected period, and every following peak is searched in a
// +/- T/4 window around the previous peak plus one mean period. Period
// durations come from the spacing of those peaks, so an exactly periodic
// signal measures zero jitter while genuine cycle drift is captured.
//
// Shimmer uses the peak absolute amplitude of fixed ~10 ms windows.
//
// All quotients guard their divisor counts: fewer than 2/3/5 cycles yield
// 0.0 for the affected fields, never NaN.

use crate::analysis::types::{JitterMetrics, ShimmerMetrics};
use crate::config::PerturbationConfig;

/// Cycle-level perturbation measurement over one clip.
pub struct CycleAnalyzer {
    sample_rate: u32,
    /// Peak search half-width as a fraction of the period
    search_fraction: f32,
    /// Shimmer extraction window in samples
    shimmer_window: usize,
}

impl CycleAnalyzer {
    pub fn new(sample_rate: u32, config: &PerturbationConfig) -> Self {
        let shimmer_window =
            ((sample_rate as f32 * config.shimmer_window_ms / 1000.0).round() as usize).max(8);
        Self {
            sample_rate,
            search_fraction: config.peak_search_fraction.clamp(0.05, 0.5),
            shimmer_window,
        }
    }

    /// Detect cycle peaks and return the period durations in seconds.
    ///
    /// `f0_mean` seeds the expected period; a non-positive value yields an
    /// empty period list (unvoiced input has no cycles to measure).
    pub fn detect_periods(&self, samples: &[f32], f0_mean: f32) -> Vec<f32> {
        if f0_mean <= 0.0 {
            return Vec::new();
        }
        let period = self.sample_rate as f32 / f0_mean;
        if period < 2.0 || (period as usize) >= samples.len() {
            return Vec::new();
        }

        // Track whichever polarity dominates the first period, so inverted
        // recordings produce the same cycle boundaries.
        let first_span = (period.ceil() as usize).min(samples.len());
        let max = samples[..first_span].iter().copied().fold(f32::MIN, f32::max);
        let min = samples[..first_span].iter().copied().fold(f32::MAX, f32::min);
        let invert = min.abs() > max.abs();

        let value = |i: usize| {
            if invert {
                -samples[i]
            } else {
                samples[i]
            }
        };

        let argmax = |lo: usize, hi: usize| {
            let mut best = lo;
            for i in lo + 1..hi {
                if value(i) > value(best) {
                    best = i;
                }
            }
            best
        };

        let half_window = (period * self.search_fraction).max(1.0);
        let mut peaks = vec![argmax(0, first_span)];

        loop {
            let expected = peaks[peaks.len() - 1] as f32 + period;
            let lo = (expected - half_window).round();
            let hi = (expected + half_window).round();
            // Stop before a truncated search window fabricates a short cycle
            if lo < 0.0 || hi as usize >= samples.len() {
                break;
            }
            peaks.push(argmax(lo as usize, hi as usize + 1));
        }

        peaks
            .windows(2)
            .map(|pair| (pair[1] - pair[0]) as f32 / self.sample_rate as f32)
            .collect()
    }

    /// Compute jitter metrics from period durations (seconds).
    pub fn jitter(&self, periods: &[f32]) -> JitterMetrics {
        if periods.len() < 2 {
            return JitterMetrics::zero();
        }

        let mean_period: f32 = periods.iter().sum::<f32>() / periods.len() as f32;
        if mean_period <= 0.0 {
            return JitterMetrics::zero();
        }

        let mean_diff: f32 = periods
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).abs())
            .sum::<f32>()
            / (periods.len() - 1) as f32;

        JitterMetrics {
            absolute_us: mean_diff * 1_000_000.0,
            relative: mean_diff / mean_period * 100.0,
            rap: smoothed_quotient(periods, 3) / mean_period * 100.0,
            ppq5: smoothed_quotient(periods, 5) / mean_period * 100.0,
        }
    }

    /// Extract per-window peak amplitudes for shimmer measurement.
    pub fn peak_amplitudes(&self, samples: &[f32]) -> Vec<f32> {
        samples
            .chunks_exact(self.shimmer_window)
            .map(|window| window.iter().map(|s| s.abs()).fold(0.0f32, f32::max))
            .collect()
    }

    /// Compute shimmer metrics from per-window peak amplitudes.
    pub fn shimmer(&self, amplitudes: &[f32]) -> ShimmerMetrics {
        if amplitudes.len() < 2 {
            return ShimmerMetrics::zero();
        }

        let mean_amp: f32 = amplitudes.iter().sum::<f32>() / amplitudes.len() as f32;
        if mean_amp <= 0.0 {
            return ShimmerMetrics::zero();
        }

        let mean_diff: f32 = amplitudes
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).abs())
            .sum::<f32>()
            / (amplitudes.len() - 1) as f32;

        ShimmerMetrics {
            absolute_db: 20.0 * (1.0 + mean_diff).log10(),
            relative: mean_diff / mean_amp * 100.0,
            apq3: smoothed_quotient(amplitudes, 3) / mean_amp * 100.0,
            apq5: smoothed_quotient(amplitudes, 5) / mean_amp * 100.0,
        }
    }
}

/// k-point smoothed perturbation: mean deviation of each value from the
/// average of its k-neighborhood. Returns 0.0 when fewer than k values
/// are available.
fn smoothed_quotient(values: &[f32], k: usize) -> f32 {
    if values.len() < k {
        return 0.0;
    }
    let half = k / 2;
    let deviations: Vec<f32> = (half..values.len() - half)
        .map(|i| {
            let local: f32 = values[i - half..=i + half].iter().sum::<f32>() / k as f32;
            (values[i] - local).abs()
        })
        .collect();
    deviations.iter().sum::<f32>() / deviations.len() as f32
}
