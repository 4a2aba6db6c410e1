// Intensity module - Windowed level measurement
//
// RMS amplitude is taken over fixed windows and converted to an
// approximate dB SPL value with a calibration offset. The epsilon inside
// the log keeps digital silence finite.

use crate::analysis::dsp;
use crate::analysis::types::IntensityStats;
use crate::config::IntensityConfig;

/// Guard against log(0) for silent windows.
const EPSILON: f32 = 1e-10;

/// Compute intensity statistics over fixed RMS windows.
///
/// A trailing partial window shorter than a quarter of the window size is
/// dropped; shorter clips are measured as a single window.
pub fn intensity_stats(samples: &[f32], config: &IntensityConfig) -> IntensityStats {
    let window_size = config.window_size.max(16);

    let mut levels: Vec<f32> = samples
        .chunks(window_size)
        .filter(|chunk| chunk.len() == window_size || chunk.len() >= window_size / 4)
        .map(|chunk| to_db(dsp::rms(chunk), config.db_offset))
        .collect();

    if levels.is_empty() && !samples.is_empty() {
        levels.push(to_db(dsp::rms(samples), config.db_offset));
    }
    if levels.is_empty() {
        return IntensityStats {
            mean_db: 0.0,
            min_db: 0.0,
            max_db: 0.0,
            std_db: 0.0,
        };
    }

    IntensityStats {
        mean_db: dsp::mean(&levels),
        min_db: levels.iter().copied().fold(f32::INFINITY, f32::min),
        max_db: levels.iter().copied().fold(f32::NEG_INFINITY, f32::max),
        std_db: dsp::std_dev(&levels),
    }
}

fn to_db(rms: f32, offset: f32) -> f32 {
    20.0 * (rms + EPSILON).log10() + offset
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(sample_rate: u32, frequency: f32, amplitude: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin()
            })
            .collect()
    }

    #[test]
    fn test_doubling_amplitude_adds_six_db() {
        let config = IntensityConfig::default();
        let quiet = sine(44100, 150.0, 0.25, 44100);
        let loud: Vec<f32> = quiet.iter().map(|s| s * 2.0).collect();

        let a = intensity_stats(&quiet, &config);
        let b = intensity_stats(&loud, &config);
        let gain = b.mean_db - a.mean_db;
        assert!(
            (gain - 6.02).abs() < 0.1,
            "expected ~6.02 dB gain, got {}",
            gain
        );
    }

    #[test]
    fn test_steady_tone_has_low_spread() {
        let config = IntensityConfig::default();
        let stats = intensity_stats(&sine(44100, 150.0, 0.5, 44100), &config);
        assert!(stats.min_db <= stats.mean_db && stats.mean_db <= stats.max_db);
        assert!(stats.std_db < 1.0, "std {}", stats.std_db);
    }

    #[test]
    fn test_silence_stays_finite() {
        let config = IntensityConfig::default();
        let stats = intensity_stats(&vec![0.0f32; 4096], &config);
        assert!(stats.mean_db.is_finite());
        // 20*log10(1e-10) + 100 = -100
        assert!((stats.mean_db + 100.0).abs() < 0.5);
    }

    #[test]
    fn test_short_clip_single_window() {
        let config = IntensityConfig::default();
        let stats = intensity_stats(&sine(44100, 300.0, 0.5, 100), &config);
        assert!(stats.mean_db.is_finite());
        assert_eq!(stats.std_db, 0.0);
    }
}
