// Analysis module - voice-quality measurement pipeline
//
// This module coordinates the complete analysis pass over one decoded
// recording. A single call runs pitch tracking, perturbation measurement,
// formant estimation, HNR, intensity and the quality composite, and
// assembles them into an AnalysisResult.
//
// Pipeline: PitchTracker -> CycleAnalyzer -> FormantExtractor -> HNR ->
// intensity -> quality. Each stage is pure over its input; the analyzer
// holds only configuration and is safe to share between threads.

pub mod dsp;
pub mod formant;
pub mod intensity;
pub mod noise;
pub mod norms;
pub mod perturbation;
pub mod pitch;
pub mod quality;
pub mod types;

use log::debug;

use crate::config::AnalyzerConfig;
use crate::error::AnalysisError;
use formant::FormantExtractor;
use perturbation::CycleAnalyzer;
use pitch::PitchTracker;
use types::{AnalysisResult, AnalysisWarning, JitterMetrics, ShimmerMetrics};

/// Accepted sample-rate bounds in Hz.
pub const SAMPLE_RATE_MIN: u32 = 8_000;
pub const SAMPLE_RATE_MAX: u32 = 192_000;

/// Voice-quality analyzer.
///
/// Owns the configuration and exposes one operation: [`VoiceAnalyzer::analyze`].
/// The analyzer performs no I/O and keeps no per-call state; decoding audio
/// into samples is the caller's responsibility.
pub struct VoiceAnalyzer {
    config: AnalyzerConfig,
}

impl VoiceAnalyzer {
    /// Create an analyzer with default configuration.
    pub fn new() -> Self {
        Self::with_config(AnalyzerConfig::default())
    }

    /// Create an analyzer with explicit configuration.
    pub fn with_config(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze one mono recording.
    ///
    /// # Arguments
    /// * `samples` - Decoded PCM samples, nominally in [-1, 1]
    /// * `sample_rate` - Sample rate in Hz
    ///
    /// # Errors
    /// * [`AnalysisError::InvalidSampleRate`] - rate of 0 or outside
    ///   [8 kHz, 192 kHz]
    /// * [`AnalysisError::InsufficientSamples`] - fewer samples than one
    ///   pitch period at the configured F0 floor
    /// * [`AnalysisError::DegenerateSignal`] - only with
    ///   `strict_degenerate`; otherwise reported as a result warning
    pub fn analyze(
        &self,
        samples: &[f32],
        sample_rate: u32,
    ) -> Result<AnalysisResult, AnalysisError> {
        if !(SAMPLE_RATE_MIN..=SAMPLE_RATE_MAX).contains(&sample_rate) {
            return Err(AnalysisError::InvalidSampleRate { rate: sample_rate });
        }

        let tracker = PitchTracker::new(sample_rate, &self.config.pitch);
        let required = tracker.max_lag() + 1;
        if samples.len() < required {
            return Err(AnalysisError::InsufficientSamples {
                required,
                got: samples.len(),
            });
        }

        let duration_secs = samples.len() as f32 / sample_rate as f32;
        let mut warnings = Vec::new();

        let pitch_analysis = tracker.track(samples);
        debug!(
            "[Analyzer] {} voiced of {} frames, mean F0 {:.1} Hz",
            pitch_analysis.voiced_f0.len(),
            pitch_analysis.total_frames,
            pitch_analysis.stats.mean
        );

        let cycles = CycleAnalyzer::new(sample_rate, &self.config.perturbation);
        let (jitter, shimmer, hnr_db) = if pitch_analysis.is_unvoiced() {
            if self.config.strict_degenerate {
                return Err(AnalysisError::DegenerateSignal);
            }
            warnings.push(AnalysisWarning::DegenerateSignal);
            (JitterMetrics::zero(), ShimmerMetrics::zero(), 0.0)
        } else {
            let periods = cycles.detect_periods(samples, pitch_analysis.stats.mean);
            let amplitudes = cycles.peak_amplitudes(samples);
            if periods.len() < 5 || amplitudes.len() < 5 {
                warnings.push(AnalysisWarning::TooFewCycles);
            }
            let hnr = noise::harmonics_to_noise_ratio(
                samples,
                sample_rate,
                pitch_analysis.stats.mean,
            );
            (cycles.jitter(&periods), cycles.shimmer(&amplitudes), hnr)
        };

        let formants = if pitch_analysis.is_unvoiced() {
            FormantExtractor::nominal()
        } else {
            FormantExtractor::new(sample_rate, &self.config.formant).extract(samples)
        };

        let intensity = intensity::intensity_stats(samples, &self.config.intensity);
        let quality =
            quality::quality_scores(hnr_db, jitter.relative, shimmer.relative, &self.config.quality);

        Ok(AnalysisResult {
            f0: pitch_analysis.stats,
            jitter,
            shimmer,
            formants,
            hnr_db,
            intensity,
            quality,
            duration_secs,
            warnings,
        })
    }
}

impl Default for VoiceAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::FormantMethod;

    fn sine(sample_rate: u32, frequency: f32, amplitude: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin()
            })
            .collect()
    }

    #[test]
    fn test_full_pipeline_on_pure_tone() {
        let sample_rate = 44100;
        let analyzer = VoiceAnalyzer::new();
        let signal = sine(sample_rate, 150.0, 0.5, sample_rate as usize);

        let result = analyzer.analyze(&signal, sample_rate).unwrap();
        assert!((result.f0.mean - 150.0).abs() < 1.0);
        assert!(result.jitter.relative < 0.1);
        assert!(result.shimmer.relative < 0.2);
        assert_eq!(result.hnr_db, noise::HNR_MAX_DB);
        assert!((result.duration_secs - 1.0).abs() < 1e-3);
        assert!(!result.is_degenerate());
    }

    #[test]
    fn test_sample_rate_validation() {
        let analyzer = VoiceAnalyzer::new();
        let signal = sine(44100, 150.0, 0.5, 4410);
        assert!(matches!(
            analyzer.analyze(&signal, 0),
            Err(AnalysisError::InvalidSampleRate { rate: 0 })
        ));
        assert!(matches!(
            analyzer.analyze(&signal, 4000),
            Err(AnalysisError::InvalidSampleRate { .. })
        ));
        assert!(matches!(
            analyzer.analyze(&signal, 400_000),
            Err(AnalysisError::InvalidSampleRate { .. })
        ));
    }

    #[test]
    fn test_insufficient_samples() {
        let analyzer = VoiceAnalyzer::new();
        // One period at the 50 Hz floor is 882 samples at 44.1 kHz
        let signal = sine(44100, 150.0, 0.5, 500);
        match analyzer.analyze(&signal, 44100) {
            Err(AnalysisError::InsufficientSamples { required, got }) => {
                assert_eq!(got, 500);
                assert!(required > 500);
            }
            other => panic!("expected InsufficientSamples, got {:?}", other),
        }
    }

    #[test]
    fn test_silence_yields_degenerate_warning() {
        let analyzer = VoiceAnalyzer::new();
        let silence = vec![0.0f32; 44100];
        let result = analyzer.analyze(&silence, 44100).unwrap();
        assert!(result.is_degenerate());
        assert_eq!(result.f0.mean, 0.0);
        assert_eq!(result.jitter, JitterMetrics::zero());
        assert_eq!(result.formants.method, FormantMethod::Nominal);
        // Intensity is still measured
        assert!(result.intensity.mean_db.is_finite());
    }

    #[test]
    fn test_strict_degenerate_is_an_error() {
        let mut config = AnalyzerConfig::default();
        config.strict_degenerate = true;
        let analyzer = VoiceAnalyzer::with_config(config);
        let silence = vec![0.0f32; 44100];
        assert!(matches!(
            analyzer.analyze(&silence, 44100),
            Err(AnalysisError::DegenerateSignal)
        ));
    }

    #[test]
    fn test_malformed_config_values_do_not_panic() {
        // Values a hand-edited config file could carry
        let mut config = AnalyzerConfig::default();
        config.pitch.f0_min_hz = 0.0;
        config.formant.lpc_order = 300;
        let analyzer = VoiceAnalyzer::with_config(config);

        let signal = sine(44100, 150.0, 0.5, 44100);
        let result = analyzer.analyze(&signal, 44100).unwrap();
        assert!((result.f0.mean - 150.0).abs() < 2.0);
        assert!(result.formants.f1.is_finite());
    }

    #[test]
    fn test_quality_bounds_hold_for_noise() {
        use rand::{rngs::StdRng, Rng, SeedableRng};
        let analyzer = VoiceAnalyzer::new();
        let mut rng = StdRng::seed_from_u64(3);
        let noise_signal: Vec<f32> = (0..44100).map(|_| rng.gen_range(-1.0..1.0)).collect();

        let result = analyzer.analyze(&noise_signal, 44100).unwrap();
        for score in [
            result.quality.breathiness,
            result.quality.roughness,
            result.quality.strain,
            result.quality.overall,
        ] {
            assert!((0.0..=100.0).contains(&score), "score {}", score);
        }
    }
}
