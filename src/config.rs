//! Configuration management for analysis parameter tuning
//!
//! This module provides runtime configuration loading from JSON files,
//! enabling parameter adjustment without recompilation. Search ranges,
//! window sizes, and clinical thresholds for every analysis stage can be
//! overridden via the config file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::analysis::types::FormantMethod;

/// Complete analyzer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub pitch: PitchConfig,
    pub perturbation: PerturbationConfig,
    pub formant: FormantConfig,
    pub intensity: IntensityConfig,
    pub quality: QualityConfig,
    /// Return `DegenerateSignal` as a hard error instead of a warning
    pub strict_degenerate: bool,
}

/// Fundamental frequency tracking parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PitchConfig {
    /// Lowest candidate F0 in Hz (sets the maximum autocorrelation lag)
    pub f0_min_hz: f32,
    /// Highest candidate F0 in Hz (sets the minimum autocorrelation lag)
    pub f0_max_hz: f32,
    /// Normalized autocorrelation peak required to call a frame voiced
    pub voicing_threshold: f32,
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            f0_min_hz: 50.0,
            f0_max_hz: 500.0,
            voicing_threshold: 0.30,
        }
    }
}

/// Jitter/shimmer measurement parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerturbationConfig {
    /// Window length for shimmer peak-amplitude extraction, in milliseconds
    pub shimmer_window_ms: f32,
    /// Half-width of the peak search window around each expected cycle,
    /// as a fraction of the period
    pub peak_search_fraction: f32,
}

impl Default for PerturbationConfig {
    fn default() -> Self {
        Self {
            shimmer_window_ms: 10.0,
            peak_search_fraction: 0.25,
        }
    }
}

/// LPC formant extraction parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormantConfig {
    pub method: FormantMethod,
    /// Internal processing rate the signal is decimated to before LPC
    pub proc_sample_rate: u32,
    /// LPC model order at the processing rate
    pub lpc_order: usize,
    /// Reject candidate formants above this frequency
    pub max_formant_hz: f32,
    /// Reject candidate formants below this frequency
    pub min_formant_hz: f32,
    /// Reject candidate formants with a bandwidth above this value
    pub max_bandwidth_hz: f32,
}

impl Default for FormantConfig {
    fn default() -> Self {
        Self {
            method: FormantMethod::Lpc,
            proc_sample_rate: 10_000,
            lpc_order: 12,
            max_formant_hz: 5000.0,
            min_formant_hz: 90.0,
            max_bandwidth_hz: 1000.0,
        }
    }
}

/// Intensity measurement parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntensityConfig {
    /// RMS window size in samples
    pub window_size: usize,
    /// Offset added to 20*log10(rms) to approximate dB SPL
    pub db_offset: f32,
}

impl Default for IntensityConfig {
    fn default() -> Self {
        Self {
            window_size: 1024,
            db_offset: 100.0,
        }
    }
}

/// Clinical thresholds for the quality composite
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// HNR below this value (dB) contributes to breathiness
    pub hnr_floor_db: f32,
    /// Relative jitter above this value (%) contributes to roughness
    pub jitter_threshold_pct: f32,
    /// Relative shimmer above this value (%) contributes to strain
    pub shimmer_threshold_pct: f32,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            hnr_floor_db: 20.0,
            jitter_threshold_pct: 1.0,
            shimmer_threshold_pct: 3.5,
        }
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            pitch: PitchConfig::default(),
            perturbation: PerturbationConfig::default(),
            formant: FormantConfig::default(),
            intensity: IntensityConfig::default(),
            quality: QualityConfig::default(),
            strict_degenerate: false,
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from a JSON file.
    ///
    /// Falls back to defaults (with a logged warning) when the file is
    /// missing or malformed, so a broken config never blocks analysis.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Could not read {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Serialize the current configuration to a JSON file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(&path, json)?;
        log::info!("[Config] Saved configuration to {:?}", path.as_ref());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_clinical_ranges() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.pitch.f0_min_hz, 50.0);
        assert_eq!(config.pitch.f0_max_hz, 500.0);
        assert_eq!(config.quality.jitter_threshold_pct, 1.0);
        assert_eq!(config.quality.shimmer_threshold_pct, 3.5);
        assert_eq!(config.formant.method, FormantMethod::Lpc);
        assert!(!config.strict_degenerate);
    }

    #[test]
    fn test_load_missing_file_falls_back_to_defaults() {
        let config = AnalyzerConfig::load_from_file("/nonexistent/voicelab.json");
        assert_eq!(config.intensity.window_size, 1024);
    }

    #[test]
    fn test_partial_json_keeps_other_defaults() {
        let json = r#"{ "pitch": { "f0_min_hz": 75.0 } }"#;
        let config: AnalyzerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.pitch.f0_min_hz, 75.0);
        assert_eq!(config.pitch.f0_max_hz, 500.0);
        assert_eq!(config.formant.lpc_order, 12);
    }

    #[test]
    fn test_config_round_trip() {
        let mut config = AnalyzerConfig::default();
        config.pitch.voicing_threshold = 0.45;
        config.formant.method = FormantMethod::Nominal;

        let json = serde_json::to_string(&config).unwrap();
        let parsed: AnalyzerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.pitch.voicing_threshold, 0.45);
        assert_eq!(parsed.formant.method, FormantMethod::Nominal);
    }
}
