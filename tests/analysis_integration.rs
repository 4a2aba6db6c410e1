// End-to-end pipeline tests over synthetic clips with known acoustics.

use voicelab::analysis::noise::HNR_MAX_DB;
use voicelab::analysis::norms::{assess, SpeakerCategory};
use voicelab::analysis::types::{AnalysisWarning, FormantMethod};
use voicelab::error::{AnalysisError, AnalysisErrorCodes, ErrorCode};
use voicelab::fixtures::{
    write_wav, FixtureCatalog, FixtureProcessor, MetricCheck,
};
use voicelab::synth::{SynthSpec, WaveformPattern};
use voicelab::{AnalyzerConfig, VoiceAnalyzer};

const SAMPLE_RATE: u32 = 44_100;

fn analyze(spec: &SynthSpec) -> voicelab::AnalysisResult {
    VoiceAnalyzer::new()
        .analyze(&spec.generate(), spec.sample_rate)
        .expect("analysis should succeed")
}

fn tone_spec(frequency_hz: f32) -> SynthSpec {
    SynthSpec {
        frequency_hz,
        sample_rate: SAMPLE_RATE,
        duration_ms: 1_000,
        ..SynthSpec::default()
    }
}

#[test]
fn pure_tone_yields_accurate_f0_and_low_perturbation() {
    let result = analyze(&tone_spec(150.0));

    println!(
        "tone 150 Hz: f0 {:.2} jitter {:.3}% shimmer {:.3}%",
        result.f0.mean, result.jitter.relative, result.shimmer.relative
    );
    assert!((result.f0.mean - 150.0).abs() < 2.0, "f0 {}", result.f0.mean);
    assert!(result.f0.voiced_ratio > 0.9);
    assert!(result.jitter.relative < 0.5, "jitter {}", result.jitter.relative);
    assert!(result.shimmer.relative < 2.0, "shimmer {}", result.shimmer.relative);
    assert!(!result.is_degenerate());
    assert!((result.duration_secs - 1.0).abs() < 1e-3);
}

#[test]
fn vibrato_widens_f0_spread_around_carrier() {
    let steady = analyze(&tone_spec(150.0));
    let vibrato = analyze(&SynthSpec {
        pattern: WaveformPattern::Vibrato {
            rate_hz: 5.0,
            depth_hz: 12.0,
        },
        ..tone_spec(150.0)
    });

    assert!((vibrato.f0.mean - 150.0).abs() < 6.0, "f0 {}", vibrato.f0.mean);
    assert!(
        vibrato.f0.std_dev > steady.f0.std_dev + 1.0,
        "vibrato spread {} vs steady {}",
        vibrato.f0.std_dev,
        steady.f0.std_dev
    );
    assert!(vibrato.f0.max > vibrato.f0.min + 5.0);
}

#[test]
fn amplitude_modulation_raises_shimmer() {
    let steady = analyze(&tone_spec(150.0));
    let modulated = analyze(&SynthSpec {
        pattern: WaveformPattern::AmplitudeModulated {
            rate_hz: 4.0,
            depth: 0.15,
        },
        ..tone_spec(150.0)
    });

    assert!(
        modulated.shimmer.relative > steady.shimmer.relative + 1.0,
        "modulated {} vs steady {}",
        modulated.shimmer.relative,
        steady.shimmer.relative
    );
    // Frequency content is unchanged, so jitter should stay low.
    assert!(modulated.jitter.relative < 1.0);
}

#[test]
fn noise_lowers_hnr_and_quality() {
    let clean = analyze(&tone_spec(150.0));
    let noisy = analyze(&SynthSpec {
        pattern: WaveformPattern::NoisyTone { noise_level: 0.3 },
        ..tone_spec(150.0)
    });

    assert_eq!(clean.hnr_db, HNR_MAX_DB);
    assert!(noisy.hnr_db < clean.hnr_db, "noisy hnr {}", noisy.hnr_db);
    assert!(noisy.hnr_db > 0.0);
    assert!(
        noisy.quality.overall < clean.quality.overall,
        "noisy {} vs clean {}",
        noisy.quality.overall,
        clean.quality.overall
    );
    assert!(noisy.quality.breathiness > clean.quality.breathiness);
}

#[test]
fn silence_degrades_gracefully() {
    let result = analyze(&SynthSpec {
        pattern: WaveformPattern::Silence,
        ..tone_spec(150.0)
    });

    assert!(result.is_degenerate());
    assert!(result.warnings.contains(&AnalysisWarning::DegenerateSignal));
    assert_eq!(result.f0.voiced_ratio, 0.0);
    assert_eq!(result.jitter.relative, 0.0);
    assert_eq!(result.shimmer.relative, 0.0);
    assert_eq!(result.formants.method, FormantMethod::Nominal);
    assert!(result.intensity.mean_db.is_finite());
}

#[test]
fn strict_mode_turns_degenerate_signal_into_error() {
    let mut config = AnalyzerConfig::default();
    config.strict_degenerate = true;
    let analyzer = VoiceAnalyzer::with_config(config);
    let silence = SynthSpec {
        pattern: WaveformPattern::Silence,
        ..tone_spec(150.0)
    };

    let err = analyzer
        .analyze(&silence.generate(), SAMPLE_RATE)
        .unwrap_err();
    assert!(matches!(err, AnalysisError::DegenerateSignal));
    assert_eq!(err.code(), AnalysisErrorCodes::DEGENERATE_SIGNAL);
}

#[test]
fn error_taxonomy_covers_invalid_input() {
    let analyzer = VoiceAnalyzer::new();
    let samples = voicelab::synth::tone(150.0, SAMPLE_RATE, 1_000);

    let err = analyzer.analyze(&samples, 1_000).unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidSampleRate { rate: 1_000 }));
    assert_eq!(err.code(), AnalysisErrorCodes::INVALID_SAMPLE_RATE);

    let err = analyzer.analyze(&samples[..500], SAMPLE_RATE).unwrap_err();
    match err {
        AnalysisError::InsufficientSamples { required, got } => {
            assert_eq!(got, 500);
            assert!(required > 500);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn healthy_tone_sits_within_adult_male_norms() {
    let result = analyze(&tone_spec(120.0));

    let male = assess(&result, SpeakerCategory::AdultMale);
    assert!(male.f0_in_range);
    assert!(male.all_within_norm());

    // The same 120 Hz voice falls below the adult-female F0 range.
    let female = assess(&result, SpeakerCategory::AdultFemale);
    assert!(!female.f0_in_range);
    assert!(!female.all_within_norm());
}

#[test]
fn fixture_pipeline_roundtrip_through_wav() {
    let dir = tempfile::tempdir().unwrap();
    let spec = tone_spec(150.0);
    let wav_path = dir.path().join("tone_150.wav");
    write_wav(&wav_path, &spec.generate(), spec.sample_rate).unwrap();

    let expect_json = serde_json::json!({
        "fixture": "tone_150",
        "notes": "steady 150 Hz tone",
        "checks": [
            {"metric": "f0_mean", "expected_hz": 150.0, "tolerance_hz": 3.0},
            {"metric": "jitter_relative", "max_pct": 0.5},
            {"metric": "hnr", "min_db": 20.0},
            {"metric": "degenerate", "expected": false}
        ]
    });
    std::fs::write(
        dir.path().join("tone_150.expect.json"),
        serde_json::to_string_pretty(&expect_json).unwrap(),
    )
    .unwrap();

    let catalog = FixtureCatalog::new(dir.path());
    let data = catalog.load("tone_150", None).unwrap();
    assert_eq!(data.sample_rate, SAMPLE_RATE);

    let processor = FixtureProcessor::new(AnalyzerConfig::default());
    let result = processor.run(&data).unwrap();
    data.expectations
        .expect("expect.json should be discovered")
        .verify(&result)
        .expect("tone fixture should satisfy its expectations");
}

#[test]
fn fixture_verification_reports_mismatches() {
    let dir = tempfile::tempdir().unwrap();
    let spec = tone_spec(200.0);
    let wav_path = dir.path().join("tone_200.wav");
    write_wav(&wav_path, &spec.generate(), spec.sample_rate).unwrap();

    let catalog = FixtureCatalog::new(dir.path());
    let data = catalog.load("tone_200", None).unwrap();
    let processor = FixtureProcessor::new(AnalyzerConfig::default());
    let result = processor.run(&data).unwrap();

    let expectations = voicelab::fixtures::FixtureExpectations {
        fixture: "tone_200".to_string(),
        notes: None,
        checks: vec![
            MetricCheck::F0Mean {
                expected_hz: 120.0,
                tolerance_hz: 3.0,
            },
            MetricCheck::Hnr { min_db: 20.0 },
        ],
    };
    let diff = expectations.verify(&result).unwrap_err();
    assert_eq!(diff.failures.len(), 1);
    assert_eq!(diff.failures[0].index, 0);
    assert!((diff.failures[0].actual - 200.0).abs() < 3.0);
}

#[test]
fn discovered_expectation_file_drives_verification() {
    let dir = tempfile::tempdir().unwrap();
    let spec = tone_spec(200.0);
    write_wav(&dir.path().join("tone_200.wav"), &spec.generate(), spec.sample_rate).unwrap();
    std::fs::write(
        dir.path().join("tone_200.expect.json"),
        r#"{
            "fixture": "tone_200",
            "checks": [
                {"metric": "f0_mean", "expected_hz": 120.0, "tolerance_hz": 3.0}
            ]
        }"#,
    )
    .unwrap();

    let catalog = FixtureCatalog::new(dir.path());
    let data = catalog.load("tone_200", None).unwrap();
    let expectations = data.expectations.as_ref().expect("sidecar should be found");
    let result = FixtureProcessor::new(AnalyzerConfig::default())
        .run(&data)
        .unwrap();

    let diff = expectations.verify(&result).unwrap_err();
    assert_eq!(diff.failures.len(), 1);

    // A fixture without a sidecar has nothing to verify against
    write_wav(&dir.path().join("bare.wav"), &spec.generate(), spec.sample_rate).unwrap();
    let bare = catalog.load("bare", None).unwrap();
    assert!(bare.expectations.is_none());
}

#[test]
fn config_file_roundtrip_preserves_analysis_behavior() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("analyzer.json");

    let mut config = AnalyzerConfig::default();
    config.pitch.f0_min_hz = 60.0;
    config.pitch.f0_max_hz = 400.0;
    config.save_to_file(&path).unwrap();

    let loaded = AnalyzerConfig::load_from_file(&path);
    assert_eq!(loaded.pitch.f0_min_hz, 60.0);
    assert_eq!(loaded.pitch.f0_max_hz, 400.0);

    let spec = tone_spec(150.0);
    let result = VoiceAnalyzer::with_config(loaded)
        .analyze(&spec.generate(), SAMPLE_RATE)
        .unwrap();
    assert!((result.f0.mean - 150.0).abs() < 2.0);
}

#[test]
fn result_serializes_to_stable_json_shape() {
    let result = analyze(&tone_spec(150.0));
    let json = serde_json::to_value(&result).unwrap();

    assert!(json["f0"]["mean"].is_number());
    assert!(json["jitter"]["relative"].is_number());
    assert!(json["shimmer"]["apq3"].is_number());
    assert!(json["formants"]["f1"].is_number());
    assert!(json["formants"]["method"].is_string());
    assert!(json["quality"]["overall"].is_number());
}
