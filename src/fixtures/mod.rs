//! Fixture utilities for the deterministic CLI harness.
//!
//! This module discovers fixture assets, loads PCM WAV input data,
//! parses optional expectation JSON, and runs the acoustic analyzer
//! against them. It is intentionally desktop-focused to support CI
//! and QA workflows.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::analysis::types::AnalysisResult;
use crate::analysis::VoiceAnalyzer;
use crate::config::AnalyzerConfig;
use crate::error::log_analysis_error;

/// Default location for fixture WAV/JSON assets.
pub const DEFAULT_FIXTURE_ROOT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures");

/// Metadata describing an available fixture.
#[derive(Clone, Debug)]
pub struct FixtureMetadata {
    pub name: String,
    pub wav_path: PathBuf,
    pub expect_path: Option<PathBuf>,
}

/// Loaded fixture data with decoded PCM samples.
pub struct FixtureData {
    pub metadata: FixtureMetadata,
    pub sample_rate: u32,
    pub samples: Vec<f32>,
    pub expectations: Option<FixtureExpectations>,
}

/// JSON expectation schema for fixture verification.
///
/// Each check pins one summary metric to a tolerance band or bound, so a
/// fixture can assert e.g. "F0 within 3 Hz of 150" without committing to
/// exact floating-point output.
#[derive(Debug, Clone, Deserialize)]
pub struct FixtureExpectations {
    pub fixture: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub checks: Vec<MetricCheck>,
}

/// A single verifiable constraint on an analysis result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "metric", rename_all = "snake_case")]
pub enum MetricCheck {
    F0Mean {
        expected_hz: f32,
        #[serde(default = "default_f0_tolerance")]
        tolerance_hz: f32,
    },
    JitterRelative { max_pct: f32 },
    ShimmerRelative { max_pct: f32 },
    Hnr { min_db: f32 },
    OverallQuality { min: f32 },
    Degenerate { expected: bool },
}

fn default_f0_tolerance() -> f32 {
    3.0
}

impl MetricCheck {
    /// Returns the observed value and whether it satisfies the check.
    fn evaluate(&self, result: &AnalysisResult) -> (f32, bool) {
        match self {
            MetricCheck::F0Mean {
                expected_hz,
                tolerance_hz,
            } => {
                let actual = result.f0.mean;
                (actual, (actual - expected_hz).abs() <= *tolerance_hz)
            }
            MetricCheck::JitterRelative { max_pct } => {
                let actual = result.jitter.relative;
                (actual, actual <= *max_pct)
            }
            MetricCheck::ShimmerRelative { max_pct } => {
                let actual = result.shimmer.relative;
                (actual, actual <= *max_pct)
            }
            MetricCheck::Hnr { min_db } => {
                let actual = result.hnr_db;
                (actual, actual >= *min_db)
            }
            MetricCheck::OverallQuality { min } => {
                let actual = result.quality.overall;
                (actual, actual >= *min)
            }
            MetricCheck::Degenerate { expected } => {
                let actual = result.is_degenerate();
                (actual as u8 as f32, actual == *expected)
            }
        }
    }
}

impl FixtureExpectations {
    pub fn verify(&self, result: &AnalysisResult) -> std::result::Result<(), ExpectationDiff> {
        let mut failures = Vec::new();

        for (idx, check) in self.checks.iter().enumerate() {
            let (actual, ok) = check.evaluate(result);
            if !ok {
                failures.push(ExpectationFailure {
                    index: idx,
                    check: check.clone(),
                    actual,
                });
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ExpectationDiff { failures })
        }
    }
}

/// Outcome of comparing an analysis result with expectations.
#[derive(Debug)]
pub struct ExpectationDiff {
    pub failures: Vec<ExpectationFailure>,
}

impl ExpectationDiff {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "failures": self.failures.iter().map(|failure| {
                serde_json::json!({
                    "index": failure.index,
                    "check": failure.check,
                    "actual": failure.actual,
                })
            }).collect::<Vec<_>>()
        })
    }
}

/// Detailed diff entry for a single failed check.
#[derive(Debug)]
pub struct ExpectationFailure {
    pub index: usize,
    pub check: MetricCheck,
    pub actual: f32,
}

/// Catalog responsible for discovering fixtures on disk.
pub struct FixtureCatalog {
    root: PathBuf,
}

impl FixtureCatalog {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List all fixtures by their metadata.
    pub fn discover(&self) -> Result<Vec<FixtureMetadata>> {
        let mut fixtures = Vec::new();
        if !self.root.exists() {
            return Ok(fixtures);
        }

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                let path = entry.path();
                if path.extension().and_then(|ext| ext.to_str()) == Some("wav") {
                    let expect = path.with_extension("expect.json");
                    fixtures.push(FixtureMetadata {
                        name: path
                            .file_stem()
                            .and_then(|s| s.to_str())
                            .unwrap_or_default()
                            .to_string(),
                        wav_path: path.clone(),
                        expect_path: expect.exists().then_some(expect),
                    });
                }
            }
        }

        fixtures.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(fixtures)
    }

    /// Load fixture samples + expectations for provided name or path.
    pub fn load(&self, fixture: &str, override_expect: Option<PathBuf>) -> Result<FixtureData> {
        let wav_path = self.resolve_fixture_path(fixture)?;
        let metadata = self.metadata_for_path(&wav_path)?;
        let (samples, sample_rate) = read_wav(&wav_path)?;

        let expectation_path = override_expect.or(metadata.expect_path.clone());
        let expectations = match expectation_path {
            Some(path) => {
                let json = fs::read_to_string(&path)
                    .with_context(|| format!("reading expectation {}", path.display()))?;
                Some(
                    serde_json::from_str(&json)
                        .with_context(|| format!("parsing {}", path.display()))?,
                )
            }
            None => None,
        };

        Ok(FixtureData {
            metadata,
            sample_rate,
            samples,
            expectations,
        })
    }

    fn resolve_fixture_path(&self, fixture: &str) -> Result<PathBuf> {
        let as_path = Path::new(fixture);
        if as_path.exists() {
            return Ok(as_path.to_path_buf());
        }

        let candidate = self.root.join(format!("{fixture}.wav"));
        if candidate.exists() {
            Ok(candidate)
        } else {
            Err(anyhow!(
                "Fixture '{fixture}' not found in {}",
                self.root.display()
            ))
        }
    }

    fn metadata_for_path(&self, wav_path: &Path) -> Result<FixtureMetadata> {
        let name = wav_path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| anyhow!("Invalid fixture name for {}", wav_path.display()))?
            .to_string();
        let expect_path = wav_path.with_extension("expect.json");
        Ok(FixtureMetadata {
            name,
            wav_path: wav_path.to_path_buf(),
            expect_path: expect_path.exists().then_some(expect_path),
        })
    }
}

impl Default for FixtureCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_FIXTURE_ROOT)
    }
}

/// Executes fixtures by feeding decoded PCM samples through the analyzer.
pub struct FixtureProcessor {
    analyzer: VoiceAnalyzer,
}

impl FixtureProcessor {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            analyzer: VoiceAnalyzer::with_config(config),
        }
    }

    pub fn run(&self, data: &FixtureData) -> Result<AnalysisResult> {
        let result = self
            .analyzer
            .analyze(&data.samples, data.sample_rate)
            .map_err(|err| {
                log_analysis_error(&err, "fixture processing");
                err
            })
            .with_context(|| format!("analyzing fixture '{}'", data.metadata.name))?;
        Ok(result)
    }
}

/// Decodes a mono WAV file into normalized f32 samples.
pub fn read_wav(path: &Path) -> Result<(Vec<f32>, u32)> {
    let mut reader =
        hound::WavReader::open(path).with_context(|| format!("opening {}", path.display()))?;
    let spec = reader.spec();
    if spec.channels != 1 {
        return Err(anyhow!(
            "Fixture {} must be mono (found {} channels)",
            path.display(),
            spec.channels
        ));
    }

    let sample_rate = spec.sample_rate;

    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|sample| sample.map_err(|err| anyhow!(err)))
            .collect::<Result<Vec<f32>>>()?,
        hound::SampleFormat::Int => {
            let max = (1i64 << (spec.bits_per_sample - 1)) - 1;
            match spec.bits_per_sample {
                16 => reader
                    .samples::<i16>()
                    .map(|sample| {
                        sample
                            .map(|value| value as f32 / max as f32)
                            .map_err(|err| anyhow!(err))
                    })
                    .collect::<Result<Vec<f32>>>()?,
                24 | 32 => reader
                    .samples::<i32>()
                    .map(|sample| {
                        sample
                            .map(|value| value as f32 / max as f32)
                            .map_err(|err| anyhow!(err))
                    })
                    .collect::<Result<Vec<f32>>>()?,
                other => {
                    return Err(anyhow!(
                        "Unsupported bits per sample {} in {}",
                        other,
                        path.display()
                    ))
                }
            }
        }
    };

    Ok((samples, sample_rate))
}

/// Writes mono f32 samples as a 32-bit float WAV file.
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("creating {}", path.display()))?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}
