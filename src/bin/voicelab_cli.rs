use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use voicelab::analysis::norms::{NormativeAssessment, SpeakerCategory};
use voicelab::analysis::types::AnalysisResult;
use voicelab::config::AnalyzerConfig;
use voicelab::fixtures::{write_wav, ExpectationDiff, FixtureCatalog, FixtureProcessor};
use voicelab::synth::{SynthSpec, WaveformPattern};

#[derive(Parser, Debug)]
#[command(
    name = "voicelab_cli",
    about = "Deterministic acoustic-analysis fixture harness for VoiceLab"
)]
struct Cli {
    /// Override directory containing fixture assets (defaults to ./fixtures)
    #[arg(long)]
    fixtures_dir: Option<PathBuf>,
    /// Optional analyzer config JSON (defaults built in)
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a fixture WAV and optionally compare against expectations
    Analyze {
        #[arg(long)]
        fixture: String,
        #[arg(long)]
        expect: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
        /// Compare summary metrics against a normative table (adult-male,
        /// adult-female, child)
        #[arg(long)]
        speaker: Option<String>,
    },
    /// Verify a fixture against its expectation file without emitting a report
    Verify {
        #[arg(long)]
        fixture: String,
        #[arg(long)]
        expect: Option<PathBuf>,
    },
    /// Generate a synthetic fixture WAV with known acoustic properties
    Synth {
        #[arg(long)]
        output: PathBuf,
        /// tone | vibrato | am | noisy-tone | white-noise | silence
        #[arg(long, default_value = "tone")]
        pattern: String,
        #[arg(long, default_value_t = 150.0)]
        frequency: f32,
        #[arg(long, default_value_t = 0.8)]
        amplitude: f32,
        #[arg(long, default_value_t = 44_100)]
        sample_rate: u32,
        #[arg(long, default_value_t = 1_000)]
        duration_ms: u32,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Modulation rate in Hz (vibrato and am patterns)
        #[arg(long, default_value_t = 5.0)]
        mod_rate: f32,
        /// Modulation depth: Hz for vibrato, fraction 0-1 for am
        #[arg(long, default_value_t = 0.1)]
        mod_depth: f32,
        /// Noise amplitude relative to the tone (noisy-tone pattern)
        #[arg(long, default_value_t = 0.2)]
        noise_level: f32,
    },
    /// List available fixtures on disk
    DumpFixtures,
}

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let catalog = cli
        .fixtures_dir
        .map(FixtureCatalog::new)
        .unwrap_or_else(FixtureCatalog::default);
    let config = match &cli.config {
        Some(path) => AnalyzerConfig::load_from_file(path),
        None => AnalyzerConfig::default(),
    };

    match cli.command {
        Commands::Analyze {
            fixture,
            expect,
            output,
            speaker,
        } => run_analyze(&catalog, config, &fixture, expect, output, speaker),
        Commands::Verify { fixture, expect } => run_verify(&catalog, config, &fixture, expect),
        Commands::Synth {
            output,
            pattern,
            frequency,
            amplitude,
            sample_rate,
            duration_ms,
            seed,
            mod_rate,
            mod_depth,
            noise_level,
        } => {
            let spec = SynthSpec {
                pattern: parse_pattern(&pattern, mod_rate, mod_depth, noise_level)?,
                frequency_hz: frequency,
                amplitude,
                sample_rate,
                duration_ms,
                seed,
            };
            run_synth(&spec, &output)
        }
        Commands::DumpFixtures => run_dump(&catalog),
    }
}

fn run_analyze(
    catalog: &FixtureCatalog,
    config: AnalyzerConfig,
    fixture: &str,
    override_expect: Option<PathBuf>,
    output_path: Option<PathBuf>,
    speaker: Option<String>,
) -> Result<ExitCode> {
    let processor = FixtureProcessor::new(config);
    let data = catalog.load(fixture, override_expect)?;
    let result = processor.run(&data)?;

    let norms = speaker
        .as_deref()
        .map(parse_speaker)
        .transpose()?
        .map(|category| voicelab::analysis::norms::assess(&result, category));

    emit_report(&data.metadata.name, data.sample_rate, &result, norms, output_path)?;

    if let Some(expectations) = data.expectations {
        match expectations.verify(&result) {
            Ok(()) => Ok(ExitCode::from(0)),
            Err(diff) => {
                emit_diff(&diff)?;
                Ok(ExitCode::from(2))
            }
        }
    } else {
        Ok(ExitCode::from(0))
    }
}

fn run_verify(
    catalog: &FixtureCatalog,
    config: AnalyzerConfig,
    fixture: &str,
    override_expect: Option<PathBuf>,
) -> Result<ExitCode> {
    let processor = FixtureProcessor::new(config);
    let data = catalog.load(fixture, override_expect)?;
    let expectations = data
        .expectations
        .as_ref()
        .ok_or_else(|| anyhow!("Fixture '{fixture}' has no expectation file to verify against"))?;

    let result = processor.run(&data)?;
    match expectations.verify(&result) {
        Ok(()) => {
            println!("Fixture '{}' passed {} checks", fixture, expectations.checks.len());
            Ok(ExitCode::from(0))
        }
        Err(diff) => {
            emit_diff(&diff)?;
            Ok(ExitCode::from(2))
        }
    }
}

fn run_synth(spec: &SynthSpec, output: &PathBuf) -> Result<ExitCode> {
    let samples = spec.generate();
    write_wav(output, &samples, spec.sample_rate)?;
    println!(
        "Wrote {} samples ({} ms at {} Hz) to {}",
        samples.len(),
        spec.duration_ms,
        spec.sample_rate,
        output.display()
    );
    Ok(ExitCode::from(0))
}

fn run_dump(catalog: &FixtureCatalog) -> Result<ExitCode> {
    let fixtures = catalog.discover()?;
    if fixtures.is_empty() {
        println!("No fixtures found under {}", catalog.root().display());
        return Ok(ExitCode::from(0));
    }

    for metadata in fixtures {
        if let Some(expect) = metadata.expect_path {
            println!("{} -> {}", metadata.name, expect.display());
        } else {
            println!("{}", metadata.name);
        }
    }
    Ok(ExitCode::from(0))
}

fn parse_pattern(
    name: &str,
    mod_rate: f32,
    mod_depth: f32,
    noise_level: f32,
) -> Result<WaveformPattern> {
    match name {
        "tone" => Ok(WaveformPattern::Tone),
        "vibrato" => Ok(WaveformPattern::Vibrato {
            rate_hz: mod_rate,
            depth_hz: mod_depth,
        }),
        "am" => Ok(WaveformPattern::AmplitudeModulated {
            rate_hz: mod_rate,
            depth: mod_depth,
        }),
        "noisy-tone" => Ok(WaveformPattern::NoisyTone { noise_level }),
        "white-noise" => Ok(WaveformPattern::WhiteNoise),
        "silence" => Ok(WaveformPattern::Silence),
        other => Err(anyhow!("Unknown waveform pattern '{other}'")),
    }
}

fn parse_speaker(name: &str) -> Result<SpeakerCategory> {
    match name {
        "adult-male" => Ok(SpeakerCategory::AdultMale),
        "adult-female" => Ok(SpeakerCategory::AdultFemale),
        "child" => Ok(SpeakerCategory::Child),
        other => Err(anyhow!(
            "Unknown speaker category '{other}' (expected adult-male, adult-female, or child)"
        )),
    }
}

fn emit_report(
    fixture: &str,
    sample_rate: u32,
    result: &AnalysisResult,
    norms: Option<NormativeAssessment>,
    output_path: Option<PathBuf>,
) -> Result<()> {
    let report = FixtureReportPayload {
        fixture,
        sample_rate,
        result,
        norms,
    };
    let json = serde_json::to_string_pretty(&report)?;

    if let Some(path) = output_path {
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    } else {
        println!("{json}");
    }

    Ok(())
}

fn emit_diff(diff: &ExpectationDiff) -> Result<()> {
    let json = serde_json::to_string_pretty(&diff.to_json())?;
    eprintln!("{json}");
    Ok(())
}

#[derive(Serialize)]
struct FixtureReportPayload<'a> {
    fixture: &'a str,
    sample_rate: u32,
    result: &'a AnalysisResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    norms: Option<NormativeAssessment>,
}
