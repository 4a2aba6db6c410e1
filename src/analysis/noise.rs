// Noise module - Harmonics-to-noise ratio
//
// HNR compares the power the signal shares with itself one pitch period
// later against the power it does not. Both sums run over the same index
// range, so an exactly periodic signal cancels to zero noise power and
// saturates at the upper clamp.

/// Upper clamp for HNR in dB; also the saturation value when the noise
/// power is non-positive.
pub const HNR_MAX_DB: f32 = 30.0;

/// Compute the harmonics-to-noise ratio in dB, clamped to [0, HNR_MAX_DB].
///
/// # Arguments
/// * `samples` - Time-domain signal
/// * `sample_rate` - Sample rate in Hz
/// * `f0` - Fundamental frequency estimate in Hz; non-positive F0
///   (unvoiced input) yields 0.0
pub fn harmonics_to_noise_ratio(samples: &[f32], sample_rate: u32, f0: f32) -> f32 {
    if f0 <= 0.0 {
        return 0.0;
    }

    let period = (sample_rate as f32 / f0).round() as usize;
    if period == 0 || period >= samples.len() {
        return 0.0;
    }

    let n = samples.len() - period;
    let mut harmonic = 0.0f64;
    let mut total = 0.0f64;
    for i in 0..n {
        let a = samples[i] as f64;
        let b = samples[i + period] as f64;
        harmonic += a * b;
        total += a * a;
    }

    let noise = total - harmonic;
    if noise <= 0.0 {
        // Periodic beyond measurement: saturate
        return HNR_MAX_DB;
    }
    if harmonic <= 0.0 {
        return 0.0;
    }

    (10.0 * (harmonic / noise).log10() as f32).clamp(0.0, HNR_MAX_DB)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(sample_rate: u32, frequency: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                (2.0 * std::f32::consts::PI * frequency * t).sin()
            })
            .collect()
    }

    #[test]
    fn test_pure_sine_saturates() {
        let sample_rate = 44100;
        // Period divides the rate exactly, so x[i] == x[i + period]
        let signal = sine(sample_rate, 150.0, sample_rate as usize);
        let hnr = harmonics_to_noise_ratio(&signal, sample_rate, 150.0);
        assert_eq!(hnr, HNR_MAX_DB);
    }

    #[test]
    fn test_noisy_tone_reads_lower() {
        use rand::{rngs::StdRng, Rng, SeedableRng};
        let sample_rate = 44100;
        let mut rng = StdRng::seed_from_u64(7);
        let signal: Vec<f32> = sine(sample_rate, 150.0, sample_rate as usize)
            .into_iter()
            .map(|s| 0.8 * s + 0.2 * rng.gen_range(-1.0..1.0))
            .collect();

        let hnr = harmonics_to_noise_ratio(&signal, sample_rate, 150.0);
        assert!(hnr > 5.0 && hnr < HNR_MAX_DB, "hnr {}", hnr);
    }

    #[test]
    fn test_unvoiced_returns_zero() {
        let signal = sine(44100, 150.0, 4410);
        assert_eq!(harmonics_to_noise_ratio(&signal, 44100, 0.0), 0.0);
        assert_eq!(harmonics_to_noise_ratio(&signal, 44100, -10.0), 0.0);
    }

    #[test]
    fn test_period_longer_than_clip_returns_zero() {
        let signal = sine(44100, 150.0, 100);
        // 50 Hz period is 882 samples, longer than the clip
        assert_eq!(harmonics_to_noise_ratio(&signal, 44100, 50.0), 0.0);
    }

    #[test]
    fn test_white_noise_clamps_at_floor() {
        use rand::{rngs::StdRng, Rng, SeedableRng};
        let mut rng = StdRng::seed_from_u64(11);
        let noise: Vec<f32> = (0..44100).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let hnr = harmonics_to_noise_ratio(&noise, 44100, 150.0);
        assert!((0.0..=HNR_MAX_DB).contains(&hnr));
        assert!(hnr < 3.0, "white noise should read near the floor, got {}", hnr);
    }
}
