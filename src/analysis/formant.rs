// Formant module - LPC vocal-tract resonance estimation
//
// Each 25 ms frame is decimated to the LPC processing rate, pre-emphasized,
// Hamming-windowed, and fitted with an autocorrelation-method LPC model
// (Levinson-Durbin). The roots of the prediction polynomial give candidate
// resonances; roots inside the unit circle with a bandwidth under the
// configured limit are kept, and the per-slot median across frames yields
// F1-F4. Slots with no stable LPC value fall back to the nominal
// vocal-tract constants so the estimate always carries four frequencies.

use log::warn;
use rustfft::num_complex::Complex;

use crate::analysis::dsp::{self, FrameResampler};
use crate::analysis::types::{FormantEstimate, FormantMethod};
use crate::config::FormantConfig;

type Complex64 = Complex<f64>;

/// Nominal resonances of a neutral vocal tract, in Hz.
pub const NOMINAL_FORMANTS: [f32; 4] = [500.0, 1500.0, 2500.0, 3500.0];

/// Pre-emphasis coefficient applied before LPC fitting.
const PREEMPHASIS: f32 = 0.97;

/// Analysis frame length in seconds.
const FRAME_SEC: f32 = 0.025;

/// Hop between analysis frames in seconds.
const HOP_SEC: f32 = 0.010;

/// Frames quieter than this RMS are skipped.
const RMS_GATE: f32 = 0.01;

/// LPC-based formant extractor for one sample rate.
pub struct FormantExtractor {
    config: FormantConfig,
    frame_len: usize,
    hop: usize,
    proc_rate: u32,
    proc_frame_len: usize,
    /// LPC model order, kept below the processing frame length
    order: usize,
    resampler: Option<FrameResampler>,
    window: Vec<f32>,
}

impl FormantExtractor {
    pub fn new(sample_rate: u32, config: &FormantConfig) -> Self {
        let frame_len = ((sample_rate as f32 * FRAME_SEC) as usize).max(32);
        let hop = ((sample_rate as f32 * HOP_SEC) as usize).max(16);

        // Decimate only when the input rate is above the processing rate
        let (proc_rate, proc_frame_len, resampler) = if sample_rate > config.proc_sample_rate {
            let proc_frame_len =
                ((config.proc_sample_rate as f32 * FRAME_SEC) as usize).max(32);
            (
                config.proc_sample_rate,
                proc_frame_len,
                Some(FrameResampler::new(frame_len, proc_frame_len)),
            )
        } else {
            (sample_rate, frame_len, None)
        };

        // The autocorrelation sequence only reaches lag proc_frame_len - 1
        let order = config.lpc_order.clamp(2, proc_frame_len - 1);
        if order != config.lpc_order {
            warn!(
                "[Formant] lpc_order {} outside [2, {}]; clamped to {}",
                config.lpc_order,
                proc_frame_len - 1,
                order
            );
        }

        Self {
            config: config.clone(),
            frame_len,
            hop,
            proc_rate,
            proc_frame_len,
            order,
            resampler,
            window: dsp::hamming_window(proc_frame_len),
        }
    }

    /// Estimate F1-F4 for the clip.
    pub fn extract(&self, samples: &[f32]) -> FormantEstimate {
        if self.config.method == FormantMethod::Nominal {
            return Self::nominal();
        }

        // One candidate list per formant slot
        let mut slots: [Vec<f32>; 4] = Default::default();
        let mut start = 0usize;
        while start + self.frame_len <= samples.len() {
            let frame = &samples[start..start + self.frame_len];
            start += self.hop;

            if dsp::rms(frame) < RMS_GATE {
                continue;
            }

            let frame_formants = self.frame_formants(frame);
            for (slot, freq) in slots.iter_mut().zip(frame_formants) {
                slot.push(freq);
            }
        }

        let mut values = NOMINAL_FORMANTS;
        let mut any_lpc = false;
        for (i, slot) in slots.iter_mut().enumerate() {
            if let Some(m) = median(slot) {
                values[i] = m;
                any_lpc = true;
            }
        }

        FormantEstimate {
            f1: values[0],
            f2: values[1],
            f3: values[2],
            f4: values[3],
            method: if any_lpc {
                FormantMethod::Lpc
            } else {
                FormantMethod::Nominal
            },
        }
    }

    /// The source-parity constant estimate.
    pub fn nominal() -> FormantEstimate {
        FormantEstimate {
            f1: NOMINAL_FORMANTS[0],
            f2: NOMINAL_FORMANTS[1],
            f3: NOMINAL_FORMANTS[2],
            f4: NOMINAL_FORMANTS[3],
            method: FormantMethod::Nominal,
        }
    }

    /// Candidate formants of one frame, ascending, at most 4.
    fn frame_formants(&self, frame: &[f32]) -> Vec<f32> {
        let decimated;
        let frame = match &self.resampler {
            Some(resampler) => {
                decimated = resampler.resample(frame);
                &decimated[..]
            }
            None => frame,
        };
        if frame.len() < self.proc_frame_len {
            return Vec::new();
        }

        let mut x = frame[..self.proc_frame_len].to_vec();

        // Pre-emphasis x[n] - 0.97 x[n-1], then window
        let mut prev = x[0];
        for value in x.iter_mut().skip(1) {
            let current = *value;
            *value -= PREEMPHASIS * prev;
            prev = current;
        }
        for (v, w) in x.iter_mut().zip(self.window.iter()) {
            *v *= *w;
        }

        let r = lag_autocorrelation(&x, self.order);
        let Some(coeffs) = levinson_durbin(&r, self.order) else {
            return Vec::new();
        };

        let mut formants = self.roots_to_formants(&coeffs);
        formants.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        formants.truncate(4);
        formants
    }

    /// Filter polynomial roots down to plausible resonances.
    fn roots_to_formants(&self, coeffs: &[f64]) -> Vec<f32> {
        let rate = self.proc_rate as f64;
        let mut formants = Vec::new();
        for z in polynomial_roots(coeffs, 60, 1e-8) {
            let radius = z.norm();
            if radius >= 1.0 || z.im <= 0.0 {
                continue;
            }
            let freq = z.arg() * rate / (2.0 * std::f64::consts::PI);
            let bandwidth = -rate / std::f64::consts::PI * radius.ln();
            if freq > self.config.min_formant_hz as f64
                && freq < self.config.max_formant_hz as f64
                && bandwidth < self.config.max_bandwidth_hz as f64
            {
                formants.push(freq as f32);
            }
        }
        formants
    }
}

/// Direct autocorrelation r[0..=order] in f64 (order is small).
fn lag_autocorrelation(x: &[f32], order: usize) -> Vec<f64> {
    (0..=order)
        .map(|lag| {
            x[..x.len() - lag]
                .iter()
                .zip(&x[lag..])
                .map(|(&a, &b)| a as f64 * b as f64)
                .sum()
        })
        .collect()
}

/// Levinson-Durbin recursion; returns the prediction polynomial
/// [1, a1, .., a_order] or None for an unstable/zero-energy frame.
fn levinson_durbin(r: &[f64], order: usize) -> Option<Vec<f64>> {
    if r.len() < order + 1 || r[0] == 0.0 {
        return None;
    }

    let mut a = vec![0.0f64; order + 1];
    a[0] = 1.0;
    let mut error = r[0];

    for i in 1..=order {
        let mut acc = r[i];
        for j in 1..i {
            acc += a[j] * r[i - j];
        }
        let reflection = -acc / error;
        let previous = a.clone();
        a[i] = reflection;
        for j in 1..i {
            a[j] = previous[j] + reflection * previous[i - j];
        }
        error *= 1.0 - reflection * reflection;
        if error <= 0.0 {
            return None;
        }
    }

    Some(a)
}

/// All roots of the polynomial via Durand-Kerner iteration.
fn polynomial_roots(coeffs: &[f64], max_iter: usize, tolerance: f64) -> Vec<Complex64> {
    let degree = coeffs.len().saturating_sub(1);
    if degree == 0 || coeffs[0].abs() < 1e-12 {
        return Vec::new();
    }

    let two_pi = 2.0 * std::f64::consts::PI;
    let mut roots: Vec<Complex64> = (0..degree)
        .map(|k| {
            let theta = two_pi * k as f64 / degree as f64;
            Complex64::new(0.9 * theta.cos(), 0.9 * theta.sin())
        })
        .collect();

    for _ in 0..max_iter {
        let mut converged = true;
        for i in 0..degree {
            let mut denom = Complex64::new(1.0, 0.0);
            for j in 0..degree {
                if i != j {
                    denom *= roots[i] - roots[j];
                }
            }
            let p = evaluate(coeffs, roots[i]);
            let delta = if denom.norm() < 1e-12 {
                Complex64::new(1e-6, 1e-6)
            } else {
                p / denom
            };
            let next = roots[i] - delta;
            if (next - roots[i]).norm() > tolerance {
                converged = false;
            }
            roots[i] = next;
        }
        if converged {
            break;
        }
    }

    roots
}

fn evaluate(coeffs: &[f64], z: Complex64) -> Complex64 {
    let mut acc = Complex64::new(coeffs[0], 0.0);
    for &c in &coeffs[1..] {
        acc = acc * z + Complex64::new(c, 0.0);
    }
    acc
}

fn median(values: &mut Vec<f32>) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    Some(values[values.len() / 2])
}
