// DSP helpers - shared numeric primitives for the analysis pipeline
//
// This module contains the low-level building blocks the analysis stages
// share: FFT-based autocorrelation, fixed-ratio FFT resampling, window
// functions, and basic descriptive statistics. Each invocation owns its
// scratch buffers; nothing here holds state across calls except the
// pre-planned FFTs.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

type Complex32 = Complex<f32>;

/// Autocorrelation processor backed by the Wiener-Khinchin theorem.
///
/// Computes the unnormalized autocorrelation sequence r[0..=max_lag] in
/// O(n log n) via FFT instead of the O(n * max_lag) direct sum. Zero
/// padding to at least 2n avoids circular wrap-around.
pub struct Autocorrelator {
    planner: FftPlanner<f32>,
}

impl Autocorrelator {
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
        }
    }

    /// Compute r[lag] for lag in 0..=max_lag.
    ///
    /// Returns an empty vector when the input is shorter than 2 samples
    /// or max_lag does not fit the input.
    pub fn compute(&mut self, x: &[f32], max_lag: usize) -> Vec<f32> {
        let n = x.len();
        if n < 2 || max_lag >= n {
            return Vec::new();
        }

        let fft_size = (2 * n).next_power_of_two();
        let fft = self.planner.plan_fft_forward(fft_size);
        let ifft = self.planner.plan_fft_inverse(fft_size);

        let mut buffer: Vec<Complex32> = Vec::with_capacity(fft_size);
        buffer.extend(x.iter().map(|&s| Complex32::new(s, 0.0)));
        buffer.resize(fft_size, Complex32::new(0.0, 0.0));

        fft.process(&mut buffer);
        for v in buffer.iter_mut() {
            *v = Complex32::new(v.norm_sqr(), 0.0);
        }
        ifft.process(&mut buffer);

        // rustfft leaves the inverse unnormalized
        let scale = 1.0 / fft_size as f32;
        buffer[..=max_lag].iter().map(|c| c.re * scale).collect()
    }
}

impl Default for Autocorrelator {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed-ratio FFT resampler for analysis frames.
///
/// Truncates or zero-extends the spectrum to change the sample rate of a
/// fixed-size frame. Used to bring formant analysis frames down to the
/// LPC processing rate.
pub struct FrameResampler {
    fft: Arc<dyn Fft<f32>>,
    ifft: Arc<dyn Fft<f32>>,
    in_len: usize,
    out_len: usize,
}

impl FrameResampler {
    pub fn new(in_len: usize, out_len: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            fft: planner.plan_fft_forward(in_len),
            ifft: planner.plan_fft_inverse(out_len),
            in_len,
            out_len,
        }
    }

    pub fn resample(&self, x: &[f32]) -> Vec<f32> {
        if self.in_len == 0 || self.out_len == 0 || x.len() < self.in_len {
            return Vec::new();
        }

        let mut in_buf: Vec<Complex32> = x[..self.in_len]
            .iter()
            .map(|&s| Complex32::new(s, 0.0))
            .collect();
        self.fft.process(&mut in_buf);

        let mut out_buf = vec![Complex32::new(0.0, 0.0); self.out_len];
        let in_half = self.in_len / 2;
        let out_half = self.out_len / 2;
        let k_max = in_half.min(out_half);

        out_buf[0] = in_buf[0];
        for k in 1..=k_max {
            out_buf[k] = in_buf[k];
            out_buf[self.out_len - k] = in_buf[self.in_len - k];
        }
        if self.in_len % 2 == 0 && self.out_len % 2 == 0 && out_half <= in_half {
            out_buf[out_half] = in_buf[in_half];
        }

        self.ifft.process(&mut out_buf);

        let scale = 1.0 / self.in_len as f32;
        out_buf.iter().map(|c| c.re * scale).collect()
    }
}

/// Pre-computed Hamming window of length n.
pub fn hamming_window(n: usize) -> Vec<f32> {
    if n < 2 {
        return vec![1.0; n];
    }
    (0..n)
        .map(|i| {
            0.54 - 0.46 * ((2.0 * std::f32::consts::PI * i as f32) / (n as f32 - 1.0)).cos()
        })
        .collect()
}

/// Root-mean-square amplitude, accumulated in f64 for stability.
pub fn rms(x: &[f32]) -> f32 {
    if x.is_empty() {
        return 0.0;
    }
    let sum_squares: f64 = x.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum_squares / x.len() as f64).sqrt() as f32
}

/// Arithmetic mean; 0.0 for an empty slice.
pub fn mean(x: &[f32]) -> f32 {
    if x.is_empty() {
        return 0.0;
    }
    let sum: f64 = x.iter().map(|&v| v as f64).sum();
    (sum / x.len() as f64) as f32
}

/// Population standard deviation; 0.0 for fewer than 2 values.
pub fn std_dev(x: &[f32]) -> f32 {
    if x.len() < 2 {
        return 0.0;
    }
    let m = mean(x) as f64;
    let var: f64 = x
        .iter()
        .map(|&v| {
            let d = v as f64 - m;
            d * d
        })
        .sum::<f64>()
        / x.len() as f64;
    var.sqrt() as f32
}
