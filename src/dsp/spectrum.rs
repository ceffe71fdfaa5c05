use ndarray::Array2;
use rustfft::{num_complex::Complex32, FftPlanner};

use crate::dsp::level::to_db;

/// Positive-frequency magnitude spectrum in dB.
#[derive(Clone, Debug)]
pub struct MagnitudeSpectrum {
    pub frequencies_hz: Vec<f32>,
    pub magnitudes_db: Vec<f32>,
}

/// Full-length FFT of the trace, keeping the positive half in dB.
pub fn magnitude_spectrum_db(samples: &[f32], sample_rate_hz: f32) -> MagnitudeSpectrum {
    let n = samples.len();
    if n == 0 {
        return MagnitudeSpectrum {
            frequencies_hz: Vec::new(),
            magnitudes_db: Vec::new(),
        };
    }
    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n);
    let mut buffer: Vec<Complex32> = samples
        .iter()
        .map(|&v| Complex32::new(v, 0.0))
        .collect();
    fft.process(&mut buffer);

    let bins = n - n / 2; // DC up to (not including) the negative half
    let bin_hz = sample_rate_hz / n as f32;
    MagnitudeSpectrum {
        frequencies_hz: (0..bins).map(|k| k as f32 * bin_hz).collect(),
        magnitudes_db: buffer[..bins].iter().map(|c| to_db(c.norm())).collect(),
    }
}

/// Time-frequency power matrix of a trace.
#[derive(Clone, Debug)]
pub struct Spectrogram {
    pub frequencies_hz: Vec<f32>, // nfft / 2 + 1 bins
    pub times_s: Vec<f32>,        // frame centres
    pub power: Array2<f32>,       // freq bins x frames
}

impl Spectrogram {
    pub fn is_empty(&self) -> bool {
        self.times_s.is_empty()
    }

    pub fn peak_power(&self) -> f32 {
        self.power.iter().copied().fold(0.0f32, f32::max)
    }
}

/// Hann window of length `n`.
pub fn hann(n: usize) -> Vec<f32> {
    if n < 2 {
        return vec![1.0; n];
    }
    (0..n)
        .map(|i| {
            let phase = 2.0 * std::f32::consts::PI * i as f32 / (n - 1) as f32;
            0.5 * (1.0 - phase.cos())
        })
        .collect()
}

/// Hann-windowed power spectrogram with window `nfft` and overlap `nfft / 2`.
pub fn spectrogram(samples: &[f32], sample_rate_hz: f32, nfft: usize) -> Spectrogram {
    let nfft = nfft.max(2);
    let hop = nfft / 2;
    let bins = nfft / 2 + 1;
    let bin_hz = sample_rate_hz / nfft as f32;
    let frequencies_hz: Vec<f32> = (0..bins).map(|k| k as f32 * bin_hz).collect();

    let frames = if samples.len() >= nfft {
        (samples.len() - nfft) / hop + 1
    } else {
        0
    };

    let window = hann(nfft);
    let window_norm: f32 = window.iter().map(|w| w * w).sum();

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(nfft);

    let mut power = Array2::<f32>::zeros((bins, frames));
    let mut times_s = Vec::with_capacity(frames);
    let mut buffer = vec![Complex32::ZERO; nfft];

    for frame in 0..frames {
        let start = frame * hop;
        for (i, slot) in buffer.iter_mut().enumerate() {
            *slot = Complex32::new(samples[start + i] * window[i], 0.0);
        }
        fft.process(&mut buffer);
        for (k, value) in buffer[..bins].iter().enumerate() {
            power[[k, frame]] = value.norm_sqr() / window_norm;
        }
        times_s.push((start + nfft / 2) as f32 / sample_rate_hz);
    }

    Spectrogram {
        frequencies_hz,
        times_s,
        power,
    }
}
