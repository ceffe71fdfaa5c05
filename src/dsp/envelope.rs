use rustfft::{num_complex::Complex32, FftPlanner};

/// Envelope of an oscillating signal via the analytic signal.
///
/// Computed with an FFT Hilbert transform: negative frequencies are
/// zeroed, positive ones doubled, and the magnitude of the inverse
/// transform is the envelope.
pub fn envelope(samples: &[f32]) -> Vec<f32> {
    let n = samples.len();
    if n < 2 {
        return samples.iter().map(|v| v.abs()).collect();
    }
    let mut planner = FftPlanner::<f32>::new();
    let forward = planner.plan_fft_forward(n);
    let inverse = planner.plan_fft_inverse(n);

    let mut buffer: Vec<Complex32> = samples
        .iter()
        .map(|&v| Complex32::new(v, 0.0))
        .collect();
    forward.process(&mut buffer);

    // DC stays, positive bins double, negative bins vanish. For even n the
    // Nyquist bin is shared and stays as well.
    let half = n / 2;
    for k in 1..n {
        if k < half || (n % 2 == 1 && k == half) {
            buffer[k] = buffer[k] * 2.0;
        } else if k > half {
            buffer[k] = Complex32::ZERO;
        }
    }

    inverse.process(&mut buffer);
    buffer.iter().map(|c| c.norm() / n as f32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sine_envelope_is_flat() {
        let n = 256;
        let samples: Vec<f32> = (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * 16.0 * i as f32 / n as f32).sin())
            .collect();
        let env = envelope(&samples);
        assert_eq!(env.len(), n);
        // away from the edges the envelope of a unit sine is ~1
        for &v in &env[n / 4..3 * n / 4] {
            assert!((v - 1.0).abs() < 0.05, "envelope deviates: {v}");
        }
    }

    #[test]
    fn envelope_tracks_amplitude() {
        let n = 256;
        let samples: Vec<f32> = (0..n)
            .map(|i| 3.0 * (2.0 * std::f32::consts::PI * 16.0 * i as f32 / n as f32).sin())
            .collect();
        let env = envelope(&samples);
        assert!((env[n / 2] - 3.0).abs() < 0.2);
    }

    #[test]
    fn degenerate_inputs() {
        assert!(envelope(&[]).is_empty());
        assert_eq!(envelope(&[-2.0]), vec![2.0]);
    }
}
