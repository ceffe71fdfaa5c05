use rustfft::{num_complex::Complex32, FftPlanner};

/// Full linear cross-correlation of `signal` against `reference`,
/// computed in the frequency domain. Output covers lags
/// `-(reference.len() - 1) ..= signal.len() - 1`.
pub fn correlate_full(signal: &[f32], reference: &[f32]) -> Vec<f32> {
    let n = signal.len();
    let m = reference.len();
    if n == 0 || m == 0 {
        return Vec::new();
    }
    let len = n + m - 1;
    let mut planner = FftPlanner::<f32>::new();
    let forward = planner.plan_fft_forward(len);
    let inverse = planner.plan_fft_inverse(len);

    let mut a: Vec<Complex32> = signal.iter().map(|&v| Complex32::new(v, 0.0)).collect();
    a.resize(len, Complex32::ZERO);
    let mut b: Vec<Complex32> = reference.iter().map(|&v| Complex32::new(v, 0.0)).collect();
    b.resize(len, Complex32::ZERO);

    forward.process(&mut a);
    forward.process(&mut b);
    for (x, y) in a.iter_mut().zip(&b) {
        *x = *x * y.conj();
    }
    inverse.process(&mut a);

    // unwrap the circular result into lag order
    (0..len)
        .map(|i| {
            let idx = (i + len - (m - 1)) % len;
            a[idx].re / len as f32
        })
        .collect()
}

/// Matched-filter compression of a measured trace against the probe chirp.
///
/// The reference is zero-padded to the measurement length so the output has
/// the same length as the input with zero lag at the centre, and the result
/// is scaled to correlation-coefficient range.
pub fn compress_chirp(measurement: &[f32], chirp: &[f32]) -> Vec<f32> {
    let n = measurement.len();
    if n == 0 || chirp.is_empty() {
        return Vec::new();
    }
    let mut reference = chirp.to_vec();
    reference.resize(n, 0.0);

    let full = correlate_full(measurement, &reference);
    let energy_signal: f32 = measurement.iter().map(|v| v * v).sum();
    let energy_reference: f32 = chirp.iter().map(|v| v * v).sum();
    let norm = (energy_signal * energy_reference).sqrt();
    let scale = if norm > 0.0 { 1.0 / norm } else { 0.0 };

    let start = (n - 1) / 2;
    full[start..start + n].iter().map(|v| v * scale).collect()
}

/// Time axis in seconds for a compressed trace, zero lag at the centre.
pub fn lag_axis_seconds(len: usize, sample_rate_hz: f32) -> Vec<f32> {
    let centre = (len / 2) as f32;
    (0..len)
        .map(|i| (i as f32 - centre) / sample_rate_hz)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chirp(len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| {
                let t = i as f32 / len as f32;
                (2.0 * std::f32::consts::PI * (2.0 + 6.0 * t) * t * len as f32 / 16.0).sin()
            })
            .collect()
    }

    #[test]
    fn correlation_peaks_at_delay() {
        let probe = chirp(16);
        let mut signal = vec![0.0; 100];
        signal[30..46].copy_from_slice(&probe);

        let compressed = compress_chirp(&signal, &probe);
        assert_eq!(compressed.len(), signal.len());

        let (peak_idx, peak) = compressed
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .unwrap();
        // zero lag sits at len / 2, the echo 30 samples later
        assert_eq!(peak_idx, 30 + signal.len() / 2);
        assert!(*peak > 0.99, "normalized peak should be ~1, got {peak}");
    }

    #[test]
    fn lag_axis_is_centred() {
        let axis = lag_axis_seconds(4, 2.0);
        assert_eq!(axis, vec![-1.0, -0.5, 0.0, 0.5]);
    }

    #[test]
    fn empty_inputs() {
        assert!(compress_chirp(&[], &[1.0]).is_empty());
        assert!(compress_chirp(&[1.0], &[]).is_empty());
    }
}
