/// Per-sample mean across repeated captures.
///
/// Captures shorter than the longest one only contribute up to their own
/// length; the output is truncated to the shortest capture.
pub fn average_of_captures(captures: &[Vec<f32>]) -> Vec<f32> {
    let Some(len) = captures.iter().map(Vec::len).min() else {
        return Vec::new();
    };
    let count = captures.len() as f32;
    (0..len)
        .map(|i| captures.iter().map(|c| c[i]).sum::<f32>() / count)
        .collect()
}

/// Per-sample population variance across repeated captures.
pub fn variance_of_captures(captures: &[Vec<f32>]) -> Vec<f32> {
    let Some(len) = captures.iter().map(Vec::len).min() else {
        return Vec::new();
    };
    let count = captures.len() as f32;
    (0..len)
        .map(|i| {
            let mean = captures.iter().map(|c| c[i]).sum::<f32>() / count;
            captures
                .iter()
                .map(|c| {
                    let d = c[i] - mean;
                    d * d
                })
                .sum::<f32>()
                / count
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_variance_across_captures() {
        let captures = vec![vec![1.0, 0.0, 2.0], vec![3.0, 0.0, 4.0]];
        let mean = average_of_captures(&captures);
        assert_eq!(mean, vec![2.0, 0.0, 3.0]);
        let var = variance_of_captures(&captures);
        assert_eq!(var, vec![1.0, 0.0, 1.0]);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(average_of_captures(&[]).is_empty());
        assert!(variance_of_captures(&[]).is_empty());
    }

    #[test]
    fn truncates_to_shortest_capture() {
        let captures = vec![vec![1.0, 1.0, 1.0], vec![1.0, 1.0]];
        assert_eq!(average_of_captures(&captures).len(), 2);
    }
}
