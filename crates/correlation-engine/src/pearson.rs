//! Pearson correlation over aligned sequences.

use common::CorrelationResult;

/// Results computed over fewer aligned points than this are not
/// statistically usable, even though `pearson` returns a number for any
/// equal length >= 2.
pub const MIN_SAMPLES: usize = 10;

/// Sample Pearson correlation coefficient.
///
/// Returns 0.0 — never an error or NaN — for unequal lengths, fewer than
/// two points, or a degenerate (zero-variance) series.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return 0.0;
    }

    let n = x.len() as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_x2 = 0.0;
    let mut sum_y2 = 0.0;

    for (&xi, &yi) in x.iter().zip(y.iter()) {
        sum_x += xi;
        sum_y += yi;
        sum_xy += xi * yi;
        sum_x2 += xi * xi;
        sum_y2 += yi * yi;
    }

    let var_x = n * sum_x2 - sum_x * sum_x;
    let var_y = n * sum_y2 - sum_y * sum_y;
    if var_x <= 0.0 || var_y <= 0.0 {
        // Constant series carry no signal.
        return 0.0;
    }

    let numerator = n * sum_xy - sum_x * sum_y;
    (numerator / (var_x * var_y).sqrt()).clamp(-1.0, 1.0)
}

/// Correlate two equal-length sequences and derive a statistical
/// confidence: |r| scaled by sample size, `|r| * (1 - 1/sqrt(n))`.
pub fn correlate(x: &[f64], y: &[f64]) -> CorrelationResult {
    let coefficient = pearson(x, y);
    let sample_size = if x.len() == y.len() { x.len() } else { 0 };
    CorrelationResult {
        coefficient,
        sample_size,
        confidence: derived_confidence(coefficient, sample_size),
    }
}

fn derived_confidence(r: f64, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    (r.abs() * (1.0 - 1.0 / (n as f64).sqrt())).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_correlation_is_one() {
        let x = vec![0.1, 0.4, 0.2, 0.8, 0.5, 0.3];
        let r = pearson(&x, &x);
        assert!((r - 1.0).abs() < 1e-9, "r={} should be 1.0", r);
    }

    #[test]
    fn test_correlation_is_symmetric() {
        let x = vec![0.1, 0.4, 0.2, 0.8, 0.5, 0.3];
        let y = vec![0.2, 0.5, 0.1, 0.9, 0.6, 0.2];
        let rxy = pearson(&x, &y);
        let ryx = pearson(&y, &x);
        assert!((rxy - ryx).abs() < 1e-12, "{} vs {}", rxy, ryx);
    }

    #[test]
    fn test_perfect_anticorrelation() {
        let x = vec![0.1, 0.2, 0.3, 0.4];
        let y: Vec<f64> = x.iter().map(|v| 1.0 - v).collect();
        let r = pearson(&x, &y);
        assert!((r + 1.0).abs() < 1e-9, "r={} should be -1.0", r);
    }

    #[test]
    fn test_degenerate_inputs_return_zero() {
        // Unequal lengths.
        assert_eq!(pearson(&[0.1, 0.2], &[0.1, 0.2, 0.3]), 0.0);
        // Too short.
        assert_eq!(pearson(&[0.1], &[0.2]), 0.0);
        assert_eq!(pearson(&[], &[]), 0.0);
        // Zero variance.
        assert_eq!(pearson(&[0.5, 0.5, 0.5], &[0.1, 0.2, 0.3]), 0.0);
    }

    #[test]
    fn test_derived_confidence_grows_with_samples() {
        let small = correlate(&[0.1, 0.2, 0.3, 0.4], &[0.1, 0.2, 0.3, 0.4]);
        let x: Vec<f64> = (0..100).map(|i| i as f64 / 100.0).collect();
        let large = correlate(&x, &x);
        assert!(
            large.confidence > small.confidence,
            "{} should exceed {}",
            large.confidence,
            small.confidence
        );
        assert!(large.confidence <= 1.0);
    }
}
