//! Impact estimation for a validated candidate.

use common::{clamp_probability, Direction};

/// Correlation magnitude historically overstates causal impact, so the
/// estimate is dampened by a fixed factor.
const CORRELATION_DAMPENING: f64 = 0.5;

/// Unvalidated claims get a much smaller multiplier.
const CLAIMED_FALLBACK_DAMPENING: f64 = 0.10;

/// Expected move for one target market.
#[derive(Debug, Clone, Copy)]
pub struct ImpactEstimate {
    /// Absolute probability-change magnitude.
    pub magnitude: f64,
    pub direction: Direction,
    /// current ± magnitude, clamped to the representable band.
    pub predicted_probability: f64,
}

/// Estimate the expected probability change for a target market.
///
/// Magnitude comes from statistics when a validated correlation exists
/// (`|r| * shock * 0.5`), otherwise from the dampened claim
/// (`claimed_strength * 0.10`). Direction comes from the correlation sign
/// when available, else the claimed direction — correlation sign is
/// trusted for orientation only when the data actually supports it.
pub fn estimate_impact(
    correlation: Option<f64>,
    claimed_strength: f64,
    claimed_direction: Direction,
    current_probability: f64,
    shock: f64,
) -> ImpactEstimate {
    let (magnitude, direction) = match correlation {
        Some(r) => {
            let direction = if r >= 0.0 {
                Direction::Increase
            } else {
                Direction::Decrease
            };
            (r.abs() * shock * CORRELATION_DAMPENING, direction)
        }
        None => (
            claimed_strength * CLAIMED_FALLBACK_DAMPENING,
            claimed_direction,
        ),
    };

    let predicted = clamp_probability(current_probability + direction.sign() * magnitude);

    ImpactEstimate {
        magnitude,
        direction,
        predicted_probability: predicted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worked_example() {
        // Trigger prior 0.20 → shock 0.80; r = 0.50; target at 0.30.
        let est = estimate_impact(Some(0.50), 0.6, Direction::Decrease, 0.30, 0.80);
        assert!((est.magnitude - 0.20).abs() < 1e-12, "magnitude={}", est.magnitude);
        assert_eq!(est.direction, Direction::Increase);
        assert!((est.predicted_probability - 0.50).abs() < 1e-12);
    }

    #[test]
    fn test_negative_correlation_decreases() {
        let est = estimate_impact(Some(-0.50), 0.6, Direction::Increase, 0.30, 0.80);
        assert_eq!(est.direction, Direction::Decrease);
        assert!((est.predicted_probability - 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_claimed_fallback_is_conservative() {
        let est = estimate_impact(None, 0.6, Direction::Increase, 0.30, 0.80);
        assert!((est.magnitude - 0.06).abs() < 1e-12, "magnitude={}", est.magnitude);
        assert_eq!(est.direction, Direction::Increase);
        assert!((est.predicted_probability - 0.36).abs() < 1e-12);
    }

    #[test]
    fn test_prediction_is_clamped() {
        let up = estimate_impact(Some(1.0), 0.0, Direction::Increase, 0.95, 1.0);
        assert_eq!(up.predicted_probability, 0.99);

        let down = estimate_impact(Some(-1.0), 0.0, Direction::Increase, 0.05, 1.0);
        assert_eq!(down.predicted_probability, 0.01);
    }
}
