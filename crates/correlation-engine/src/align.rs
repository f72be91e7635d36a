//! Time-series alignment.
//!
//! Market price histories are irregularly sampled, so two series rarely
//! share exact timestamps. The aligner merges them into equal-length,
//! timestamp-matched sequences within a tolerance window.

use common::PricePoint;

/// Two equal-length numeric sequences with their matched timestamps.
#[derive(Debug, Clone, Default)]
pub struct AlignedSeries {
    pub timestamps: Vec<i64>,
    pub left: Vec<f64>,
    pub right: Vec<f64>,
}

impl AlignedSeries {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Align two price series with a two-pointer merge.
///
/// Both inputs are sorted by timestamp first. When the timestamp gap
/// exceeds `tolerance_secs` the earlier pointer advances; within
/// tolerance a matched pair is emitted (stamped with the left timestamp)
/// and both pointers advance, so no timestamp is emitted twice. Empty
/// input yields empty output, never an error.
pub fn align_series(
    left: &[PricePoint],
    right: &[PricePoint],
    tolerance_secs: i64,
) -> AlignedSeries {
    let mut a = left.to_vec();
    let mut b = right.to_vec();
    a.sort_by_key(|p| p.ts);
    b.sort_by_key(|p| p.ts);

    let mut out = AlignedSeries::default();
    let (mut i, mut j) = (0usize, 0usize);

    while i < a.len() && j < b.len() {
        let gap = a[i].ts - b[j].ts;
        if gap.abs() <= tolerance_secs {
            out.timestamps.push(a[i].ts);
            out.left.push(a[i].price);
            out.right.push(b[j].price);
            i += 1;
            j += 1;
        } else if a[i].ts < b[j].ts {
            i += 1;
        } else {
            j += 1;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_series(points: &[(i64, f64)]) -> Vec<PricePoint> {
        points
            .iter()
            .map(|&(ts, price)| PricePoint { ts, price })
            .collect()
    }

    #[test]
    fn test_identical_timestamps_align_fully() {
        let a = make_series(&[(100, 0.1), (200, 0.2), (300, 0.3)]);
        let b = make_series(&[(100, 0.5), (200, 0.6), (300, 0.7)]);

        let aligned = align_series(&a, &b, 3600);
        assert_eq!(aligned.len(), 3);
        assert_eq!(aligned.timestamps, vec![100, 200, 300]);
        assert_eq!(aligned.left, vec![0.1, 0.2, 0.3]);
        assert_eq!(aligned.right, vec![0.5, 0.6, 0.7]);
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        let a = make_series(&[(100, 0.1)]);
        assert!(align_series(&a, &[], 3600).is_empty());
        assert!(align_series(&[], &a, 3600).is_empty());
        assert!(align_series(&[], &[], 3600).is_empty());
    }

    #[test]
    fn test_points_outside_tolerance_are_skipped() {
        // Right series is offset by 2h; with 1h tolerance nothing matches.
        let a = make_series(&[(0, 0.1), (10_000, 0.2)]);
        let b = make_series(&[(7200, 0.5), (17_200, 0.6)]);

        let aligned = align_series(&a, &b, 3600);
        assert!(aligned.is_empty(), "2h gaps must not match at 1h tolerance");
    }

    #[test]
    fn test_within_tolerance_matches_once() {
        // 30min offsets match at 1h tolerance; each point used once.
        let a = make_series(&[(0, 0.1), (7200, 0.2), (14_400, 0.3)]);
        let b = make_series(&[(1800, 0.5), (9000, 0.6)]);

        let aligned = align_series(&a, &b, 3600);
        assert_eq!(aligned.len(), 2);
        assert_eq!(aligned.timestamps, vec![0, 7200]);
    }

    #[test]
    fn test_unsorted_input_is_sorted_first() {
        let a = make_series(&[(300, 0.3), (100, 0.1), (200, 0.2)]);
        let b = make_series(&[(200, 0.6), (300, 0.7), (100, 0.5)]);

        let aligned = align_series(&a, &b, 60);
        assert_eq!(aligned.timestamps, vec![100, 200, 300]);
        assert_eq!(aligned.left, vec![0.1, 0.2, 0.3]);
        assert_eq!(aligned.right, vec![0.5, 0.6, 0.7]);
    }
}
