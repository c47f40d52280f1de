use serde::Serialize;

/// Five-number summary of a sample, plus mean and count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
}

impl Summary {
    /// `None` for an empty sample. Non-finite values are ignored.
    pub fn from_values(values: &[f64]) -> Option<Summary> {
        let sorted = sorted_finite(values);
        if sorted.is_empty() {
            return None;
        }

        Some(Summary {
            count: sorted.len(),
            min: sorted[0],
            q1: percentile_of_sorted(&sorted, 25.0),
            median: percentile_of_sorted(&sorted, 50.0),
            q3: percentile_of_sorted(&sorted, 75.0),
            max: sorted[sorted.len() - 1],
            mean: sorted.iter().sum::<f64>() / sorted.len() as f64,
        })
    }

    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

pub fn sorted_finite(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Linear interpolation between closest ranks. `sorted` must be non-empty
/// and ascending; `pct` is clamped to [0, 100].
pub fn percentile_of_sorted(sorted: &[f64], pct: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let pct = pct.clamp(0.0, 100.0);
    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    if lower + 1 >= sorted.len() {
        return sorted[sorted.len() - 1];
    }
    let fraction = rank - lower as f64;
    sorted[lower] + (sorted[lower + 1] - sorted[lower]) * fraction
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_of_odd_sample() {
        let s = Summary::from_values(&[100.0, 102.0, 98.0, 101.0, 4000.0]).unwrap();
        assert_eq!(s.count, 5);
        assert_eq!(s.min, 98.0);
        assert_eq!(s.q1, 100.0);
        assert_eq!(s.median, 101.0);
        assert_eq!(s.q3, 102.0);
        assert_eq!(s.max, 4000.0);
        assert_eq!(s.iqr(), 2.0);
    }

    #[test]
    fn interpolates_even_sample() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile_of_sorted(&sorted, 50.0), 2.5);
        assert_eq!(percentile_of_sorted(&sorted, 25.0), 1.75);
        assert_eq!(percentile_of_sorted(&sorted, 100.0), 4.0);
        assert_eq!(percentile_of_sorted(&sorted, 0.0), 1.0);
    }

    #[test]
    fn empty_and_single() {
        assert!(Summary::from_values(&[]).is_none());
        assert!(Summary::from_values(&[f64::NAN]).is_none());
        let s = Summary::from_values(&[7.0]).unwrap();
        assert_eq!((s.min, s.median, s.max), (7.0, 7.0, 7.0));
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 3.0]), Some(2.0));
    }
}
