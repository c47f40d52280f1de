use super::stats::Summary;
use super::{AnalysisError, Result};
use crate::model::{DerivedRecord, MetricKey};
use tracing::debug;

pub const DEFAULT_OUTLIER_THRESHOLD: f64 = 1.5;

/// Upper Tukey-style fence: `median + threshold * IQR`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fence {
    pub median: f64,
    pub iqr: f64,
    pub upper: f64,
}

impl Fence {
    pub fn from_values(values: &[f64], threshold: f64) -> Result<Option<Fence>> {
        check_threshold(threshold)?;
        Ok(Summary::from_values(values).map(|s| Fence {
            median: s.median,
            iqr: s.iqr(),
            upper: s.median + threshold * s.iqr(),
        }))
    }
}

fn check_threshold(threshold: f64) -> Result<()> {
    if threshold.is_finite() && threshold >= 0.0 {
        Ok(())
    } else {
        Err(AnalysisError::InvalidOption(format!(
            "outlier threshold must be a non-negative number, got {}",
            threshold
        )))
    }
}

/// Records whose `key` lies above the upper fence, in input order.
/// Records with an undefined `key` take no part.
pub fn detect_outliers(
    derived: &[DerivedRecord],
    key: MetricKey,
    threshold: f64,
) -> Result<Vec<&DerivedRecord>> {
    let values: Vec<f64> = derived.iter().filter_map(|d| d.value(key)).collect();

    let fence = match Fence::from_values(&values, threshold)? {
        Some(fence) => fence,
        None => return Ok(Vec::new()),
    };

    let flagged: Vec<&DerivedRecord> = derived
        .iter()
        .filter(|d| d.value(key).map_or(false, |v| v > fence.upper))
        .collect();
    debug!(metric = %key, upper = fence.upper, flagged = flagged.len(), "outlier fence");

    Ok(flagged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::derive;
    use crate::model::VoterRecord;

    fn by_active(values: &[u64]) -> Vec<DerivedRecord> {
        derive(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| VoterRecord::new("X", format!("d{}", i), *v / 2, *v - *v / 2, 0, *v))
                .collect(),
        )
    }

    #[test]
    fn flags_only_the_spike() {
        let derived = by_active(&[100, 102, 98, 101, 4000]);
        let outliers = detect_outliers(
            &derived,
            MetricKey::ActiveRegistrations,
            DEFAULT_OUTLIER_THRESHOLD,
        )
        .unwrap();
        assert_eq!(outliers.len(), 1);
        assert_eq!(outliers[0].record.active_registrations, 4000);
    }

    #[test]
    fn fence_values() {
        let fence = Fence::from_values(&[100.0, 102.0, 98.0, 101.0, 4000.0], 1.5)
            .unwrap()
            .unwrap();
        assert_eq!(fence.median, 101.0);
        assert_eq!(fence.iqr, 2.0);
        assert_eq!(fence.upper, 104.0);
    }

    #[test]
    fn rejects_bad_threshold() {
        let derived = by_active(&[1, 2, 3]);
        assert!(matches!(
            detect_outliers(&derived, MetricKey::ActiveRegistrations, -1.0),
            Err(AnalysisError::InvalidOption(_))
        ));
        assert!(detect_outliers(&derived, MetricKey::ActiveRegistrations, f64::NAN).is_err());
    }

    #[test]
    fn undefined_values_are_ignored() {
        let derived = derive(vec![
            VoterRecord::new("X", "a", 0, 10, 0, 10),
            VoterRecord::new("X", "b", 100, 100, 0, 200),
        ]);
        let outliers = detect_outliers(&derived, MetricKey::GenderRatio, 1.5).unwrap();
        assert!(outliers.is_empty());
        assert!(detect_outliers(&[], MetricKey::GenderRatio, 1.5)
            .unwrap()
            .is_empty());
    }
}
