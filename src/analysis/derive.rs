use crate::model::{DerivedMetrics, DerivedRecord, VoterRecord};

fn ratio(numerator: u64, denominator: u64, scale: f64) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator as f64 / denominator as f64 * scale)
    }
}

pub fn derive_metrics(record: &VoterRecord) -> DerivedMetrics {
    let total_registration = record.total_registration();
    DerivedMetrics {
        gender_ratio: ratio(record.female_count, record.male_count, 1000.0),
        female_percentage: ratio(record.female_count, record.active_registrations, 100.0),
        male_percentage: ratio(record.male_count, record.active_registrations, 100.0),
        total_registration,
        reconciled: total_registration == record.active_registrations,
    }
}

pub fn derive(records: Vec<VoterRecord>) -> Vec<DerivedRecord> {
    records
        .into_iter()
        .map(|record| {
            let metrics = derive_metrics(&record);
            DerivedRecord { record, metrics }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratios_and_zero_denominators() {
        let derived = derive(vec![
            VoterRecord::new("X", "A", 100, 150, 0, 250),
            VoterRecord::new("X", "B", 0, 50, 0, 50),
            VoterRecord::new("X", "C", 0, 0, 0, 0),
        ]);

        let a = &derived[0].metrics;
        assert_eq!(a.gender_ratio, Some(1500.0));
        assert_eq!(a.female_percentage, Some(60.0));
        assert_eq!(a.male_percentage, Some(40.0));
        assert!(a.reconciled);

        let b = &derived[1].metrics;
        assert_eq!(b.gender_ratio, None);
        assert_eq!(b.female_percentage, Some(100.0));

        let c = &derived[2].metrics;
        assert_eq!(c.gender_ratio, None);
        assert_eq!(c.female_percentage, None);
        assert_eq!(c.male_percentage, None);
    }

    #[test]
    fn percentages_stay_in_range() {
        let records: Vec<VoterRecord> = (0..50u64)
            .map(|i| VoterRecord::new("D", format!("d{}", i), i * 7 + 1, i * 3, i, i * 11 + 1))
            .collect();

        for d in derive(records) {
            assert!(d.metrics.gender_ratio.unwrap() >= 0.0);
            if d.metrics.reconciled {
                let pct = d.metrics.female_percentage.unwrap();
                assert!((0.0..=100.0).contains(&pct));
            }
        }
    }

    #[test]
    fn unreconciled_row_is_flagged() {
        let d = derive_metrics(&VoterRecord::new("X", "A", 10, 10, 1, 25));
        assert!(!d.reconciled);
        assert_eq!(d.total_registration, 21);
    }
}
