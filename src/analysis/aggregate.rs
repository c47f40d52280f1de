use super::stats::{mean, Summary};
use crate::model::DerivedRecord;
use serde::Serialize;
use std::collections::HashMap;

/// Per-division view of the derived table, consumed by the box plot and
/// the division section of the report.
#[derive(Debug, Clone, Serialize)]
pub struct DivisionAggregate {
    pub division: String,
    pub districts: Vec<String>,
    pub registrations: Vec<f64>,
    pub registration_summary: Option<Summary>,
    /// Only members with a defined gender ratio.
    pub gender_ratios: Vec<f64>,
    pub gender_ratio_summary: Option<Summary>,
    pub total_active: u64,
    pub total_male: u64,
    pub total_female: u64,
    pub total_other: u64,
    pub mean_gender_ratio: Option<f64>,
    pub mean_female_percentage: Option<f64>,
}

impl DivisionAggregate {
    fn new(division: &str) -> Self {
        Self {
            division: division.to_string(),
            districts: Vec::new(),
            registrations: Vec::new(),
            registration_summary: None,
            gender_ratios: Vec::new(),
            gender_ratio_summary: None,
            total_active: 0,
            total_male: 0,
            total_female: 0,
            total_other: 0,
            mean_gender_ratio: None,
            mean_female_percentage: None,
        }
    }

    pub fn district_count(&self) -> usize {
        self.districts.len()
    }

    pub fn mean_active(&self) -> Option<f64> {
        mean(&self.registrations)
    }
}

/// Group by division in order of first appearance.
pub fn aggregate_by_division(derived: &[DerivedRecord]) -> Vec<DivisionAggregate> {
    let mut aggregates: Vec<DivisionAggregate> = Vec::new();
    let mut female_percentages: Vec<Vec<f64>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for d in derived {
        let slot = *index.entry(d.record.division.as_str()).or_insert_with(|| {
            aggregates.push(DivisionAggregate::new(&d.record.division));
            female_percentages.push(Vec::new());
            aggregates.len() - 1
        });

        let agg = &mut aggregates[slot];
        agg.districts.push(d.record.district.clone());
        agg.registrations.push(d.record.active_registrations as f64);
        agg.total_active = agg.total_active.saturating_add(d.record.active_registrations);
        agg.total_male = agg.total_male.saturating_add(d.record.male_count);
        agg.total_female = agg.total_female.saturating_add(d.record.female_count);
        agg.total_other = agg.total_other.saturating_add(d.record.other_count);

        if let Some(ratio) = d.metrics.gender_ratio {
            agg.gender_ratios.push(ratio);
        }
        if let Some(pct) = d.metrics.female_percentage {
            female_percentages[slot].push(pct);
        }
    }

    for (agg, pcts) in aggregates.iter_mut().zip(female_percentages.iter()) {
        agg.registration_summary = Summary::from_values(&agg.registrations);
        agg.gender_ratio_summary = Summary::from_values(&agg.gender_ratios);
        agg.mean_gender_ratio = mean(&agg.gender_ratios);
        agg.mean_female_percentage = mean(pcts);
    }

    aggregates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::derive;
    use crate::model::VoterRecord;
    use std::collections::HashSet;

    fn sample() -> Vec<DerivedRecord> {
        derive(vec![
            VoterRecord::new("Pune", "Satara", 100, 150, 0, 250),
            VoterRecord::new("Nagpur", "Wardha", 0, 50, 0, 50),
            VoterRecord::new("Pune", "Sangli", 200, 190, 10, 400),
            VoterRecord::new("Konkan", "Thane", 300, 290, 0, 590),
            VoterRecord::new("Nagpur", "Bhandara", 100, 100, 0, 200),
        ])
    }

    #[test]
    fn groups_in_first_appearance_order() {
        let aggs = aggregate_by_division(&sample());
        let names: Vec<&str> = aggs.iter().map(|a| a.division.as_str()).collect();
        assert_eq!(names, vec!["Pune", "Nagpur", "Konkan"]);

        let pune = &aggs[0];
        assert_eq!(pune.districts, vec!["Satara", "Sangli"]);
        assert_eq!(pune.total_active, 650);
        assert_eq!(pune.total_other, 10);
        assert_eq!(pune.mean_active(), Some(325.0));
        assert_eq!(pune.registration_summary.unwrap().max, 400.0);
    }

    #[test]
    fn undefined_ratio_kept_for_volume_only() {
        let aggs = aggregate_by_division(&sample());
        let nagpur = &aggs[1];
        assert_eq!(nagpur.district_count(), 2);
        assert_eq!(nagpur.registrations.len(), 2);
        assert_eq!(nagpur.gender_ratios, vec![1000.0]);
        assert_eq!(nagpur.mean_gender_ratio, Some(1000.0));
        assert_eq!(nagpur.total_active, 250);
    }

    #[test]
    fn union_of_members_matches_input() {
        let derived = sample();
        let aggs = aggregate_by_division(&derived);

        let divisions: HashSet<&str> = aggs.iter().map(|a| a.division.as_str()).collect();
        assert_eq!(divisions.len(), aggs.len());

        let members: HashSet<(&str, &str)> = aggs
            .iter()
            .flat_map(|a| a.districts.iter().map(move |d| (a.division.as_str(), d.as_str())))
            .collect();
        let input: HashSet<(&str, &str)> = derived
            .iter()
            .map(|d| (d.record.division.as_str(), d.record.district.as_str()))
            .collect();
        assert_eq!(members, input);
    }

    #[test]
    fn division_totals_saturate() {
        let derived = derive(vec![
            VoterRecord::new("X", "A", u64::MAX, 1, 0, u64::MAX),
            VoterRecord::new("X", "B", 5, 1, 0, 6),
        ]);
        let aggs = aggregate_by_division(&derived);
        assert_eq!(aggs[0].total_active, u64::MAX);
        assert_eq!(aggs[0].total_male, u64::MAX);
        assert_eq!(aggs[0].total_female, 2);
    }
}
