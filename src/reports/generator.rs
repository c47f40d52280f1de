use super::{
    AnalysisReport, DivisionSummary, OutlierEntry, OutlierSummary, OverallSummary, RankedDistrict,
};
use crate::analysis::{stats::mean, top_n, CleanedTable, DivisionAggregate};
use crate::model::{DerivedRecord, MetricKey};
use chrono::Utc;

fn saturating_total(derived: &[DerivedRecord], count: impl Fn(&DerivedRecord) -> u64) -> u64 {
    derived
        .iter()
        .fold(0u64, |acc, d| acc.saturating_add(count(d)))
}

fn ranked(rows: Vec<&DerivedRecord>) -> Vec<RankedDistrict> {
    rows.into_iter()
        .map(|d| RankedDistrict {
            district: d.record.district.clone(),
            division: d.record.division.clone(),
            active_registrations: d.record.active_registrations,
            gender_ratio: d.metrics.gender_ratio,
        })
        .collect()
}

fn outlier_entries(rows: &[&DerivedRecord], key: MetricKey) -> Vec<OutlierEntry> {
    rows.iter()
        .filter_map(|d| {
            d.value(key).map(|value| OutlierEntry {
                district: d.record.district.clone(),
                division: d.record.division.clone(),
                value,
            })
        })
        .collect()
}

/// Inputs shared by the report and the charts, computed once by the caller.
pub struct ReportInputs<'a> {
    pub input: &'a str,
    pub cleaned: &'a CleanedTable,
    pub derived: &'a [DerivedRecord],
    pub aggregates: &'a [DivisionAggregate],
    pub ratio_outliers: &'a [&'a DerivedRecord],
    pub registration_outliers: &'a [&'a DerivedRecord],
    pub top_n: usize,
    pub outlier_threshold: f64,
}

/// Build the complete summary for one run
pub fn generate_report(inputs: &ReportInputs<'_>) -> AnalysisReport {
    let derived = inputs.derived;

    let total_active = saturating_total(derived, |d| d.record.active_registrations);
    let total_female = saturating_total(derived, |d| d.record.female_count);
    let ratios: Vec<f64> = derived.iter().filter_map(|d| d.metrics.gender_ratio).collect();

    let overall = OverallSummary {
        district_count: derived.len(),
        division_count: inputs.aggregates.len(),
        total_active,
        total_male: saturating_total(derived, |d| d.record.male_count),
        total_female,
        total_other: saturating_total(derived, |d| d.record.other_count),
        mean_gender_ratio: mean(&ratios),
        female_percentage: if total_active == 0 {
            None
        } else {
            Some(total_female as f64 / total_active as f64 * 100.0)
        },
    };

    let divisions = inputs
        .aggregates
        .iter()
        .map(|a| DivisionSummary {
            division: a.division.clone(),
            district_count: a.district_count(),
            total_active: a.total_active,
            mean_active: a.mean_active(),
            mean_gender_ratio: a.mean_gender_ratio,
            mean_female_percentage: a.mean_female_percentage,
            registration: a.registration_summary,
            gender_ratio: a.gender_ratio_summary,
        })
        .collect();

    AnalysisReport {
        generated_at: Utc::now(),
        input: inputs.input.to_string(),
        overall,
        divisions,
        top_by_registration: ranked(top_n(derived, inputs.top_n, MetricKey::ActiveRegistrations)),
        top_by_gender_ratio: ranked(top_n(derived, inputs.top_n, MetricKey::GenderRatio)),
        outliers: OutlierSummary {
            threshold: inputs.outlier_threshold,
            gender_ratio: outlier_entries(inputs.ratio_outliers, MetricKey::GenderRatio),
            active_registrations: outlier_entries(
                inputs.registration_outliers,
                MetricKey::ActiveRegistrations,
            ),
        },
        dropped_rows: inputs.cleaned.dropped.clone(),
        unreconciled_rows: derived.iter().filter(|d| !d.metrics.reconciled).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{aggregate_by_division, derive, detect_outliers, DropReason, DroppedRow};
    use crate::model::VoterRecord;

    #[test]
    fn report_totals_and_rankings() {
        let records = vec![
            VoterRecord::new("Pune", "Satara", 100, 150, 0, 250),
            VoterRecord::new("Nagpur", "Wardha", 0, 50, 0, 50),
            VoterRecord::new("Pune", "Sangli", 200, 190, 10, 401),
        ];
        let cleaned = CleanedTable {
            records: records.clone(),
            dropped: vec![DroppedRow {
                line: 5,
                reason: DropReason::MissingIdentifier {
                    column: "district".to_string(),
                },
            }],
        };
        let derived = derive(records);
        let aggregates = aggregate_by_division(&derived);
        let ratio_outliers = detect_outliers(&derived, MetricKey::GenderRatio, 1.5).unwrap();

        let report = generate_report(&ReportInputs {
            input: "data.csv",
            cleaned: &cleaned,
            derived: &derived,
            aggregates: &aggregates,
            ratio_outliers: &ratio_outliers,
            registration_outliers: &[],
            top_n: 2,
            outlier_threshold: 1.5,
        });

        assert_eq!(report.overall.district_count, 3);
        assert_eq!(report.overall.division_count, 2);
        assert_eq!(report.overall.total_active, 701);
        assert_eq!(report.overall.total_other, 10);
        assert_eq!(report.overall.mean_gender_ratio, Some((1500.0 + 950.0) / 2.0));

        assert_eq!(report.top_by_registration.len(), 2);
        assert_eq!(report.top_by_registration[0].district, "Sangli");
        assert_eq!(report.top_by_gender_ratio[0].district, "Satara");
        assert_eq!(report.dropped_rows.len(), 1);
        assert_eq!(report.unreconciled_rows, 1);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["overall"]["total_active"], 701);
        assert_eq!(json["droppedRows"][0]["reason"]["kind"], "missing_identifier");
        assert!(json["topByGenderRatio"].is_array());
    }
}
