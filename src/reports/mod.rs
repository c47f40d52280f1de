use crate::analysis::{DroppedRow, Summary};
use crate::model::MetricKey;
use crate::util::write_serialized;
use chrono::{DateTime, Utc};
use colored::*;
use serde::Serialize;
use std::path::Path;

pub mod generator;

pub use generator::generate_report;

pub const SUMMARY_FILE: &str = "summary.json";

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ReportResult<T> = std::result::Result<T, ReportError>;

/// Everything the run found, in the shape written to `summary.json`.
#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    #[serde(rename = "generatedAt")]
    pub generated_at: DateTime<Utc>,
    pub input: String,
    pub overall: OverallSummary,
    pub divisions: Vec<DivisionSummary>,
    #[serde(rename = "topByRegistration")]
    pub top_by_registration: Vec<RankedDistrict>,
    #[serde(rename = "topByGenderRatio")]
    pub top_by_gender_ratio: Vec<RankedDistrict>,
    pub outliers: OutlierSummary,
    #[serde(rename = "droppedRows")]
    pub dropped_rows: Vec<DroppedRow>,
    #[serde(rename = "unreconciledRows")]
    pub unreconciled_rows: usize,
}

#[derive(Debug, Serialize)]
pub struct OverallSummary {
    pub district_count: usize,
    pub division_count: usize,
    pub total_active: u64,
    pub total_male: u64,
    pub total_female: u64,
    pub total_other: u64,
    pub mean_gender_ratio: Option<f64>,
    pub female_percentage: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct DivisionSummary {
    pub division: String,
    pub district_count: usize,
    pub total_active: u64,
    pub mean_active: Option<f64>,
    pub mean_gender_ratio: Option<f64>,
    pub mean_female_percentage: Option<f64>,
    pub registration: Option<Summary>,
    pub gender_ratio: Option<Summary>,
}

#[derive(Debug, Serialize)]
pub struct RankedDistrict {
    pub district: String,
    pub division: String,
    pub active_registrations: u64,
    pub gender_ratio: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct OutlierSummary {
    pub threshold: f64,
    pub gender_ratio: Vec<OutlierEntry>,
    pub active_registrations: Vec<OutlierEntry>,
}

#[derive(Debug, Serialize)]
pub struct OutlierEntry {
    pub district: String,
    pub division: String,
    pub value: f64,
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "n/a".to_string(),
    }
}

impl AnalysisReport {
    pub fn write_json(&self, output_dir: &Path) -> ReportResult<std::path::PathBuf> {
        let path = output_dir.join(SUMMARY_FILE);
        write_serialized(&path, self)?;
        Ok(path)
    }

    /// Print summary statistics
    pub fn print(&self) {
        println!("\n{}", "📊 Voter Registration Summary".bright_cyan().bold());
        println!("{}", "=".repeat(60).bright_cyan());

        let o = &self.overall;
        println!(
            "{}: {}",
            "Districts".bright_white().bold(),
            o.district_count.to_string().bright_yellow()
        );
        println!(
            "{}: {}",
            "Divisions".bright_white().bold(),
            o.division_count.to_string().bright_yellow()
        );
        println!(
            "{}: {}",
            "Total Active Registrations".bright_white().bold(),
            o.total_active.to_string().bright_yellow()
        );
        println!(
            "{}: {} male, {} female, {} other",
            "By Gender".bright_white().bold(),
            o.total_male.to_string().bright_yellow(),
            o.total_female.to_string().bright_yellow(),
            o.total_other.to_string().bright_yellow()
        );
        println!(
            "{}: {} females per 1000 males",
            "Average Gender Ratio".bright_white().bold(),
            fmt_opt(o.mean_gender_ratio, 0).bright_green()
        );
        println!(
            "{}: {}%",
            "Overall Female Percentage".bright_white().bold(),
            fmt_opt(o.female_percentage, 1).bright_green()
        );

        println!("\n{}", "Division-wise".bright_cyan().bold());
        println!("{}", "-".repeat(60).bright_cyan());
        println!(
            "{:<20} {:>9} {:>14} {:>12} {:>9}",
            "Division", "Districts", "Active", "Ratio", "Female %"
        );
        for d in &self.divisions {
            println!(
                "{:<20} {:>9} {:>14} {:>12} {:>9}",
                d.division,
                d.district_count,
                d.total_active,
                fmt_opt(d.mean_gender_ratio, 1),
                fmt_opt(d.mean_female_percentage, 1)
            );
        }

        print_ranking(MetricKey::ActiveRegistrations, &self.top_by_registration);
        print_ranking(MetricKey::GenderRatio, &self.top_by_gender_ratio);

        let flagged = self.outliers.gender_ratio.len() + self.outliers.active_registrations.len();
        if flagged > 0 {
            println!(
                "\n{} (threshold {})",
                "⚠️  Outliers".bright_yellow().bold(),
                self.outliers.threshold
            );
            for entry in &self.outliers.gender_ratio {
                println!(
                    "  {:<20} {} ({}): {:.0}",
                    MetricKey::GenderRatio.label(),
                    entry.district,
                    entry.division,
                    entry.value
                );
            }
            for entry in &self.outliers.active_registrations {
                println!(
                    "  {:<20} {} ({}): {:.0}",
                    MetricKey::ActiveRegistrations.label(),
                    entry.district,
                    entry.division,
                    entry.value
                );
            }
        }

        if !self.dropped_rows.is_empty() {
            println!(
                "\n{}: {}",
                "Dropped Rows".bright_red().bold(),
                self.dropped_rows.len().to_string().bright_red()
            );
            for row in &self.dropped_rows {
                println!("  line {}: {}", row.line, row.reason);
            }
        }
        if self.unreconciled_rows > 0 {
            println!(
                "{}: {} rows where male + female + other differs from active registrations",
                "Unreconciled".yellow().bold(),
                self.unreconciled_rows
            );
        }
        println!();
    }
}

fn print_ranking(key: MetricKey, rows: &[RankedDistrict]) {
    let title = format!("Top Districts by {}", key.label());
    println!("\n{}", title.bright_cyan().bold());
    println!("{}", "-".repeat(60).bright_cyan());
    for (rank, row) in rows.iter().enumerate() {
        println!(
            "{:>3}. {:<20} {:<16} {:>12} {:>10}",
            rank + 1,
            row.district,
            row.division,
            row.active_registrations,
            fmt_opt(row.gender_ratio, 0)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_values_format() {
        assert_eq!(fmt_opt(Some(1499.6), 0), "1500");
        assert_eq!(fmt_opt(Some(60.04), 1), "60.0");
        assert_eq!(fmt_opt(None, 1), "n/a");
    }
}
