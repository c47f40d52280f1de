use serde::{Deserialize, Serialize};
use std::fmt;

/// One validated row of the registration table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterRecord {
    pub division: String,
    pub district: String,
    pub male_count: u64,
    pub female_count: u64,
    pub other_count: u64,
    pub active_registrations: u64,
    /// Line in the source file, header is line 1.
    pub line: u64,
}

impl VoterRecord {
    pub fn new(
        division: impl Into<String>,
        district: impl Into<String>,
        male_count: u64,
        female_count: u64,
        other_count: u64,
        active_registrations: u64,
    ) -> Self {
        Self {
            division: division.into(),
            district: district.into(),
            male_count,
            female_count,
            other_count,
            active_registrations,
            line: 0,
        }
    }

    /// Saturates instead of overflowing.
    pub fn total_registration(&self) -> u64 {
        self.male_count
            .saturating_add(self.female_count)
            .saturating_add(self.other_count)
    }
}

/// Ratios computed once per record. `None` marks a zero denominator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub gender_ratio: Option<f64>,
    pub female_percentage: Option<f64>,
    pub male_percentage: Option<f64>,
    pub total_registration: u64,
    pub reconciled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedRecord {
    pub record: VoterRecord,
    pub metrics: DerivedMetrics,
}

impl DerivedRecord {
    pub fn value(&self, key: MetricKey) -> Option<f64> {
        match key {
            MetricKey::ActiveRegistrations => Some(self.record.active_registrations as f64),
            MetricKey::GenderRatio => self.metrics.gender_ratio,
            MetricKey::FemalePercentage => self.metrics.female_percentage,
            MetricKey::MalePercentage => self.metrics.male_percentage,
            MetricKey::TotalRegistration => Some(self.metrics.total_registration as f64),
        }
    }
}

/// Field selector for ranking and outlier detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKey {
    ActiveRegistrations,
    GenderRatio,
    FemalePercentage,
    MalePercentage,
    TotalRegistration,
}

impl MetricKey {
    pub fn label(&self) -> &'static str {
        match self {
            MetricKey::ActiveRegistrations => "Active Registration",
            MetricKey::GenderRatio => "Gender Ratio",
            MetricKey::FemalePercentage => "Female %",
            MetricKey::MalePercentage => "Male %",
            MetricKey::TotalRegistration => "Total Registration",
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKey::ActiveRegistrations => write!(f, "active_registrations"),
            MetricKey::GenderRatio => write!(f, "gender_ratio"),
            MetricKey::FemalePercentage => write!(f, "female_percentage"),
            MetricKey::MalePercentage => write!(f, "male_percentage"),
            MetricKey::TotalRegistration => write!(f, "total_registration"),
        }
    }
}
