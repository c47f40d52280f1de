use super::{AnalysisError, Result};
use crate::formats::voter_csv::{CellError, Column, LoadedTable, RawRecord};
use crate::model::VoterRecord;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};

/// Why a row was left out of the cleaned table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DropReason {
    Unparseable { column: String, value: String },
    NegativeCount { column: String, value: i64 },
    MissingIdentifier { column: String },
    DuplicateDistrict { division: String, district: String },
    CountTooLarge { column: String, value: i64 },
    InconsistentCounts { column: String, value: i64, active_registrations: i64 },
}

/// Largest count accepted in any cell.
pub const MAX_COUNT: i64 = 1_000_000_000_000;

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::Unparseable { column, value } => {
                write!(f, "cannot parse {:?} in column {}", value, column)
            }
            DropReason::NegativeCount { column, value } => {
                write!(f, "negative count {} in column {}", value, column)
            }
            DropReason::MissingIdentifier { column } => write!(f, "empty {}", column),
            DropReason::DuplicateDistrict { division, district } => {
                write!(f, "duplicate district {} in division {}", district, division)
            }
            DropReason::CountTooLarge { column, value } => {
                write!(f, "count {} in column {} exceeds {}", value, column, MAX_COUNT)
            }
            DropReason::InconsistentCounts {
                column,
                value,
                active_registrations,
            } => write!(
                f,
                "{} {} exceeds active registrations {}",
                column, value, active_registrations
            ),
        }
    }
}

impl From<&CellError> for DropReason {
    fn from(e: &CellError) -> Self {
        DropReason::Unparseable {
            column: e.column.name().to_string(),
            value: e.value.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedRow {
    pub line: u64,
    pub reason: DropReason,
}

/// Result of cleaning: the surviving records and an account of every drop.
#[derive(Debug, Clone)]
pub struct CleanedTable {
    pub records: Vec<VoterRecord>,
    pub dropped: Vec<DroppedRow>,
}

impl CleanedTable {
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }
}

fn validate(raw: &RawRecord) -> std::result::Result<(), DropReason> {
    if raw.division.is_empty() {
        return Err(DropReason::MissingIdentifier {
            column: Column::Division.name().to_string(),
        });
    }
    if raw.district.is_empty() {
        return Err(DropReason::MissingIdentifier {
            column: Column::District.name().to_string(),
        });
    }

    let counts = [
        (Column::MaleCount, raw.male_count),
        (Column::FemaleCount, raw.female_count),
        (Column::OtherCount, raw.other_count),
        (Column::ActiveRegistrations, raw.active_registrations),
    ];
    if let Some((column, value)) = counts.iter().find(|(_, v)| *v < 0) {
        return Err(DropReason::NegativeCount {
            column: column.name().to_string(),
            value: *value,
        });
    }
    if let Some((column, value)) = counts.iter().find(|(_, v)| *v > MAX_COUNT) {
        return Err(DropReason::CountTooLarge {
            column: column.name().to_string(),
            value: *value,
        });
    }

    let parts = [
        (Column::MaleCount, raw.male_count),
        (Column::FemaleCount, raw.female_count),
    ];
    if let Some((column, value)) = parts
        .iter()
        .find(|(_, v)| *v > raw.active_registrations)
    {
        return Err(DropReason::InconsistentCounts {
            column: column.name().to_string(),
            value: *value,
            active_registrations: raw.active_registrations,
        });
    }

    Ok(())
}

/// Drop invalid rows and count them. Fails if nothing usable remains.
pub fn clean(table: LoadedTable) -> Result<CleanedTable> {
    if table.is_empty() {
        return Err(AnalysisError::DataFormat(
            "input contains no data rows".to_string(),
        ));
    }

    let mut records = Vec::with_capacity(table.rows.len());
    let mut dropped = Vec::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();

    for row in table.rows {
        let raw = match row.content {
            Ok(raw) => raw,
            Err(e) => {
                dropped.push(DroppedRow {
                    line: row.line,
                    reason: DropReason::from(&e),
                });
                continue;
            }
        };

        if let Err(reason) = validate(&raw) {
            dropped.push(DroppedRow {
                line: row.line,
                reason,
            });
            continue;
        }

        if !seen.insert((raw.division.clone(), raw.district.clone())) {
            dropped.push(DroppedRow {
                line: row.line,
                reason: DropReason::DuplicateDistrict {
                    division: raw.division,
                    district: raw.district,
                },
            });
            continue;
        }

        // Sign checked by validate().
        let record = VoterRecord {
            division: raw.division,
            district: raw.district,
            male_count: raw.male_count as u64,
            female_count: raw.female_count as u64,
            other_count: raw.other_count as u64,
            active_registrations: raw.active_registrations as u64,
            line: row.line,
        };

        if record.total_registration() != record.active_registrations {
            warn!(
                line = record.line,
                district = %record.district,
                total = record.total_registration(),
                active = record.active_registrations,
                "male + female + other does not match active registrations"
            );
        }

        records.push(record);
    }

    for row in &dropped {
        debug!(line = row.line, reason = %row.reason, "dropped row");
    }

    if records.is_empty() {
        let examples: Vec<String> = dropped
            .iter()
            .take(3)
            .map(|d| format!("line {}: {}", d.line, d.reason))
            .collect();
        return Err(AnalysisError::DataFormat(format!(
            "all {} rows are invalid ({})",
            dropped.len(),
            examples.join("; ")
        )));
    }

    Ok(CleanedTable { records, dropped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::voter_csv::{load_from_reader, ReaderOptions};

    fn table(data: &str) -> LoadedTable {
        load_from_reader(data.as_bytes(), &ReaderOptions::default()).unwrap()
    }

    const HEADER: &str = "division,district,male_count,female_count,other_count,active_registrations\n";

    #[test]
    fn drops_and_counts_invalid_rows() {
        let data = format!(
            "{}{}",
            HEADER,
            "Pune,Satara,100,150,0,250\n\
             Pune,,10,10,0,20\n\
             Pune,Sangli,-1,10,0,9\n\
             Pune,Kolhapur,x,10,0,10\n\
             Pune,Satara,1,1,0,2\n\
             Nagpur,Wardha,40,45,1,86\n"
        );
        let loaded = table(&data);
        let input_len = loaded.len();
        let cleaned = clean(loaded).unwrap();

        assert_eq!(cleaned.records.len(), 2);
        assert_eq!(cleaned.dropped_count(), input_len - cleaned.records.len());

        let reasons: Vec<&DropReason> = cleaned.dropped.iter().map(|d| &d.reason).collect();
        assert_eq!(
            reasons[0],
            &DropReason::MissingIdentifier {
                column: "district".to_string()
            }
        );
        assert_eq!(
            reasons[1],
            &DropReason::NegativeCount {
                column: "male_count".to_string(),
                value: -1
            }
        );
        assert!(matches!(reasons[2], DropReason::Unparseable { .. }));
        assert!(matches!(reasons[3], DropReason::DuplicateDistrict { .. }));
        assert_eq!(cleaned.dropped[0].line, 3);
    }

    #[test]
    fn same_district_name_in_other_division_is_kept() {
        let data = format!("{}{}", HEADER, "A,Central,1,1,0,2\nB,Central,1,1,0,2\n");
        let cleaned = clean(table(&data)).unwrap();
        assert_eq!(cleaned.records.len(), 2);
        assert_eq!(cleaned.dropped_count(), 0);
    }

    #[test]
    fn all_invalid_escalates() {
        let data = format!("{}{}", HEADER, "Pune,Satara,x,1,0,1\nPune,Sangli,1,-2,0,1\n");
        match clean(table(&data)) {
            Err(AnalysisError::DataFormat(msg)) => {
                assert!(msg.contains("all 2 rows"));
                assert!(msg.contains("line 2"));
            }
            other => panic!("expected DataFormat error, got {:?}", other),
        }
    }

    #[test]
    fn part_above_active_is_dropped() {
        let data = format!(
            "{}{}",
            HEADER,
            "X,A,10,200,0,100
X,B,150,10,0,100
X,C,40,60,0,100
"
        );
        let cleaned = clean(table(&data)).unwrap();

        assert_eq!(cleaned.records.len(), 1);
        assert_eq!(cleaned.records[0].district, "C");
        assert_eq!(cleaned.dropped_count(), 2);
        assert_eq!(
            cleaned.dropped[0].reason,
            DropReason::InconsistentCounts {
                column: "female_count".to_string(),
                value: 200,
                active_registrations: 100,
            }
        );
        assert!(matches!(
            &cleaned.dropped[1].reason,
            DropReason::InconsistentCounts { column, .. } if column == "male_count"
        ));
    }

    #[test]
    fn huge_counts_are_dropped_without_overflow() {
        let max = i64::MAX;
        let data = format!(
            "{}X,A,{max},{max},{max},{max}\nX,B,1,1,0,2\n",
            HEADER,
            max = max
        );
        let cleaned = clean(table(&data)).unwrap();

        assert_eq!(cleaned.records.len(), 1);
        assert_eq!(
            cleaned.dropped[0].reason,
            DropReason::CountTooLarge {
                column: "male_count".to_string(),
                value: max,
            }
        );
    }

    #[test]
    fn empty_input_escalates() {
        assert!(matches!(
            clean(table(HEADER)),
            Err(AnalysisError::DataFormat(_))
        ));
    }
}
