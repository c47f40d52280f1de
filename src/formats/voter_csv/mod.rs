use crate::analysis::{AnalysisError, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Logical columns of the registration table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Division,
    District,
    MaleCount,
    FemaleCount,
    OtherCount,
    ActiveRegistrations,
}

impl Column {
    pub const ALL: [Column; 6] = [
        Column::Division,
        Column::District,
        Column::MaleCount,
        Column::FemaleCount,
        Column::OtherCount,
        Column::ActiveRegistrations,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Column::Division => "division",
            Column::District => "district",
            Column::MaleCount => "male_count",
            Column::FemaleCount => "female_count",
            Column::OtherCount => "other_count",
            Column::ActiveRegistrations => "active_registrations",
        }
    }

    /// Accepted header spellings after normalization.
    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Column::Division => &["division"],
            Column::District => &["district"],
            Column::MaleCount => &["male_count", "male"],
            Column::FemaleCount => &["female_count", "female"],
            Column::OtherCount => &["other_count", "other"],
            Column::ActiveRegistrations => &["active_registrations", "active_registration"],
        }
    }

    pub fn is_required(&self) -> bool {
        !matches!(self, Column::OtherCount)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub struct ReaderOptions {
    pub delimiter: u8,
    /// Cell values read as zero, compared case-insensitively.
    pub na_values: Vec<String>,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            na_values: vec!["NA".to_string()],
        }
    }
}

/// A row as it appears in the file. Counts are signed so that negative
/// values survive until cleaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub division: String,
    pub district: String,
    pub male_count: i64,
    pub female_count: i64,
    pub other_count: i64,
    pub active_registrations: i64,
}

/// A numeric cell that could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellError {
    pub column: Column,
    pub value: String,
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot parse {:?} in column {} as a count",
            self.value, self.column
        )
    }
}

#[derive(Debug, Clone)]
pub struct LoadedRow {
    pub line: u64,
    pub content: std::result::Result<RawRecord, CellError>,
}

#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub rows: Vec<LoadedRow>,
    pub has_other_column: bool,
}

impl LoadedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

struct ColumnMap {
    division: usize,
    district: usize,
    male_count: usize,
    female_count: usize,
    other_count: Option<usize>,
    active_registrations: usize,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Result<ColumnMap> {
        let normalized: Vec<String> = headers.iter().map(normalize_header).collect();
        let find = |column: Column| {
            normalized
                .iter()
                .position(|h| column.aliases().contains(&h.as_str()))
        };

        let missing: Vec<&str> = Column::ALL
            .iter()
            .filter(|c| c.is_required() && find(**c).is_none())
            .map(|c| c.name())
            .collect();

        if !missing.is_empty() {
            return Err(AnalysisError::DataFormat(format!(
                "missing required column(s): {}",
                missing.join(", ")
            )));
        }

        // Required columns were all found above.
        let required = |column: Column| find(column).unwrap_or_default();

        Ok(ColumnMap {
            division: required(Column::Division),
            district: required(Column::District),
            male_count: required(Column::MaleCount),
            female_count: required(Column::FemaleCount),
            other_count: find(Column::OtherCount),
            active_registrations: required(Column::ActiveRegistrations),
        })
    }
}

/// Lowercase, trim, strip a byte order mark, spaces to underscores.
fn normalize_header(header: &str) -> String {
    header
        .trim_start_matches('\u{feff}')
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Parse a count cell. Thousands separators are stripped; blank and NA
/// cells read as zero.
fn parse_count(cell: &str, options: &ReaderOptions) -> Option<i64> {
    let cleaned: String = cell.trim().chars().filter(|c| *c != ',').collect();

    if cleaned.is_empty()
        || options
            .na_values
            .iter()
            .any(|na| na.eq_ignore_ascii_case(&cleaned))
    {
        return Some(0);
    }

    if let Ok(value) = cleaned.parse::<i64>() {
        return Some(value);
    }

    // Exports sometimes carry counts as "1234.0".
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 => {
            Some(value as i64)
        }
        _ => None,
    }
}

fn read_row(
    record: &StringRecord,
    columns: &ColumnMap,
    options: &ReaderOptions,
) -> std::result::Result<RawRecord, CellError> {
    let cell = |idx: usize| record.get(idx).unwrap_or("");
    let count = |column: Column, idx: usize| {
        parse_count(cell(idx), options).ok_or_else(|| CellError {
            column,
            value: cell(idx).to_string(),
        })
    };

    Ok(RawRecord {
        division: cell(columns.division).trim().to_string(),
        district: cell(columns.district).trim().to_string(),
        male_count: count(Column::MaleCount, columns.male_count)?,
        female_count: count(Column::FemaleCount, columns.female_count)?,
        other_count: match columns.other_count {
            Some(idx) => count(Column::OtherCount, idx)?,
            None => 0,
        },
        active_registrations: count(Column::ActiveRegistrations, columns.active_registrations)?,
    })
}

/// Read a registration table from a file. The handle is closed when this returns.
pub fn load(path: &Path) -> Result<LoadedTable> {
    let file = File::open(path).map_err(|e| {
        AnalysisError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;
    load_from_reader(file, &ReaderOptions::default())
}

pub fn load_from_reader<R: Read>(reader: R, options: &ReaderOptions) -> Result<LoadedTable> {
    let mut csv_reader = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let columns = ColumnMap::from_headers(&headers)?;

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let content = read_row(&record, &columns, options);

        if let Err(e) = &content {
            debug!(line, error = %e, "unparseable row");
        }

        rows.push(LoadedRow { line, content });
    }

    Ok(LoadedTable {
        rows,
        has_other_column: columns.other_count.is_some(),
    })
}
