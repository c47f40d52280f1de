pub mod aggregate;
pub mod clean;
pub mod derive;
pub mod outliers;
pub mod ranking;
pub mod stats;
pub mod trend;

pub use aggregate::{aggregate_by_division, DivisionAggregate};
pub use clean::{clean, CleanedTable, DropReason, DroppedRow};
pub use derive::derive;
pub use outliers::{detect_outliers, DEFAULT_OUTLIER_THRESHOLD};
pub use ranking::top_n;
pub use stats::Summary;
pub use trend::{linear_fit, LinearFit};

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Data format error: {0}")]
    DataFormat(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid option: {0}")]
    InvalidOption(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
