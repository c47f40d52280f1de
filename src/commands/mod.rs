mod analyze;
mod info;

pub use analyze::{analyze, RunSummary};
pub use info::info;
