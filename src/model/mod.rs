pub mod record;

pub use record::{DerivedMetrics, DerivedRecord, MetricKey, VoterRecord};
