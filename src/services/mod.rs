pub mod score_aggregator;
pub mod status_reporter;

pub use score_aggregator::{aggregate, overall_correct};
pub use status_reporter::{MemoryReporter, StatusReporter, TracingReporter};
