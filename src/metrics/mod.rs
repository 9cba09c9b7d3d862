mod aggregator;
mod types;
mod writer;

#[cfg(test)]
mod tests;

pub use aggregator::{AggregatorReport, spawn_aggregator};
pub use types::{Outcome, OutcomeKind, WorkerId};
pub use writer::MetricsWriter;
