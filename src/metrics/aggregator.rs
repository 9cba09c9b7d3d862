use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use super::types::{Outcome, OutcomeKind};
use super::writer::MetricsWriter;

/// Totals observed by the aggregator over one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorReport {
    pub outcomes: u64,
    pub failures: u64,
    pub sink_errors: u64,
}

/// Spawn the single consumer of the outcome channel.
///
/// The task drains until the channel is explicitly closed: `recv` only yields
/// `None` once every producer handle has been dropped and the queue is empty,
/// so nothing enqueued before close is lost. Sink write failures are logged
/// and counted but never stop the drain.
#[must_use]
pub fn spawn_aggregator(
    mut writer: MetricsWriter,
    mut outcome_rx: mpsc::Receiver<Outcome>,
) -> JoinHandle<AggregatorReport> {
    tokio::spawn(async move {
        let mut report = AggregatorReport::default();

        while let Some(outcome) = outcome_rx.recv().await {
            report.outcomes = report.outcomes.saturating_add(1);

            if let Err(err) = writer.write_outcome(&outcome).await {
                report.sink_errors = report.sink_errors.saturating_add(1);
                error!("Failed to write metrics record: {}", err);
            }

            match (&outcome.error, &outcome.kind) {
                (Some(cause), _) => {
                    report.failures = report.failures.saturating_add(1);
                    warn!(
                        "Worker {} in event {} reported an error: {}",
                        outcome.worker, outcome.event_id, cause
                    );
                }
                (
                    None,
                    OutcomeKind::Broadcast {
                        message_count,
                        latency_ms,
                        ..
                    },
                ) => {
                    debug!(
                        "Watcher {} (event {}): received {} messages, latency {}ms",
                        outcome.worker, outcome.event_id, message_count, latency_ms
                    );
                }
                (None, OutcomeKind::Update { .. }) => {}
            }
        }

        if let Err(err) = writer.close().await {
            report.sink_errors = report.sink_errors.saturating_add(1);
            error!("Failed to close metrics files: {}", err);
        }
        report
    })
}
