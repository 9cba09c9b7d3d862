use std::path::Path;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;
use url::Url;
use uuid::Uuid;

use crate::args::HarnessArgs;
use crate::error::{AppResult, ValidationError};
use crate::metrics::{MetricsWriter, spawn_aggregator};
use crate::shutdown::{ShutdownSender, setup_signal_shutdown_handler, shutdown_channel};
use crate::workers::{Mover, Watcher, mover};

/// Run the harness to completion: validate, spawn the worker population,
/// wait for the stop condition, then drain and report.
///
/// # Errors
///
/// Returns an error on invalid arguments, metrics file creation failure,
/// HTTP client construction failure, or a panicked worker task.
pub async fn run(args: HarnessArgs) -> AppResult<()> {
    validate_target_url(&args.target_url)?;
    if args.movers_per_event == 0 && args.watchers_per_event == 0 {
        return Err(ValidationError::NoWorkers.into());
    }
    let event_ids = resolve_event_ids(args.events.get(), &args.event_ids)?;

    let writer = MetricsWriter::create(
        Path::new(&args.mover_metrics_file),
        Path::new(&args.watcher_metrics_file),
    )
    .await?;

    let (shutdown_tx, mut shutdown_rx) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);

    let (outcome_tx, outcome_rx) = mpsc::channel(args.buffer_size.get());
    let aggregator = spawn_aggregator(writer, outcome_rx);

    info!(
        "Starting harness against {}: {} event(s), {} mover(s) and {} watcher(s) per event, update interval {:?}",
        args.target_url,
        event_ids.len(),
        args.movers_per_event,
        args.watchers_per_event,
        args.update_interval
    );

    let workers = spawn_workers(&args, &event_ids, &outcome_tx, &shutdown_tx)?;

    match args.duration {
        Some(duration) => {
            tokio::select! {
                _ = tokio::time::sleep(duration) => {
                    info!("Run duration elapsed, shutting down");
                    drop(shutdown_tx.send(()));
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received");
                }
            }
        }
        None => {
            drop(shutdown_rx.recv().await);
            info!("Shutdown signal received");
        }
    }

    // A signal that fired before a worker subscribed is not queued for it;
    // broadcast again so every receiver observes the stop.
    drop(shutdown_tx.send(()));

    // Workers finish their in-flight operation and emissions before the
    // channel is closed, so the aggregator sees every produced outcome.
    for worker in workers {
        worker.await?;
    }
    drop(outcome_tx);

    let report = aggregator.await?;
    signal_handle.await?;
    info!(
        "Run complete: {} outcome(s) recorded, {} failure(s), {} sink error(s)",
        report.outcomes, report.failures, report.sink_errors
    );
    Ok(())
}

fn spawn_workers(
    args: &HarnessArgs,
    event_ids: &[String],
    outcome_tx: &mpsc::Sender<crate::metrics::Outcome>,
    shutdown_tx: &ShutdownSender,
) -> AppResult<Vec<JoinHandle<()>>> {
    let client = mover::build_client()?;
    let mut workers = Vec::new();

    for event_id in event_ids {
        for _ in 0..args.movers_per_event {
            let mover = Mover::new(
                event_id.clone(),
                Uuid::new_v4().to_string(),
                &args.target_url,
                client.clone(),
            );
            workers.push(tokio::spawn(mover.run(
                args.update_interval,
                outcome_tx.clone(),
                shutdown_tx.subscribe(),
            )));
        }
    }
    for (event_id, number) in watcher_assignments(event_ids, args.watchers_per_event) {
        let watcher = Watcher::new(event_id, number, &args.target_url);
        workers.push(tokio::spawn(
            watcher.run(outcome_tx.clone(), shutdown_tx.subscribe()),
        ));
    }
    Ok(workers)
}

/// Watcher ordinals run across the whole population in spawn order, not per
/// event.
fn watcher_assignments(event_ids: &[String], per_event: usize) -> Vec<(String, u32)> {
    let mut assignments = Vec::with_capacity(event_ids.len().saturating_mul(per_event));
    let mut number: u32 = 0;
    for event_id in event_ids {
        for _ in 0..per_event {
            number = number.saturating_add(1);
            assignments.push((event_id.clone(), number));
        }
    }
    assignments
}

fn validate_target_url(target_url: &str) -> Result<(), ValidationError> {
    let url = Url::parse(target_url)?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ValidationError::TargetScheme {
            scheme: other.to_owned(),
        }),
    }
}

/// Use the provided event IDs when given (trimmed, count must match
/// `--events`), otherwise generate fresh UUIDs.
fn resolve_event_ids(expected: usize, provided: &[String]) -> Result<Vec<String>, ValidationError> {
    if provided.is_empty() {
        return Ok((0..expected).map(|_| Uuid::new_v4().to_string()).collect());
    }
    if provided.len() != expected {
        return Err(ValidationError::EventCountMismatch {
            provided: provided.len(),
            expected,
        });
    }
    let mut ids = Vec::with_capacity(provided.len());
    for (index, id) in provided.iter().enumerate() {
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyEventId {
                position: index + 1,
            });
        }
        ids.push(trimmed.to_owned());
    }
    Ok(ids)
}
