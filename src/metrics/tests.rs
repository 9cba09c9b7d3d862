use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;

use super::{AggregatorReport, MetricsWriter, Outcome, spawn_aggregator};

fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

fn scratch_paths() -> Result<(tempfile::TempDir, PathBuf, PathBuf), String> {
    let dir = tempfile::tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let movers = dir.path().join("mover-metrics.csv");
    let watchers = dir.path().join("watcher-metrics.csv");
    Ok((dir, movers, watchers))
}

async fn read_lines(path: &PathBuf) -> Result<Vec<String>, String> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|err| format!("read {} failed: {}", path.display(), err))?;
    Ok(content.lines().map(str::to_owned).collect())
}

fn sample_update(event_id: &str, error: Option<&str>) -> Outcome {
    let timestamp = Utc::now();
    match error {
        None => Outcome::update_success(
            event_id.to_owned(),
            "mover-1".to_owned(),
            timestamp,
            Duration::from_millis(42),
        ),
        Some(cause) => Outcome::update_failure(
            event_id.to_owned(),
            "mover-1".to_owned(),
            timestamp,
            Duration::from_millis(42),
            cause.to_owned(),
        ),
    }
}

#[test]
fn rows_land_in_the_right_files() -> Result<(), String> {
    run_async_test(async {
        let (_dir, mover_path, watcher_path) = scratch_paths()?;
        let mut writer = MetricsWriter::create(&mover_path, &watcher_path)
            .await
            .map_err(|err| format!("create writer failed: {}", err))?;

        writer
            .write_outcome(&sample_update("evt-a", None))
            .await
            .map_err(|err| format!("write update failed: {}", err))?;
        writer
            .write_outcome(&Outcome::broadcast_success(
                "evt-a".to_owned(),
                1,
                Utc::now(),
                3,
                17,
                vec!["m1".to_owned(), "m2".to_owned()],
            ))
            .await
            .map_err(|err| format!("write broadcast failed: {}", err))?;
        writer
            .close()
            .await
            .map_err(|err| format!("close failed: {}", err))?;

        let mover_lines = read_lines(&mover_path).await?;
        let watcher_lines = read_lines(&watcher_path).await?;
        if mover_lines.len() != 2 || watcher_lines.len() != 2 {
            return Err(format!(
                "unexpected line counts: movers {:?}, watchers {:?}",
                mover_lines, watcher_lines
            ));
        }
        let mover_header = mover_lines
            .first()
            .ok_or_else(|| "missing mover header".to_owned())?;
        if mover_header != "timestamp,event_id,mover_id,response_time_ms,error" {
            return Err(format!("unexpected mover header: {}", mover_header));
        }
        let mover_row = mover_lines
            .get(1)
            .ok_or_else(|| "missing mover row".to_owned())?;
        if !mover_row.contains(",evt-a,mover-1,42.00,") {
            return Err(format!("unexpected mover row: {}", mover_row));
        }
        let watcher_row = watcher_lines
            .get(1)
            .ok_or_else(|| "missing watcher row".to_owned())?;
        if !watcher_row.contains(",evt-a,1,3,17,m1|m2,") {
            return Err(format!("unexpected watcher row: {}", watcher_row));
        }
        Ok(())
    })
}

#[test]
fn error_text_with_delimiters_is_quoted() -> Result<(), String> {
    run_async_test(async {
        let (_dir, mover_path, watcher_path) = scratch_paths()?;
        let mut writer = MetricsWriter::create(&mover_path, &watcher_path)
            .await
            .map_err(|err| format!("create writer failed: {}", err))?;

        writer
            .write_outcome(&sample_update("evt-a", Some("bad, \"worse\"")))
            .await
            .map_err(|err| format!("write failed: {}", err))?;
        writer
            .close()
            .await
            .map_err(|err| format!("close failed: {}", err))?;

        let mover_lines = read_lines(&mover_path).await?;
        let row = mover_lines
            .get(1)
            .ok_or_else(|| "missing mover row".to_owned())?;
        if !row.ends_with("\"bad, \"\"worse\"\"\"") {
            return Err(format!("field not quoted: {}", row));
        }
        Ok(())
    })
}

#[test]
fn aggregator_drains_every_producer_before_exit() -> Result<(), String> {
    run_async_test(async {
        let (_dir, mover_path, watcher_path) = scratch_paths()?;
        let writer = MetricsWriter::create(&mover_path, &watcher_path)
            .await
            .map_err(|err| format!("create writer failed: {}", err))?;

        let (outcome_tx, outcome_rx) = mpsc::channel::<Outcome>(4);
        let aggregator = spawn_aggregator(writer, outcome_rx);

        let mut producers = Vec::new();
        for producer in 0..3u32 {
            let tx = outcome_tx.clone();
            producers.push(tokio::spawn(async move {
                for tick in 0..5u32 {
                    let failed = producer == 0 && tick == 0;
                    let outcome = if failed {
                        sample_update("evt-a", Some("request failed: simulated"))
                    } else {
                        sample_update("evt-a", None)
                    };
                    if tx.send(outcome).await.is_err() {
                        return;
                    }
                }
            }));
        }
        drop(outcome_tx);
        for producer in producers {
            producer
                .await
                .map_err(|err| format!("producer join failed: {}", err))?;
        }

        let report = aggregator
            .await
            .map_err(|err| format!("aggregator join failed: {}", err))?;
        let expected = AggregatorReport {
            outcomes: 15,
            failures: 1,
            sink_errors: 0,
        };
        if report != expected {
            return Err(format!("unexpected report: {:?}", report));
        }

        let mover_lines = read_lines(&mover_path).await?;
        if mover_lines.len() != 16 {
            return Err(format!(
                "expected header + 15 rows, got {}",
                mover_lines.len()
            ));
        }
        Ok(())
    })
}

#[test]
fn capacity_one_channel_loses_nothing() -> Result<(), String> {
    run_async_test(async {
        let (_dir, mover_path, watcher_path) = scratch_paths()?;
        let writer = MetricsWriter::create(&mover_path, &watcher_path)
            .await
            .map_err(|err| format!("create writer failed: {}", err))?;

        let (outcome_tx, outcome_rx) = mpsc::channel::<Outcome>(1);
        let aggregator = spawn_aggregator(writer, outcome_rx);

        for _ in 0..10 {
            outcome_tx
                .send(sample_update("evt-a", None))
                .await
                .map_err(|err| format!("send failed: {}", err))?;
        }
        drop(outcome_tx);

        let report = aggregator
            .await
            .map_err(|err| format!("aggregator join failed: {}", err))?;
        if report.outcomes != 10 || report.failures != 0 {
            return Err(format!("unexpected report: {:?}", report));
        }
        Ok(())
    })
}
