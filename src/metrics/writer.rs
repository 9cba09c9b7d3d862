use std::borrow::Cow;
use std::fmt::Write as _;
use std::path::Path;

use tokio::{
    fs::File,
    io::{AsyncWriteExt, BufWriter},
};

use crate::error::MetricsError;

use super::types::{Outcome, OutcomeKind};

const MOVER_HEADER: &str = "timestamp,event_id,mover_id,response_time_ms,error\n";
const WATCHER_HEADER: &str =
    "timestamp,event_id,watcher_number,message_count,latency_ms,mover_ids,error\n";

/// Mover rows arrive seconds apart, so every row is flushed; watcher rows can
/// arrive per broadcast tick and are flushed in small batches.
const MOVER_FLUSH_EVERY: usize = 1;
const WATCHER_FLUSH_EVERY: usize = 10;

struct RecordFile {
    writer: BufWriter<File>,
    flush_every: usize,
    unflushed: usize,
}

impl RecordFile {
    async fn create(path: &Path, header: &str, flush_every: usize) -> Result<Self, MetricsError> {
        let file = File::create(path).await.map_err(|err| MetricsError::Io {
            context: "create metrics file",
            source: err,
        })?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(header.as_bytes())
            .await
            .map_err(|err| MetricsError::Io {
                context: "write metrics header",
                source: err,
            })?;
        writer.flush().await.map_err(|err| MetricsError::Io {
            context: "flush metrics header",
            source: err,
        })?;
        Ok(Self {
            writer,
            flush_every,
            unflushed: 0,
        })
    }

    async fn write_row(&mut self, row: &str) -> Result<(), MetricsError> {
        self.writer
            .write_all(row.as_bytes())
            .await
            .map_err(|err| MetricsError::Io {
                context: "write metrics record",
                source: err,
            })?;
        self.unflushed = self.unflushed.saturating_add(1);
        if self.unflushed >= self.flush_every {
            self.writer.flush().await.map_err(|err| MetricsError::Io {
                context: "flush metrics records",
                source: err,
            })?;
            self.unflushed = 0;
        }
        Ok(())
    }

    async fn close(mut self) -> Result<(), MetricsError> {
        self.writer.flush().await.map_err(|err| MetricsError::Io {
            context: "flush metrics file",
            source: err,
        })
    }
}

/// The outcome sink: two append-only CSV files, one per worker population.
pub struct MetricsWriter {
    movers: RecordFile,
    watchers: RecordFile,
}

impl MetricsWriter {
    /// Create both CSV files and write their headers.
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be created or the headers
    /// cannot be written.
    pub async fn create(mover_path: &Path, watcher_path: &Path) -> Result<Self, MetricsError> {
        Ok(Self {
            movers: RecordFile::create(mover_path, MOVER_HEADER, MOVER_FLUSH_EVERY).await?,
            watchers: RecordFile::create(watcher_path, WATCHER_HEADER, WATCHER_FLUSH_EVERY).await?,
        })
    }

    /// Append one outcome as a CSV row to the file for its population.
    ///
    /// # Errors
    ///
    /// Returns an error if the row cannot be formatted or written; callers
    /// treat this as non-fatal.
    pub async fn write_outcome(&mut self, outcome: &Outcome) -> Result<(), MetricsError> {
        let row = format_row(outcome)?;
        match &outcome.kind {
            OutcomeKind::Update { .. } => self.movers.write_row(&row).await,
            OutcomeKind::Broadcast { .. } => self.watchers.write_row(&row).await,
        }
    }

    /// Flush both files.
    ///
    /// # Errors
    ///
    /// Returns the first flush error encountered.
    pub async fn close(self) -> Result<(), MetricsError> {
        self.movers.close().await?;
        self.watchers.close().await
    }
}

fn format_row(outcome: &Outcome) -> Result<String, MetricsError> {
    let mut row = String::new();
    let error_text = outcome.error.as_deref().unwrap_or_default();
    match &outcome.kind {
        OutcomeKind::Update { response_time } => {
            writeln!(
                &mut row,
                "{},{},{},{:.2},{}",
                outcome.timestamp.to_rfc3339(),
                csv_field(&outcome.event_id),
                csv_field(&outcome.worker.to_string()),
                response_time.as_secs_f64() * 1000.0,
                csv_field(error_text),
            )?;
        }
        OutcomeKind::Broadcast {
            message_count,
            latency_ms,
            mover_ids,
        } => {
            writeln!(
                &mut row,
                "{},{},{},{},{},{},{}",
                outcome.timestamp.to_rfc3339(),
                csv_field(&outcome.event_id),
                outcome.worker,
                message_count,
                latency_ms,
                csv_field(&mover_ids.join("|")),
                csv_field(error_text),
            )?;
        }
    }
    Ok(row)
}

/// Quote a field only when it would break the row.
fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}
