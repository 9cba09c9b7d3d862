use std::time::Duration;

use chrono::Utc;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

use crate::error::WorkerError;
use crate::metrics::Outcome;
use crate::shutdown::ShutdownReceiver;

use super::wire::BroadcastBatch;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// The service pings well inside this window; a silent minute means the
/// stream is dead.
const READ_TIMEOUT: Duration = Duration::from_secs(60);
const WRITE_TIMEOUT: Duration = Duration::from_secs(10);
/// Client-side keepalive period, 90% of the read window.
const PING_PERIOD: Duration = Duration::from_secs(54);

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Derive the broadcast stream endpoint from the harness target URL:
/// `http` maps to `ws`, `https` to `wss`, host and port carry over.
///
/// # Errors
///
/// Returns an error if the target URL does not parse, uses a scheme other
/// than `http`/`https`, or has no host.
pub fn derive_stream_url(target_url: &str, event_id: &str) -> Result<Url, WorkerError> {
    let base = Url::parse(target_url)?;
    let scheme = match base.scheme() {
        "http" => "ws",
        "https" => "wss",
        other => {
            return Err(WorkerError::Scheme {
                scheme: other.to_owned(),
            });
        }
    };
    let host = base.host_str().ok_or(WorkerError::MissingHost)?;
    let authority = match base.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_owned(),
    };
    let stream_url = format!("{}://{}/events/{}/stream", scheme, authority, event_id);
    Ok(Url::parse(&stream_url)?)
}

/// A simulated broadcast consumer. Holds one WebSocket stream open and
/// reports an outcome per received batch.
pub struct Watcher {
    event_id: String,
    number: u32,
    target_url: String,
}

impl Watcher {
    #[must_use]
    pub fn new(event_id: String, number: u32, target_url: &str) -> Self {
        Self {
            event_id,
            number,
            target_url: target_url.to_owned(),
        }
    }

    /// Connect, then read batches until the stream ends or shutdown fires.
    ///
    /// Connection-level failures produce one terminal failure outcome; a
    /// malformed batch produces a failure outcome but keeps the stream open.
    /// A clean close from either side ends the loop silently.
    pub async fn run(self, outcome_tx: mpsc::Sender<Outcome>, mut shutdown_rx: ShutdownReceiver) {
        let stream_url = match derive_stream_url(&self.target_url, &self.event_id) {
            Ok(url) => url,
            Err(err) => {
                let outcome = self.failure(0, format!("invalid URL: {}", err));
                send_outcome(&outcome_tx, &mut shutdown_rx, outcome).await;
                return;
            }
        };

        let stream = match timeout(CONNECT_TIMEOUT, connect_async(stream_url.as_str())).await {
            Err(_) => {
                let outcome = self.failure(0, "connection failed: timed out".to_owned());
                send_outcome(&outcome_tx, &mut shutdown_rx, outcome).await;
                return;
            }
            Ok(Err(err)) => {
                let outcome = self.failure(0, format!("connection failed: {}", err));
                send_outcome(&outcome_tx, &mut shutdown_rx, outcome).await;
                return;
            }
            Ok(Ok((stream, _response))) => stream,
        };

        let (sink, mut reader) = stream.split();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let keepalive = tokio::spawn(keepalive_loop(sink, shutdown_rx.resubscribe(), stop_rx));

        let mut message_count: u64 = 0;
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => break,
                frame = timeout(READ_TIMEOUT, reader.next()) => match frame {
                    Err(_) => {
                        let outcome =
                            self.failure(message_count, "connection error: read timed out".to_owned());
                        send_outcome(&outcome_tx, &mut shutdown_rx, outcome).await;
                        break;
                    }
                    Ok(None) | Ok(Some(Err(tungstenite::Error::ConnectionClosed))) => break,
                    Ok(Some(Err(err))) => {
                        let outcome =
                            self.failure(message_count, format!("connection error: {}", err));
                        send_outcome(&outcome_tx, &mut shutdown_rx, outcome).await;
                        break;
                    }
                    Ok(Some(Ok(message))) => {
                        let text = match message {
                            Message::Text(text) => text,
                            Message::Binary(bytes) => match String::from_utf8(bytes) {
                                Ok(text) => text,
                                Err(err) => {
                                    let outcome = self.failure(
                                        message_count,
                                        format!("failed to parse message: {}", err),
                                    );
                                    if !send_outcome(&outcome_tx, &mut shutdown_rx, outcome)
                                        .await
                                    {
                                        break;
                                    }
                                    continue;
                                }
                            },
                            Message::Close(_) => break,
                            // Ping and pong frames only refresh the read window.
                            _ => continue,
                        };
                        let received = Utc::now();
                        match serde_json::from_str::<BroadcastBatch>(&text) {
                            Err(err) => {
                                let outcome = self.failure(
                                    message_count,
                                    format!("failed to parse message: {}", err),
                                );
                                if !send_outcome(&outcome_tx, &mut shutdown_rx, outcome).await {
                                    break;
                                }
                            }
                            Ok(batch) => {
                                message_count = message_count.saturating_add(1);
                                let latency_ms =
                                    received.timestamp_millis().saturating_sub(batch.server_time);
                                let outcome = Outcome::broadcast_success(
                                    self.event_id.clone(),
                                    self.number,
                                    received,
                                    message_count,
                                    latency_ms,
                                    batch.distinct_mover_ids(),
                                );
                                if !send_outcome(&outcome_tx, &mut shutdown_rx, outcome).await {
                                    break;
                                }
                            }
                        }
                    }
                }
            }
        }

        drop(stop_tx);
        drop(keepalive.await);
    }

    fn failure(&self, message_count: u64, error: String) -> Outcome {
        Outcome::broadcast_failure(
            self.event_id.clone(),
            self.number,
            Utc::now(),
            message_count,
            error,
        )
    }
}

/// Race the bounded send against shutdown; a send in flight completes, a
/// send attempted after shutdown is dropped. Returns false when the worker
/// should stop emitting.
async fn send_outcome(
    outcome_tx: &mpsc::Sender<Outcome>,
    shutdown_rx: &mut ShutdownReceiver,
    outcome: Outcome,
) -> bool {
    tokio::select! {
        _ = shutdown_rx.recv() => false,
        sent = outcome_tx.send(outcome) => sent.is_ok(),
    }
}

/// Owns the write half: periodic pings, then one best-effort close frame on
/// the way out. The reader signals exit by dropping its stop handle.
async fn keepalive_loop(
    mut sink: WsSink,
    mut shutdown_rx: ShutdownReceiver,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let mut ticker =
        tokio::time::interval_at(tokio::time::Instant::now() + PING_PERIOD, PING_PERIOD);
    loop {
        tokio::select! {
            _ = &mut stop_rx => break,
            _ = shutdown_rx.recv() => break,
            _ = ticker.tick() => {
                match timeout(WRITE_TIMEOUT, sink.send(Message::Ping(Vec::new()))).await {
                    Ok(Ok(())) => {}
                    _ => return,
                }
            }
        }
    }
    drop(timeout(WRITE_TIMEOUT, sink.send(Message::Close(None))).await);
}
