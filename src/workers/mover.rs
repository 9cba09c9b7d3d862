use std::time::{Duration, Instant};

use chrono::Utc;
use rand::Rng;
use reqwest::{Client, StatusCode};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::metrics::Outcome;
use crate::shutdown::ShutdownReceiver;

/// Movers start inside a 0.1 x 0.1 degree square over central London.
const START_LATITUDE: f64 = 51.5074;
const START_LONGITUDE: f64 = -0.1278;
const START_SPREAD: f64 = 0.1;
/// Maximum per-tick movement in degrees, roughly ten metres of GPS drift.
const MOVEMENT_DELTA: f64 = 0.000_1;
const HTTP_CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Geographic coordinate owned by a single mover.
#[derive(Debug, Clone, Copy)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

/// A simulated position-reporting client. Owns its state exclusively; the
/// only shared handle is the cloned HTTP client pool.
pub struct Mover {
    event_id: String,
    mover_id: String,
    position: Position,
    client: Client,
    base_url: String,
}

/// Build the HTTP client movers share, with the harness-wide request timeout.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn build_client() -> reqwest::Result<Client> {
    Client::builder().timeout(HTTP_CLIENT_TIMEOUT).build()
}

impl Mover {
    #[must_use]
    pub fn new(event_id: String, mover_id: String, base_url: &str, client: Client) -> Self {
        let mut rng = rand::thread_rng();
        Self {
            event_id,
            mover_id,
            position: Position {
                latitude: START_LATITUDE + rng.gen_range(0.0..START_SPREAD),
                longitude: START_LONGITUDE + rng.gen_range(0.0..START_SPREAD),
            },
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Nudge both axes independently by a uniform delta within
    /// +-`MOVEMENT_DELTA`/2.
    pub fn perturb(&mut self) {
        let mut rng = rand::thread_rng();
        self.position.latitude += rng.gen_range(-0.5..0.5) * MOVEMENT_DELTA;
        self.position.longitude += rng.gen_range(-0.5..0.5) * MOVEMENT_DELTA;
    }

    /// Send the current position and classify the result. Never fails as a
    /// value: every path produces exactly one outcome.
    pub async fn submit(&self) -> Outcome {
        let timestamp = Utc::now();
        let start = Instant::now();
        let url = format!(
            "{}/events/{}/movers/{}",
            self.base_url, self.event_id, self.mover_id
        );
        let body = serde_json::json!({
            "coordinates": [self.position.longitude, self.position.latitude]
        });

        let response = self.client.put(&url).json(&body).send().await;
        let response_time = start.elapsed();

        match response {
            Err(err) => Outcome::update_failure(
                self.event_id.clone(),
                self.mover_id.clone(),
                timestamp,
                response_time,
                format!("request failed: {}", err),
            ),
            Ok(response) if response.status() != StatusCode::ACCEPTED => Outcome::update_failure(
                self.event_id.clone(),
                self.mover_id.clone(),
                timestamp,
                response_time,
                format!("unexpected status: {}", response.status().as_u16()),
            ),
            Ok(_) => Outcome::update_success(
                self.event_id.clone(),
                self.mover_id.clone(),
                timestamp,
                response_time,
            ),
        }
    }

    /// Tick loop: perturb, submit, emit one outcome, repeat. The bounded send
    /// blocks when the aggregator falls behind (deliberate backpressure);
    /// stop is observed between ticks.
    pub async fn run(
        mut self,
        update_interval: Duration,
        outcome_tx: mpsc::Sender<Outcome>,
        mut shutdown_rx: ShutdownReceiver,
    ) {
        let mut ticker = tokio::time::interval(update_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => return,
                _ = ticker.tick() => {
                    self.perturb();
                    let outcome = self.submit().await;
                    if outcome_tx.send(outcome).await.is_err() {
                        return;
                    }
                }
            }
        }
    }
}
