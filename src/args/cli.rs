use clap::Parser;
use std::time::Duration;

use super::parsers::{parse_duration_arg, parse_positive_usize};
use super::types::PositiveUsize;

const DEFAULT_EVENTS: &str = "1";
const DEFAULT_BUFFER_SIZE: &str = "1000";

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Load-generation harness for live location-tracking services: simulated movers pushing position updates over HTTP and watchers consuming streamed broadcasts over WebSocket, with per-operation CSV metrics."
)]
pub struct HarnessArgs {
    /// Target base URL of the tracking service (http or https)
    #[arg(long = "target-url", short = 'u')]
    pub target_url: String,

    /// Number of events (groups) to simulate
    #[arg(long, default_value = DEFAULT_EVENTS, value_parser = parse_positive_usize)]
    pub events: PositiveUsize,

    /// Comma-separated event IDs to reuse; random UUIDs are generated otherwise
    #[arg(long = "event-ids", value_delimiter = ',')]
    pub event_ids: Vec<String>,

    /// Number of movers per event
    #[arg(long = "movers-per-event", default_value_t = 10)]
    pub movers_per_event: usize,

    /// Number of watchers per event
    #[arg(long = "watchers-per-event", default_value_t = 0)]
    pub watchers_per_event: usize,

    /// Interval between position updates (supports ms/s/m/h)
    #[arg(long = "update-interval", default_value = "3s", value_parser = parse_duration_arg)]
    pub update_interval: Duration,

    /// Output CSV file for mover metrics
    #[arg(long = "mover-metrics-file", default_value = "mover-metrics.csv")]
    pub mover_metrics_file: String,

    /// Output CSV file for watcher metrics
    #[arg(long = "watcher-metrics-file", default_value = "watcher-metrics.csv")]
    pub watcher_metrics_file: String,

    /// Capacity of the outcome buffer between workers and the aggregator
    #[arg(long = "buffer-size", default_value = DEFAULT_BUFFER_SIZE, value_parser = parse_positive_usize)]
    pub buffer_size: PositiveUsize,

    /// Stop automatically after this long; runs until Ctrl+C otherwise
    #[arg(long = "duration", short = 't', value_parser = parse_duration_arg)]
    pub duration: Option<Duration>,

    /// Enable debug logging
    #[arg(long, short)]
    pub verbose: bool,
}
