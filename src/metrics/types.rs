use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Identity of the worker that produced an outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerId {
    /// Mover client id (UUID).
    Mover(String),
    /// Watcher ordinal, assigned across the whole population in spawn
    /// order, starting at 1.
    Watcher(u32),
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerId::Mover(id) => f.write_str(id),
            WorkerId::Watcher(number) => write!(f, "{}", number),
        }
    }
}

#[derive(Debug, Clone)]
pub enum OutcomeKind {
    /// One position-update round trip.
    Update { response_time: Duration },
    /// One broadcast batch received on a stream. `latency_ms` is signed:
    /// local clock skew can make it non-positive and it is never clamped.
    Broadcast {
        message_count: u64,
        latency_ms: i64,
        mover_ids: Vec<String>,
    },
}

/// One measured operation from a simulated client. `error` is the
/// authoritative failure indicator; a failure outcome may still carry
/// partial counters (messages received before the failure).
#[derive(Debug, Clone)]
pub struct Outcome {
    pub event_id: String,
    pub worker: WorkerId,
    pub timestamp: DateTime<Utc>,
    pub kind: OutcomeKind,
    pub error: Option<String>,
}

impl Outcome {
    #[must_use]
    pub fn update_success(
        event_id: String,
        mover_id: String,
        timestamp: DateTime<Utc>,
        response_time: Duration,
    ) -> Self {
        Self {
            event_id,
            worker: WorkerId::Mover(mover_id),
            timestamp,
            kind: OutcomeKind::Update { response_time },
            error: None,
        }
    }

    #[must_use]
    pub fn update_failure(
        event_id: String,
        mover_id: String,
        timestamp: DateTime<Utc>,
        response_time: Duration,
        error: String,
    ) -> Self {
        Self {
            event_id,
            worker: WorkerId::Mover(mover_id),
            timestamp,
            kind: OutcomeKind::Update { response_time },
            error: Some(error),
        }
    }

    #[must_use]
    pub fn broadcast_success(
        event_id: String,
        watcher_number: u32,
        timestamp: DateTime<Utc>,
        message_count: u64,
        latency_ms: i64,
        mover_ids: Vec<String>,
    ) -> Self {
        Self {
            event_id,
            worker: WorkerId::Watcher(watcher_number),
            timestamp,
            kind: OutcomeKind::Broadcast {
                message_count,
                latency_ms,
                mover_ids,
            },
            error: None,
        }
    }

    #[must_use]
    pub fn broadcast_failure(
        event_id: String,
        watcher_number: u32,
        timestamp: DateTime<Utc>,
        message_count: u64,
        error: String,
    ) -> Self {
        Self {
            event_id,
            worker: WorkerId::Watcher(watcher_number),
            timestamp,
            kind: OutcomeKind::Broadcast {
                message_count,
                latency_ms: 0,
                mover_ids: Vec::new(),
            },
            error: Some(error),
        }
    }

    #[must_use]
    pub const fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}
