use serde::Deserialize;

/// One mover position inside a broadcast frame.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastLocation {
    pub mover_id: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Per-entry capture time, epoch milliseconds.
    pub timestamp: i64,
}

/// Batch of positions the service pushes to every watcher on a stream.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastBatch {
    pub locations: Vec<BroadcastLocation>,
    /// Batch origination time on the service, epoch milliseconds.
    pub server_time: i64,
}

impl BroadcastBatch {
    /// Distinct mover ids in first-seen order.
    #[must_use]
    pub fn distinct_mover_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::with_capacity(self.locations.len());
        for location in &self.locations {
            if !ids.iter().any(|id| id == &location.mover_id) {
                ids.push(location.mover_id.clone());
            }
        }
        ids
    }
}
