//! Per-station print lanes
//!
//! Jobs for one station are transmitted one after another, in arrival
//! order; different stations never wait on each other.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One FIFO lane per station id
#[derive(Debug, Default)]
pub struct StationQueues {
    lanes: DashMap<String, Arc<Mutex<()>>>,
}

impl StationQueues {
    pub fn new() -> Self {
        Self::default()
    }

    fn lane(&self, station_id: &str) -> Arc<Mutex<()>> {
        if let Some(lane) = self.lanes.get(station_id) {
            return lane.clone();
        }
        self.lanes
            .entry(station_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Wait for the station's turn
    ///
    /// tokio's mutex queues waiters fairly, so turns are granted in call order.
    /// The lane stays held until the guard is dropped.
    pub async fn acquire(&self, station_id: &str) -> OwnedMutexGuard<()> {
        self.lane(station_id).lock_owned().await
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_station_runs_in_order() {
        let queues = Arc::new(StationQueues::new());
        let log = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let first = queues.acquire("grill").await;

        let mut handles = Vec::new();
        for n in 0..3 {
            let queues = queues.clone();
            let log = log.clone();
            handles.push(tokio::spawn(async move {
                let _turn = queues.acquire("grill").await;
                log.lock().push(n);
            }));
            // Let the task reach the lane before spawning the next one
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        drop(first);
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(*log.lock(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_stations_are_independent() {
        let queues = StationQueues::new();
        let _grill = queues.acquire("grill").await;

        let bar = tokio::time::timeout(Duration::from_millis(100), queues.acquire("bar")).await;
        assert!(bar.is_ok());
        assert_eq!(queues.lane_count(), 2);
    }
}
