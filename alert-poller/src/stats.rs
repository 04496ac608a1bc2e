use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PollStats {
    pub ticks_completed: u64,
    pub ticks_failed: u64,
    pub notifications_fetched: u64,
    pub alerts_delivered: u64,
    pub delivery_failures: u64,
    pub last_tick_time: Option<SystemTime>,
    pub last_alert_time: Option<SystemTime>,
}

impl PollStats {
    pub fn tick_success_rate(&self) -> f64 {
        let total = self.ticks_completed + self.ticks_failed;
        if total == 0 {
            0.0
        } else {
            self.ticks_completed as f64 / total as f64
        }
    }
}

#[derive(Debug)]
pub struct StatsCollector {
    stats: RwLock<PollStats>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self {
            stats: RwLock::new(PollStats::default()),
        }
    }

    pub async fn record_tick(&self, fetched: usize) {
        let mut stats = self.stats.write().await;
        stats.ticks_completed += 1;
        stats.notifications_fetched += fetched as u64;
        stats.last_tick_time = Some(SystemTime::now());
    }

    pub async fn record_tick_failure(&self) {
        let mut stats = self.stats.write().await;
        stats.ticks_failed += 1;
        stats.last_tick_time = Some(SystemTime::now());
    }

    pub async fn record_alert(&self) {
        let mut stats = self.stats.write().await;
        stats.alerts_delivered += 1;
        stats.last_alert_time = Some(SystemTime::now());
    }

    pub async fn record_delivery_failure(&self) {
        let mut stats = self.stats.write().await;
        stats.delivery_failures += 1;
    }

    pub async fn get_stats(&self) -> PollStats {
        self.stats.read().await.clone()
    }

    pub async fn reset_stats(&self) {
        let mut stats = self.stats.write().await;
        *stats = PollStats::default();
    }

    pub async fn export_stats(&self) -> Result<String, serde_json::Error> {
        let stats = self.get_stats().await;
        serde_json::to_string_pretty(&stats)
    }
}

impl Default for StatsCollector {
    fn default() -> Self {
        Self::new()
    }
}
