use landwarn_core::{CoreError, ErrorExt, NotificationRecord};
use notification_client::NotificationSource;
use seen_store::SeenStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::sink::AlertSink;
use crate::stats::{PollStats, StatsCollector};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Watches one user's notification feed and raises an alert exactly once per
/// notification id, persisting delivered ids so a restart stays quiet about
/// everything it already announced.
pub struct AlertPoller {
    source: Arc<dyn NotificationSource>,
    store: Arc<dyn SeenStore>,
    sink: Arc<dyn AlertSink>,
}

impl AlertPoller {
    pub fn new(
        source: Arc<dyn NotificationSource>,
        store: Arc<dyn SeenStore>,
        sink: Arc<dyn AlertSink>,
    ) -> Self {
        Self {
            source,
            store,
            sink,
        }
    }

    /// Spawns the polling loop for `user_id`. The first poll happens right
    /// away; each later poll follows the previous one by `interval`.
    pub fn start(&self, user_id: &str, interval: Duration) -> Result<SessionHandle, CoreError> {
        if user_id.trim().is_empty() {
            return Err(CoreError::PreconditionFailed {
                message: "user id must not be empty".to_string(),
            });
        }

        let session_id = Uuid::new_v4();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let stats = Arc::new(StatsCollector::new());

        let worker = PollWorker {
            source: Arc::clone(&self.source),
            store: Arc::clone(&self.store),
            sink: Arc::clone(&self.sink),
            user_id: user_id.to_string(),
            session_id,
            stats: Arc::clone(&stats),
            shutdown: shutdown_rx,
        };

        info!(
            "Starting poll session {} for user {} (interval {:?})",
            session_id, user_id, interval
        );
        let join = tokio::spawn(worker.run(interval));

        Ok(SessionHandle {
            session_id,
            shutdown: shutdown_tx,
            join: Mutex::new(Some(join)),
            stats,
        })
    }
}

/// Handle to a running poll session. Dropping it requests cancellation too;
/// [`SessionHandle::stop`] additionally waits for the loop to finish.
pub struct SessionHandle {
    session_id: Uuid,
    shutdown: watch::Sender<bool>,
    join: Mutex<Option<JoinHandle<()>>>,
    stats: Arc<StatsCollector>,
}

impl SessionHandle {
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub async fn is_running(&self) -> bool {
        self.join
            .lock()
            .await
            .as_ref()
            .map_or(false, |join| !join.is_finished())
    }

    /// Signals the loop and waits for it to exit. Safe to call more than
    /// once; later calls return immediately.
    pub async fn stop(&self) -> Result<(), CoreError> {
        let _ = self.shutdown.send(true);

        let join = self.join.lock().await.take();
        if let Some(join) = join {
            join.await.map_err(|e| CoreError::Internal {
                message: format!("poll task failed to join: {}", e),
            })?;
        }
        Ok(())
    }

    pub async fn stats(&self) -> PollStats {
        self.stats.get_stats().await
    }
}

struct PollWorker {
    source: Arc<dyn NotificationSource>,
    store: Arc<dyn SeenStore>,
    sink: Arc<dyn AlertSink>,
    user_id: String,
    session_id: Uuid,
    stats: Arc<StatsCollector>,
    shutdown: watch::Receiver<bool>,
}

impl PollWorker {
    /// True once stop was signalled or every handle was dropped.
    fn cancelled(&self) -> bool {
        *self.shutdown.borrow() || self.shutdown.has_changed().is_err()
    }

    async fn run(mut self, interval: Duration) {
        loop {
            if self.cancelled() {
                break;
            }

            let fetched = tokio::select! {
                result = self.source.fetch(&self.user_id) => result,
                _ = self.shutdown.changed() => break,
            };

            // A stop that lands while the request is in flight must not
            // produce any further effects.
            if self.cancelled() {
                break;
            }

            match fetched {
                Ok(records) => {
                    let count = records.len();
                    match self.dispatch(records).await {
                        Ok(()) => self.stats.record_tick(count).await,
                        Err(e) => {
                            warn!("Session {}: tick aborted: {}", self.session_id, e);
                            self.stats.record_tick_failure().await;
                        }
                    }
                }
                Err(e) => {
                    // A failed poll skips this tick; the loop itself stays up.
                    if e.is_transient() {
                        warn!("Session {}: poll failed: {}", self.session_id, e);
                    } else {
                        e.log_error();
                    }
                    self.stats.record_tick_failure().await;
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = self.shutdown.changed() => break,
            }
        }

        info!("Poll session {} stopped", self.session_id);
    }

    async fn dispatch(&self, records: Vec<NotificationRecord>) -> Result<(), CoreError> {
        debug!(
            "Session {}: fetched {} notifications",
            self.session_id,
            records.len()
        );

        for record in records {
            if !record.has_id() {
                debug!(
                    "Session {}: skipping notification without id",
                    self.session_id
                );
                continue;
            }
            if self.store.contains(&record.notification_id).await? {
                continue;
            }

            info!(
                "Session {}: new notification {} ({})",
                self.session_id, record.notification_id, record.title
            );

            // Alert first, then persist; an id is marked seen only after its
            // alert attempt. A delivery failure does not block the marker.
            if let Err(e) = self.sink.deliver(&record).await {
                warn!(
                    "Session {}: delivery failed for {}: {}",
                    self.session_id, record.notification_id, e
                );
                self.stats.record_delivery_failure().await;
            } else {
                self.stats.record_alert().await;
            }

            self.store.insert(&record.notification_id).await?;
        }

        Ok(())
    }
}
