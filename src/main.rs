use alert_poller::{AlertPoller, DesktopAlertSink};
use landwarn_core::{AppConfig, CoreError};
use notification_client::HttpNotificationSource;
use seen_store::SqliteSeenStore;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), CoreError> {
    tracing_subscriber::fmt()
        .with_env_filter("landwarn=debug,alert_poller=debug,notification_client=debug,seen_store=debug")
        .init();

    tracing::info!("Starting Landwarn - Landslide Alert Watcher");

    let config = AppConfig::load()?;

    // Sign-in and the platform notification-permission prompt belong to the
    // host app; the only gate left here is the account itself.
    if !config.can_receive_alerts() {
        tracing::info!(
            "Account '{}' (role '{}') does not receive alerts; exiting",
            config.user_id,
            config.role
        );
        return Ok(());
    }

    let source = Arc::new(HttpNotificationSource::with_timeout(
        &config.base_url,
        config.user_agent.clone(),
        config.request_timeout(),
    ));
    let store = Arc::new(SqliteSeenStore::open(&config.db_path).await?);
    let sink = Arc::new(DesktopAlertSink::new());

    let poller = AlertPoller::new(source, store, sink);
    let session = poller.start(&config.user_id, config.poll_interval())?;
    tracing::info!(
        "Watching alerts for {} every {:?} (session {})",
        config.user_id,
        config.poll_interval(),
        session.session_id()
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("Received ctrl-c, shutting down");

    session.stop().await?;
    let stats = session.stats().await;
    tracing::info!(
        "Stopped after {} polls ({} failed), {} alerts delivered",
        stats.ticks_completed + stats.ticks_failed,
        stats.ticks_failed,
        stats.alerts_delivered
    );
    Ok(())
}
