pub mod poller;
pub mod sink;
pub mod stats;

pub use poller::{AlertPoller, SessionHandle, DEFAULT_POLL_INTERVAL};
pub use sink::{alert_slot, AlertSink, DesktopAlertSink};
pub use stats::{PollStats, StatsCollector};
