use chrono::{DateTime, Utc};

/// Source of "now" for scheduling and timestamps.
///
/// Services hold an `Arc<dyn Clock>` so tests can pin the time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock of the running server
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
