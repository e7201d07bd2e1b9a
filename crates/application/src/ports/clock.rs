use chrono::{DateTime, Utc};

/// Source of wall-clock time for freshness checks and timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
