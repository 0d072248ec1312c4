use chrono::{DateTime, Local, Utc};

/// Abstraction over "current time" so services behave deterministically in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Current moment in the server's local timezone, which defines what
    /// "today" means for check-ins.
    fn now_local(&self) -> DateTime<Local> {
        self.now().with_timezone(&Local)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}
