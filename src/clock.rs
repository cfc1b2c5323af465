use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// Source of "now" for toasts and refresh timers.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// The runtime's clock; follows `tokio::time::pause` and `advance`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    elapsed_ms: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Arc<Self> {
        Arc::new(ManualClock {
            origin: Instant::now(),
            elapsed_ms: AtomicU64::new(0),
        })
    }

    pub fn advance(&self, by: Duration) {
        self.elapsed_ms
            .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + Duration::from_millis(self.elapsed_ms.load(Ordering::SeqCst))
    }
}

/// Fixed-interval re-fetch schedule
///
/// Cancelling drops the deadline; nothing fires until `start` is called again.
#[derive(Debug, Clone)]
pub struct RefreshTimer {
    interval: Duration,
    deadline: Option<Instant>,
}

impl RefreshTimer {
    pub fn new(interval: Duration) -> Self {
        RefreshTimer {
            interval,
            deadline: None,
        }
    }

    /// (Re)start the schedule from `now`; an existing deadline is replaced.
    pub fn start(&mut self, now: Instant) {
        self.deadline = Some(now + self.interval);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_running(&self) -> bool {
        self.deadline.is_some()
    }

    /// True once per elapsed deadline; the next deadline is scheduled from `now`.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }
}
