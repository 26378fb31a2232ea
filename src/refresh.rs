//! Clock abstraction and the cancellable fixed-cadence refresh schedule.

use chrono::{DateTime, Duration, Utc};

/// Upper bound on overdue ticks delivered in one poll. Anything beyond is
/// skipped so a suspended process does not replay hours of ticks on wake.
const MAX_CATCH_UP: usize = 64;

/// Source of wall-clock time for the panel.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Simulated clock that only moves when told to.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: std::sync::Arc<parking_lot::Mutex<DateTime<Utc>>>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: std::sync::Arc::new(parking_lot::Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: std::time::Duration) {
        let mut now = self.now.lock();
        *now += Duration::milliseconds(by.as_millis() as i64);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// A running refresh schedule. Holding it keeps the schedule alive; dropping
/// it cancels every future tick.
#[derive(Debug)]
pub struct RefreshTask {
    interval: Duration,
    next_due: DateTime<Utc>,
}

impl RefreshTask {
    /// First tick is due one interval after `now`. `interval` must be non-zero.
    pub fn start(now: DateTime<Utc>, interval: std::time::Duration) -> Self {
        let interval = Duration::milliseconds(interval.as_millis().max(1) as i64);
        log::debug!("Refresh task started ({} ms cadence)", interval.num_milliseconds());
        Self {
            interval,
            next_due: now + interval,
        }
    }

    #[inline]
    pub fn next_due(&self) -> DateTime<Utc> {
        self.next_due
    }

    /// Scheduled instants that came due by `now`, oldest first. Each instant
    /// is reported once.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        let mut fired = Vec::new();
        while self.next_due <= now {
            if fired.len() == MAX_CATCH_UP {
                let step = self.interval.num_milliseconds();
                let missed = (now - self.next_due).num_milliseconds() / step + 1;
                log::debug!("Refresh fell behind, skipping {} ticks", missed);
                self.next_due += Duration::milliseconds(step * missed);
                break;
            }
            fired.push(self.next_due);
            self.next_due += self.interval;
        }
        fired
    }
}

impl Drop for RefreshTask {
    fn drop(&mut self) {
        log::debug!("Refresh task cancelled");
    }
}
