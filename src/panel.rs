//! StatsPanel: owns the held snapshot and its refresh schedule.

use crate::refresh::{Clock, RefreshTask};
use crate::stats::{
    compute_allowance_remaining, compute_reset_boundary, compute_snapshot, Quota, StatsSnapshot,
};
use chrono::{DateTime, Utc};
use rand::{rngs::StdRng, SeedableRng};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    Inactive,
    Active,
}

pub struct StatsPanel<C: Clock> {
    clock: C,
    epoch: DateTime<Utc>,
    interval: Duration,
    rng: StdRng,
    snapshot: StatsSnapshot,
    /// Present exactly while the panel is active.
    task: Option<RefreshTask>,
    refreshes: u64,
}

impl<C: Clock> StatsPanel<C> {
    pub fn new(clock: C, epoch: DateTime<Utc>, interval: Duration) -> Self {
        Self::with_rng(clock, epoch, interval, StdRng::from_entropy())
    }

    pub fn with_rng(clock: C, epoch: DateTime<Utc>, interval: Duration, rng: StdRng) -> Self {
        let snapshot = StatsSnapshot::empty(clock.now());
        Self {
            clock,
            epoch,
            interval,
            rng,
            snapshot,
            task: None,
            refreshes: 0,
        }
    }

    #[inline]
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn state(&self) -> PanelState {
        if self.task.is_some() {
            PanelState::Active
        } else {
            PanelState::Inactive
        }
    }

    /// Mount: start the refresh schedule. No-op when already active.
    pub fn activate(&mut self) {
        if self.task.is_none() {
            self.task = Some(RefreshTask::start(self.clock.now(), self.interval));
            log::info!("Stats panel active");
        }
    }

    /// Unmount: cancel the schedule. Safe to call repeatedly.
    pub fn deactivate(&mut self) {
        if self.task.take().is_some() {
            log::info!("Stats panel inactive");
        }
    }

    /// Run every tick that has come due. Returns how many snapshots were
    /// replaced; always zero while inactive.
    pub fn poll(&mut self) -> usize {
        let Some(task) = self.task.as_mut() else {
            return 0;
        };
        let due = task.poll(self.clock.now());
        for at in &due {
            self.snapshot = compute_snapshot(*at, self.epoch, &mut self.rng);
            self.refreshes += 1;
            log::trace!(
                "Snapshot refreshed at {}: sent={} received={} failed={}",
                at,
                self.snapshot.sent,
                self.snapshot.received,
                self.snapshot.failed_attempts
            );
        }
        due.len()
    }

    /// Time until the next tick, for sizing the event-loop poll timeout.
    pub fn until_next_tick(&self) -> Option<Duration> {
        self.task.as_ref().map(|task| {
            (task.next_due() - self.clock.now())
                .to_std()
                .unwrap_or(Duration::ZERO)
        })
    }

    #[inline]
    pub fn snapshot(&self) -> &StatsSnapshot {
        &self.snapshot
    }

    #[inline]
    pub fn allowance_remaining(&self, quota: Quota) -> u64 {
        compute_allowance_remaining(self.snapshot.sent, quota)
    }

    #[inline]
    pub fn reset_boundary(&self, reset_hour_utc: u32) -> DateTime<Utc> {
        compute_reset_boundary(self.clock.now(), reset_hour_utc)
    }

    #[inline]
    pub fn refreshes(&self) -> u64 {
        self.refreshes
    }
}
