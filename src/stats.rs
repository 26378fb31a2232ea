//! Acorn statistics: snapshot generation, daily allowance and reset window.
//!
//! The counts are a placeholder until a real ledger source exists: a bounded
//! random base plus a term that grows with the days elapsed since the epoch.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use rand::Rng;
use std::num::NonZeroU64;

pub const MS_PER_DAY: i64 = 86_400_000;

/// Upper bounds (exclusive) of the random base for each counter.
const SENT_RANGE: u64 = 1000;
const RECEIVED_RANGE: u64 = 1500;
const FAILED_RANGE: u64 = 50;

/// Per-day growth of each counter.
const SENT_PER_DAY: u64 = 10;
const RECEIVED_PER_DAY: u64 = 15;
const FAILED_PER_DAY: u64 = 1;

/// Point-in-time view of a user's acorn activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub sent: u64,
    pub received: u64,
    pub failed_attempts: u64,
    pub captured_at: DateTime<Utc>,
}

impl StatsSnapshot {
    /// Zeroed snapshot shown before the first refresh.
    pub fn empty(captured_at: DateTime<Utc>) -> Self {
        Self {
            sent: 0,
            received: 0,
            failed_attempts: 0,
            captured_at,
        }
    }
}

/// Strictly positive daily allowance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota(NonZeroU64);

impl Quota {
    /// Returns `None` for zero or negative values.
    pub fn new(value: i64) -> Option<Self> {
        u64::try_from(value).ok().and_then(NonZeroU64::new).map(Self)
    }

    #[inline]
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

/// Whole days elapsed since `epoch`, rounded toward negative infinity.
#[inline]
pub fn days_passed(now: DateTime<Utc>, epoch: DateTime<Utc>) -> i64 {
    (now - epoch).num_milliseconds().div_euclid(MS_PER_DAY)
}

/// Build a snapshot for `now`. Before the epoch the linear terms are zero.
pub fn compute_snapshot<R: Rng + ?Sized>(
    now: DateTime<Utc>,
    epoch: DateTime<Utc>,
    rng: &mut R,
) -> StatsSnapshot {
    let days = days_passed(now, epoch).max(0) as u64;

    StatsSnapshot {
        sent: rng.gen_range(0..SENT_RANGE) + days * SENT_PER_DAY,
        received: rng.gen_range(0..RECEIVED_RANGE) + days * RECEIVED_PER_DAY,
        failed_attempts: rng.gen_range(0..FAILED_RANGE) + days * FAILED_PER_DAY,
        captured_at: now,
    }
}

/// Next daily reset at `reset_hour_utc`:00:00.000 UTC.
///
/// Returns today's instant while `now` is strictly before it, otherwise
/// tomorrow's, so the result is always in the future.
pub fn compute_reset_boundary(now: DateTime<Utc>, reset_hour_utc: u32) -> DateTime<Utc> {
    let midnight = now.date_naive().and_time(NaiveTime::MIN).and_utc();
    let today = midnight + Duration::hours(i64::from(reset_hour_utc));
    if now < today {
        today
    } else {
        today + Duration::days(1)
    }
}

/// Units left in the current allowance window, always in `1..=quota`.
#[inline]
pub fn compute_allowance_remaining(sent: u64, quota: Quota) -> u64 {
    let q = quota.get();
    q - sent % q
}

/// Reset time as shown in the card, e.g. `Mon, 10 Mar 2025 11:00:00`.
pub fn format_reset(boundary: DateTime<Utc>) -> String {
    boundary.format("%a, %d %b %Y %H:%M:%S").to_string()
}

/// Epoch as shown in the card subtitle, e.g. `Feb 1, 2025`.
pub fn format_epoch(epoch: DateTime<Utc>) -> String {
    epoch.format("%b %-d, %Y").to_string()
}

#[inline]
pub fn format_number_full(value: u64) -> String {
    let s = value.to_string();
    let len = s.len();

    if len <= 3 {
        return s;
    }

    let mut result = String::with_capacity(len + (len - 1) / 3);
    let bytes = s.as_bytes();

    for (i, &byte) in bytes.iter().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(byte as char);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_reset_before_boundary_is_today() {
        let now = utc(2025, 3, 10, 10, 0);
        assert_eq!(compute_reset_boundary(now, 11), utc(2025, 3, 10, 11, 0));
    }

    #[test]
    fn test_reset_after_boundary_is_tomorrow() {
        let now = utc(2025, 3, 10, 12, 0);
        assert_eq!(compute_reset_boundary(now, 11), utc(2025, 3, 11, 11, 0));
    }

    #[test]
    fn test_reset_at_boundary_rolls_over() {
        let now = utc(2025, 3, 10, 11, 0);
        assert_eq!(compute_reset_boundary(now, 11), utc(2025, 3, 11, 11, 0));
    }

    #[test]
    fn test_reset_stable_within_morning() {
        let early = compute_reset_boundary(utc(2025, 3, 10, 0, 1), 11);
        let late = compute_reset_boundary(utc(2025, 3, 10, 10, 59), 11);
        assert_eq!(early, late);
    }

    #[test]
    fn test_reset_crosses_month_end() {
        let now = utc(2025, 2, 28, 23, 30);
        assert_eq!(compute_reset_boundary(now, 11), utc(2025, 3, 1, 11, 0));
    }

    #[test]
    fn test_days_passed() {
        let epoch = utc(2025, 2, 1, 0, 0);
        assert_eq!(days_passed(epoch, epoch), 0);
        assert_eq!(days_passed(epoch + Duration::days(2), epoch), 2);
        assert_eq!(days_passed(epoch + Duration::hours(47), epoch), 1);
        assert_eq!(days_passed(epoch - Duration::hours(1), epoch), -1);
    }

    #[test]
    fn test_snapshot_linear_terms() {
        let epoch = utc(2025, 2, 1, 0, 0);
        let base = compute_snapshot(epoch, epoch, &mut StdRng::seed_from_u64(7));
        let later = compute_snapshot(
            epoch + Duration::days(2),
            epoch,
            &mut StdRng::seed_from_u64(7),
        );

        assert_eq!(later.sent - base.sent, 20);
        assert_eq!(later.received - base.received, 30);
        assert_eq!(later.failed_attempts - base.failed_attempts, 2);
        assert_eq!(base.captured_at, epoch);
    }

    #[test]
    fn test_snapshot_at_epoch_is_bounded() {
        let epoch = utc(2025, 2, 1, 0, 0);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let s = compute_snapshot(epoch, epoch, &mut rng);
            assert!(s.sent < SENT_RANGE);
            assert!(s.received < RECEIVED_RANGE);
            assert!(s.failed_attempts < FAILED_RANGE);
        }
    }

    #[test]
    fn test_snapshot_before_epoch_has_no_linear_term() {
        let epoch = utc(2025, 2, 1, 0, 0);
        let s = compute_snapshot(epoch - Duration::days(30), epoch, &mut StdRng::seed_from_u64(1));
        assert!(s.sent < SENT_RANGE);
        assert!(s.failed_attempts < FAILED_RANGE);
    }

    #[test]
    fn test_quota_rejects_non_positive() {
        assert!(Quota::new(0).is_none());
        assert!(Quota::new(-1).is_none());
        assert_eq!(Quota::new(30).map(Quota::get), Some(30));
    }

    #[test]
    fn test_allowance_examples() {
        let quota = Quota::new(30).unwrap();
        assert_eq!(compute_allowance_remaining(0, quota), 30);
        assert_eq!(compute_allowance_remaining(29, quota), 1);
        assert_eq!(compute_allowance_remaining(30, quota), 30);
        assert_eq!(compute_allowance_remaining(1045, quota), 5);
    }

    #[test]
    fn test_format_reset_matches_card() {
        assert_eq!(format_reset(utc(2025, 3, 10, 11, 0)), "Mon, 10 Mar 2025 11:00:00");
        assert_eq!(format_epoch(utc(2025, 2, 1, 0, 0)), "Feb 1, 2025");
    }

    #[test]
    fn test_format_number_full() {
        assert_eq!(format_number_full(999), "999");
        assert_eq!(format_number_full(1234), "1,234");
        assert_eq!(format_number_full(1234567), "1,234,567");
    }

    proptest! {
        #[test]
        fn allowance_within_window(sent in any::<u64>(), quota in 1i64..=i64::MAX) {
            let quota = Quota::new(quota).unwrap();
            let remaining = compute_allowance_remaining(sent, quota);
            prop_assert!(remaining > 0);
            prop_assert!(remaining <= quota.get());
        }
    }
}
