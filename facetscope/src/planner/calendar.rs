//! Calendar gap ladder for date histograms

use super::BucketPolicy;
use crate::model::range::date_bucket_count;
use crate::model::{DateGap, DateRange, DateUnit};
use chrono::{DateTime, Utc};

/// Candidate gaps ordered by nominal duration
pub const DATE_LADDER: [DateGap; 19] = [
    DateGap::new(1, DateUnit::Second),
    DateGap::new(5, DateUnit::Second),
    DateGap::new(15, DateUnit::Second),
    DateGap::new(30, DateUnit::Second),
    DateGap::new(1, DateUnit::Minute),
    DateGap::new(5, DateUnit::Minute),
    DateGap::new(15, DateUnit::Minute),
    DateGap::new(30, DateUnit::Minute),
    DateGap::new(1, DateUnit::Hour),
    DateGap::new(3, DateUnit::Hour),
    DateGap::new(6, DateUnit::Hour),
    DateGap::new(12, DateUnit::Hour),
    DateGap::new(1, DateUnit::Day),
    DateGap::new(7, DateUnit::Day),
    DateGap::new(1, DateUnit::Month),
    DateGap::new(3, DateUnit::Month),
    DateGap::new(1, DateUnit::Year),
    DateGap::new(5, DateUnit::Year),
    DateGap::new(10, DateUnit::Year),
];

/// Buckets of `gap` over `[start, end)` once start is floored to the gap's unit
pub fn count_with(start: DateTime<Utc>, end: DateTime<Utc>, gap: &DateGap) -> u64 {
    date_bucket_count(gap.unit.floor(start), end, gap)
}

pub fn build(start: DateTime<Utc>, end: DateTime<Utc>, gap: DateGap) -> DateRange {
    DateRange {
        start: gap.unit.floor(start),
        end,
        gap,
    }
}

/// How far a bucket count lies outside the policy range
fn distance(count: u64, policy: &BucketPolicy) -> u64 {
    if count < policy.min_buckets {
        policy.min_buckets - count
    } else {
        count.saturating_sub(policy.max_buckets)
    }
}

/// Finest ladder gap whose count fits the policy, else the one closest to it.
///
/// When every candidate yields too few buckets the finest wins; when every
/// candidate yields too many the coarsest wins.
pub fn plan_gap(start: DateTime<Utc>, end: DateTime<Utc>, policy: &BucketPolicy) -> DateGap {
    let mut best = DATE_LADDER[0];
    let mut best_distance = u64::MAX;
    for gap in DATE_LADDER {
        let d = distance(count_with(start, end, &gap), policy);
        if d == 0 {
            return gap;
        }
        if d < best_distance {
            best = gap;
            best_distance = d;
        }
    }
    best
}

/// Gap for zooming into `[start, end)` that is never coarser than `current`
pub fn zoom_gap(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    current: DateGap,
    policy: &BucketPolicy,
) -> DateGap {
    let candidate = plan_gap(start, end, policy);
    if candidate.nominal_seconds() < current.nominal_seconds() {
        return candidate;
    }

    let finer = DATE_LADDER
        .iter()
        .rev()
        .find(|gap| gap.nominal_seconds() < current.nominal_seconds());
    match finer {
        Some(gap) if count_with(start, end, gap) <= policy.max_buckets => *gap,
        _ => current,
    }
}
