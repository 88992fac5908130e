//! `{1, 2, 5} x 10^k` gap ladder for numeric histograms

use super::BucketPolicy;
use crate::model::range::{decimals_of, numeric_bucket_count, round_to};
use crate::model::NumericRange;

const STEPS: [f64; 3] = [1.0, 2.0, 5.0];

/// Relative slack when comparing gaps computed through floats
const EPSILON: f64 = 1e-9;

/// Ladder steps the planner may move away from the target-derived gap.
///
/// The target gap yields between `target / 2.5` and `target + 2` buckets,
/// so three steps either way always reach the policy bounds.
const MAX_ADJUST_STEPS: i32 = 3;

/// Decimal exponents outside the f64 range, in either direction
const EXPONENT_LIMIT: f64 = 330.0;

/// Ladder value at `idx`; index 0 is 1, index 3 is 10, index -1 is 0.5
pub fn ladder_value(idx: i32) -> f64 {
    STEPS[idx.rem_euclid(3) as usize] * 10f64.powi(idx.div_euclid(3))
}

/// Smallest ladder index whose value is at least `x`
pub fn index_at_least(x: f64) -> i32 {
    let exponent = x.log10().floor();
    let exponent = if exponent.is_nan() {
        0
    } else {
        exponent.clamp(-EXPONENT_LIMIT, EXPONENT_LIMIT) as i32
    };
    let mut idx = 3 * exponent - 3;
    // a finite x lands within six steps, the bound only matters for infinities
    for _ in 0..9 {
        if ladder_value(idx) >= x * (1.0 - EPSILON) {
            break;
        }
        idx += 1;
    }
    idx
}

/// Largest ladder index whose value is strictly below `x`
pub fn index_below(x: f64) -> i32 {
    index_at_least(x) - 1
}

/// `start` snapped down and `end` snapped up to multiples of `gap`
pub fn snap(start: f64, end: f64, gap: f64) -> (f64, f64) {
    let decimals = decimals_of(gap);
    let lower = round_to((start / gap + EPSILON).floor() * gap, decimals);
    let upper = round_to((end / gap - EPSILON).ceil() * gap, decimals);
    if upper > lower {
        return (lower, upper);
    }
    let bumped = round_to(lower + gap, decimals);
    if bumped > lower {
        (lower, bumped)
    } else {
        (lower, lower + gap)
    }
}

/// Buckets of width `gap` covering the snapped `[start, end)`
pub fn count_with(start: f64, end: f64, gap: f64) -> u64 {
    let (lower, upper) = snap(start, end, gap);
    numeric_bucket_count(upper - lower, gap)
}

pub fn build(start: f64, end: f64, gap: f64, integral: bool) -> NumericRange {
    let (start, end) = snap(start, end, gap);
    NumericRange {
        start,
        end,
        gap,
        integral,
    }
}

/// Ladder index of the initial gap for `[start, end)`
pub fn plan_index(start: f64, end: f64, integral: bool, policy: &BucketPolicy) -> i32 {
    let lowest = if integral { 0 } else { i32::MIN };
    let count = |idx: i32| count_with(start, end, ladder_value(idx));

    let raw_step = (end - start) / policy.target_buckets as f64;
    let initial = index_at_least(raw_step).max(lowest);
    let finest = (initial - MAX_ADJUST_STEPS).max(lowest);
    let coarsest = initial + MAX_ADJUST_STEPS;

    let mut idx = initial;
    while count(idx) > policy.max_buckets && idx < coarsest {
        idx += 1;
    }
    while count(idx) < policy.min_buckets
        && idx > finest
        && count(idx - 1) <= policy.max_buckets
    {
        idx -= 1;
    }
    idx
}

/// Gap for zooming into `[start, end)` that is never coarser than `current`
pub fn zoom_gap(start: f64, end: f64, current: f64, integral: bool, policy: &BucketPolicy) -> f64 {
    let candidate = ladder_value(plan_index(start, end, integral, policy));
    if candidate < current * (1.0 - EPSILON) {
        return candidate;
    }

    let finer_idx = index_below(current);
    if integral && finer_idx < 0 {
        return current;
    }
    let finer = ladder_value(finer_idx);
    if count_with(start, end, finer) > policy.max_buckets {
        current
    } else {
        finer
    }
}
