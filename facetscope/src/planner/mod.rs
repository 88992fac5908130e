//! Adaptive bucket widths for range facets.
//!
//! A histogram should show roughly `target_buckets` bars. The planner picks a
//! human-friendly gap from a fixed ladder so the bucket count lands in
//! `[min_buckets, max_buckets]`, and on zoom re-derives a gap for the
//! sub-range that is never coarser than the one already shown.

pub mod calendar;
pub mod numeric;

use crate::error::{Error, Result};
use crate::model::{Bound, Facet, RangeBucket, RangeSpec, ValueDomain};
use serde::{Deserialize, Serialize};

/// Largest bound magnitude whose spans and snapped ends stay finite
const MAX_MAGNITUDE: f64 = 1e300;
/// Smallest decimal span whose gaps stay normal floats
const MIN_SPAN: f64 = 1e-290;
/// Smallest decimal span relative to its bounds that still fits distinct buckets
const MIN_RELATIVE_SPAN: f64 = 1e-12;

/// Bucket count targets of the planner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketPolicy {
    #[serde(default = "default_target_buckets")]
    pub target_buckets: u64,
    #[serde(default = "default_min_buckets")]
    pub min_buckets: u64,
    #[serde(default = "default_max_buckets")]
    pub max_buckets: u64,
}

fn default_target_buckets() -> u64 {
    20
}

fn default_min_buckets() -> u64 {
    10
}

fn default_max_buckets() -> u64 {
    100
}

impl Default for BucketPolicy {
    fn default() -> Self {
        Self {
            target_buckets: default_target_buckets(),
            min_buckets: default_min_buckets(),
            max_buckets: default_max_buckets(),
        }
    }
}

impl BucketPolicy {
    /// `1 <= min <= target <= max`
    pub fn validate(&self) -> Result<()> {
        if self.min_buckets == 0
            || self.min_buckets > self.target_buckets
            || self.target_buckets > self.max_buckets
        {
            return Err(Error::Config(format!(
                "bucket policy needs 1 <= min_buckets <= target_buckets <= max_buckets, got {}/{}/{}",
                self.min_buckets, self.target_buckets, self.max_buckets
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RangeFacetPlanner {
    policy: BucketPolicy,
}

impl RangeFacetPlanner {
    pub fn new(policy: BucketPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &BucketPolicy {
        &self.policy
    }

    /// Pick start, end and gap for a histogram over `[start, end)`
    pub fn plan_initial_gap(&self, domain: ValueDomain, start: Bound, end: Bound) -> Result<RangeSpec> {
        let spec = match (domain, start, end) {
            (ValueDomain::Integer | ValueDomain::Decimal, Bound::Number(s), Bound::Number(e)) => {
                let integral = domain == ValueDomain::Integer;
                check_numeric(s, e, integral)?;
                let idx = numeric::plan_index(s, e, integral, &self.policy);
                RangeSpec::Numeric(numeric::build(s, e, numeric::ladder_value(idx), integral))
            }
            (ValueDomain::Date, Bound::Date(s), Bound::Date(e)) => {
                if s >= e {
                    return Err(Error::InvalidRange(format!("start {} is not before end {}", start, end)));
                }
                let gap = calendar::plan_gap(s, e, &self.policy);
                RangeSpec::Date(calendar::build(s, e, gap))
            }
            _ => {
                return Err(Error::InvalidRange(format!(
                    "bounds {} and {} do not belong to the {:?} domain",
                    start, end, domain
                )))
            }
        };

        tracing::debug!(
            domain = ?domain,
            start = %spec.start(),
            end = %spec.end(),
            gap = %spec.gap_string(),
            buckets = spec.bucket_count(),
            "planned range facet"
        );
        Ok(spec)
    }

    /// Narrow a range facet to `range` with a gap no coarser than the current one
    pub fn zoom(&self, facet: &Facet, range: &RangeBucket) -> Result<RangeSpec> {
        let current = facet
            .range()
            .ok_or_else(|| {
                Error::InvalidRange(format!(
                    "facet '{}' is a {} facet, not a range facet",
                    facet.id,
                    facet.facet_type()
                ))
            })?
            .spec;

        let spec = match (current, range.from, range.to) {
            (RangeSpec::Numeric(r), Bound::Number(from), Bound::Number(to)) => {
                check_numeric(from, to, r.integral)?;
                if !(r.gap.is_finite() && r.gap > 0.0) {
                    return Err(Error::InvalidRange(format!(
                        "facet '{}' has a non-positive gap {}",
                        facet.id, r.gap
                    )));
                }
                let gap = numeric::zoom_gap(from, to, r.gap, r.integral, &self.policy);
                RangeSpec::Numeric(numeric::build(from, to, gap, r.integral))
            }
            (RangeSpec::Date(r), Bound::Date(from), Bound::Date(to)) => {
                if from >= to {
                    return Err(Error::InvalidRange(format!(
                        "zoom start {} is not before end {}",
                        range.from, range.to
                    )));
                }
                let gap = calendar::zoom_gap(from, to, r.gap, &self.policy);
                RangeSpec::Date(calendar::build(from, to, gap))
            }
            _ => {
                return Err(Error::InvalidRange(format!(
                    "zoom range {} does not match the {:?} domain of facet '{}'",
                    range.label(),
                    current.domain(),
                    facet.id
                )))
            }
        };

        tracing::debug!(
            facet = %facet.id,
            from = %range.from,
            to = %range.to,
            previous_gap = %current.gap_string(),
            gap = %spec.gap_string(),
            "zoomed range facet"
        );
        Ok(spec)
    }
}

fn check_numeric(start: f64, end: f64, integral: bool) -> Result<()> {
    if !start.is_finite() || !end.is_finite() {
        return Err(Error::InvalidRange(format!(
            "bounds must be finite, got {} and {}",
            start, end
        )));
    }
    if start >= end {
        return Err(Error::InvalidRange(format!(
            "start {} is not before end {}",
            start, end
        )));
    }
    let magnitude = start.abs().max(end.abs());
    if magnitude > MAX_MAGNITUDE {
        return Err(Error::InvalidRange(format!(
            "bounds {} and {} exceed {:e}",
            start, end, MAX_MAGNITUDE
        )));
    }
    let span = end - start;
    if !integral && (span < MIN_SPAN || span < magnitude * MIN_RELATIVE_SPAN) {
        return Err(Error::InvalidRange(format!(
            "span {:e} between {} and {} is too narrow to bucket",
            span, start, end
        )));
    }
    Ok(())
}
