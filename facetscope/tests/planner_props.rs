//! Property tests for range facet planning.
//!
//! Whatever span the planner is given, the chosen gap must cover the data,
//! stay within the bucket policy where the ladder allows it, and a zoom must
//! never produce a coarser gap than the histogram it starts from.

use chrono::{DateTime, Duration, TimeZone, Utc};
use facetscope::model::{
    Bound, Facet, FacetKind, RangeBucket, RangeFacet, RangeSpec, SortOrder, ValueDomain,
    WidgetOptions, WidgetType,
};
use facetscope::planner::RangeFacetPlanner;
use facetscope::Error;
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn range_facet(spec: RangeSpec) -> Facet {
    Facet {
        id: "r".to_string(),
        label: "Range".to_string(),
        field: "value".to_string(),
        widget_type: WidgetType::Histogram,
        options: WidgetOptions::default(),
        kind: FacetKind::Range(RangeFacet {
            spec,
            sort: SortOrder::Desc,
            mincount: 0,
        }),
    }
}

fn numeric_gap(spec: &RangeSpec) -> f64 {
    match spec {
        RangeSpec::Numeric(r) => r.gap,
        RangeSpec::Date(_) => panic!("expected a numeric range"),
    }
}

fn date_gap_seconds(spec: &RangeSpec) -> i64 {
    match spec {
        RangeSpec::Date(r) => r.gap.nominal_seconds(),
        RangeSpec::Numeric(_) => panic!("expected a date range"),
    }
}

fn epoch(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(seconds, 0).unwrap()
}

/// 2000-01-01 .. 2030-01-01
fn any_instant() -> impl Strategy<Value = i64> {
    946_684_800i64..1_893_456_000i64
}

// ---------------------------------------------------------------------------
// Initial gap
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn decimal_spans_land_within_policy(start in -10_000.0f64..10_000.0, width in 0.01f64..1_000_000.0) {
        let planner = RangeFacetPlanner::default();
        let end = start + width;
        let spec = planner
            .plan_initial_gap(ValueDomain::Decimal, Bound::Number(start), Bound::Number(end))
            .unwrap();

        let count = spec.bucket_count();
        prop_assert!((10..=100).contains(&count), "{} buckets for width {}", count, width);

        let gap = numeric_gap(&spec);
        let slack = gap * 1e-6;
        prop_assert!(spec.start().as_number().unwrap() <= start + slack);
        prop_assert!(spec.end().as_number().unwrap() >= end - slack);
    }

    #[test]
    fn integer_gaps_are_whole(start in -100_000i64..100_000, width in 1i64..1_000_000) {
        let planner = RangeFacetPlanner::default();
        let spec = planner
            .plan_initial_gap(
                ValueDomain::Integer,
                Bound::Number(start as f64),
                Bound::Number((start + width) as f64),
            )
            .unwrap();

        let gap = numeric_gap(&spec);
        prop_assert!(gap >= 1.0);
        prop_assert_eq!(gap.fract(), 0.0);

        let count = spec.bucket_count();
        prop_assert!(count <= 100);
        if width >= 10 {
            prop_assert!(count >= 10, "{} buckets for width {}", count, width);
        } else {
            prop_assert_eq!(gap, 1.0);
        }
    }

    #[test]
    fn date_spans_land_within_policy(start in any_instant(), span in 10i64..(20 * 365 * 86_400)) {
        let planner = RangeFacetPlanner::default();
        let from = epoch(start);
        let to = from + Duration::seconds(span);
        let spec = planner
            .plan_initial_gap(ValueDomain::Date, Bound::Date(from), Bound::Date(to))
            .unwrap();

        let count = spec.bucket_count();
        prop_assert!((10..=100).contains(&count), "{} buckets over {}s", count, span);
        prop_assert!(spec.start().as_date().unwrap() <= from);
        prop_assert_eq!(spec.end().as_date().unwrap(), to);
    }

    #[test]
    fn short_date_spans_use_the_finest_gap(start in any_instant(), span in 1i64..10) {
        let planner = RangeFacetPlanner::default();
        let from = epoch(start);
        let spec = planner
            .plan_initial_gap(
                ValueDomain::Date,
                Bound::Date(from),
                Bound::Date(from + Duration::seconds(span)),
            )
            .unwrap();
        prop_assert_eq!(spec.gap_string(), "+1SECONDS");
    }
}

// ---------------------------------------------------------------------------
// Zoom
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn numeric_zoom_never_coarsens(
        width in 1.0f64..100_000.0,
        lo in 0.0f64..1.0,
        len in 0.001f64..1.0,
    ) {
        let planner = RangeFacetPlanner::default();
        let spec = planner
            .plan_initial_gap(ValueDomain::Decimal, Bound::Number(0.0), Bound::Number(width))
            .unwrap();
        let current = numeric_gap(&spec);

        let from = lo * width;
        let to = (from + len * width).min(width);
        prop_assume!(to > from);

        let zoomed = planner
            .zoom(&range_facet(spec), &RangeBucket::new(Bound::Number(from), Bound::Number(to)))
            .unwrap();
        prop_assert!(numeric_gap(&zoomed) <= current * (1.0 + 1e-9));
        prop_assert!(zoomed.bucket_count() <= 100);
    }

    #[test]
    fn integer_zoom_stays_whole(width in 10i64..100_000, a in 0i64..100_000, b in 0i64..100_000) {
        let planner = RangeFacetPlanner::default();
        let spec = planner
            .plan_initial_gap(ValueDomain::Integer, Bound::Number(0.0), Bound::Number(width as f64))
            .unwrap();
        let current = numeric_gap(&spec);

        let (from, to) = (a.min(b) % width, a.max(b) % width);
        prop_assume!(to > from);

        let zoomed = planner
            .zoom(
                &range_facet(spec),
                &RangeBucket::new(Bound::Number(from as f64), Bound::Number(to as f64)),
            )
            .unwrap();
        let gap = numeric_gap(&zoomed);
        prop_assert!(gap <= current);
        prop_assert!(gap >= 1.0);
        prop_assert_eq!(gap.fract(), 0.0);
    }

    #[test]
    fn date_zoom_never_coarsens(
        start in any_instant(),
        span in 3_600i64..(10 * 365 * 86_400),
        lo in 0.0f64..1.0,
        len in 0.01f64..1.0,
    ) {
        let planner = RangeFacetPlanner::default();
        let from = epoch(start);
        let spec = planner
            .plan_initial_gap(
                ValueDomain::Date,
                Bound::Date(from),
                Bound::Date(from + Duration::seconds(span)),
            )
            .unwrap();
        let current = date_gap_seconds(&spec);

        let zoom_from = from + Duration::seconds((lo * span as f64) as i64);
        let zoom_to = zoom_from + Duration::seconds(((len * span as f64) as i64).max(1));

        let zoomed = planner
            .zoom(
                &range_facet(spec),
                &RangeBucket::new(Bound::Date(zoom_from), Bound::Date(zoom_to)),
            )
            .unwrap();
        prop_assert!(date_gap_seconds(&zoomed) <= current);
    }
}

// ---------------------------------------------------------------------------
// Extreme magnitudes
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn tiny_decimal_spans_land_within_policy(
        mantissa in 1.0f64..10.0,
        exponent in -200i32..-2,
        offset in 0.0f64..100.0,
    ) {
        let width = mantissa * 10f64.powi(exponent);
        let start = offset * width;
        let end = start + width;
        let spec = RangeFacetPlanner::default()
            .plan_initial_gap(ValueDomain::Decimal, Bound::Number(start), Bound::Number(end))
            .unwrap();

        let count = spec.bucket_count();
        prop_assert!((10..=100).contains(&count), "{} buckets for [{}, {})", count, start, end);
        prop_assert!(spec.end().as_number().unwrap() > spec.start().as_number().unwrap());
    }

    #[test]
    fn huge_decimal_spans_land_within_policy(mantissa in 1.0f64..10.0, exponent in 100i32..299) {
        let width = mantissa * 10f64.powi(exponent);
        let start = -width / 2.0;
        let end = width / 2.0;
        let spec = RangeFacetPlanner::default()
            .plan_initial_gap(ValueDomain::Decimal, Bound::Number(start), Bound::Number(end))
            .unwrap();

        let count = spec.bucket_count();
        prop_assert!((10..=100).contains(&count), "{} buckets for width {:e}", count, width);
    }
}

#[test]
fn overflowing_spans_are_rejected() {
    let planner = RangeFacetPlanner::default();
    for domain in [ValueDomain::Decimal, ValueDomain::Integer] {
        let result = planner.plan_initial_gap(domain, Bound::Number(-1e308), Bound::Number(1e308));
        assert!(matches!(result, Err(Error::InvalidRange(_))), "{:?}", result);
    }
}

#[test]
fn span_of_1e_13_gets_twenty_buckets() {
    let spec = RangeFacetPlanner::default()
        .plan_initial_gap(ValueDomain::Decimal, Bound::Number(0.0), Bound::Number(1e-13))
        .unwrap();
    assert_eq!(spec.bucket_count(), 20);
}

#[test]
fn zoom_on_mismatched_domain_is_rejected() {
    let planner = RangeFacetPlanner::default();
    let spec = planner
        .plan_initial_gap(ValueDomain::Integer, Bound::Number(0.0), Bound::Number(100.0))
        .unwrap();
    let at = epoch(1_700_000_000);
    let result = planner.zoom(
        &range_facet(spec),
        &RangeBucket::new(Bound::Date(at), Bound::Date(at + Duration::hours(1))),
    );
    assert!(result.is_err());
}
