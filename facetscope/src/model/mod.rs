//! Request-scoped value objects describing what the UI shows and selects

pub mod collection;
pub mod facet;
pub mod query;
pub mod range;

pub use collection::{Collection, FieldDescriptor};
pub use facet::{
    Facet, FacetKind, FacetType, QueryFacet, RangeFacet, SortOrder, TermsFacet, WidgetOptions,
    WidgetType,
};
pub use query::{FilterQuery, Query, QueryClause};
pub use range::{
    Bound, DateGap, DateRange, DateUnit, NumericRange, RangeBucket, RangeSpec, ValueDomain,
};
