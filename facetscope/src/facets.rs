//! Facet definitions for widgets dropped on the page

use crate::backend::{FieldStats, SearchBackend};
use crate::error::Result;
use crate::model::{
    Bound, Collection, Facet, FacetKind, QueryFacet, RangeFacet, SortOrder, TermsFacet,
    ValueDomain, WidgetOptions, WidgetType,
};
use crate::planner::RangeFacetPlanner;
use serde_json::Value;

/// Builds a new facet for a widget, choosing its type from the widget and field
#[derive(Debug, Clone, Copy, Default)]
pub struct FacetFactory {
    planner: RangeFacetPlanner,
}

impl FacetFactory {
    pub fn new(planner: RangeFacetPlanner) -> Self {
        Self { planner }
    }

    /// Default facet of `widget_type` over `field`.
    ///
    /// Histogram widgets over numeric or date fields become range facets
    /// spanning the field's current min and max. Hit widgets count a query,
    /// everything else counts field values.
    pub async fn new_facet(
        &self,
        backend: &dyn SearchBackend,
        collection: &Collection,
        id: &str,
        label: &str,
        field: &str,
        widget_type: WidgetType,
    ) -> Result<Facet> {
        let mut options = WidgetOptions::default();
        let mut terms = TermsFacet::default();

        let kind = match &widget_type {
            WidgetType::Hit => FacetKind::Query(QueryFacet {
                query: field.to_string(),
            }),
            WidgetType::Map => {
                options.scope = Some("world".to_string());
                terms.mincount = 1;
                terms.limit = 100;
                FacetKind::Field(terms)
            }
            widget if widget.is_histogram_capable() => {
                match self.range_kind(backend, &collection.name, field).await? {
                    Some(range) => {
                        options.can_range = true;
                        FacetKind::Range(range)
                    }
                    None => FacetKind::Field(terms),
                }
            }
            _ => FacetKind::Field(terms),
        };

        let facet = Facet {
            id: id.to_string(),
            label: (if label.is_empty() { field } else { label }).to_string(),
            field: field.to_string(),
            widget_type,
            options,
            kind,
        };
        tracing::debug!(facet = %facet.id, field, kind = %facet.facet_type(), "created facet");
        Ok(facet)
    }

    /// Range facet over the field's value span, `None` when it cannot have one
    async fn range_kind(
        &self,
        backend: &dyn SearchBackend,
        collection: &str,
        field: &str,
    ) -> Result<Option<RangeFacet>> {
        let info = backend.field_metadata(collection).await?;
        let Some(domain) = info.get(field).and_then(|p| p.value_domain()) else {
            return Ok(None);
        };
        let Some(stats) = backend.field_stats(collection, field).await? else {
            return Ok(None);
        };
        let Some((start, end)) = stats_bounds(&stats, domain) else {
            return Ok(None);
        };

        match self.planner.plan_initial_gap(domain, start, end) {
            Ok(spec) => Ok(Some(RangeFacet {
                spec,
                sort: SortOrder::Desc,
                mincount: 0,
            })),
            Err(e) => {
                tracing::debug!(field, "keeping field facet: {}", e);
                Ok(None)
            }
        }
    }
}

fn stats_bounds(stats: &FieldStats, domain: ValueDomain) -> Option<(Bound, Bound)> {
    let bound = |v: &Value| match (domain, v) {
        (ValueDomain::Date, Value::String(s)) => s.parse::<Bound>().ok().filter(|b| b.as_date().is_some()),
        (ValueDomain::Date, _) => None,
        (_, Value::Number(n)) => n.as_f64().map(Bound::Number),
        (_, Value::String(s)) => s.parse::<f64>().ok().map(Bound::Number),
        _ => None,
    };
    Some((bound(&stats.min)?, bound(&stats.max)?))
}
