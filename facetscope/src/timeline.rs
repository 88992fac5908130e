//! One selection gesture reduced to one labeled series

use crate::backend::{BackendError, SearchBackend};
use crate::error::{Error, Result};
use crate::model::query::value_to_string;
use crate::model::{Bound, Collection, Facet, FilterQuery, Query, QueryClause, RangeBucket};
use crate::query::QueryAssembler;
use crate::response::{FacetCount, ResponseNormalizer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// What the user picked to draw a series for
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Free-text query replacing the current clauses
    SubQuery(String),
    /// Lower bound of one bucket of a range facet
    RangeValue(Bound),
    /// One discrete value of a field facet
    FieldValue(Value),
}

impl Selection {
    /// Decode the `multiQ` mode (`query`, `range`, `field`) and its value
    pub fn from_mode(mode: &str, value: &Value) -> Result<Self> {
        match mode {
            "query" => Ok(Selection::SubQuery(value_to_string(
                value.get("q").unwrap_or(value),
            ))),
            "range" => {
                let bound = match value {
                    Value::Number(n) => n.as_f64().map(Bound::Number),
                    Value::String(s) => s.parse().ok(),
                    _ => None,
                };
                bound.map(Selection::RangeValue).ok_or_else(|| {
                    Error::MalformedQuery(format!("'{}' is not a range bucket bound", value))
                })
            }
            "field" => Ok(Selection::FieldValue(value.clone())),
            other => Err(Error::MalformedQuery(format!(
                "unknown selection mode '{}'",
                other
            ))),
        }
    }
}

/// A named sequence of counts drawn as one line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSeries {
    pub label: String,
    pub counts: Vec<FacetCount>,
}

pub struct TimelineBuilder {
    backend: Arc<dyn SearchBackend>,
    assembler: QueryAssembler,
}

impl TimelineBuilder {
    pub fn new(backend: Arc<dyn SearchBackend>, assembler: QueryAssembler) -> Self {
        Self { backend, assembler }
    }

    /// Run `facet` under `selection` and return its counts as one series.
    ///
    /// Exactly one engine round trip. The label ends with the number of
    /// matching documents, e.g. `error (42)`.
    pub async fn build_series(
        &self,
        collection: &Collection,
        query: &Query,
        facet: &Facet,
        selection: &Selection,
    ) -> Result<NormalizedSeries> {
        let (label, query) = apply_selection(query, facet, selection)?;
        // Filters of every facet apply, but only the inspected facet is computed
        let mut structured = self.assembler.assemble(&collection.with_facet(facet), &query)?;
        structured.facets.retain(|request| request.key() == facet.id);
        let pruned = collection.with_only_facet(facet);

        let mut raw = self.backend.query(&structured).await?;
        if let Some(error) = raw.error.take() {
            return Err(BackendError::Engine(error.msg).into());
        }

        let num_found = raw.response.num_found;
        let normalized = ResponseNormalizer::normalize(raw, &pruned, &query);
        let counts = normalized
            .normalized_facets
            .into_iter()
            .next()
            .map(|f| f.counts)
            .unwrap_or_default();

        tracing::debug!(facet = %facet.id, %label, num_found, points = counts.len(), "built series");

        Ok(NormalizedSeries {
            label: format!("{} ({})", label, num_found),
            counts,
        })
    }
}

/// Label of the series and the query restricted to the selection
fn apply_selection(query: &Query, facet: &Facet, selection: &Selection) -> Result<(String, Query)> {
    let mut query = query.clone();
    let label = match selection {
        Selection::SubQuery(text) => {
            query.qs = vec![QueryClause::new(text.clone())];
            text.clone()
        }
        Selection::RangeValue(lower) => {
            let range = facet.range().ok_or_else(|| {
                Error::InvalidRange(format!(
                    "facet '{}' is a {} facet, not a range facet",
                    facet.id,
                    facet.facet_type()
                ))
            })?;
            let bucket = range.spec.bucket_at(lower).ok_or_else(|| {
                Error::BucketNotFound(format!("no bucket of facet '{}' starts at {}", facet.id, lower))
            })?;
            select_bucket(&mut query, facet, bucket);
            bucket.label()
        }
        Selection::FieldValue(value) => {
            select_value(&mut query, facet, value.clone());
            value_to_string(value)
        }
    };
    Ok((label, query))
}

fn owned_filter<'a>(query: &'a mut Query, facet: &Facet) -> &'a mut FilterQuery {
    let position = query.fqs.iter().position(|fq| fq.id == facet.id);
    let index = match position {
        Some(index) => index,
        None => {
            let mut fq = FilterQuery::new(facet.id.clone());
            fq.field = Some(facet.field.clone());
            query.fqs.push(fq);
            query.fqs.len() - 1
        }
    };
    &mut query.fqs[index]
}

fn select_bucket(query: &mut Query, facet: &Facet, bucket: RangeBucket) {
    let fq = owned_filter(query, facet);
    fq.filter.clear();
    fq.properties = vec![bucket];
}

fn select_value(query: &mut Query, facet: &Facet, value: Value) {
    let fq = owned_filter(query, facet);
    fq.properties.clear();
    fq.filter = vec![value];
}
