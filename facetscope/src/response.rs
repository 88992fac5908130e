//! Engine responses reshaped for display

use crate::backend::{BackendError, DocumentPage, RawRangeCounts, RawResponse};
use crate::model::query::value_to_string;
use crate::model::{Bound, Collection, Facet, FacetKind, FacetType, Query, RangeFacet};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Documents plus per-facet counts, ready for the UI
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedResponse {
    pub response: DocumentPage,
    pub normalized_facets: Vec<NormalizedFacet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NormalizedResponse {
    /// Empty page carrying only an error message
    pub fn failed(message: impl Into<String>, start: usize) -> Self {
        Self {
            response: DocumentPage::empty(start as u64),
            normalized_facets: Vec::new(),
            error: Some(message.into()),
        }
    }

    pub fn facet(&self, id: &str) -> Option<&NormalizedFacet> {
        self.normalized_facets.iter().find(|f| f.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedFacet {
    pub id: String,
    pub field: String,
    #[serde(rename = "type")]
    pub facet_type: FacetType,
    pub label: String,
    pub counts: Vec<FacetCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetCount {
    pub value: Value,
    pub count: u64,
    #[serde(default)]
    pub selected: bool,
    /// Upper bound of a range bucket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Value>,
}

/// Maps raw engine responses to [`NormalizedResponse`]
pub struct ResponseNormalizer;

impl ResponseNormalizer {
    /// Normalize a successful round trip.
    ///
    /// A response carrying the engine's `error` envelope is reported like a
    /// failed request.
    pub fn normalize(raw: RawResponse, collection: &Collection, query: &Query) -> NormalizedResponse {
        if let Some(error) = raw.error {
            let message = if error.msg.trim().is_empty() {
                format!("Search engine error (code {})", error.code.unwrap_or_default())
            } else {
                error.msg
            };
            return NormalizedResponse::failed(message, query.start);
        }

        let normalized_facets = collection
            .facets
            .iter()
            .filter_map(|facet| Self::normalize_facet(&raw, facet, query))
            .collect();

        NormalizedResponse {
            response: raw.response,
            normalized_facets,
            error: None,
        }
    }

    /// Normalize the outcome of a backend call, embedding failures as data
    pub fn normalize_result(
        result: Result<RawResponse, BackendError>,
        collection: &Collection,
        query: &Query,
    ) -> NormalizedResponse {
        match result {
            Ok(raw) => Self::normalize(raw, collection, query),
            Err(e) => {
                tracing::warn!(collection = %collection.name, "search failed: {}", e);
                NormalizedResponse::failed(e.user_message(), query.start)
            }
        }
    }

    fn normalize_facet(raw: &RawResponse, facet: &Facet, query: &Query) -> Option<NormalizedFacet> {
        let counts = match &facet.kind {
            FacetKind::Field(terms) => {
                let pairs = raw.facet_counts.facet_fields.get(&facet.id)?;
                let selected: Vec<String> = query
                    .filters_for(&facet.id)
                    .flat_map(|fq| fq.filter.iter().map(value_to_string))
                    .collect();
                pairs
                    .chunks(2)
                    .take(terms.limit)
                    .map(|pair| {
                        let value = pair[0].clone();
                        FacetCount {
                            selected: selected.contains(&value_to_string(&value)),
                            count: pair.get(1).and_then(Value::as_u64).unwrap_or(0),
                            value,
                            to: None,
                        }
                    })
                    .collect()
            }
            FacetKind::Range(range) => {
                let raw_counts = raw.facet_counts.facet_ranges.get(&facet.id)?;
                match range_counts(raw_counts, range, facet, query) {
                    Some(counts) => counts,
                    None => {
                        tracing::warn!(facet = %facet.id, "dropping range facet with undecodable counts");
                        return None;
                    }
                }
            }
            FacetKind::Query(q) => {
                let count = *raw.facet_counts.facet_queries.get(&facet.id)?;
                vec![FacetCount {
                    value: Value::String(q.query.clone()),
                    count,
                    selected: query.filters_for(&facet.id).next().is_some(),
                    to: None,
                }]
            }
        };

        Some(NormalizedFacet {
            id: facet.id.clone(),
            field: facet.field.clone(),
            facet_type: facet.facet_type(),
            label: facet.label.clone(),
            counts,
        })
    }
}

/// Pair every raw bucket with its lower and upper bound
fn range_counts(
    raw: &Value,
    range: &RangeFacet,
    facet: &Facet,
    query: &Query,
) -> Option<Vec<FacetCount>> {
    let raw: RawRangeCounts = serde_json::from_value(raw.clone()).ok()?;
    let selected: Vec<Bound> = query
        .filters_for(&facet.id)
        .flat_map(|fq| fq.properties.iter().map(|b| b.from))
        .collect();

    raw.counts
        .chunks(2)
        .map(|pair| {
            let lower = parse_bound(&pair[0])?;
            let upper = range.spec.upper_of(&lower)?;
            Some(FacetCount {
                value: lower.to_json(),
                count: pair.get(1).and_then(Value::as_u64).unwrap_or(0),
                selected: selected.contains(&lower),
                to: Some(upper.to_json()),
            })
        })
        .collect()
}

fn parse_bound(value: &Value) -> Option<Bound> {
    match value {
        Value::Number(n) => n.as_f64().map(Bound::Number),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
