//! Collection + query state to [`StructuredQuery`]

use super::structured::{FacetRequest, FilterClause, StructuredQuery, MATCH_ALL};
use crate::error::{Error, Result};
use crate::model::query::value_to_string;
use crate::model::{Collection, Facet, FacetKind, FilterQuery, Query};

/// Rows per result page unless configured otherwise
pub const DEFAULT_PAGE_SIZE: usize = 15;

/// Builds engine queries from a collection definition and the page state.
///
/// Pure: no I/O and no state, so identical inputs always produce identical
/// queries.
#[derive(Debug, Clone, Copy)]
pub struct QueryAssembler {
    page_size: usize,
}

impl Default for QueryAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl QueryAssembler {
    pub fn new(page_size: usize) -> Self {
        Self { page_size }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn assemble(&self, collection: &Collection, query: &Query) -> Result<StructuredQuery> {
        if collection.name.trim().is_empty() {
            return Err(Error::MalformedQuery(
                "collection has no name".to_string(),
            ));
        }
        if query.qs.is_empty() {
            return Err(Error::MalformedQuery(
                "query must contain at least one clause".to_string(),
            ));
        }

        let filters = query
            .fqs
            .iter()
            .filter_map(|fq| match collection.facet(&fq.id) {
                Some(facet) => filter_clause(facet, fq),
                None => {
                    tracing::debug!(facet = %fq.id, "ignoring filter of unknown facet");
                    None
                }
            })
            .collect();

        let structured = StructuredQuery {
            collection: collection.name.clone(),
            q: search_expression(query),
            filters,
            facets: collection.facets.iter().map(facet_request).collect(),
            start: query.start,
            rows: self.page_size,
        };

        tracing::debug!(
            collection = %structured.collection,
            q = %structured.q,
            filters = structured.filters.len(),
            facets = structured.facets.len(),
            "assembled query"
        );

        Ok(structured)
    }
}

/// Non-empty clauses joined with AND, match-all when there are none
fn search_expression(query: &Query) -> String {
    let clauses: Vec<&str> = query
        .qs
        .iter()
        .map(|clause| clause.q.trim())
        .filter(|q| !q.is_empty())
        .collect();

    match clauses.as_slice() {
        [] => MATCH_ALL.to_string(),
        [single] => single.to_string(),
        many => many
            .iter()
            .map(|q| format!("({})", q))
            .collect::<Vec<_>>()
            .join(" AND "),
    }
}

fn filter_clause(facet: &Facet, fq: &FilterQuery) -> Option<FilterClause> {
    match &facet.kind {
        FacetKind::Field(_) => {
            let values: Vec<String> = fq.filter.iter().map(value_to_string).collect();
            (!values.is_empty()).then(|| FilterClause::Terms {
                tag: facet.id.clone(),
                field: facet.field.clone(),
                values,
            })
        }
        FacetKind::Range(_) => (!fq.properties.is_empty()).then(|| FilterClause::Ranges {
            tag: facet.id.clone(),
            field: facet.field.clone(),
            ranges: fq.properties.clone(),
        }),
        FacetKind::Query(q) => Some(FilterClause::Query {
            tag: facet.id.clone(),
            query: q.query.clone(),
        }),
    }
}

fn facet_request(facet: &Facet) -> FacetRequest {
    match &facet.kind {
        FacetKind::Field(terms) => FacetRequest::Terms {
            key: facet.id.clone(),
            field: facet.field.clone(),
            sort: terms.sort,
            limit: terms.limit,
            mincount: terms.mincount,
        },
        FacetKind::Range(range) => FacetRequest::Range {
            key: facet.id.clone(),
            field: facet.field.clone(),
            spec: range.spec,
            mincount: range.mincount,
        },
        FacetKind::Query(q) => FacetRequest::Query {
            key: facet.id.clone(),
            query: q.query.clone(),
        },
    }
}
