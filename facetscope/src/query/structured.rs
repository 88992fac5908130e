//! Engine-agnostic query representation and its Solr rendering

use crate::model::{RangeBucket, RangeSpec, SortOrder};
use serde::{Deserialize, Serialize};

/// Lucene match-all expression
pub const MATCH_ALL: &str = "*:*";

/// A fully resolved query: search expression, filters, facet requests, page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredQuery {
    pub collection: String,
    pub q: String,
    pub filters: Vec<FilterClause>,
    pub facets: Vec<FacetRequest>,
    pub start: usize,
    pub rows: usize,
}

/// One filter, tagged with the facet that owns it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FilterClause {
    /// Any of the exact values
    Terms {
        tag: String,
        field: String,
        values: Vec<String>,
    },
    /// Any of the half-open intervals
    Ranges {
        tag: String,
        field: String,
        ranges: Vec<RangeBucket>,
    },
    Query { tag: String, query: String },
}

impl FilterClause {
    pub fn tag(&self) -> &str {
        match self {
            FilterClause::Terms { tag, .. }
            | FilterClause::Ranges { tag, .. }
            | FilterClause::Query { tag, .. } => tag,
        }
    }

    /// Lucene syntax of the clause
    pub fn to_lucene(&self) -> String {
        match self {
            FilterClause::Terms { field, values, .. } => disjunction(
                values
                    .iter()
                    .map(|v| format!("{}:{}", field, escape_value(v))),
            ),
            FilterClause::Ranges { field, ranges, .. } => disjunction(
                ranges
                    .iter()
                    .map(|r| format!("{}:[{} TO {}}}", field, r.from, r.to)),
            ),
            FilterClause::Query { query, .. } => format!("({})", query),
        }
    }
}

fn disjunction(parts: impl Iterator<Item = String>) -> String {
    let parts: Vec<String> = parts.collect();
    if parts.len() == 1 {
        parts.into_iter().collect()
    } else {
        format!("({})", parts.join(" OR "))
    }
}

/// One facet computation, keyed by facet id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FacetRequest {
    Terms {
        key: String,
        field: String,
        sort: SortOrder,
        limit: usize,
        mincount: u64,
    },
    Range {
        key: String,
        field: String,
        spec: RangeSpec,
        mincount: u64,
    },
    Query { key: String, query: String },
}

impl FacetRequest {
    pub fn key(&self) -> &str {
        match self {
            FacetRequest::Terms { key, .. }
            | FacetRequest::Range { key, .. }
            | FacetRequest::Query { key, .. } => key,
        }
    }

    /// `(parameter, value)` of the Solr facet request.
    ///
    /// The key and exclusion local params make counts come back under the
    /// facet id, unaffected by the facet's own filter.
    fn to_param(&self) -> (&'static str, String) {
        match self {
            FacetRequest::Terms {
                key,
                field,
                sort,
                limit,
                mincount,
            } => (
                "facet.field",
                format!(
                    "{{!key={key} ex={key} facet.limit={limit} facet.mincount={mincount} facet.sort={}}}{field}",
                    solr_sort(*sort)
                ),
            ),
            FacetRequest::Range {
                key,
                field,
                spec,
                mincount,
            } => (
                "facet.range",
                format!(
                    "{{!key={key} ex={key} facet.range.start={} facet.range.end={} facet.range.gap={} facet.mincount={mincount}}}{field}",
                    spec.start(),
                    spec.end(),
                    spec.gap_string()
                ),
            ),
            FacetRequest::Query { key, query } => {
                ("facet.query", format!("{{!key={key} ex={key}}}{query}"))
            }
        }
    }
}

fn solr_sort(sort: SortOrder) -> &'static str {
    match sort {
        SortOrder::Desc => "count",
        SortOrder::Asc => "index",
    }
}

impl StructuredQuery {
    /// Request parameters for the Solr `select` handler, in a stable order
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("q".to_string(), self.q.clone()),
            ("start".to_string(), self.start.to_string()),
            ("rows".to_string(), self.rows.to_string()),
            ("wt".to_string(), "json".to_string()),
        ];

        for filter in &self.filters {
            params.push((
                "fq".to_string(),
                format!("{{!tag={}}}{}", filter.tag(), filter.to_lucene()),
            ));
        }

        if !self.facets.is_empty() {
            params.push(("facet".to_string(), "true".to_string()));
            for facet in &self.facets {
                let (name, value) = facet.to_param();
                params.push((name.to_string(), value));
            }
        }

        params
    }
}

/// Quote a term when it contains whitespace or Lucene reserved characters
pub fn escape_value(s: &str) -> String {
    if s.is_empty() {
        return "\"\"".to_string();
    }
    if s.contains(|c: char| c.is_whitespace() || "+-&|!(){}[]^\"~*?:\\/".contains(c)) {
        format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        s.to_string()
    }
}
