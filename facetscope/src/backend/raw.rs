//! Engine-native response shape.
//!
//! Only the members facetscope interprets are decoded; everything else the
//! engine sends is ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawResponse {
    #[serde(default, rename = "responseHeader", skip_serializing_if = "Option::is_none")]
    pub response_header: Option<Value>,
    #[serde(default)]
    pub response: DocumentPage,
    #[serde(default)]
    pub facet_counts: FacetCounts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<EngineError>,
}

/// One page of matching documents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPage {
    #[serde(default)]
    pub num_found: u64,
    #[serde(default)]
    pub start: u64,
    #[serde(default)]
    pub docs: Vec<Value>,
}

impl DocumentPage {
    pub fn empty(start: u64) -> Self {
        Self {
            num_found: 0,
            start,
            docs: Vec::new(),
        }
    }
}

/// Raw facet counts keyed by facet id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetCounts {
    /// Flat `[value, count, value, count, ...]`
    #[serde(default)]
    pub facet_fields: BTreeMap<String, Vec<Value>>,
    /// Kept undecoded so one malformed entry cannot fail the whole response
    #[serde(default)]
    pub facet_ranges: BTreeMap<String, Value>,
    #[serde(default)]
    pub facet_queries: BTreeMap<String, u64>,
}

impl FacetCounts {
    pub fn is_empty(&self) -> bool {
        self.facet_fields.is_empty() && self.facet_ranges.is_empty() && self.facet_queries.is_empty()
    }
}

/// One range facet's counts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRangeCounts {
    /// Flat `[lower bound, count, ...]`
    #[serde(default)]
    pub counts: Vec<Value>,
    #[serde(default)]
    pub gap: Option<Value>,
    #[serde(default)]
    pub start: Option<Value>,
    #[serde(default)]
    pub end: Option<Value>,
}

/// Structured error envelope of the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineError {
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub code: Option<i64>,
}
