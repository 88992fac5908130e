//! In-process search backend for pipeline and API tests

#![allow(dead_code)]

use async_trait::async_trait;
use facetscope::backend::{BackendError, FieldInfo, FieldStats, RawResponse, SearchBackend};
use facetscope::model::Collection;
use facetscope::query::StructuredQuery;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;

/// Canned answers plus a log of every query it executed
#[derive(Default)]
pub struct MockBackend {
    response: Mutex<RawResponse>,
    failure: Mutex<Option<(u16, String)>>,
    fields: FieldInfo,
    stats: HashMap<String, FieldStats>,
    documents: HashMap<String, Value>,
    suggestions: Vec<String>,
    queries: Mutex<Vec<StructuredQuery>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, response: Value) -> Self {
        *self.response.lock() = serde_json::from_value(response).unwrap();
        self
    }

    pub fn failing(self, status: u16, body: &str) -> Self {
        *self.failure.lock() = Some((status, body.to_string()));
        self
    }

    pub fn with_fields(mut self, fields: Value) -> Self {
        self.fields = serde_json::from_value(json!({ "fields": fields })).unwrap();
        self
    }

    pub fn with_stats(mut self, field: &str, min: Value, max: Value) -> Self {
        self.stats.insert(field.to_string(), FieldStats { min, max });
        self
    }

    pub fn with_document(mut self, id: &str, doc: Value) -> Self {
        self.documents.insert(id.to_string(), doc);
        self
    }

    pub fn with_suggestions(mut self, suggestions: &[&str]) -> Self {
        self.suggestions = suggestions.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn queries(&self) -> Vec<StructuredQuery> {
        self.queries.lock().clone()
    }

    fn check_failure(&self) -> Result<(), BackendError> {
        match self.failure.lock().clone() {
            Some((status, body)) => Err(BackendError::Http { status, body }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SearchBackend for MockBackend {
    async fn query(&self, query: &StructuredQuery) -> Result<RawResponse, BackendError> {
        self.queries.lock().push(query.clone());
        self.check_failure()?;
        Ok(self.response.lock().clone())
    }

    async fn suggest(&self, _collection: &str, partial: &str) -> Result<Vec<String>, BackendError> {
        self.check_failure()?;
        Ok(self
            .suggestions
            .iter()
            .filter(|s| s.starts_with(partial))
            .cloned()
            .collect())
    }

    async fn fetch_document(
        &self,
        _collection: &str,
        id: &str,
    ) -> Result<Option<Value>, BackendError> {
        self.check_failure()?;
        Ok(self.documents.get(id).cloned())
    }

    async fn field_metadata(&self, _collection: &str) -> Result<FieldInfo, BackendError> {
        self.check_failure()?;
        Ok(self.fields.clone())
    }

    async fn field_stats(
        &self,
        _collection: &str,
        field: &str,
    ) -> Result<Option<FieldStats>, BackendError> {
        self.check_failure()?;
        Ok(self.stats.get(field).cloned())
    }
}

/// Logs collection with a field, a range and a query facet
pub fn logs_collection() -> Collection {
    serde_json::from_value(json!({
        "id": "c1",
        "name": "logs",
        "label": "Logs",
        "facets": [
            {"id": "f1", "label": "Status", "field": "status", "type": "field",
             "widgetType": "facet-widget", "properties": {"limit": 10}},
            {"id": "r1", "label": "Latency", "field": "latency", "type": "range",
             "widgetType": "histogram-widget",
             "properties": {"start": 0, "end": 100, "gap": 10, "integral": true}},
            {"id": "q1", "label": "Slow", "field": "latency:[500 TO *]", "type": "query",
             "widgetType": "hit-widget"}
        ]
    }))
    .unwrap()
}

/// Engine answer with counts for every facet of [`logs_collection`]
pub fn logs_response(num_found: u64) -> Value {
    json!({
        "responseHeader": {"status": 0, "QTime": 2},
        "response": {"numFound": num_found, "start": 0, "docs": [{"id": "1", "status": "error"}]},
        "facet_counts": {
            "facet_fields": {"f1": ["error", 7, "ok", 3]},
            "facet_ranges": {"r1": {"counts": ["0", 2, "10", 5, "20", 3], "gap": 10, "start": 0, "end": 100}},
            "facet_queries": {"q1": 1}
        }
    })
}
