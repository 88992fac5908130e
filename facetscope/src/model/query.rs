use super::range::RangeBucket;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Search state of the page: free-text clauses, active filters, offset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    #[serde(default)]
    pub qs: Vec<QueryClause>,
    #[serde(default)]
    pub fqs: Vec<FilterQuery>,
    #[serde(default)]
    pub start: usize,
}

impl Query {
    /// The initial page state: one empty clause, no filters
    pub fn match_all() -> Self {
        Self {
            qs: vec![QueryClause::default()],
            fqs: Vec::new(),
            start: 0,
        }
    }

    pub fn filters_for<'a>(&'a self, facet_id: &'a str) -> impl Iterator<Item = &'a FilterQuery> {
        self.fqs.iter().filter(move |fq| fq.id == facet_id)
    }
}

/// One free-text sub-query; empty text matches everything
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryClause {
    #[serde(default, alias = "text")]
    pub q: String,
}

impl QueryClause {
    pub fn new(q: impl Into<String>) -> Self {
        Self { q: q.into() }
    }
}

/// Selection made on a facet, owned by the facet with the same `id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterQuery {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Selected values of a field facet
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<Value>,
    /// Selected buckets of a range facet
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<RangeBucket>,
}

impl FilterQuery {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            field: None,
            filter: Vec::new(),
            properties: Vec::new(),
        }
    }

    pub fn with_values(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.filter = values.into_iter().collect();
        self
    }

    pub fn with_buckets(mut self, buckets: impl IntoIterator<Item = RangeBucket>) -> Self {
        self.properties = buckets.into_iter().collect();
        self
    }
}

/// Text of a selected facet value as the engine writes it
pub fn value_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => v.to_string(),
    }
}
