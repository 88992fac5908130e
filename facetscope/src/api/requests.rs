//! Request bodies of the HTTP operations.
//!
//! Members the front end may omit are optional here so that a missing
//! member becomes an envelope error instead of a rejected request.

use crate::error::{Error, Result};
use crate::model::{Collection, Facet, Query, RangeBucket, WidgetType};
use crate::search::RangeAction;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Decode a JSON body, reporting failures as malformed queries
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}".as_slice()
    } else {
        body
    };
    serde_json::from_slice(body).map_err(|e| Error::MalformedQuery(format!("invalid request body: {}", e)))
}

pub fn required<T>(value: Option<T>, name: &str) -> Result<T> {
    value.ok_or_else(|| Error::MalformedQuery(format!("missing '{}'", name)))
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub collection: Option<Collection>,
    #[serde(default)]
    pub query: Option<Query>,
}

#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    #[serde(default)]
    pub collection: Option<Collection>,
    /// Page layout, accepted but not stored
    #[serde(default)]
    pub layout: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestRequest {
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FieldsRequest {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DocumentRequest {
    #[serde(default)]
    pub collection: Option<Collection>,
    #[serde(default)]
    pub id: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineRequest {
    #[serde(default)]
    pub collection: Option<Collection>,
    #[serde(default)]
    pub query: Option<Query>,
    #[serde(default)]
    pub facet: Option<Facet>,
    #[serde(default = "default_multi_q", rename = "multiQ")]
    pub multi_q: String,
    #[serde(default)]
    pub qdata: Value,
}

fn default_multi_q() -> String {
    "query".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFacetRequest {
    #[serde(default)]
    pub collection: Option<Collection>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub widget_type: WidgetType,
}

#[derive(Debug, Deserialize)]
pub struct RangeFacetRequest {
    #[serde(default)]
    pub facet: Option<Facet>,
    #[serde(default = "default_action")]
    pub action: RangeAction,
    #[serde(default)]
    pub range: Option<RangeBucket>,
}

fn default_action() -> RangeAction {
    RangeAction::Select
}

#[derive(Debug, Deserialize)]
pub struct CollectionRequest {
    #[serde(default)]
    pub name: Option<String>,
}

/// Summary row of the collection listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSummary {
    pub id: String,
    pub name: String,
    pub label: String,
    pub enabled: bool,
}

impl From<Collection> for CollectionSummary {
    fn from(collection: Collection) -> Self {
        Self {
            id: collection.id.unwrap_or_default(),
            name: collection.name,
            label: collection.label,
            enabled: collection.enabled,
        }
    }
}
