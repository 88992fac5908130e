//! Facet definitions as displayed by the search page.
//!
//! On the wire a facet is `{id, label, field, type, widgetType, properties}`
//! with one flat `properties` object. In memory the type-specific settings
//! live in [`FacetKind`] so each variant only carries what it uses.

use super::range::RangeSpec;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Facet ordering by count
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Serialized facet type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetType {
    Field,
    Range,
    Query,
}

impl fmt::Display for FacetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FacetType::Field => "field",
            FacetType::Range => "range",
            FacetType::Query => "query",
        })
    }
}

/// UI widget rendering a facet
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WidgetType {
    Resultset,
    #[default]
    Facet,
    Hit,
    Histogram,
    Bar,
    Line,
    Pie,
    Map,
    Timeline,
    Filter,
    Tree,
    Other(String),
}

impl WidgetType {
    pub fn as_str(&self) -> &str {
        match self {
            WidgetType::Resultset => "resultset-widget",
            WidgetType::Facet => "facet-widget",
            WidgetType::Hit => "hit-widget",
            WidgetType::Histogram => "histogram-widget",
            WidgetType::Bar => "bar-widget",
            WidgetType::Line => "line-widget",
            WidgetType::Pie => "pie-widget",
            WidgetType::Map => "map-widget",
            WidgetType::Timeline => "timeline-widget",
            WidgetType::Filter => "filter-widget",
            WidgetType::Tree => "tree-widget",
            WidgetType::Other(name) => name,
        }
    }

    /// Widgets that draw counts along a numeric or time axis
    pub fn is_histogram_capable(&self) -> bool {
        matches!(
            self,
            WidgetType::Histogram | WidgetType::Bar | WidgetType::Line | WidgetType::Timeline
        )
    }
}

impl From<String> for WidgetType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "resultset-widget" => WidgetType::Resultset,
            "facet-widget" => WidgetType::Facet,
            "hit-widget" => WidgetType::Hit,
            "histogram-widget" => WidgetType::Histogram,
            "bar-widget" => WidgetType::Bar,
            "line-widget" => WidgetType::Line,
            "pie-widget" => WidgetType::Pie,
            "map-widget" => WidgetType::Map,
            "timeline-widget" => WidgetType::Timeline,
            "filter-widget" => WidgetType::Filter,
            "tree-widget" => WidgetType::Tree,
            _ => WidgetType::Other(name),
        }
    }
}

impl From<&str> for WidgetType {
    fn from(name: &str) -> Self {
        WidgetType::from(name.to_string())
    }
}

impl From<WidgetType> for String {
    fn from(widget: WidgetType) -> Self {
        widget.as_str().to_string()
    }
}

/// Display flags shared by every facet type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WidgetOptions {
    pub can_range: bool,
    pub stacked: bool,
    pub and_up: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Discrete value counts of a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TermsFacet {
    pub sort: SortOrder,
    pub limit: usize,
    pub mincount: u64,
}

impl Default for TermsFacet {
    fn default() -> Self {
        Self {
            sort: SortOrder::Desc,
            limit: 10,
            mincount: 0,
        }
    }
}

/// Histogram over a numeric or date field
#[derive(Debug, Clone, PartialEq)]
pub struct RangeFacet {
    pub spec: RangeSpec,
    pub sort: SortOrder,
    pub mincount: u64,
}

/// Count of documents matching an explicit Boolean sub-query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFacet {
    pub query: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FacetKind {
    Field(TermsFacet),
    Range(RangeFacet),
    Query(QueryFacet),
}

impl FacetKind {
    pub fn facet_type(&self) -> FacetType {
        match self {
            FacetKind::Field(_) => FacetType::Field,
            FacetKind::Range(_) => FacetType::Range,
            FacetKind::Query(_) => FacetType::Query,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireFacet", into = "WireFacet")]
pub struct Facet {
    pub id: String,
    pub label: String,
    pub field: String,
    pub widget_type: WidgetType,
    pub options: WidgetOptions,
    pub kind: FacetKind,
}

impl Facet {
    pub fn facet_type(&self) -> FacetType {
        self.kind.facet_type()
    }

    pub fn range(&self) -> Option<&RangeFacet> {
        match &self.kind {
            FacetKind::Range(range) => Some(range),
            _ => None,
        }
    }

    /// Display limit of a field facet
    pub fn limit(&self) -> Option<usize> {
        match &self.kind {
            FacetKind::Field(terms) => Some(terms.limit),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireFacet {
    id: String,
    #[serde(default)]
    label: String,
    #[serde(default)]
    field: String,
    #[serde(rename = "type")]
    facet_type: FacetType,
    #[serde(default)]
    widget_type: WidgetType,
    #[serde(default)]
    properties: Value,
}

impl TryFrom<WireFacet> for Facet {
    type Error = serde_json::Error;

    fn try_from(wire: WireFacet) -> Result<Self, Self::Error> {
        let properties = match wire.properties {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };

        let options = WidgetOptions::deserialize(&properties)?;
        let kind = match wire.facet_type {
            FacetType::Field => FacetKind::Field(TermsFacet::deserialize(&properties)?),
            FacetType::Range => {
                let spec = RangeSpec::deserialize(&properties)?;
                let TermsFacet { sort, mincount, .. } = TermsFacet::deserialize(&properties)?;
                FacetKind::Range(RangeFacet {
                    spec,
                    sort,
                    mincount,
                })
            }
            FacetType::Query => FacetKind::Query(QueryFacet {
                query: properties
                    .get("query")
                    .and_then(Value::as_str)
                    .unwrap_or(&wire.field)
                    .to_string(),
            }),
        };

        Ok(Facet {
            id: wire.id,
            label: wire.label,
            field: wire.field,
            widget_type: wire.widget_type,
            options,
            kind,
        })
    }
}

impl From<Facet> for WireFacet {
    fn from(facet: Facet) -> Self {
        let facet_type = facet.facet_type();
        let mut properties = Map::new();
        merge_object(&mut properties, serde_json::to_value(&facet.options));

        match facet.kind {
            FacetKind::Field(terms) => {
                merge_object(&mut properties, serde_json::to_value(&terms));
            }
            FacetKind::Range(range) => {
                merge_object(&mut properties, serde_json::to_value(range.spec));
                properties.insert("sort".to_string(), Value::from(sort_name(range.sort)));
                properties.insert("mincount".to_string(), Value::from(range.mincount));
            }
            FacetKind::Query(query) => {
                properties.insert("query".to_string(), Value::String(query.query));
            }
        }

        WireFacet {
            id: facet.id,
            label: facet.label,
            field: facet.field,
            facet_type,
            widget_type: facet.widget_type,
            properties: Value::Object(properties),
        }
    }
}

fn sort_name(sort: SortOrder) -> &'static str {
    match sort {
        SortOrder::Asc => "asc",
        SortOrder::Desc => "desc",
    }
}

fn merge_object(target: &mut Map<String, Value>, value: serde_json::Result<Value>) {
    if let Ok(Value::Object(map)) = value {
        target.extend(map);
    }
}
