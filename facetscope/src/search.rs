//! Top-level operations of a search page, independent of transport

use crate::backend::SearchBackend;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::facets::FacetFactory;
use crate::model::{Collection, Facet, FieldDescriptor, Query, RangeBucket, RangeSpec, WidgetType};
use crate::planner::RangeFacetPlanner;
use crate::query::QueryAssembler;
use crate::response::{NormalizedResponse, ResponseNormalizer};
use crate::timeline::{NormalizedSeries, Selection, TimelineBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// What a range facet request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeAction {
    /// Re-plan the gap over the facet's current bounds
    Select,
    /// Narrow the facet to a sub-range
    Zoom,
}

/// Runs every operation against one shared backend
pub struct Searcher {
    backend: Arc<dyn SearchBackend>,
    assembler: QueryAssembler,
    planner: RangeFacetPlanner,
}

impl Searcher {
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        assembler: QueryAssembler,
        planner: RangeFacetPlanner,
    ) -> Self {
        Self {
            backend,
            assembler,
            planner,
        }
    }

    pub fn from_config(backend: Arc<dyn SearchBackend>, config: &Config) -> Self {
        Self::new(
            backend,
            QueryAssembler::new(config.search.page_size),
            RangeFacetPlanner::new(config.planner),
        )
    }

    pub fn backend(&self) -> &Arc<dyn SearchBackend> {
        &self.backend
    }

    pub fn planner(&self) -> &RangeFacetPlanner {
        &self.planner
    }

    /// Documents and facet counts of one page; failures are embedded in the result
    pub async fn search(&self, collection: Option<&Collection>, query: &Query) -> NormalizedResponse {
        let Some(collection) = collection else {
            return NormalizedResponse::failed("There is no collection to search.", query.start);
        };

        let structured = match self.assembler.assemble(collection, query) {
            Ok(structured) => structured,
            Err(e) => return NormalizedResponse::failed(e.user_message(), query.start),
        };

        let result = self.backend.query(&structured).await;
        ResponseNormalizer::normalize_result(result, collection, query)
    }

    pub async fn suggest(&self, collection: &Collection, partial: &str) -> Result<Vec<String>> {
        Ok(self.backend.suggest(&collection.name, partial).await?)
    }

    pub async fn get_document(&self, collection: &Collection, id: Option<&str>) -> Result<Value> {
        let id = id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| Error::NotFound("This document does not have any index id.".to_string()))?;

        self.backend
            .fetch_document(&collection.name, id)
            .await?
            .ok_or_else(|| Error::NotFound("No document was returned by the search engine.".to_string()))
    }

    /// Fields of engine collection `name` created from dynamic field patterns
    pub async fn index_fields_dynamic(&self, name: &str) -> Result<Vec<FieldDescriptor>> {
        let info = self.backend.field_metadata(name).await?;
        Ok(info
            .descriptors()
            .into_iter()
            .filter(|field| field.dynamic_base.is_some())
            .collect())
    }

    /// A fresh collection definition over engine collection `name`
    pub async fn get_collection(&self, name: &str) -> Result<Collection> {
        if name.trim().is_empty() {
            return Err(Error::MalformedQuery("collection name is empty".to_string()));
        }
        let info = self.backend.field_metadata(name).await?;
        let mut collection = Collection::new(name, name);
        collection.fields = info.descriptors();
        if collection.fields.iter().any(|f| f.name == "id") {
            collection.id_field = Some("id".to_string());
        }
        Ok(collection)
    }

    pub fn range_facet(
        &self,
        facet: &Facet,
        action: RangeAction,
        range: Option<&RangeBucket>,
    ) -> Result<RangeSpec> {
        match action {
            RangeAction::Select => {
                let current = facet.range().ok_or_else(|| {
                    Error::InvalidRange(format!("facet '{}' is not a range facet", facet.id))
                })?;
                let spec = current.spec;
                self.planner
                    .plan_initial_gap(spec.domain(), spec.start(), spec.end())
            }
            RangeAction::Zoom => {
                let range = range.ok_or_else(|| {
                    Error::MalformedQuery("zoom needs a range to zoom into".to_string())
                })?;
                self.planner.zoom(facet, range)
            }
        }
    }

    pub async fn timeline(
        &self,
        collection: &Collection,
        query: &Query,
        facet: &Facet,
        selection: &Selection,
    ) -> Result<NormalizedSeries> {
        TimelineBuilder::new(self.backend.clone(), self.assembler)
            .build_series(collection, query, facet, selection)
            .await
    }

    pub async fn new_facet(
        &self,
        collection: &Collection,
        id: &str,
        label: &str,
        field: &str,
        widget_type: WidgetType,
    ) -> Result<Facet> {
        FacetFactory::new(self.planner)
            .new_facet(self.backend.as_ref(), collection, id, label, field, widget_type)
            .await
    }
}
