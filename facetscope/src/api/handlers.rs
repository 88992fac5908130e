//! One handler per operation.
//!
//! Handlers decode the body themselves so that every failure, including a
//! malformed body, is answered with the status envelope.

use super::envelope::Envelope;
use super::requests::*;
use super::AppState;
use crate::error::{Error, Result};
use crate::model::{Collection, Facet, FieldDescriptor, RangeSpec};
use crate::response::NormalizedResponse;
use crate::timeline::{NormalizedSeries, Selection};
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Serialize)]
pub struct SavedBody {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsBody {
    pub suggestions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct FieldsBody {
    pub fields: Vec<FieldDescriptor>,
}

#[derive(Debug, Serialize)]
pub struct DocumentBody {
    pub doc: Value,
}

#[derive(Debug, Serialize)]
pub struct SeriesBody {
    pub series: NormalizedSeries,
}

#[derive(Debug, Serialize)]
pub struct FacetBody {
    pub facet: Facet,
}

#[derive(Debug, Serialize)]
pub struct PropertiesBody {
    pub properties: RangeSpec,
}

#[derive(Debug, Serialize)]
pub struct CollectionBody {
    pub collection: Collection,
}

/// POST /search
pub async fn search(State(state): State<AppState>, body: Bytes) -> Json<NormalizedResponse> {
    let request: SearchRequest = match decode(&body) {
        Ok(request) => request,
        Err(e) => return Json(NormalizedResponse::failed(e.user_message(), 0)),
    };
    let Some(query) = request.query else {
        let err = Error::MalformedQuery("missing 'query'".to_string());
        return Json(NormalizedResponse::failed(err.user_message(), 0));
    };

    Json(state.searcher.search(request.collection.as_ref(), &query).await)
}

/// POST /save
pub async fn save(State(state): State<AppState>, body: Bytes) -> Envelope<SavedBody> {
    match save_collection(&state, &body) {
        Ok(saved) => Envelope::ok(saved).with_message("Page saved !"),
        Err(e) => Envelope::error(&e),
    }
}

fn save_collection(state: &AppState, body: &[u8]) -> Result<SavedBody> {
    let request: SaveRequest = decode(body)?;
    let collection = required(request.collection, "collection")?;
    let saved = state.store.save(collection)?;
    tracing::info!(collection = %saved.name, "saved collection");
    Ok(SavedBody {
        id: saved.id.unwrap_or_default(),
    })
}

/// POST /suggest/:collection_id
pub async fn suggest(
    State(state): State<AppState>,
    Path(collection_id): Path<String>,
    body: Bytes,
) -> Envelope<SuggestionsBody> {
    suggest_terms(&state, &collection_id, &body).await.into()
}

async fn suggest_terms(state: &AppState, collection_id: &str, body: &[u8]) -> Result<SuggestionsBody> {
    let request: SuggestRequest = decode(body)?;
    let partial = required(request.query, "query")?;
    let collection = state.store.get(collection_id)?;
    let suggestions = state.searcher.suggest(&collection, &partial).await?;
    Ok(SuggestionsBody { suggestions })
}

/// POST /index/fields/dynamic
pub async fn index_fields_dynamic(State(state): State<AppState>, body: Bytes) -> Envelope<FieldsBody> {
    dynamic_fields(&state, &body).await.into()
}

async fn dynamic_fields(state: &AppState, body: &[u8]) -> Result<FieldsBody> {
    let request: FieldsRequest = decode(body)?;
    let name = required(request.name, "name")?;
    let fields = state.searcher.index_fields_dynamic(&name).await?;
    Ok(FieldsBody { fields })
}

/// POST /get_document
pub async fn get_document(State(state): State<AppState>, body: Bytes) -> Envelope<DocumentBody> {
    fetch_document(&state, &body).await.into()
}

async fn fetch_document(state: &AppState, body: &[u8]) -> Result<DocumentBody> {
    let request: DocumentRequest = decode(body)?;
    let collection = required(request.collection, "collection")?;
    let id = request.id.as_ref().and_then(document_id);
    let doc = state.searcher.get_document(&collection, id.as_deref()).await?;
    Ok(DocumentBody { doc })
}

fn document_id(id: &Value) -> Option<String> {
    match id {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// POST /get_timeline
pub async fn get_timeline(State(state): State<AppState>, body: Bytes) -> Envelope<SeriesBody> {
    timeline_series(&state, &body).await.into()
}

async fn timeline_series(state: &AppState, body: &[u8]) -> Result<SeriesBody> {
    let request: TimelineRequest = decode(body)?;
    let collection = required(request.collection, "collection")?;
    let query = required(request.query, "query")?;
    let facet = required(request.facet, "facet")?;
    let selection = Selection::from_mode(&request.multi_q, &request.qdata)?;

    let series = state
        .searcher
        .timeline(&collection, &query, &facet, &selection)
        .await?;
    Ok(SeriesBody { series })
}

/// POST /new_facet
pub async fn new_facet(State(state): State<AppState>, body: Bytes) -> Envelope<FacetBody> {
    create_facet(&state, &body).await.into()
}

async fn create_facet(state: &AppState, body: &[u8]) -> Result<FacetBody> {
    let request: NewFacetRequest = decode(body)?;
    let collection = required(request.collection, "collection")?;
    let id = required(request.id, "id")?;
    let field = required(request.field, "field")?;

    let facet = state
        .searcher
        .new_facet(&collection, &id, &request.label, &field, request.widget_type)
        .await?;
    Ok(FacetBody { facet })
}

/// POST /get_range_facet
pub async fn get_range_facet(State(state): State<AppState>, body: Bytes) -> Envelope<PropertiesBody> {
    range_properties(&state, &body).into()
}

fn range_properties(state: &AppState, body: &[u8]) -> Result<PropertiesBody> {
    let request: RangeFacetRequest = decode(body)?;
    let facet = required(request.facet, "facet")?;
    let properties = state
        .searcher
        .range_facet(&facet, request.action, request.range.as_ref())?;
    Ok(PropertiesBody { properties })
}

/// POST /get_collection
pub async fn get_collection(State(state): State<AppState>, body: Bytes) -> Envelope<CollectionBody> {
    describe_collection(&state, &body).await.into()
}

async fn describe_collection(state: &AppState, body: &[u8]) -> Result<CollectionBody> {
    let request: CollectionRequest = decode(body)?;
    let name = required(request.name, "name")?;
    let collection = state.searcher.get_collection(&name).await?;
    Ok(CollectionBody { collection })
}

/// GET /collections
pub async fn list_collections(State(state): State<AppState>) -> Response {
    match state.store.list_all() {
        Ok(collections) => {
            let summaries: Vec<CollectionSummary> =
                collections.into_iter().map(CollectionSummary::from).collect();
            Json(summaries).into_response()
        }
        Err(e) => Envelope::<()>::error(&e).into_response(),
    }
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
