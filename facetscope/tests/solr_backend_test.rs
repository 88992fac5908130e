//! SolrBackend against an in-process fake Solr.
//!
//! The fake records the form parameters of every `select` POST so the tests
//! can check the exact request dialect without a real engine.

use axum::extract::{Query as Params, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Form, Json, Router};
use facetscope::backend::{BackendError, SearchBackend, SolrBackend};
use facetscope::config::BackendConfig;
use facetscope::model::{Collection, Query, QueryClause};
use facetscope::query::QueryAssembler;
use facetscope::search::Searcher;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

type Recorded = Arc<Mutex<Vec<Vec<(String, String)>>>>;

// ---------------------------------------------------------------------------
// Fake engine
// ---------------------------------------------------------------------------

async fn select_post(
    State(recorded): State<Recorded>,
    Form(params): Form<Vec<(String, String)>>,
) -> impl IntoResponse {
    let q = params
        .iter()
        .find(|(k, _)| k == "q")
        .map(|(_, v)| v.clone())
        .unwrap_or_default();
    recorded.lock().push(params);

    if q.contains('(') && !q.contains(')') {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "responseHeader": {"status": 400},
                "error": {"msg": format!("Cannot parse '{}'", q), "code": 400}
            })),
        );
    }
    if q == "slow" {
        tokio::time::sleep(Duration::from_secs(2)).await;
    }

    (
        StatusCode::OK,
        Json(json!({
            "responseHeader": {"status": 0, "QTime": 1},
            "response": {"numFound": 2, "start": 0, "docs": [{"id": "1"}, {"id": "2"}]},
            "facet_counts": {
                "facet_queries": {"q1": 1},
                "facet_fields": {"f1": ["error", 2, "ok", 0]},
                "facet_ranges": {"r1": {"counts": ["0", 1, "10", 1], "gap": 10, "start": 0, "end": 20}}
            }
        })),
    )
}

async fn select_get(Params(params): Params<HashMap<String, String>>) -> Json<Value> {
    let field = params.get("stats.field").cloned().unwrap_or_default();
    let stats = match field.as_str() {
        "latency" => json!({"min": 3.0, "max": 97.0}),
        _ => json!({"min": null, "max": null}),
    };
    Json(json!({
        "response": {"numFound": 10, "start": 0, "docs": []},
        "stats": {"stats_fields": {field: stats}}
    }))
}

async fn suggest(Params(params): Params<HashMap<String, String>>) -> Json<Value> {
    let partial = params.get("suggest.q").cloned().unwrap_or_default();
    Json(json!({
        "suggest": {
            "mainSuggester": {
                partial.clone(): {"numFound": 2, "suggestions": [
                    {"term": format!("{}out", partial), "weight": 3},
                    {"term": format!("{}er", partial), "weight": 1}
                ]}
            },
            "altSuggester": {
                partial.clone(): {"numFound": 1, "suggestions": [
                    {"term": format!("{}out", partial), "weight": 2}
                ]}
            }
        }
    }))
}

async fn realtime_get(Params(params): Params<HashMap<String, String>>) -> Json<Value> {
    match params.get("id").map(String::as_str) {
        Some("42") => Json(json!({"doc": {"id": "42", "status": "error"}})),
        _ => Json(json!({"doc": null})),
    }
}

async fn luke() -> Json<Value> {
    Json(json!({
        "index": {"numDocs": 10},
        "fields": {
            "id": {"type": "string", "schema": "I-S-----OF-----l"},
            "latency": {"type": "pint", "schema": "I-S-----OF-----l"},
            "tags_ss": {"type": "strings", "schema": "I-SM----OF-----l", "dynamicBase": "*_ss"}
        }
    }))
}

async fn start_fake_solr() -> (String, Recorded, tokio::task::JoinHandle<()>) {
    let recorded: Recorded = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/solr/logs/select", get(select_get).post(select_post))
        .route("/solr/logs/suggest", get(suggest))
        .route("/solr/logs/get", get(realtime_get))
        .route("/solr/logs/admin/luke", get(luke))
        .with_state(recorded.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/solr/", addr), recorded, handle)
}

fn backend(url: &str, timeout_ms: u64) -> SolrBackend {
    SolrBackend::new(&BackendConfig {
        url: url.to_string(),
        timeout_ms,
        connect_timeout_ms: 1000,
    })
    .unwrap()
}

fn collection() -> Collection {
    serde_json::from_value(json!({
        "name": "logs",
        "facets": [
            {"id": "f1", "label": "Status", "field": "status", "type": "field",
             "properties": {"sort": "desc", "limit": 5, "mincount": 1}},
            {"id": "r1", "label": "Latency", "field": "latency", "type": "range",
             "properties": {"start": 0, "end": 20, "gap": 10}},
            {"id": "q1", "label": "Slow", "field": "latency:[500 TO *]", "type": "query"}
        ]
    }))
    .unwrap()
}

fn values<'a>(params: &'a [(String, String)], key: &str) -> Vec<&'a str> {
    params
        .iter()
        .filter(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_query_sends_solr_parameters() {
    let (url, recorded, _handle) = start_fake_solr().await;
    let backend = backend(&url, 5000);
    assert!(!backend.url().ends_with('/'));

    let query: Query = serde_json::from_value(json!({
        "qs": [{"q": "timeout"}],
        "fqs": [{"id": "f1", "filter": ["error"]}],
        "start": 15
    }))
    .unwrap();
    let structured = QueryAssembler::default().assemble(&collection(), &query).unwrap();
    let raw = backend.query(&structured).await.unwrap();

    assert_eq!(raw.response.num_found, 2);
    assert_eq!(raw.facet_counts.facet_queries.get("q1"), Some(&1));

    let sent = recorded.lock().pop().unwrap();
    assert_eq!(values(&sent, "q"), vec!["timeout"]);
    assert_eq!(values(&sent, "start"), vec!["15"]);
    assert_eq!(values(&sent, "rows"), vec!["15"]);
    assert_eq!(values(&sent, "facet"), vec!["true"]);
    assert_eq!(values(&sent, "fq"), vec!["{!tag=f1}status:error"]);
    assert_eq!(
        values(&sent, "facet.field"),
        vec!["{!key=f1 ex=f1 facet.limit=5 facet.mincount=1 facet.sort=count}status"]
    );
    assert_eq!(values(&sent, "facet.range").len(), 1);
    assert!(values(&sent, "facet.range")[0].contains("facet.range.gap=10"));
    assert_eq!(values(&sent, "facet.query"), vec!["{!key=q1 ex=q1}latency:[500 TO *]"]);
}

#[tokio::test]
async fn test_engine_error_is_kept() {
    let (url, _recorded, _handle) = start_fake_solr().await;
    let backend = backend(&url, 5000);

    let query = Query {
        qs: vec![QueryClause::new("status:(error")],
        ..Query::default()
    };
    let structured = QueryAssembler::default().assemble(&collection(), &query).unwrap();
    let err = backend.query(&structured).await.unwrap_err();

    match &err {
        BackendError::Http { status, .. } => assert_eq!(*status, 400),
        other => panic!("expected an HTTP error, got {:?}", other),
    }
    assert_eq!(err.user_message(), "Cannot parse 'status:(error'");
}

#[tokio::test]
async fn test_search_embeds_engine_error() {
    let (url, _recorded, _handle) = start_fake_solr().await;
    let searcher = Searcher::new(
        Arc::new(backend(&url, 5000)),
        QueryAssembler::default(),
        Default::default(),
    );
    let query = Query {
        qs: vec![QueryClause::new("(broken")],
        start: 30,
        ..Query::default()
    };

    let response = searcher.search(Some(&collection()), &query).await;
    assert_eq!(response.error.as_deref(), Some("Cannot parse '(broken'"));
    assert_eq!(response.response.start, 30);
}

#[tokio::test]
async fn test_timeout() {
    let (url, _recorded, _handle) = start_fake_solr().await;
    let backend = backend(&url, 200);

    let query = Query {
        qs: vec![QueryClause::new("slow")],
        ..Query::default()
    };
    let structured = QueryAssembler::default().assemble(&collection(), &query).unwrap();
    let err = backend.query(&structured).await.unwrap_err();
    assert!(matches!(err, BackendError::Timeout), "got {:?}", err);
}

#[tokio::test]
async fn test_unknown_collection_is_http_error() {
    let (url, _recorded, _handle) = start_fake_solr().await;
    let err = backend(&url, 5000).field_metadata("nope").await.unwrap_err();
    assert!(matches!(err, BackendError::Http { status: 404, .. }));
}

#[tokio::test]
async fn test_suggest_deduplicates_terms() {
    let (url, _recorded, _handle) = start_fake_solr().await;
    let terms = backend(&url, 5000).suggest("logs", "time").await.unwrap();
    assert_eq!(terms, vec!["timeout", "timeer"]);
}

#[tokio::test]
async fn test_fetch_document() {
    let (url, _recorded, _handle) = start_fake_solr().await;
    let backend = backend(&url, 5000);

    let doc = backend.fetch_document("logs", "42").await.unwrap().unwrap();
    assert_eq!(doc["status"], "error");
    assert!(backend.fetch_document("logs", "7").await.unwrap().is_none());
}

#[tokio::test]
async fn test_field_metadata_and_stats() {
    let (url, _recorded, _handle) = start_fake_solr().await;
    let backend = backend(&url, 5000);

    let info = backend.field_metadata("logs").await.unwrap();
    assert_eq!(info.fields.len(), 3);
    assert_eq!(info.dynamic_fields().count(), 1);

    let stats = backend.field_stats("logs", "latency").await.unwrap().unwrap();
    assert_eq!(stats.min, json!(3.0));
    assert_eq!(stats.max, json!(97.0));

    assert!(backend.field_stats("logs", "empty").await.unwrap().is_none());
}
