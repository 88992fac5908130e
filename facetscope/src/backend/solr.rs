//! Solr HTTP client

use super::{metrics, BackendError, FieldInfo, FieldStats, RawResponse, SearchBackend};
use crate::config::BackendConfig;
use crate::query::StructuredQuery;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::time::{Duration, Instant};

/// [`SearchBackend`] speaking the Solr request-parameter dialect
pub struct SolrBackend {
    client: Client,
    url: String,
}

impl SolrBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()
            .map_err(BackendError::Transport)?;

        Ok(Self {
            client,
            url: config.url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn endpoint(&self, collection: &str, handler: &str) -> String {
        format!("{}/{}/{}", self.url, collection, handler)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        collection: &str,
        handler: &str,
        params: &[(&str, &str)],
    ) -> Result<T, BackendError> {
        let response = self
            .client
            .get(self.endpoint(collection, handler))
            .query(params)
            .send()
            .await?;
        decode(response).await
    }
}

/// Turn a response into `T`, keeping the body of failed requests
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(BackendError::Http {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))
}

/// Run one engine round trip, recording its latency and outcome
async fn timed<T, F>(op: &'static str, fut: F) -> Result<T, BackendError>
where
    F: Future<Output = Result<T, BackendError>>,
{
    let started = Instant::now();
    let result = fut.await;
    let elapsed = started.elapsed();
    metrics::record_request(op, elapsed, result.is_ok());

    match &result {
        Ok(_) => tracing::debug!(op, elapsed_ms = elapsed.as_millis() as u64, "engine request"),
        Err(e) => tracing::warn!(op, kind = e.kind(), "engine request failed: {}", e),
    }
    result
}

#[async_trait]
impl SearchBackend for SolrBackend {
    async fn query(&self, query: &StructuredQuery) -> Result<RawResponse, BackendError> {
        timed("query", async {
            let params = query.to_params();
            let response = self
                .client
                .post(self.endpoint(&query.collection, "select"))
                .form(&params)
                .send()
                .await?;
            decode(response).await
        })
        .await
    }

    async fn suggest(&self, collection: &str, partial: &str) -> Result<Vec<String>, BackendError> {
        timed("suggest", async {
            let body: Value = self
                .get_json(
                    collection,
                    "suggest",
                    &[("suggest", "true"), ("suggest.q", partial), ("wt", "json")],
                )
                .await?;
            Ok::<_, BackendError>(suggestion_terms(&body))
        })
        .await
    }

    async fn fetch_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Value>, BackendError> {
        timed("get", async {
            let body: Value = self
                .get_json(collection, "get", &[("id", id), ("wt", "json")])
                .await?;
            Ok::<_, BackendError>(body.get("doc").filter(|doc| !doc.is_null()).cloned())
        })
        .await
    }

    async fn field_metadata(&self, collection: &str) -> Result<FieldInfo, BackendError> {
        timed("luke", async {
            self.get_json(
                collection,
                "admin/luke",
                &[("numTerms", "0"), ("wt", "json")],
            )
            .await
        })
        .await
    }

    async fn field_stats(
        &self,
        collection: &str,
        field: &str,
    ) -> Result<Option<FieldStats>, BackendError> {
        timed("stats", async {
            let body: Value = self
                .get_json(
                    collection,
                    "select",
                    &[
                        ("q", "*:*"),
                        ("rows", "0"),
                        ("stats", "true"),
                        ("stats.field", field),
                        ("wt", "json"),
                    ],
                )
                .await?;
            Ok::<_, BackendError>(stats_of(&body, field))
        })
        .await
    }
}

/// Terms of every dictionary in a suggester response, deduplicated in order
fn suggestion_terms(body: &Value) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    let Some(dictionaries) = body.get("suggest").and_then(Value::as_object) else {
        return terms;
    };

    for by_query in dictionaries.values().filter_map(Value::as_object) {
        for result in by_query.values() {
            let suggestions = result
                .get("suggestions")
                .and_then(Value::as_array)
                .into_iter()
                .flatten();
            for term in suggestions.filter_map(|s| s.get("term").and_then(Value::as_str)) {
                if !terms.iter().any(|t| t == term) {
                    terms.push(term.to_string());
                }
            }
        }
    }
    terms
}

fn stats_of(body: &Value, field: &str) -> Option<FieldStats> {
    let stats = body.get("stats")?.get("stats_fields")?.get(field)?;
    let min = stats.get("min").filter(|v| !v.is_null())?;
    let max = stats.get("max").filter(|v| !v.is_null())?;
    Some(FieldStats {
        min: min.clone(),
        max: max.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_suggestion_terms_dedup() {
        let body = json!({
            "suggest": {
                "mySuggester": {
                    "tim": {"numFound": 2, "suggestions": [
                        {"term": "timeout", "weight": 3},
                        {"term": "timer", "weight": 1}
                    ]}
                },
                "other": {
                    "tim": {"numFound": 1, "suggestions": [{"term": "timeout", "weight": 1}]}
                }
            }
        });
        assert_eq!(suggestion_terms(&body), vec!["timeout", "timer"]);
        assert!(suggestion_terms(&json!({})).is_empty());
    }

    #[test]
    fn test_stats_of_empty_collection() {
        let body = json!({"stats": {"stats_fields": {"price": {"min": null, "max": null, "count": 0}}}});
        assert!(stats_of(&body, "price").is_none());

        let body = json!({"stats": {"stats_fields": {"price": {"min": 1.5, "max": 99.0}}}});
        let stats = stats_of(&body, "price").unwrap();
        assert_eq!(stats.min, json!(1.5));
        assert_eq!(stats.max, json!(99.0));
    }

    #[test]
    fn test_url_is_normalized() {
        let backend = SolrBackend::new(&BackendConfig {
            url: "http://localhost:8983/solr/".to_string(),
            ..BackendConfig::default()
        })
        .unwrap();
        assert_eq!(backend.url(), "http://localhost:8983/solr");
        assert_eq!(
            backend.endpoint("logs", "select"),
            "http://localhost:8983/solr/logs/select"
        );
    }
}
