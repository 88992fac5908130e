//! Search engine boundary

mod error;
mod fields;
pub mod metrics;
mod raw;
mod solr;

pub use error::{error_message_of, extract_error_message, BackendError};
pub use fields::{field_type_domain, FieldInfo, FieldProperties, FieldStats};
pub use raw::{DocumentPage, EngineError, FacetCounts, RawRangeCounts, RawResponse};
pub use solr::SolrBackend;

use crate::query::StructuredQuery;
use async_trait::async_trait;
use serde_json::Value;

/// A search engine that can execute structured queries.
///
/// Implementations must be cheap to share: one instance serves every
/// request of the process behind an `Arc`.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Execute a query and return the engine's native response
    async fn query(&self, query: &StructuredQuery) -> Result<RawResponse, BackendError>;

    /// Completions for a partial query string
    async fn suggest(&self, collection: &str, partial: &str) -> Result<Vec<String>, BackendError>;

    /// Fetch one document by its unique key, `None` when the engine has none
    async fn fetch_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Value>, BackendError>;

    /// Schema fields of a collection
    async fn field_metadata(&self, collection: &str) -> Result<FieldInfo, BackendError>;

    /// Minimum and maximum of a field, `None` when the collection is empty
    async fn field_stats(
        &self,
        collection: &str,
        field: &str,
    ) -> Result<Option<FieldStats>, BackendError>;
}
