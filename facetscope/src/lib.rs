//! Query orchestration for faceted search front ends
//!
//! facetscope sits between a search UI and a Solr-compatible engine. It turns a
//! declarative collection/facet model plus the user's selections into a
//! structured engine query, plans the bucket widths of numeric and date
//! histograms, and reshapes the engine's facet payloads into display-ready
//! counts and series.
//!
//! # Pipeline
//!
//! - [`query::QueryAssembler`] - collection + query state to [`query::StructuredQuery`]
//! - [`planner::RangeFacetPlanner`] - initial gap selection and zoom refinement
//! - [`backend::SearchBackend`] - executes the structured query ([`backend::SolrBackend`])
//! - [`response::ResponseNormalizer`] - raw engine response to normalized facets
//! - [`timeline::TimelineBuilder`] - one selection gesture to one labeled series
//!
//! The [`api`] module exposes every operation over HTTP with the uniform
//! `{status, message}` envelope.

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod facets;
pub mod model;
pub mod planner;
pub mod query;
pub mod response;
pub mod search;
pub mod store;
pub mod timeline;

pub use config::Config;
pub use error::{Error, Result};
