//! Structured engine queries and their assembly from UI state

mod assembler;
mod structured;

pub use assembler::{QueryAssembler, DEFAULT_PAGE_SIZE};
pub use structured::{escape_value, FacetRequest, FilterClause, StructuredQuery, MATCH_ALL};
