//! # Catalog Search Shared
//!
//! Types shared by the catalog search crates: the product document stored in
//! the index, and the query/hit pair used by search and evaluation.

mod document;
mod query;

pub use document::{ProductDocument, PRODUCT_SOURCE_FIELDS};
pub use query::{SearchHit, SearchQuery, DEFAULT_TOP_K, UNKNOWN_NAME};
