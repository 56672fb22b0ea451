//! Error types for the catalog search repository.

mod search_error;

pub use search_error::SearchError;
