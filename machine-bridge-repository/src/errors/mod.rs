//! Error types for search backend operations.

mod search_error;

pub use search_error::SearchError;
