//! OpenSearch implementation of the search index client.

mod client;

pub use client::{OpenSearchClient, OpenSearchConfig};
