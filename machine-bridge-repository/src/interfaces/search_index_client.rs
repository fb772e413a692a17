//! Search index client trait definition.
//!
//! This module defines the abstract interface for submitting production
//! events to a search backend, allowing for different implementations
//! (OpenSearch, mock, etc.).

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::errors::SearchError;

/// Acknowledgment returned by the search backend for an index operation.
///
/// Carries the backend's `result` field verbatim so callers can distinguish
/// a newly created document from any other outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexAck {
    /// The backend's result classification, e.g. `"created"` or `"updated"`.
    pub result: String,
}

impl IndexAck {
    /// Create an acknowledgment from the backend's result string.
    pub fn new(result: impl Into<String>) -> Self {
        Self {
            result: result.into(),
        }
    }

    /// Whether the backend reported the document as newly created.
    pub fn is_created(&self) -> bool {
        self.result == "created"
    }
}

/// Abstract interface for search backend operations.
///
/// Implementations can be swapped for different backends (OpenSearch, mock,
/// etc.) enabling easy testing and potential future migrations.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow use across async tasks.
#[async_trait]
pub trait SearchIndexClient: Send + Sync {
    /// Submit a document as a new entry in the production index.
    ///
    /// # Arguments
    ///
    /// * `document` - The decoded event payload to index
    ///
    /// # Returns
    ///
    /// * `Ok(IndexAck)` - The backend's acknowledgment
    /// * `Err(SearchError)` - If the request fails or the response cannot
    ///   be parsed
    async fn index_document(&self, document: &Map<String, Value>) -> Result<IndexAck, SearchError>;

    /// Check if the search backend is healthy and reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the backend is healthy
    /// * `Ok(false)` - If the backend is unhealthy
    /// * `Err(SearchError)` - If the health check fails to execute
    async fn health_check(&self) -> Result<bool, SearchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_ack() {
        assert!(IndexAck::new("created").is_created());
    }

    #[test]
    fn test_other_acks_are_not_created() {
        assert!(!IndexAck::new("updated").is_created());
        assert!(!IndexAck::new("noop").is_created());
        assert!(!IndexAck::new("").is_created());
    }
}
