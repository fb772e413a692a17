//! Index writer for decoded production events.
//!
//! Wraps the search backend client and folds every failure into an
//! [`IndexReceipt`] so the handler's control flow is uniform.

use std::sync::Arc;
use tracing::{debug, error, warn};

use machine_bridge_repository::SearchIndexClient;
use machine_bridge_shared::IndexReceipt;
use serde_json::{Map, Value};

/// Writer that submits documents to the search backend.
///
/// There is no retry and no timeout on the backend call: a write failure is
/// terminal for that message and only surfaces via feedback. A hanging
/// backend call stalls the serial pipeline; the wait is unbounded by design.
pub struct IndexWriter {
    client: Arc<dyn SearchIndexClient>,
}

impl IndexWriter {
    /// Create a new writer with the given backend client.
    pub fn new(client: Arc<dyn SearchIndexClient>) -> Self {
        Self { client }
    }

    /// Submit a document and classify the outcome.
    ///
    /// Never fails: backend errors and acknowledgments other than `"created"`
    /// both yield a receipt with `success: false` and a diagnostic.
    pub async fn write(&self, document: &Map<String, Value>) -> IndexReceipt {
        match self.client.index_document(document).await {
            Ok(ack) if ack.is_created() => {
                debug!("Document indexed successfully");
                IndexReceipt::created()
            }
            Ok(ack) => {
                warn!(result = %ack.result, "Backend did not report document creation");
                IndexReceipt::failed(format!("Unexpected acknowledgment: {}", ack.result))
            }
            Err(e) => {
                error!(error = %e, "Failed to index document");
                IndexReceipt::failed(e.to_string())
            }
        }
    }
}
