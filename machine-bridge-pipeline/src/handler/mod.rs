//! Message handler for inbound production events.
//!
//! Each message is decoded, written to the search backend, and answered with
//! a feedback record. The handler is the single recovery boundary per
//! message: nothing here terminates message delivery.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::errors::PipelineError;
use crate::feedback::FeedbackPublisher;
use crate::writer::IndexWriter;
use machine_bridge_shared::{FeedbackRecord, FeedbackStatus};
use serde_json::{Map, Value};

/// Feedback message for a successfully indexed payload.
const SUCCESS_MESSAGE: &str = "Payload indexed successfully";

/// Feedback message for a payload that was not indexed.
const ERROR_MESSAGE: &str = "Payload was not indexed";

/// Maximum number of characters of a bad payload echoed into the log.
const PAYLOAD_PREVIEW_CHARS: usize = 64;

/// Handler that processes one inbound message at a time.
///
/// Messages are handled serially on the supervisor's task, in delivery
/// order: feedback for message N is published before message N+1 is decoded.
pub struct MessageHandler {
    writer: IndexWriter,
    feedback: Arc<dyn FeedbackPublisher>,
}

impl MessageHandler {
    /// Create a new handler with the given writer and feedback publisher.
    pub fn new(writer: IndexWriter, feedback: Arc<dyn FeedbackPublisher>) -> Self {
        Self { writer, feedback }
    }

    /// Process a single inbound message.
    ///
    /// Decode failures drop the message with no feedback (there is no
    /// well-formed event to correlate feedback with). Every decodable
    /// message yields exactly one feedback publication attempt, whether
    /// indexing succeeded or failed. Publish failures are logged and
    /// swallowed.
    pub async fn handle(&self, topic: &str, payload: &[u8]) {
        let document = match decode_document(payload) {
            Ok(document) => document,
            Err(e) => {
                warn!(
                    topic = %topic,
                    error = %e,
                    payload = %payload_preview(payload),
                    "Dropping message that failed to decode"
                );
                return;
            }
        };

        debug!(topic = %topic, fields = document.len(), "Decoded production event");

        let receipt = self.writer.write(&document).await;

        let record = if receipt.success {
            FeedbackRecord::new(FeedbackStatus::Success, SUCCESS_MESSAGE)
        } else {
            FeedbackRecord::new(FeedbackStatus::Error, ERROR_MESSAGE)
        };

        if let Err(e) = self.feedback.publish(&record).await {
            warn!(error = %e, "Failed to publish feedback");
        }
    }
}

/// Decode an inbound payload as a UTF-8 JSON object.
fn decode_document(payload: &[u8]) -> Result<Map<String, Value>, PipelineError> {
    let text = std::str::from_utf8(payload)
        .map_err(|e| PipelineError::decode(format!("Payload is not valid UTF-8: {}", e)))?;

    let value: Value = serde_json::from_str(text)
        .map_err(|e| PipelineError::decode(format!("Payload is not valid JSON: {}", e)))?;

    match value {
        Value::Object(document) => Ok(document),
        other => Err(PipelineError::decode(format!(
            "Payload is not a JSON object: got {}",
            json_type_name(&other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Truncated lossy excerpt of a payload for log context.
fn payload_preview(payload: &[u8]) -> String {
    let text = String::from_utf8_lossy(payload);
    if text.chars().count() > PAYLOAD_PREVIEW_CHARS {
        let truncated: String = text.chars().take(PAYLOAD_PREVIEW_CHARS).collect();
        format!("{}...", truncated)
    } else {
        text.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use machine_bridge_repository::{IndexAck, SearchError, SearchIndexClient};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Mock backend client counting writes.
    struct MockSearchClient {
        fail: bool,
        write_count: AtomicUsize,
    }

    impl MockSearchClient {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                write_count: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SearchIndexClient for MockSearchClient {
        async fn index_document(
            &self,
            _document: &Map<String, Value>,
        ) -> Result<IndexAck, SearchError> {
            self.write_count.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(SearchError::index("simulated backend failure"))
            } else {
                Ok(IndexAck::new("created"))
            }
        }

        async fn health_check(&self) -> Result<bool, SearchError> {
            Ok(true)
        }
    }

    /// Feedback publisher capturing every record it is given.
    struct CapturingPublisher {
        records: Mutex<Vec<FeedbackRecord>>,
        fail: bool,
    }

    impl CapturingPublisher {
        fn new() -> Self {
            Self {
                records: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                records: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn published(&self) -> Vec<FeedbackRecord> {
            self.records.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl FeedbackPublisher for CapturingPublisher {
        async fn publish(&self, record: &FeedbackRecord) -> Result<(), PipelineError> {
            self.records.lock().unwrap().push(record.clone());
            if self.fail {
                Err(PipelineError::mqtt("not connected"))
            } else {
                Ok(())
            }
        }
    }

    fn handler(
        fail_backend: bool,
    ) -> (MessageHandler, Arc<MockSearchClient>, Arc<CapturingPublisher>) {
        let client = Arc::new(MockSearchClient::new(fail_backend));
        let publisher = Arc::new(CapturingPublisher::new());
        let handler = MessageHandler::new(IndexWriter::new(client.clone()), publisher.clone());
        (handler, client, publisher)
    }

    #[tokio::test]
    async fn test_valid_payload_yields_one_write_and_success_feedback() {
        let (handler, client, publisher) = handler(false);

        handler
            .handle("Machine/Produce", br#"{"machine":"A1","count":10}"#)
            .await;

        assert_eq!(client.write_count.load(Ordering::SeqCst), 1);
        let records = publisher.published();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, FeedbackStatus::Success);
        assert_eq!(records[0].message, "Payload indexed successfully");
    }

    #[tokio::test]
    async fn test_backend_failure_still_publishes_error_feedback() {
        let (handler, client, publisher) = handler(true);

        handler
            .handle("Machine/Produce", br#"{"machine":"A1","count":10}"#)
            .await;

        assert_eq!(client.write_count.load(Ordering::SeqCst), 1);
        let records = publisher.published();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, FeedbackStatus::Error);
        assert_eq!(records[0].message, "Payload was not indexed");
    }

    #[tokio::test]
    async fn test_non_utf8_payload_is_dropped_without_feedback() {
        let (handler, client, publisher) = handler(false);

        handler.handle("Machine/Produce", b"\xff\xfe").await;

        assert_eq!(client.write_count.load(Ordering::SeqCst), 0);
        assert!(publisher.published().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_json_is_dropped_without_feedback() {
        let (handler, client, publisher) = handler(false);

        handler.handle("Machine/Produce", b"{not json").await;

        assert_eq!(client.write_count.load(Ordering::SeqCst), 0);
        assert!(publisher.published().is_empty());
    }

    #[tokio::test]
    async fn test_non_object_json_is_dropped_without_feedback() {
        let (handler, client, publisher) = handler(false);

        handler.handle("Machine/Produce", b"[1, 2, 3]").await;
        handler.handle("Machine/Produce", b"42").await;

        assert_eq!(client.write_count.load(Ordering::SeqCst), 0);
        assert!(publisher.published().is_empty());
    }

    #[tokio::test]
    async fn test_feedback_publish_failure_is_swallowed() {
        let client = Arc::new(MockSearchClient::new(false));
        let publisher = Arc::new(CapturingPublisher::failing());
        let handler = MessageHandler::new(IndexWriter::new(client.clone()), publisher.clone());

        handler
            .handle("Machine/Produce", br#"{"machine":"A1"}"#)
            .await;

        // One attempt was made even though it failed; handle did not panic.
        assert_eq!(publisher.published().len(), 1);
    }

    #[test]
    fn test_decode_document_accepts_objects_only() {
        assert!(decode_document(br#"{"a": 1}"#).is_ok());
        assert!(decode_document(b"null").is_err());
        assert!(decode_document(b"\"text\"").is_err());
        assert!(decode_document(b"[]").is_err());
    }

    #[test]
    fn test_payload_preview_truncates() {
        let long = json!({"k": "v".repeat(200)}).to_string();
        let preview = payload_preview(long.as_bytes());
        assert!(preview.chars().count() <= PAYLOAD_PREVIEW_CHARS + 3);
        assert!(preview.ends_with("..."));

        assert_eq!(payload_preview(b"short"), "short");
    }
}
