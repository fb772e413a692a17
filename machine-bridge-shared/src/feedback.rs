//! Feedback record published after each processed production event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome status carried by a feedback record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackStatus {
    /// The event was indexed successfully.
    Success,
    /// The event could not be indexed.
    Error,
}

/// Record published on the feedback topic for every decodable event.
///
/// Serialized as `{"timestamp": <RFC 3339 UTC>, "status": "success"|"error",
/// "message": <human-readable>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    /// Time the feedback was produced.
    pub timestamp: DateTime<Utc>,
    /// Whether the indexing attempt succeeded.
    pub status: FeedbackStatus,
    /// Human-readable summary of the outcome.
    pub message: String,
}

impl FeedbackRecord {
    /// Create a new feedback record stamped with the current time.
    pub fn new(status: FeedbackStatus, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            status,
            message: message.into(),
        }
    }

    /// Check whether this record reports a successful indexing attempt.
    pub fn is_success(&self) -> bool {
        self.status == FeedbackStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_lowercase() {
        let record = FeedbackRecord::new(FeedbackStatus::Success, "Payload indexed successfully");
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["status"], "success");
        assert_eq!(value["message"], "Payload indexed successfully");

        let record = FeedbackRecord::new(FeedbackStatus::Error, "Payload was not indexed");
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["status"], "error");
    }

    #[test]
    fn test_timestamp_is_rfc3339_utc() {
        let record = FeedbackRecord::new(FeedbackStatus::Success, "ok");
        let value = serde_json::to_value(&record).unwrap();

        let raw = value["timestamp"].as_str().unwrap();
        let parsed = DateTime::parse_from_rfc3339(raw).unwrap();

        assert_eq!(parsed.with_timezone(&Utc), record.timestamp);
    }

    #[test]
    fn test_roundtrip() {
        let record = FeedbackRecord::new(FeedbackStatus::Error, "Payload was not indexed");
        let json = serde_json::to_string(&record).unwrap();
        let back: FeedbackRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(back, record);
        assert!(!back.is_success());
    }
}
