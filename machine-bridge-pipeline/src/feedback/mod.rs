//! Feedback publishing for processed production events.
//!
//! Every decodable inbound event yields exactly one feedback publication
//! attempt. Delivery is best-effort: a failed publish is reported to the
//! caller, which logs and drops it rather than retrying (feedback about a
//! feedback failure would recurse indefinitely).

use async_trait::async_trait;
use rumqttc::{AsyncClient, QoS};
use tracing::debug;

use crate::errors::PipelineError;
use machine_bridge_shared::FeedbackRecord;

/// The topic that per-message outcomes are published on.
pub const FEEDBACK_TOPIC: &str = "Machine/Produce/Feedback";

/// Abstract sink for feedback records.
///
/// Implementations must be `Send + Sync`; the handler holds one behind an
/// `Arc` so tests can substitute a capturing mock.
#[async_trait]
pub trait FeedbackPublisher: Send + Sync {
    /// Serialize and publish a feedback record on the feedback topic.
    async fn publish(&self, record: &FeedbackRecord) -> Result<(), PipelineError>;
}

/// Feedback publisher backed by the supervisor's MQTT session.
pub struct MqttFeedbackPublisher {
    client: AsyncClient,
}

impl MqttFeedbackPublisher {
    /// Create a publisher sharing the given broker client.
    pub fn new(client: AsyncClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FeedbackPublisher for MqttFeedbackPublisher {
    async fn publish(&self, record: &FeedbackRecord) -> Result<(), PipelineError> {
        let payload = serde_json::to_vec(record)
            .map_err(|e| PipelineError::serialization(format!("Failed to serialize feedback: {}", e)))?;

        self.client
            .publish(FEEDBACK_TOPIC, QoS::AtLeastOnce, false, payload)
            .await?;

        debug!(topic = FEEDBACK_TOPIC, status = ?record.status, "Published feedback");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use machine_bridge_shared::FeedbackStatus;
    use rumqttc::MqttOptions;

    #[tokio::test]
    async fn test_publish_enqueues_without_broker() {
        // AsyncClient buffers requests until the event loop is polled, so a
        // publish must succeed with no broker present.
        let options = MqttOptions::new("test-feedback", "localhost", 1883);
        let (client, _eventloop) = AsyncClient::new(options, 10);
        let publisher = MqttFeedbackPublisher::new(client);

        let record = FeedbackRecord::new(FeedbackStatus::Success, "Payload indexed successfully");
        publisher.publish(&record).await.unwrap();
    }
}
