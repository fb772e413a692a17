//! Error types for the bridge pipeline.

use thiserror::Error;

/// Errors that can occur in the bridge pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Initial broker handshake or authentication failed. Fatal at startup.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// MQTT session or client error.
    #[error("MQTT error: {0}")]
    MqttError(String),

    /// Inbound payload could not be decoded as a UTF-8 JSON object.
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// Outbound record could not be serialized.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl PipelineError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create an MQTT error.
    pub fn mqtt(msg: impl Into<String>) -> Self {
        Self::MqttError(msg.into())
    }

    /// Create a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::DecodeError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }
}

impl From<rumqttc::ClientError> for PipelineError {
    fn from(err: rumqttc::ClientError) -> Self {
        Self::MqttError(err.to_string())
    }
}
