//! Supervisor module for the bridge pipeline.
//!
//! Owns the broker session lifecycle: connect, subscribe, detect
//! disconnection, reconnect with a fixed delay, and deliver inbound
//! messages to the handler.

mod mqtt_supervisor;
mod session_state;

pub use mqtt_supervisor::{BrokerConfig, MqttSupervisor, SupervisorHandle};
pub use session_state::SessionState;
