//! Dependency initialization and wiring for the bridge.

use std::env;
use std::sync::Arc;
use tracing::info;

use crate::BridgeError;
use machine_bridge_pipeline::{
    feedback::MqttFeedbackPublisher,
    handler::MessageHandler,
    supervisor::{BrokerConfig, MqttSupervisor, SupervisorHandle},
    writer::IndexWriter,
};
use machine_bridge_repository::{OpenSearchClient, OpenSearchConfig, SearchIndexClient};
use machine_bridge_shared::BridgeState;

/// Default MQTT broker port (TLS).
const DEFAULT_MQTT_PORT: u16 = 8883;

/// Default OpenSearch port.
const DEFAULT_OPENSEARCH_PORT: u16 = 25060;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured supervisor ready to run.
    pub supervisor: MqttSupervisor,
    /// Handle for stopping the supervisor.
    pub handle: SupervisorHandle,
    /// Shared connection state.
    pub state: Arc<BridgeState>,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `MQTT_BROKER`: MQTT broker hostname (required)
    /// - `MQTT_PORT`: MQTT broker port (default: 8883)
    /// - `MQTT_USERNAME` / `MQTT_PASSWORD`: broker credentials (required)
    /// - `OPENSEARCH_HOST`: OpenSearch hostname (required)
    /// - `OPENSEARCH_PORT`: OpenSearch port (default: 25060)
    /// - `OPENSEARCH_USERNAME` / `OPENSEARCH_PASSWORD`: backend credentials
    ///   (required)
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(BridgeError)` - If configuration is incomplete or the search
    ///   backend is unreachable
    pub async fn new() -> Result<Self, BridgeError> {
        let mqtt_host = require_var("MQTT_BROKER")?;
        let mqtt_port = port_var("MQTT_PORT", DEFAULT_MQTT_PORT)?;
        let mqtt_username = require_var("MQTT_USERNAME")?;
        let mqtt_password = require_var("MQTT_PASSWORD")?;

        let opensearch_host = require_var("OPENSEARCH_HOST")?;
        let opensearch_port = port_var("OPENSEARCH_PORT", DEFAULT_OPENSEARCH_PORT)?;
        let opensearch_username = require_var("OPENSEARCH_USERNAME")?;
        let opensearch_password = require_var("OPENSEARCH_PASSWORD")?;

        info!(
            mqtt_host = %mqtt_host,
            mqtt_port = mqtt_port,
            opensearch_host = %opensearch_host,
            "Initializing dependencies"
        );

        // Initialize OpenSearch client
        let search_client = OpenSearchClient::new(&OpenSearchConfig {
            host: opensearch_host,
            port: opensearch_port,
            username: opensearch_username,
            password: opensearch_password,
        })
        .map_err(|e| BridgeError::config(format!("Failed to create OpenSearch client: {}", e)))?;

        // Verify OpenSearch is reachable
        let healthy = search_client
            .health_check()
            .await
            .map_err(|e| BridgeError::config(format!("OpenSearch health check failed: {}", e)))?;

        if !healthy {
            return Err(BridgeError::config("OpenSearch cluster is unhealthy"));
        }

        info!("OpenSearch connection verified");

        // Open the broker session and wire the handler in
        let broker_config = BrokerConfig {
            host: mqtt_host,
            port: mqtt_port,
            username: mqtt_username,
            password: mqtt_password,
        };

        let (client, eventloop) = MqttSupervisor::open_session(&broker_config);
        let publisher = Arc::new(MqttFeedbackPublisher::new(client.clone()));
        let writer = IndexWriter::new(Arc::new(search_client));
        let handler = MessageHandler::new(writer, publisher);

        let state = Arc::new(BridgeState::new());
        let supervisor = MqttSupervisor::new(client, eventloop, handler, state.clone());
        let handle = supervisor.handle();

        info!("MQTT supervisor created");

        Ok(Self {
            supervisor,
            handle,
            state,
        })
    }
}

fn require_var(name: &str) -> Result<String, BridgeError> {
    env::var(name).map_err(|_| BridgeError::config(format!("{} is not set", name)))
}

fn port_var(name: &str, default: u16) -> Result<u16, BridgeError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| BridgeError::config(format!("{} is not a valid port: {}", name, raw))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_var_default() {
        assert_eq!(port_var("MACHINE_BRIDGE_TEST_UNSET_PORT", 8883).unwrap(), 8883);
    }

    #[test]
    fn test_port_var_invalid() {
        env::set_var("MACHINE_BRIDGE_TEST_BAD_PORT", "not-a-port");
        let result = port_var("MACHINE_BRIDGE_TEST_BAD_PORT", 8883);
        env::remove_var("MACHINE_BRIDGE_TEST_BAD_PORT");

        assert!(matches!(result, Err(BridgeError::ConfigError(_))));
    }

    #[test]
    fn test_require_var_missing() {
        let result = require_var("MACHINE_BRIDGE_TEST_MISSING_VAR");
        assert!(matches!(result, Err(BridgeError::ConfigError(_))));
    }
}
