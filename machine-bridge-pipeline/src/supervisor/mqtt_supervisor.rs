//! MQTT connection supervisor.
//!
//! Drives the broker event loop, dispatches inbound publishes to the
//! message handler one at a time, and recovers from session drops with a
//! fixed-delay retry loop. The first connection failure is fatal; after a
//! successful connect the supervisor retries indefinitely until the
//! termination flag is set.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rumqttc::{
    AsyncClient, ConnectionError, Event, EventLoop, MqttOptions, Packet, QoS, TlsConfiguration,
    Transport,
};
use tracing::{info, warn};

use crate::errors::PipelineError;
use crate::handler::MessageHandler;
use crate::supervisor::SessionState;
use machine_bridge_shared::BridgeState;

/// The topic carrying machine production events.
pub const PRODUCE_TOPIC: &str = "Machine/Produce";

/// Client identifier presented to the broker. Reconnects reuse it.
const MQTT_CLIENT_ID: &str = "MqttAggregator";

/// Keep-alive interval for the broker session.
const KEEP_ALIVE: Duration = Duration::from_secs(60);

/// Fixed delay between reconnect attempts.
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Capacity of the client request queue.
const REQUEST_QUEUE_CAPACITY: usize = 10;

/// Broker connection settings.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// Broker hostname.
    pub host: String,
    /// Broker port.
    pub port: u16,
    /// Username credential.
    pub username: String,
    /// Password credential.
    pub password: String,
}

impl BrokerConfig {
    fn mqtt_options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(MQTT_CLIENT_ID, self.host.as_str(), self.port);
        options.set_credentials(self.username.as_str(), self.password.as_str());
        options.set_keep_alive(KEEP_ALIVE);
        options.set_transport(Transport::Tls(TlsConfiguration::Native));
        options
    }
}

/// Control flow decision after processing one event-loop poll.
enum Flow {
    /// Keep polling.
    Continue,
    /// The session reached its terminal state.
    Closed,
}

/// Handle for stopping a running supervisor.
///
/// Clonable across tasks; `stop` is idempotent.
#[derive(Clone)]
pub struct SupervisorHandle {
    client: AsyncClient,
    state: Arc<BridgeState>,
    closed: Arc<AtomicBool>,
}

impl SupervisorHandle {
    /// Stop the supervisor: set the termination flag, stop message delivery
    /// and close the session. The second and later calls are no-ops.
    pub async fn stop(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        self.state.begin_termination();

        if let Err(e) = self.client.disconnect().await {
            warn!(error = %e, "Failed to send disconnect to broker");
        }

        info!("MQTT session stop requested");
    }
}

/// Supervisor that owns the broker session.
///
/// Inbound publishes are handled inline on the supervisor's own task, so
/// messages are processed serially in delivery order.
pub struct MqttSupervisor {
    client: AsyncClient,
    eventloop: EventLoop,
    handler: MessageHandler,
    state: Arc<BridgeState>,
    session: SessionState,
    ever_connected: bool,
    closed: Arc<AtomicBool>,
}

impl MqttSupervisor {
    /// Open the broker session handles.
    ///
    /// No network I/O happens until the supervisor runs; the returned client
    /// can be cloned for the feedback publisher before wiring the handler in.
    pub fn open_session(config: &BrokerConfig) -> (AsyncClient, EventLoop) {
        AsyncClient::new(config.mqtt_options(), REQUEST_QUEUE_CAPACITY)
    }

    /// Create a new supervisor over an open session.
    pub fn new(
        client: AsyncClient,
        eventloop: EventLoop,
        handler: MessageHandler,
        state: Arc<BridgeState>,
    ) -> Self {
        Self {
            client,
            eventloop,
            handler,
            state,
            session: SessionState::Disconnected,
            ever_connected: false,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a stop handle for this supervisor.
    pub fn handle(&self) -> SupervisorHandle {
        SupervisorHandle {
            client: self.client.clone(),
            state: self.state.clone(),
            closed: self.closed.clone(),
        }
    }

    /// Current session state.
    pub fn session(&self) -> SessionState {
        self.session
    }

    /// Drive the broker session until it is closed.
    ///
    /// Returns an error only for a failed initial connection (fatal to the
    /// process) or a broken client channel; session drops after a successful
    /// connect are retried here indefinitely.
    pub async fn run(mut self) -> Result<(), PipelineError> {
        self.transition(SessionState::Connecting);

        loop {
            if self.state.is_terminating() {
                self.transition(SessionState::Closed);
                break;
            }

            let polled = self.eventloop.poll().await;
            match self.process(polled).await? {
                Flow::Continue => {}
                Flow::Closed => break,
            }
        }

        info!("Supervisor stopped");
        Ok(())
    }

    /// Process the outcome of one event-loop poll.
    async fn process(
        &mut self,
        polled: Result<Event, ConnectionError>,
    ) -> Result<Flow, PipelineError> {
        match polled {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                info!(session_present = ack.session_present, "Connected to MQTT broker");
                self.ever_connected = true;
                self.state.set_connected(true);
                self.transition(SessionState::Connected);

                // The broker is not trusted to preserve subscriptions
                // across sessions; subscribe on every ConnAck.
                self.client.subscribe(PRODUCE_TOPIC, QoS::AtLeastOnce).await?;
                info!(topic = PRODUCE_TOPIC, "Subscribed to production topic");

                Ok(Flow::Continue)
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                self.handler.handle(&publish.topic, &publish.payload).await;
                Ok(Flow::Continue)
            }
            Ok(_) => Ok(Flow::Continue),
            Err(e) => {
                if !self.ever_connected {
                    return Err(PipelineError::connection(e.to_string()));
                }

                self.state.set_connected(false);
                self.transition(SessionState::Connecting);
                warn!(error = %e, "Lost connection to MQTT broker, retrying");

                if self.await_retry().await {
                    Ok(Flow::Continue)
                } else {
                    self.transition(SessionState::Closed);
                    Ok(Flow::Closed)
                }
            }
        }
    }

    /// Wait out the retry delay.
    ///
    /// The termination flag is checked before and after the sleep, bounding
    /// shutdown latency to one retry interval. Returns false if termination
    /// was requested.
    async fn await_retry(&mut self) -> bool {
        if self.state.is_terminating() {
            return false;
        }

        tokio::time::sleep(RETRY_DELAY).await;

        !self.state.is_terminating()
    }

    fn transition(&mut self, next: SessionState) {
        if self.session != next {
            info!(from = %self.session, to = %next, "Session state changed");
            self.session = next;
        }
    }
}
